//! Command-line configuration for the lookup binary.

use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use hedged_cep_lookup::{
    config::{BRASIL_API_URL, VIA_CEP_URL},
    Cep, CepClient, ProviderConfig, RaceConfig,
};

/// Looks a CEP up at Brasil API and ViaCEP at once and prints the first answer.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Postal code to look up (NNNNNNNN or NNNNN-NNN).
    #[arg(default_value = "01153000")]
    pub cep: String,

    /// How long to wait for the first provider, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Connect timeout for each provider request, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// End-to-end timeout for each provider request, in milliseconds.
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Wait up to this many milliseconds for losing lookups before exiting.
    ///
    /// Without it, losing lookups are dropped when the process exits.
    #[arg(long)]
    pub drain_ms: Option<u64>,

    /// Brasil API URL template; `{cep}` is replaced by the postal code.
    #[arg(long, env = "CEP_BRASILAPI_URL", default_value = BRASIL_API_URL)]
    pub brasilapi_url: String,

    /// ViaCEP URL template; `{cep}` is replaced by the postal code.
    #[arg(long, env = "CEP_VIACEP_URL", default_value = VIA_CEP_URL)]
    pub viacep_url: String,
}

impl Args {
    pub fn cep(&self) -> Result<Cep> {
        Ok(Cep::parse(&self.cep)?)
    }

    pub fn drain_grace(&self) -> Option<Duration> {
        self.drain_ms.map(Duration::from_millis)
    }

    pub fn race_config(&self) -> RaceConfig {
        RaceConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            ..RaceConfig::default()
        }
    }

    /// Builds the racing client from the parsed arguments.
    pub fn build_client(&self) -> Result<CepClient> {
        let providers = vec![
            ProviderConfig::brasil_api().with_url_template(&self.brasilapi_url),
            ProviderConfig::via_cep().with_url_template(&self.viacep_url),
        ];

        Ok(CepClient::new(providers, self.race_config())?)
    }
}
