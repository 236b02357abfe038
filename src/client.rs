use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::{
    address::Cep,
    config::{default_providers, ProviderConfig, RaceConfig},
    errors::CepError,
    provider,
    race::{self, RaceReport},
};

/// A postal code client that races every configured provider.
///
/// Each [`lookup`](Self::lookup) queries all providers at once over a shared
/// HTTP client and resolves to the first outcome or to a timeout.
#[derive(Clone, Debug)]
pub struct CepClient {
    providers: Arc<Vec<ProviderConfig>>,
    http: Client,
    cfg: RaceConfig,
}

impl CepClient {
    /// Creates a client for the given providers and configuration.
    ///
    /// # Example
    /// ```no_run
    /// use hedged_cep_lookup::{CepClient, ProviderConfig, RaceConfig};
    /// use std::time::Duration;
    ///
    /// let providers = vec![
    ///     ProviderConfig::brasil_api(),
    ///     ProviderConfig::via_cep().with_url_template("http://localhost:8080/ws/{cep}/json"),
    /// ];
    ///
    /// let config = RaceConfig {
    ///     timeout: Duration::from_millis(750),
    ///     ..RaceConfig::default()
    /// };
    ///
    /// let client = CepClient::new(providers, config).unwrap();
    /// ```
    pub fn new(providers: Vec<ProviderConfig>, cfg: RaceConfig) -> Result<Self, CepError> {
        if providers.is_empty() {
            return Err(CepError::NoProviders);
        }

        let mut builder = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout);
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            providers: Arc::new(providers),
            http,
            cfg,
        })
    }

    /// Creates a client racing Brasil API against ViaCEP.
    pub fn with_default_providers(cfg: RaceConfig) -> Result<Self, CepError> {
        Self::new(default_providers(), cfg)
    }

    /// Returns a reference to the configured providers.
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    /// Returns the race configuration.
    pub fn config(&self) -> &RaceConfig {
        &self.cfg
    }

    /// Looks `cep` up at every provider and returns the first resolution.
    ///
    /// A failed provider that answers first still wins; inspect
    /// [`RaceOutcome`](crate::RaceOutcome) to tell addresses from failures.
    pub async fn lookup(&self, cep: &Cep) -> Result<RaceReport, CepError> {
        debug!(%cep, providers = self.providers.len(), "starting race");

        let lookups = self.providers.iter().map(|pcfg| {
            let request = pcfg.request_for(cep);
            provider::lookup(self.http.clone(), request)
        });

        race::race(lookups, self.cfg.timeout).await
    }
}
