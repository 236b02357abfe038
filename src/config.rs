use std::{fmt, time::Duration};

use serde::Deserialize;

use crate::{
    address::{Address, Cep},
    provider::LookupRequest,
};

/// Unique, human-readable name of an address provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId(pub &'static str);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Maps a provider's raw response body onto the shared [`Address`] shape.
pub type Normalizer = fn(&[u8]) -> Result<Address, serde_json::Error>;

/// Placeholder replaced by the postal code in a provider URL template.
pub const CEP_PLACEHOLDER: &str = "{cep}";

pub const BRASIL_API_URL: &str = "https://brasilapi.com.br/api/cep/v1/{cep}";
pub const VIA_CEP_URL: &str = "http://viacep.com.br/ws/{cep}/json";

/// Configuration for a single address provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Unique identifier, also shown as the source of a rendered address.
    pub id: ProviderId,
    /// Endpoint URL with a `{cep}` placeholder.
    pub url_template: String,
    /// Decoder for this provider's response schema.
    pub normalize: Normalizer,
}

impl ProviderConfig {
    /// Brasil API (`cep`, `street`, `neighborhood`, `city`, `state`).
    pub fn brasil_api() -> Self {
        Self {
            id: ProviderId("Brasil API"),
            url_template: BRASIL_API_URL.to_string(),
            normalize: normalize_brasil_api,
        }
    }

    /// ViaCEP (`cep`, `logradouro`, `bairro`, `localidade`, `uf`).
    pub fn via_cep() -> Self {
        Self {
            id: ProviderId("Via CEP"),
            url_template: VIA_CEP_URL.to_string(),
            normalize: normalize_via_cep,
        }
    }

    /// Replaces the URL template, keeping id and decoder.
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    /// Returns the endpoint URL for `cep`.
    pub fn endpoint_for(&self, cep: &Cep) -> String {
        self.url_template.replace(CEP_PLACEHOLDER, cep.as_str())
    }

    /// Builds the request a provider task executes for `cep`.
    pub fn request_for(&self, cep: &Cep) -> LookupRequest {
        LookupRequest {
            provider: self.id,
            endpoint: self.endpoint_for(cep),
            normalize: self.normalize,
        }
    }
}

/// The providers raced when none are configured explicitly.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::brasil_api(), ProviderConfig::via_cep()]
}

#[derive(Debug, Deserialize)]
struct BrasilApiResponse {
    cep: String,
    street: String,
    neighborhood: String,
    city: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    cep: String,
    logradouro: String,
    bairro: String,
    localidade: String,
    uf: String,
}

pub fn normalize_brasil_api(body: &[u8]) -> Result<Address, serde_json::Error> {
    let r: BrasilApiResponse = serde_json::from_slice(body)?;
    Ok(Address {
        postal_code: r.cep,
        street: r.street,
        neighborhood: r.neighborhood,
        city: r.city,
        region: r.state,
    })
}

pub fn normalize_via_cep(body: &[u8]) -> Result<Address, serde_json::Error> {
    let r: ViaCepResponse = serde_json::from_slice(body)?;
    Ok(Address {
        postal_code: r.cep,
        street: r.logradouro,
        neighborhood: r.bairro,
        city: r.localidade,
        region: r.uf,
    })
}

/// Race and transport configuration.
#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Maximum time to wait for the first provider outcome.
    pub timeout: Duration,

    /// Connect timeout of the shared HTTP client.
    ///
    /// Bounds how long a provider task can hang on an unreachable endpoint.
    pub connect_timeout: Duration,

    /// Optional end-to-end timeout for each provider request.
    ///
    /// Losing providers are never cancelled, so this is also what bounds the
    /// lifetime of their background tasks.
    pub request_timeout: Option<Duration>,

    /// `User-Agent` sent to every provider.
    pub user_agent: String,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            timeout: crate::race::DEFAULT_TIMEOUT,
            connect_timeout: Duration::from_secs(5),
            request_timeout: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

impl RaceConfig {
    /// Tolerates slow providers:
    /// - 3 second race timeout
    /// - 10 second request timeout
    pub fn patient() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            request_timeout: Some(Duration::from_secs(10)),
            ..Self::default()
        }
    }

    /// Gives up early and keeps background requests short-lived:
    /// - 500ms race timeout
    /// - 2 second connect and request timeouts
    pub fn strict() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Some(Duration::from_secs(2)),
            ..Self::default()
        }
    }
}
