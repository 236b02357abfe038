use reqwest::StatusCode;

/// Failure of a single provider lookup.
///
/// These never escape the race as errors: they travel inside an
/// [`Outcome`](crate::Outcome) and can win the race like any address.
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    /// The provider could not be reached or the body could not be read.
    #[error("Failed to make request to {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with something other than `200 OK`.
    #[error("Non-OK HTTP status: {status}")]
    Status { endpoint: String, status: StatusCode },

    /// The body did not match the provider's response schema.
    #[error("Failed to decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LookupError {
    /// Endpoint of the lookup that failed.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// Errors raised by the race coordinator and the client facade.
#[derive(thiserror::Error, Debug)]
pub enum CepError {
    /// No providers were given to race.
    #[error("no providers configured")]
    NoProviders,

    /// Every provider task ended without delivering an outcome.
    ///
    /// Only happens when the provider futures panic.
    #[error("all provider tasks exited without reporting an outcome")]
    ProvidersExited,

    /// The postal code is not eight digits (optionally `NNNNN-NNN`).
    #[error("invalid CEP {0:?}: expected 8 digits, optionally formatted as NNNNN-NNN")]
    InvalidCep(String),

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}
