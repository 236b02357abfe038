//! Single-provider lookup executed by each racing task.

use std::{
    fmt,
    time::{Duration, Instant},
};

use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::{
    address::{Address, AddressResult},
    config::{Normalizer, ProviderId},
    errors::LookupError,
};

/// Everything a provider task needs to perform one lookup.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub provider: ProviderId,
    pub endpoint: String,
    pub normalize: Normalizer,
}

/// The single message a provider task produces, success or failure.
#[derive(Debug)]
pub struct Outcome {
    pub provider: ProviderId,
    pub endpoint: String,
    /// Wall time of the lookup. Diagnostic only; it plays no part in the race.
    pub elapsed: Duration,
    pub result: Result<AddressResult, LookupError>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(address) => write!(f, "{address}"),
            Err(error) => write!(f, "{error}"),
        }
    }
}

/// Performs one GET against the request's endpoint and decodes the answer.
///
/// Never fails: every error is folded into the returned [`Outcome`].
pub async fn lookup(http: Client, request: LookupRequest) -> Outcome {
    let LookupRequest {
        provider,
        endpoint,
        normalize,
    } = request;

    let start = Instant::now();
    let result = fetch(&http, &endpoint, normalize).await;
    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

    match &result {
        Ok(_) => info!(
            provider = %provider,
            endpoint = %endpoint,
            elapsed_ms,
            "request to {endpoint} took {elapsed:?}"
        ),
        Err(error) => warn!(
            provider = %provider,
            endpoint = %endpoint,
            elapsed_ms,
            error = %error,
            "lookup failed"
        ),
    }

    Outcome {
        provider,
        endpoint,
        elapsed,
        result: result.map(|address| AddressResult::new(address, provider)),
    }
}

async fn fetch(
    http: &Client,
    endpoint: &str,
    normalize: Normalizer,
) -> Result<Address, LookupError> {
    let transport = |source: reqwest::Error| LookupError::Transport {
        endpoint: endpoint.to_string(),
        source,
    };

    // The response and its connection are released when this scope exits.
    let response = http.get(endpoint).send().await.map_err(transport)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(LookupError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(transport)?;

    normalize(&body).map_err(|source| LookupError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
