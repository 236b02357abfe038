//! Brazilian postal code (CEP) lookup that races several address providers.
//!
//! Every configured provider is queried at the same time and the first outcome
//! to arrive wins, whether it is an address or a failure. A lookup that takes
//! longer than the race timeout resolves to a timeout instead.
//!
//! # Quick Start
//!
//! ```no_run
//! use hedged_cep_lookup::{Cep, CepClient, RaceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CepClient::with_default_providers(RaceConfig::default())?;
//! let cep = Cep::parse("01153-000")?;
//!
//! let report = client.lookup(&cep).await?;
//! println!("{}", report.outcome);
//!
//! // Losing lookups keep running in the background; drop them.
//! report.stragglers.abandon();
//! # Ok(())
//! # }
//! ```
//!
//! # Racing arbitrary lookups
//!
//! [`race`] accepts any set of futures producing an [`Outcome`], so providers
//! can be stubbed or added without touching the coordinator.

pub mod address;
pub mod client;
pub mod config;
pub mod errors;
pub mod provider;
pub mod race;

pub use address::{Address, AddressResult, Cep};
pub use client::CepClient;
pub use config::{Normalizer, ProviderConfig, ProviderId, RaceConfig};
pub use errors::{CepError, LookupError};
pub use provider::{lookup, LookupRequest, Outcome};
pub use race::{race, DrainReport, RaceOutcome, RaceReport, Stragglers, DEFAULT_TIMEOUT};
