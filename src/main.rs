//! Races Brasil API against ViaCEP for one postal code and prints the winner.
//!
//! The first provider outcome to arrive is printed, whether it is an address
//! or a failure description; if none arrives in time, `timeout` is printed.
//! Per-provider latency is logged as each lookup finishes, winners and losers
//! alike.

mod cli;

use clap::Parser;
use cli::Args;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hedged_cep_lookup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let cep = args.cep()?;
    let client = args.build_client()?;

    let report = client.lookup(&cep).await?;

    println!("{}", report.outcome);

    match args.drain_grace() {
        Some(grace) => {
            let drained = report.stragglers.drain(grace).await;
            info!(
                finished = drained.finished,
                panicked = drained.panicked,
                abandoned = drained.abandoned,
                "provider tasks settled"
            );
        }
        None => report.stragglers.abandon(),
    }

    Ok(())
}
