//! Repeated races between simulated providers, without touching the network.
//!
//! Each race pits two stub providers with jittered latencies against a short
//! timeout, then prints per-provider win counts and the number of timeouts.
//! Useful for seeing how the race timeout trades answers for latency.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use hedged_cep_lookup::{
    race, Address, AddressResult, Outcome, ProviderId, RaceOutcome,
};
use tokio::sync::{mpsc, Semaphore};

const NUM_RACES: usize = 200;
const MAX_IN_FLIGHT: usize = 32;
const TIMEOUT: Duration = Duration::from_millis(120);

#[derive(Debug)]
struct RaceResult {
    race_idx: usize,
    winner: Option<ProviderId>,
    latency: Duration,
}

/// Deterministic jitter so runs are reproducible.
fn jitter(race_idx: usize, salt: usize, max_ms: u64) -> Duration {
    let mixed = (race_idx.wrapping_mul(2_654_435_761) ^ salt.wrapping_mul(40_503)) as u64;
    Duration::from_millis(mixed % max_ms)
}

async fn stub_provider(id: &'static str, delay: Duration) -> Outcome {
    tokio::time::sleep(delay).await;
    let address = Address {
        postal_code: "01153000".into(),
        street: "Rua Vitorino Carmilo".into(),
        neighborhood: "Barra Funda".into(),
        city: "São Paulo".into(),
        region: "SP".into(),
    };
    Outcome {
        provider: ProviderId(id),
        endpoint: format!("stub://{id}"),
        elapsed: delay,
        result: Ok(AddressResult::new(address, ProviderId(id))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<RaceResult>(MAX_IN_FLIGHT * 2);
    let semaphore = Arc::new(Semaphore::new(MAX_IN_FLIGHT));

    let consumer = tokio::spawn(async move {
        let mut results = Vec::with_capacity(NUM_RACES);
        while let Some(res) = rx.recv().await {
            results.push(res);
        }
        results
    });

    for i in 0..NUM_RACES {
        let tx = tx.clone();
        let sem = semaphore.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return;
            };

            let lookups = [
                stub_provider("Brasil API", Duration::from_millis(30) + jitter(i, 1, 150)),
                stub_provider("Via CEP", Duration::from_millis(50) + jitter(i, 2, 100)),
            ];

            let start = Instant::now();
            let winner = match race(lookups, TIMEOUT).await {
                Ok(report) => {
                    report.stragglers.abandon();
                    match report.outcome {
                        RaceOutcome::Settled(outcome) => Some(outcome.provider),
                        RaceOutcome::TimedOut(_) => None,
                    }
                }
                Err(e) => {
                    eprintln!("[race {i:04}] error: {e}");
                    None
                }
            };

            let _ = tx
                .send(RaceResult {
                    race_idx: i,
                    winner,
                    latency: start.elapsed(),
                })
                .await;
        });
    }

    drop(tx);
    let mut results = consumer.await?;
    results.sort_by_key(|r| r.race_idx);

    let mut wins: HashMap<&'static str, usize> = HashMap::new();
    let mut total_latency: HashMap<&'static str, Duration> = HashMap::new();
    let mut timeouts = 0usize;

    for r in &results {
        match r.winner {
            Some(provider) => {
                *wins.entry(provider.0).or_insert(0) += 1;
                *total_latency.entry(provider.0).or_insert(Duration::ZERO) += r.latency;
            }
            None => timeouts += 1,
        }
    }

    println!("=== summary ===");
    println!("races                : {}", results.len());
    println!("timeouts ({:?})    : {}", TIMEOUT, timeouts);

    for (provider, count) in wins.iter() {
        let avg_ms = total_latency[provider].as_secs_f64() * 1000.0 / (*count as f64);
        println!(
            "provider {:>10}: wins = {:4}, avg_latency = {:7.2} ms",
            provider, count, avg_ms,
        );
    }

    Ok(())
}
