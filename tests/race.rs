use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use hedged_cep_lookup::{
    race, Address, AddressResult, LookupError, Outcome, ProviderId, RaceOutcome,
};
use reqwest::StatusCode;
use tokio::time::{self, Instant};

const TIMEOUT: Duration = Duration::from_millis(1000);

fn address(street: &str) -> Address {
    Address {
        postal_code: "01153000".into(),
        street: street.into(),
        neighborhood: "Barra Funda".into(),
        city: "São Paulo".into(),
        region: "SP".into(),
    }
}

/// A provider stub that answers with an address after `delay`.
fn succeeds_after(
    id: &'static str,
    delay: Duration,
    street: &'static str,
) -> impl Future<Output = Outcome> + Send + 'static {
    async move {
        time::sleep(delay).await;
        Outcome {
            provider: ProviderId(id),
            endpoint: format!("stub://{id}"),
            elapsed: delay,
            result: Ok(AddressResult::new(address(street), ProviderId(id))),
        }
    }
}

/// A provider stub that answers with a 404 after `delay`.
fn fails_after(id: &'static str, delay: Duration) -> impl Future<Output = Outcome> + Send + 'static {
    async move {
        time::sleep(delay).await;
        let endpoint = format!("stub://{id}");
        Outcome {
            provider: ProviderId(id),
            endpoint: endpoint.clone(),
            elapsed: delay,
            result: Err(LookupError::Status {
                endpoint,
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

type BoxedLookup = std::pin::Pin<Box<dyn Future<Output = Outcome> + Send>>;

fn boxed(fut: impl Future<Output = Outcome> + Send + 'static) -> BoxedLookup {
    Box::pin(fut)
}

fn winner(outcome: &RaceOutcome) -> ProviderId {
    outcome.settled().expect("race should have settled").provider
}

#[tokio::test(start_paused = true)]
async fn first_arrival_wins() {
    let start = Instant::now();
    let report = race(
        [
            succeeds_after("A", Duration::from_millis(100), "Rua X"),
            succeeds_after("B", Duration::from_millis(400), "Rua Y"),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(100));
    assert_eq!(winner(&report.outcome), ProviderId("A"));

    let text = report.outcome.to_string();
    assert!(text.contains("Logradouro: Rua X"), "{text}");
    assert!(text.ends_with("Consulta feita por: A"), "{text}");
}

#[tokio::test(start_paused = true)]
async fn registration_order_does_not_matter() {
    let report = race(
        [
            succeeds_after("slow", Duration::from_millis(400), "Rua Y"),
            succeeds_after("fast", Duration::from_millis(100), "Rua X"),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(winner(&report.outcome), ProviderId("fast"));
}

#[tokio::test(start_paused = true)]
async fn failure_can_win_the_race() {
    let report = race(
        [
            boxed(fails_after("broken", Duration::from_millis(50))),
            boxed(succeeds_after("healthy", Duration::from_millis(300), "Rua X")),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();

    let settled = report.outcome.settled().unwrap();
    assert_eq!(settled.provider, ProviderId("broken"));
    assert!(!settled.is_success());
    assert_eq!(report.outcome.to_string(), "Non-OK HTTP status: 404 Not Found");
}

#[tokio::test(start_paused = true)]
async fn success_wins_when_it_arrives_before_failure() {
    let report = race(
        [
            boxed(fails_after("broken", Duration::from_millis(500))),
            boxed(succeeds_after("healthy", Duration::from_millis(200), "Rua X")),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();

    let settled = report.outcome.settled().unwrap();
    assert_eq!(settled.provider, ProviderId("healthy"));
    assert!(settled.is_success());
}

#[tokio::test(start_paused = true)]
async fn slow_providers_time_out() {
    let start = Instant::now();
    let report = race(
        [
            succeeds_after("A", Duration::from_millis(2000), "Rua X"),
            succeeds_after("B", Duration::from_millis(2000), "Rua Y"),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(start.elapsed(), TIMEOUT);
    assert!(report.outcome.is_timeout());
    assert_eq!(report.outcome.to_string(), "timeout");
}

#[tokio::test(start_paused = true)]
async fn race_never_outlives_its_timeout() {
    for n in 1..=5 {
        let start = Instant::now();
        let lookups =
            (0..n).map(|_| succeeds_after("never", Duration::from_secs(3600), "Rua X"));

        let report = race(lookups, TIMEOUT).await.unwrap();

        assert!(report.outcome.is_timeout());
        assert!(start.elapsed() <= TIMEOUT + Duration::from_millis(1));
        assert_eq!(report.stragglers.len(), n);
    }
}

#[tokio::test(start_paused = true)]
async fn single_provider_is_raced_alone() {
    let report = race(
        [succeeds_after("only", Duration::from_millis(10), "Rua X")],
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(winner(&report.outcome), ProviderId("only"));
}

#[tokio::test(start_paused = true)]
async fn same_inputs_pick_the_same_winner() {
    let run = || {
        race(
            [
                boxed(succeeds_after("A", Duration::from_millis(120), "Rua X")),
                boxed(fails_after("B", Duration::from_millis(250))),
            ],
            TIMEOUT,
        )
    };

    let first = run().await.unwrap();
    let second = run().await.unwrap();

    assert_eq!(winner(&first.outcome), winner(&second.outcome));
    assert_eq!(first.outcome.to_string(), second.outcome.to_string());
}

#[tokio::test(start_paused = true)]
async fn losing_providers_run_to_completion() {
    let completed = Arc::new(AtomicUsize::new(0));

    let lookups = [100u64, 400, 700].map(|ms| {
        let completed = completed.clone();
        async move {
            let outcome = succeeds_after("p", Duration::from_millis(ms), "Rua X").await;
            completed.fetch_add(1, Ordering::SeqCst);
            outcome
        }
    });

    let report = race(lookups, TIMEOUT).await.unwrap();
    assert!(!report.outcome.is_timeout());
    assert_eq!(completed.load(Ordering::SeqCst), 1);

    // Nobody reads the losers' outcomes, yet their sends must not block.
    let drained = report.stragglers.drain(Duration::from_secs(5)).await;

    assert_eq!(drained.finished, 3);
    assert_eq!(drained.panicked, 0);
    assert_eq!(drained.abandoned, 0);
    assert_eq!(completed.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn losers_keep_running_after_a_timeout() {
    let report = race(
        [
            succeeds_after("A", Duration::from_millis(1500), "Rua X"),
            succeeds_after("B", Duration::from_millis(2500), "Rua Y"),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();
    assert!(report.outcome.is_timeout());

    let drained = report.stragglers.drain(Duration::from_secs(5)).await;
    assert_eq!(drained.finished, 2);
    assert_eq!(drained.abandoned, 0);
}

#[tokio::test(start_paused = true)]
async fn drain_detaches_tasks_past_the_grace_period() {
    let report = race(
        [
            succeeds_after("fast", Duration::from_millis(10), "Rua X"),
            succeeds_after("stuck", Duration::from_secs(3600), "Rua Y"),
        ],
        TIMEOUT,
    )
    .await
    .unwrap();

    let drained = report.stragglers.drain(Duration::from_millis(500)).await;
    assert_eq!(drained.finished, 1);
    assert_eq!(drained.abandoned, 1);
}
