//! First-arrival race across independent provider lookups.

use std::{fmt, future::Future, time::Duration};

use futures::{stream::FuturesUnordered, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle, time};
use tracing::{debug, warn};

use crate::{errors::CepError, provider::Outcome};

/// Race timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// How a race resolved.
#[derive(Debug)]
pub enum RaceOutcome {
    /// The first outcome delivered by any provider, success or failure.
    Settled(Outcome),
    /// Nothing arrived before the timeout.
    TimedOut(Duration),
}

impl RaceOutcome {
    /// Returns `true` if nothing arrived before the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// The winning outcome, if the race did not time out.
    pub fn settled(&self) -> Option<&Outcome> {
        match self {
            Self::Settled(outcome) => Some(outcome),
            Self::TimedOut(_) => None,
        }
    }
}

impl fmt::Display for RaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settled(outcome) => write!(f, "{outcome}"),
            Self::TimedOut(_) => f.write_str("timeout"),
        }
    }
}

/// Result of [`race`]: the resolution plus every task it spawned.
#[derive(Debug)]
pub struct RaceReport {
    pub outcome: RaceOutcome,
    pub stragglers: Stragglers,
}

/// Provider tasks still owned after a race resolved.
///
/// Losing tasks are never cancelled. Either [`abandon`](Self::abandon) them,
/// leaving them to finish on their own or die with the runtime, or
/// [`drain`](Self::drain) them before shutting down.
#[derive(Debug)]
pub struct Stragglers {
    handles: Vec<JoinHandle<()>>,
}

/// What [`Stragglers::drain`] observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tasks that ran to completion.
    pub finished: usize,
    /// Tasks whose lookup panicked.
    pub panicked: usize,
    /// Tasks still running at the deadline, now detached, or cancelled by a
    /// shutting-down runtime.
    pub abandoned: usize,
}

impl Stragglers {
    /// Number of provider tasks the race spawned.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if the race spawned no tasks.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Detaches every task without waiting for it.
    pub fn abandon(self) {
        let running = self.handles.iter().filter(|h| !h.is_finished()).count();
        debug!(running, "abandoning provider tasks");
    }

    /// Waits up to `grace` for every task to finish.
    pub async fn drain(self, grace: Duration) -> DrainReport {
        let total = self.handles.len();
        let mut pending: FuturesUnordered<_> = self.handles.into_iter().collect();
        let mut report = DrainReport::default();

        let deadline = time::sleep(grace);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                joined = pending.next() => match joined {
                    Some(Ok(())) => report.finished += 1,
                    Some(Err(e)) if e.is_panic() => {
                        warn!(error = %e, "provider task panicked");
                        report.panicked += 1;
                    }
                    Some(Err(e)) => debug!(error = %e, "provider task cancelled"),
                    None => break,
                },
                _ = &mut deadline => break,
            }
        }

        report.abandoned = total - report.finished - report.panicked;
        debug!(?report, "drained provider tasks");
        report
    }
}

/// One slot per lookup: every task's single send completes even while the
/// receiver is alive and unread.
fn outcome_channel(lookups: usize) -> (mpsc::Sender<Outcome>, mpsc::Receiver<Outcome>) {
    mpsc::channel(lookups)
}

/// Runs every lookup concurrently and resolves to the first outcome or a timeout.
///
/// Each lookup runs on its own task and delivers exactly one [`Outcome`] to a
/// channel sized to the number of lookups, so a loser's send never blocks even
/// though nobody reads it. Losers are not cancelled; they are handed back in
/// [`RaceReport::stragglers`].
///
/// # Errors
/// * [`CepError::NoProviders`] when `lookups` is empty.
/// * [`CepError::ProvidersExited`] when every task ended without an outcome.
pub async fn race<I, Fut>(lookups: I, timeout: Duration) -> Result<RaceReport, CepError>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let lookups: Vec<Fut> = lookups.into_iter().collect();
    if lookups.is_empty() {
        return Err(CepError::NoProviders);
    }

    let (tx, mut rx) = outcome_channel(lookups.len());

    let handles = lookups
        .into_iter()
        .map(|lookup| {
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = lookup.await;
                // Capacity covers every lookup, so this never waits. Once the
                // race resolves the receiver is gone and the send fails fast.
                let _ = tx.send(outcome).await;
            })
        })
        .collect();
    drop(tx);

    let stragglers = Stragglers { handles };

    let outcome = match time::timeout(timeout, rx.recv()).await {
        Ok(Some(winner)) => {
            debug!(
                provider = %winner.provider,
                success = winner.is_success(),
                "race settled"
            );
            RaceOutcome::Settled(winner)
        }
        Ok(None) => return Err(CepError::ProvidersExited),
        Err(_) => {
            debug!(?timeout, "race timed out");
            RaceOutcome::TimedOut(timeout)
        }
    };

    Ok(RaceReport {
        outcome,
        stragglers,
    })
}
