//! Multi-strategy dispatch of a protocol URL.
//!
//! Several strategies may be able to hand a URL to the OS, and some of them
//! cannot tell whether they worked. Strategies run one after another and share
//! a [`SuccessCell`]: the first confirmed success settles the cell, every later
//! strategy sees it and is skipped, and a duplicate success is ignored. The
//! cell empties itself after a cool-down so a later activation can run again.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::PathHubError;

struct Settled {
    strategy: String,
    at: Instant,
}

/// Single-assignment success marker with a cool-down.
pub struct SuccessCell {
    settled: Mutex<Option<Settled>>,
    cooldown: Duration,
}

impl SuccessCell {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            settled: Mutex::new(None),
            cooldown,
        }
    }

    /// Record `strategy` as the winner. Returns `false` if another strategy
    /// already won within the cool-down window.
    pub fn try_settle(&self, strategy: &str) -> bool {
        let mut settled = self.settled.lock().expect("success cell poisoned");
        if let Some(existing) = settled.as_ref() {
            if existing.at.elapsed() < self.cooldown {
                debug!(
                    "Duplicate success from {} ignored (settled by {})",
                    strategy, existing.strategy
                );
                return false;
            }
        }
        *settled = Some(Settled {
            strategy: strategy.to_string(),
            at: Instant::now(),
        });
        true
    }

    /// Name of the winning strategy, if the cell is settled and not expired.
    pub fn winner(&self) -> Option<String> {
        let mut settled = self.settled.lock().expect("success cell poisoned");
        let expired = match settled.as_ref() {
            Some(existing) if existing.at.elapsed() < self.cooldown => {
                return Some(existing.strategy.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("Success cell cool-down elapsed, resetting");
            *settled = None;
        }
        None
    }

    pub fn is_settled(&self) -> bool {
        self.winner().is_some()
    }
}

/// One way of handing a URL to the OS.
#[async_trait]
pub trait DispatchStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(true)` when the strategy confirmed success, `Ok(false)` when it
    /// launched without being able to confirm. A strategy may also settle
    /// `cell` itself from a confirmation it observes later.
    async fn attempt(&self, url: &str, cell: &SuccessCell) -> Result<bool, PathHubError>;
}

/// Result of [`dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded { strategy: String },
    /// The cell was already settled, by this run or by another one.
    AlreadySettled { by: String },
    Exhausted { failures: Vec<PathHubError> },
}

/// Try `strategies` in order until one succeeds.
///
/// The cell is checked before every attempt, and `interval` is waited after
/// each unconfirmed or failed attempt to give confirmations time to arrive.
pub async fn dispatch(
    url: &str,
    strategies: &[Box<dyn DispatchStrategy>],
    cell: &SuccessCell,
    interval: Duration,
) -> DispatchOutcome {
    let mut failures = Vec::new();

    for (index, strategy) in strategies.iter().enumerate() {
        if let Some(by) = cell.winner() {
            info!("Already dispatched by {}, skipping remaining strategies", by);
            return DispatchOutcome::AlreadySettled { by };
        }

        debug!("Trying strategy {}: {}", index + 1, strategy.name());
        match strategy.attempt(url, cell).await {
            Ok(true) => {
                if cell.try_settle(strategy.name()) {
                    info!("Dispatched via {}", strategy.name());
                    return DispatchOutcome::Succeeded {
                        strategy: strategy.name().to_string(),
                    };
                }
                let by = cell.winner().unwrap_or_else(|| strategy.name().to_string());
                return DispatchOutcome::AlreadySettled { by };
            }
            Ok(false) => debug!("Strategy {} launched without confirmation", strategy.name()),
            Err(e) => {
                warn!("Strategy {} failed: {}", strategy.name(), e);
                failures.push(e);
            }
        }

        tokio::time::sleep(interval).await;
    }

    match cell.winner() {
        Some(by) => DispatchOutcome::AlreadySettled { by },
        None => {
            warn!("All {} dispatch strategies failed", strategies.len());
            DispatchOutcome::Exhausted { failures }
        }
    }
}
