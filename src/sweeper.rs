//! Balayage quotidien des remplacements échus.
//!
//! Tâche de fond indépendante des requêtes : elle ne tient qu'une référence
//! vers le planner, tourne une fois par jour à `run_at` (heure locale) et ne
//! remonte ses échecs qu'aux logs. Un échec est retenté au passage suivant.

use crate::error::SchedError;
use crate::planner::Planner;
use crate::storage::Storage;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use mockable::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Options du balayage
#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    pub run_at: NaiveTime,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self { run_at: NaiveTime::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Completed { today: NaiveDate, removed: usize },
    /// Un autre balayage était déjà en cours.
    AlreadyRunning,
}

pub struct Sweeper<S> {
    planner: Arc<Planner<S>>,
    clock: Arc<dyn Clock + Send + Sync>,
    opts: SweepOptions,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: Storage + 'static> Sweeper<S> {
    pub fn new(
        planner: Arc<Planner<S>>,
        clock: Arc<dyn Clock + Send + Sync>,
        opts: SweepOptions,
    ) -> Self {
        Self {
            planner,
            clock,
            opts,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }

    /// Un passage de balayage ; jamais deux à la fois.
    pub fn sweep_now(&self) -> Result<SweepOutcome, SchedError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!("sweep already in flight, skipping");
            return Ok(SweepOutcome::AlreadyRunning);
        }
        let _guard = InFlight(&self.in_flight);

        let today = self.today();
        let removed = self.planner.sweep_expired(today)?;
        Ok(SweepOutcome::Completed { today, removed })
    }

    /// Délai jusqu'au prochain `run_at` strictement futur.
    pub fn next_run_delay(&self) -> Duration {
        let now = self.clock.local().naive_local();
        let mut next = now.date().and_time(self.opts.run_at);
        if next <= now {
            next += ChronoDuration::days(1);
        }
        (next - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Lance la boucle quotidienne sur le runtime tokio courant.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let delay = self.next_run_delay();
                info!(delay_secs = delay.as_secs(), "next substitution sweep scheduled");
                tokio::time::sleep(delay).await;

                let sweeper = Arc::clone(&self);
                match tokio::task::spawn_blocking(move || sweeper.sweep_now()).await {
                    Ok(Ok(SweepOutcome::Completed { today, removed })) => {
                        info!(%today, removed, "substitution sweep completed");
                    }
                    Ok(Ok(SweepOutcome::AlreadyRunning)) => {}
                    Ok(Err(err)) => error!(error = %err, "substitution sweep failed, retrying next run"),
                    Err(err) => error!(error = %err, "substitution sweep task panicked"),
                }
            }
        })
    }
}
