use crate::intervals::IntervalTable;
use log::{error, info, warn};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use vigil_core::{Regime, RegimeState};
use vigil_ports::{Clock, SchedulerError, SchedulerResult};

/// Error type job handlers may return; logged at the scheduler boundary.
pub type JobError = Box<dyn std::error::Error + Send + Sync>;

type BoxedJobFuture = Pin<Box<dyn Future<Output = Result<(), JobError>> + Send>>;
type JobFn = Arc<dyn Fn() -> BoxedJobFuture + Send + Sync>;

/// Declarative description of a recurring job
pub struct JobBuilder {
    name: String,
    interval: Duration,
    non_reentrant: bool,
    handler: JobFn,
}

impl JobBuilder {
    pub fn new<F, Fut>(name: impl Into<String>, interval: Duration, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            interval,
            non_reentrant: false,
            handler: Arc::new(move || Box::pin(handler()) as BoxedJobFuture),
        }
    }

    /// Declare the job non-reentrant: if a tick fires while the previous
    /// invocation is still running, the tick is skipped (and logged)
    /// instead of queued.
    pub fn non_reentrant(mut self) -> Self {
        self.non_reentrant = true;
        self
    }
}

struct JobEntry {
    interval: Duration,
    handler: JobFn,
    non_reentrant: bool,
    /// Number of handler invocations currently running
    in_flight: Arc<AtomicUsize>,
    timer: JoinHandle<()>,
}

struct Inner {
    jobs: HashMap<String, JobEntry>,
    regime: RegimeState,
    shut_down: bool,
}

/// Owns recurring jobs and adapts their cadence to the market regime
///
/// One tokio task per job timer. `reschedule` swaps only the *next*
/// scheduled firing: in-flight handler invocations run as detached
/// tasks and are never interrupted. A single mutex guards the regime
/// state and timer swaps, so concurrent reschedules are linearized.
pub struct AdaptiveScheduler {
    inner: Mutex<Inner>,
    intervals: IntervalTable,
    clock: Arc<dyn Clock>,
    /// Counts timer installations (used to verify reschedule is a
    /// no-op when the regime did not change).
    timer_installs: AtomicU64,
}

impl AdaptiveScheduler {
    pub fn new(intervals: IntervalTable, clock: Arc<dyn Clock>) -> Self {
        let regime = RegimeState::initial(clock.now());
        Self {
            inner: Mutex::new(Inner {
                jobs: HashMap::new(),
                regime,
                shut_down: false,
            }),
            intervals,
            clock,
            timer_installs: AtomicU64::new(0),
        }
    }

    /// Register a repeating job. Must be called from within a tokio
    /// runtime; the first firing happens one full interval from now.
    pub fn register(&self, job: JobBuilder) -> SchedulerResult<()> {
        let mut inner = self.inner.lock().expect("scheduler lock poisoned");
        if inner.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        if inner.jobs.contains_key(&job.name) {
            return Err(SchedulerError::DuplicateJob(job.name));
        }

        let in_flight = Arc::new(AtomicUsize::new(0));
        let timer = self.spawn_timer(
            job.name.clone(),
            job.interval,
            job.handler.clone(),
            job.non_reentrant,
            in_flight.clone(),
        );
        info!(
            "registered job '{}' (interval {:?}{})",
            job.name,
            job.interval,
            if job.non_reentrant {
                ", non-reentrant"
            } else {
                ""
            }
        );
        inner.jobs.insert(
            job.name,
            JobEntry {
                interval: job.interval,
                handler: job.handler,
                non_reentrant: job.non_reentrant,
                in_flight,
                timer,
            },
        );
        Ok(())
    }

    /// Apply a new regime: swap timers for every adaptive job whose
    /// interval changes under the new regime.
    ///
    /// Idempotent — calling with the already-active regime only updates
    /// the stored volatility reading and touches no timer. Returns the
    /// number of jobs whose timer was reinstalled.
    pub fn reschedule(&self, new_regime: Regime, volatility: f64) -> SchedulerResult<usize> {
        let mut inner = self.inner.lock().expect("scheduler lock poisoned");
        if inner.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        if inner.regime.regime == new_regime {
            inner.regime.last_volatility = volatility;
            return Ok(0);
        }

        let previous = inner.regime.regime;
        let affected: Vec<(String, Duration)> = self
            .intervals
            .jobs_for(new_regime)
            .filter_map(|job| {
                self.intervals
                    .interval(new_regime, job)
                    .map(|d| (job.to_string(), d))
            })
            .collect();

        let mut swapped = 0;
        for (name, new_interval) in affected {
            let Some(entry) = inner.jobs.get_mut(&name) else {
                continue;
            };
            if entry.interval == new_interval {
                continue;
            }
            // Cancel the next firing only; running invocations are
            // detached tasks and finish on their own.
            entry.timer.abort();
            entry.timer = self.spawn_timer(
                name.clone(),
                new_interval,
                entry.handler.clone(),
                entry.non_reentrant,
                entry.in_flight.clone(),
            );
            info!(
                "job '{}' rescheduled: {:?} -> {:?}",
                name, entry.interval, new_interval
            );
            entry.interval = new_interval;
            swapped += 1;
        }

        inner.regime = RegimeState {
            regime: new_regime,
            last_volatility: volatility,
            transitioned_at: self.clock.now(),
        };
        info!(
            "regime transition {} -> {} (volatility {:.1}), {} timer(s) swapped",
            previous, new_regime, volatility, swapped
        );
        Ok(swapped)
    }

    /// Consistent snapshot of the regime state.
    pub fn regime_state(&self) -> RegimeState {
        self.inner
            .lock()
            .expect("scheduler lock poisoned")
            .regime
            .clone()
    }

    /// Current interval of a registered job.
    pub fn interval_of(&self, name: &str) -> Option<Duration> {
        self.inner
            .lock()
            .expect("scheduler lock poisoned")
            .jobs
            .get(name)
            .map(|e| e.interval)
    }

    /// Total number of timer installations since construction.
    pub fn timer_installs(&self) -> u64 {
        self.timer_installs.load(Ordering::Relaxed)
    }

    /// Cancel all timers and wait (bounded by `grace`) for in-flight
    /// handler invocations to finish. Handlers are never interrupted;
    /// a handler outliving the grace period is logged and abandoned.
    pub async fn shutdown(&self, grace: Duration) {
        let in_flight: Vec<(String, Arc<AtomicUsize>)> = {
            let mut inner = self.inner.lock().expect("scheduler lock poisoned");
            inner.shut_down = true;
            for entry in inner.jobs.values() {
                entry.timer.abort();
            }
            inner
                .jobs
                .iter()
                .map(|(name, e)| (name.clone(), e.in_flight.clone()))
                .collect()
        };

        let deadline = Instant::now() + grace;
        loop {
            let still_running: Vec<&str> = in_flight
                .iter()
                .filter(|(_, f)| f.load(Ordering::Acquire) > 0)
                .map(|(name, _)| name.as_str())
                .collect();
            if still_running.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                warn!(
                    "shutdown grace elapsed with handlers still running: {:?}",
                    still_running
                );
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        info!("scheduler stopped");
    }

    fn spawn_timer(
        &self,
        name: String,
        interval: Duration,
        handler: JobFn,
        non_reentrant: bool,
        in_flight: Arc<AtomicUsize>,
    ) -> JoinHandle<()> {
        self.timer_installs.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(async move {
            // First fire is one full interval out; a reschedule never
            // causes an immediate re-fire.
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if non_reentrant && in_flight.load(Ordering::Acquire) > 0 {
                    warn!("job '{}' still running, skipping tick", name);
                    continue;
                }
                in_flight.fetch_add(1, Ordering::AcqRel);
                let fut = handler();
                let name = name.clone();
                let in_flight = in_flight.clone();
                tokio::spawn(async move {
                    // Inner spawn turns a handler panic into a JoinError
                    // instead of taking down the timer task.
                    match tokio::spawn(fut).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => error!("job '{}' failed: {}", name, e),
                        Err(e) => error!("job '{}' panicked: {}", name, e),
                    }
                    in_flight.fetch_sub(1, Ordering::AcqRel);
                });
            }
        })
    }
}
