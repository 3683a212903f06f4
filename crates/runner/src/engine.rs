use crate::config::{ADAPTIVE_JOBS, Config};
use crate::dispatch::AlertDispatcher;
use crate::jobs;
use log::info;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vigil_core::{PositionBook, Regime, RegimeState};
use vigil_monitor::{CooldownRegistry, RealtimeEventProcessor};
use vigil_ports::{
    Clock, ConfigError, MarketDataProvider, Notifier, PortfolioReader, ProviderError, ScanCache,
    SchedulerError,
};
use vigil_scheduler::{AdaptiveScheduler, JobBuilder};

/// Failures that abort engine startup. Once running, nothing in the
/// engine is fatal.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("startup provider call failed: {0}")]
    Provider(#[from] ProviderError),
}

/// External collaborators the engine is wired against.
pub struct EnginePorts {
    pub market_data: Arc<dyn MarketDataProvider>,
    pub portfolio: Arc<dyn PortfolioReader>,
    pub scan_cache: Option<Arc<dyn ScanCache>>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

/// The assembled engine: adaptive scheduler, realtime consumer, and
/// alert dispatcher, sharing one position book.
pub struct VigilEngine {
    scheduler: Arc<AdaptiveScheduler>,
    book: Arc<RwLock<PositionBook>>,
    shutdown_grace: Duration,
    tasks: Vec<JoinHandle<()>>,
}

impl VigilEngine {
    /// Validate config, take the initial portfolio snapshot, open the
    /// tick subscription, and start every background task. Must be
    /// called from within a tokio runtime.
    pub async fn start(config: Config, ports: EnginePorts) -> Result<Self, EngineError> {
        config.validate()?;
        let monitor_config = config.monitor.to_monitor_config()?;

        // Startup snapshot is the one provider call treated as fatal:
        // without it the engine would watch an empty book.
        let positions = ports.portfolio.active_positions().await?;
        let tickers: Vec<String> = positions.iter().map(|p| p.ticker.clone()).collect();
        info!("initial snapshot: {} holdings", positions.len());
        let mut initial_book = PositionBook::new();
        initial_book.replace_all(positions);
        let book = Arc::new(RwLock::new(initial_book));

        let (intent_tx, intent_rx) = mpsc::channel(config.alert_channel_capacity);
        let processor = Arc::new(RealtimeEventProcessor::new(
            monitor_config,
            book.clone(),
            Arc::new(CooldownRegistry::new()),
            ports.scan_cache.clone(),
            ports.clock.clone(),
            intent_tx,
        ));

        let ticks = ports.market_data.subscribe(tickers).await?;
        let consumer = tokio::spawn({
            let processor = processor.clone();
            async move { processor.consume(ticks).await }
        });
        let dispatcher = tokio::spawn(
            AlertDispatcher::new(ports.notifier.clone()).run(intent_rx),
        );

        let scheduler = Arc::new(AdaptiveScheduler::new(
            config.intervals.clone(),
            ports.clock.clone(),
        ));
        register_jobs(&scheduler, &config, &ports, &book)?;

        info!("engine started");
        Ok(Self {
            scheduler,
            book,
            shutdown_grace: Duration::from_secs(config.shutdown_grace_secs),
            tasks: vec![consumer, dispatcher],
        })
    }

    /// Snapshot of the current regime state.
    pub fn regime_state(&self) -> RegimeState {
        self.scheduler.regime_state()
    }

    pub fn scheduler(&self) -> &AdaptiveScheduler {
        &self.scheduler
    }

    pub fn position_book(&self) -> Arc<RwLock<PositionBook>> {
        self.book.clone()
    }

    /// Block until ctrl-c, then shut down in order.
    pub async fn run_until_ctrl_c(self) {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
        }
        self.shutdown().await;
    }

    /// Stop all timers, wait for in-flight jobs (bounded by the grace
    /// period), and cancel the streaming tasks.
    pub async fn shutdown(self) {
        self.scheduler.shutdown(self.shutdown_grace).await;
        for task in self.tasks {
            task.abort();
        }
        info!("engine stopped");
    }
}

/// Registers the three recurring jobs. The adaptive pair starts at the
/// Normal-regime cadence; the risk report keeps a fixed interval.
fn register_jobs(
    scheduler: &Arc<AdaptiveScheduler>,
    config: &Config,
    ports: &EnginePorts,
    book: &Arc<RwLock<PositionBook>>,
) -> Result<(), EngineError> {
    let initial_regime = Regime::Normal;
    let interval_for = |job: &str| {
        config
            .intervals
            .interval(initial_regime, job)
            .ok_or(ConfigError::MissingInterval {
                regime: initial_regime,
                job: job.to_string(),
            })
    };

    let monitor_job = {
        let portfolio = ports.portfolio.clone();
        let book = book.clone();
        JobBuilder::new(ADAPTIVE_JOBS[0], interval_for(ADAPTIVE_JOBS[0])?, move || {
            let portfolio = portfolio.clone();
            let book = book.clone();
            async move { jobs::refresh_positions(portfolio.as_ref(), &book).await }
        })
        .non_reentrant()
    };
    scheduler.register(monitor_job)?;

    let pulse_job = {
        let market_data = ports.market_data.clone();
        // Weak reference: the job is owned by the scheduler it retunes.
        let weak = Arc::downgrade(scheduler);
        JobBuilder::new(ADAPTIVE_JOBS[1], interval_for(ADAPTIVE_JOBS[1])?, move || {
            let market_data = market_data.clone();
            let weak = weak.clone();
            async move {
                let Some(scheduler) = weak.upgrade() else {
                    return Ok(());
                };
                jobs::market_pulse(market_data.as_ref(), &scheduler).await
            }
        })
        .non_reentrant()
    };
    scheduler.register(pulse_job)?;

    let report_job = {
        let market_data = ports.market_data.clone();
        let portfolio = ports.portfolio.clone();
        let notifier = ports.notifier.clone();
        let clock = ports.clock.clone();
        let settings = config.risk.clone();
        JobBuilder::new(
            "risk_report",
            Duration::from_secs(config.risk_report_interval_secs),
            move || {
                let market_data = market_data.clone();
                let portfolio = portfolio.clone();
                let notifier = notifier.clone();
                let clock = clock.clone();
                let settings = settings.clone();
                async move {
                    jobs::risk_report(
                        market_data.as_ref(),
                        portfolio.as_ref(),
                        &settings,
                        clock.as_ref(),
                        notifier.as_ref(),
                    )
                    .await
                }
            },
        )
        .non_reentrant()
    };
    scheduler.register(report_job)?;
    Ok(())
}
