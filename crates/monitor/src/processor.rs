use crate::cooldown::{CooldownKey, CooldownRegistry};
use crate::window::TradingWindow;
use chrono::Duration;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use vigil_core::{AlertIntent, AlertKind, HoldingSummary, PositionBook, PriceTick};
use vigil_ports::{Clock, ScanCache};

/// Tunables for the realtime rules
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Surge trigger: percent change from prior close (default 3.0)
    pub surge_threshold: Decimal,
    /// Cooldown for surge alerts, seconds (default 1800)
    pub surge_cooldown_secs: i64,
    /// Cooldown shared by target/stop alerts, seconds (default 3600)
    pub sell_cooldown_secs: i64,
    /// Composite scores below this suppress surge alerts (default 50)
    pub min_surge_score: f64,
    /// Trading hours gate for the surge rule
    pub trading_window: TradingWindow,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            surge_threshold: dec!(3.0),
            surge_cooldown_secs: 1800,
            sell_cooldown_secs: 3600,
            min_surge_score: 50.0,
            trading_window: TradingWindow::default(),
        }
    }
}

/// The single logical consumer of the price-tick stream
///
/// `on_tick` is synchronous and cheap: rule evaluation plus a
/// `try_send` onto a bounded intent channel. The dispatcher drains the
/// channel on its own task, so a slow notification path never blocks
/// ingestion; when the channel is full the intent is dropped and
/// logged rather than queued unboundedly.
pub struct RealtimeEventProcessor {
    config: MonitorConfig,
    book: Arc<RwLock<PositionBook>>,
    cooldowns: Arc<CooldownRegistry>,
    scan_cache: Option<Arc<dyn ScanCache>>,
    clock: Arc<dyn Clock>,
    intents: mpsc::Sender<AlertIntent>,
}

impl RealtimeEventProcessor {
    pub fn new(
        config: MonitorConfig,
        book: Arc<RwLock<PositionBook>>,
        cooldowns: Arc<CooldownRegistry>,
        scan_cache: Option<Arc<dyn ScanCache>>,
        clock: Arc<dyn Clock>,
        intents: mpsc::Sender<AlertIntent>,
    ) -> Self {
        Self {
            config,
            book,
            cooldowns,
            scan_cache,
            clock,
            intents,
        }
    }

    /// Evaluate both rule families against one tick.
    ///
    /// The two rules are independent; each may emit at most one intent.
    /// Ticks for unknown tickers are valid and simply skip the sell rule.
    pub fn on_tick(&self, tick: &PriceTick) {
        let now = self.clock.now();
        if let Some(intent) = self.eval_surge(tick, now) {
            self.dispatch(intent);
        }
        if let Some(intent) = self.eval_sell(tick, now) {
            self.dispatch(intent);
        }
    }

    /// Drain a subscription until the provider closes it.
    pub async fn consume(&self, mut ticks: mpsc::Receiver<PriceTick>) {
        info!("realtime consumer started");
        while let Some(tick) = ticks.recv().await {
            self.on_tick(&tick);
        }
        info!("tick stream closed, realtime consumer stopping");
    }

    fn eval_surge(&self, tick: &PriceTick, now: vigil_core::Timestamp) -> Option<AlertIntent> {
        if tick.change_pct < self.config.surge_threshold {
            return None;
        }
        if !self.config.trading_window.contains(now) {
            return None;
        }
        let window = Duration::seconds(self.config.surge_cooldown_secs);
        if !self
            .cooldowns
            .allow(CooldownKey::surge(&tick.ticker), window, now)
        {
            debug!("surge alert for {} suppressed by cooldown", tick.ticker);
            return None;
        }

        // A known-bad score suppresses; an unknown ticker always alerts.
        let score = self.scan_cache.as_ref().and_then(|c| c.score(&tick.ticker));
        if let Some(s) = score {
            if s < self.config.min_surge_score {
                debug!(
                    "surge alert for {} filtered: score {:.1} < {:.1}",
                    tick.ticker, s, self.config.min_surge_score
                );
                return None;
            }
        }

        let mut intent = AlertIntent::new(
            AlertKind::Surge,
            tick.ticker.clone(),
            tick.price,
            tick.change_pct,
            now,
        );
        if let Some(s) = score {
            intent = intent.with_score(s);
        }
        if let Some(holding) = self.holding_summary(&tick.ticker) {
            intent = intent.with_holding(holding);
        }
        Some(intent)
    }

    fn eval_sell(&self, tick: &PriceTick, now: vigil_core::Timestamp) -> Option<AlertIntent> {
        let (kind, change_from_entry, holding) = {
            let book = self.book.read().ok()?;
            let position = book.get(&tick.ticker)?;
            let change = position.change_from_entry(tick.price);
            let (target, stop) = position.holding_class.thresholds();
            let kind = if change >= target {
                AlertKind::TargetReached
            } else if change <= stop {
                AlertKind::StopReached
            } else {
                return None;
            };
            (kind, change, HoldingSummary::from(position))
        };

        // One shared key for both directions: after either alert the
        // ticker stays silent for the full window.
        let window = Duration::seconds(self.config.sell_cooldown_secs);
        if !self
            .cooldowns
            .allow(CooldownKey::sell(&tick.ticker), window, now)
        {
            debug!("sell alert for {} suppressed by cooldown", tick.ticker);
            return None;
        }

        Some(
            AlertIntent::new(kind, tick.ticker.clone(), tick.price, change_from_entry, now)
                .with_holding(holding),
        )
    }

    fn holding_summary(&self, ticker: &str) -> Option<HoldingSummary> {
        let book = self.book.read().ok()?;
        book.get(ticker).map(HoldingSummary::from)
    }

    fn dispatch(&self, intent: AlertIntent) {
        if let Err(e) = self.intents.try_send(intent) {
            // Never block the stream: a saturated dispatcher loses the
            // alert, and that loss is logged.
            warn!("alert intent dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vigil_clock::ManualClock;
    use vigil_core::{HoldingClass, Position, VolumePressure};

    struct FixedScores(Vec<(&'static str, f64)>);

    impl ScanCache for FixedScores {
        fn score(&self, ticker: &str) -> Option<f64> {
            self.0
                .iter()
                .find(|(t, _)| *t == ticker)
                .map(|(_, s)| *s)
        }
    }

    struct Harness {
        clock: Arc<ManualClock>,
        book: Arc<RwLock<PositionBook>>,
        processor: RealtimeEventProcessor,
        rx: mpsc::Receiver<AlertIntent>,
    }

    // 10:00 KST, inside the trading window.
    fn session_open() -> vigil_core::Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap()
    }

    fn harness(scores: Option<Vec<(&'static str, f64)>>) -> Harness {
        let clock = Arc::new(ManualClock::new(session_open()));
        let book = Arc::new(RwLock::new(PositionBook::new()));
        let (tx, rx) = mpsc::channel(16);
        let scan_cache: Option<Arc<dyn ScanCache>> =
            scores.map(|s| Arc::new(FixedScores(s)) as Arc<dyn ScanCache>);
        let processor = RealtimeEventProcessor::new(
            MonitorConfig::default(),
            book.clone(),
            Arc::new(CooldownRegistry::new()),
            scan_cache,
            clock.clone(),
            tx,
        );
        Harness {
            clock,
            book,
            processor,
            rx,
        }
    }

    fn tick(ticker: &str, price: Decimal, change_pct: Decimal) -> PriceTick {
        PriceTick::new(
            ticker,
            price,
            change_pct,
            VolumePressure::Buy,
            session_open(),
        )
    }

    fn hold(harness: &Harness, ticker: &str, entry: Decimal, class: HoldingClass) {
        harness.book.write().unwrap().replace_all(vec![Position::new(
            ticker,
            ticker,
            entry,
            10,
            class,
            session_open(),
        )]);
    }

    #[test]
    fn surge_fires_once_per_cooldown_window() {
        let mut h = harness(None);

        h.processor.on_tick(&tick("247540", dec!(31500), dec!(3.5)));
        let intent = h.rx.try_recv().unwrap();
        assert_eq!(intent.kind, AlertKind::Surge);
        assert_eq!(intent.change_pct, dec!(3.5));
        assert!(intent.holding.is_none());

        // 60s later: still cooling down.
        h.clock.advance(Duration::seconds(60));
        h.processor.on_tick(&tick("247540", dec!(31800), dec!(4.2)));
        assert!(h.rx.try_recv().is_err());

        // 1900s after the first alert: window elapsed.
        h.clock.advance(Duration::seconds(1840));
        h.processor.on_tick(&tick("247540", dec!(32000), dec!(4.9)));
        assert_eq!(h.rx.try_recv().unwrap().kind, AlertKind::Surge);
    }

    #[test]
    fn surge_below_threshold_is_ignored() {
        let mut h = harness(None);
        h.processor.on_tick(&tick("247540", dec!(31500), dec!(2.9)));
        assert!(h.rx.try_recv().is_err());
    }

    #[test]
    fn surge_outside_trading_window_is_ignored() {
        let mut h = harness(None);
        // 16:00 KST, after the close.
        h.clock.set(Utc.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap());
        h.processor.on_tick(&tick("247540", dec!(31500), dec!(5.0)));
        assert!(h.rx.try_recv().is_err());
    }

    #[test]
    fn low_score_suppresses_surge() {
        let mut h = harness(Some(vec![("247540", 35.0)]));
        h.processor.on_tick(&tick("247540", dec!(31500), dec!(3.5)));
        assert!(h.rx.try_recv().is_err());
    }

    #[test]
    fn good_score_is_attached_to_the_intent() {
        let mut h = harness(Some(vec![("247540", 72.0)]));
        h.processor.on_tick(&tick("247540", dec!(31500), dec!(3.5)));
        let intent = h.rx.try_recv().unwrap();
        assert_eq!(intent.score, Some(72.0));
    }

    #[test]
    fn surge_alert_without_score_is_not_suppressed() {
        // Scan cache exists but knows nothing about this ticker.
        let mut h = harness(Some(vec![("005930", 20.0)]));
        h.processor.on_tick(&tick("247540", dec!(31500), dec!(3.5)));
        let intent = h.rx.try_recv().unwrap();
        assert_eq!(intent.score, None);
    }

    #[test]
    fn held_ticker_surge_carries_holding_summary() {
        let mut h = harness(None);
        hold(&h, "247540", dec!(30000), HoldingClass::Scalp);
        h.processor.on_tick(&tick("247540", dec!(30500), dec!(3.5)));
        // Surge intent plus a target-reached may both fire; the surge
        // one comes first.
        let intent = h.rx.try_recv().unwrap();
        assert_eq!(intent.kind, AlertKind::Surge);
        let holding = intent.holding.unwrap();
        assert_eq!(holding.holding_class, HoldingClass::Scalp);
        assert_eq!(holding.quantity, 10);
    }

    #[test]
    fn swing_target_and_stop_thresholds() {
        let mut h = harness(None);
        hold(&h, "005930", dec!(10000), HoldingClass::Swing);

        // +5.1% crosses the +5% swing target.
        h.processor.on_tick(&tick("005930", dec!(10510), dec!(1.0)));
        let intent = h.rx.try_recv().unwrap();
        assert_eq!(intent.kind, AlertKind::TargetReached);
        assert_eq!(intent.change_pct, dec!(5.10));

        // Fresh hour so the shared cooldown is clear; -3.5% hits the stop.
        h.clock.advance(Duration::seconds(3600));
        h.processor.on_tick(&tick("005930", dec!(9650), dec!(-2.0)));
        let intent = h.rx.try_recv().unwrap();
        assert_eq!(intent.kind, AlertKind::StopReached);

        // +2.0% from entry crosses neither threshold.
        h.clock.advance(Duration::seconds(3600));
        h.processor.on_tick(&tick("005930", dec!(10200), dec!(1.0)));
        assert!(h.rx.try_recv().is_err());
    }

    #[test]
    fn sell_rule_shares_cooldown_across_directions() {
        let mut h = harness(None);
        hold(&h, "005930", dec!(10000), HoldingClass::Swing);

        h.processor.on_tick(&tick("005930", dec!(10510), dec!(1.0)));
        assert_eq!(h.rx.try_recv().unwrap().kind, AlertKind::TargetReached);

        // The stop crossing ten minutes later is swallowed by the
        // cooldown the target alert started.
        h.clock.advance(Duration::seconds(600));
        h.processor.on_tick(&tick("005930", dec!(9650), dec!(-8.0)));
        assert!(h.rx.try_recv().is_err());
    }

    #[test]
    fn no_op_tick_does_not_consume_the_cooldown() {
        let mut h = harness(None);
        hold(&h, "005930", dec!(10000), HoldingClass::Swing);

        // +2% crosses nothing and must not start a cooldown.
        h.processor.on_tick(&tick("005930", dec!(10200), dec!(1.0)));
        assert!(h.rx.try_recv().is_err());

        h.clock.advance(Duration::seconds(60));
        h.processor.on_tick(&tick("005930", dec!(10510), dec!(1.0)));
        assert_eq!(h.rx.try_recv().unwrap().kind, AlertKind::TargetReached);
    }

    #[test]
    fn unknown_ticker_skips_the_sell_rule() {
        let mut h = harness(None);
        h.processor.on_tick(&tick("000660", dec!(190000), dec!(1.5)));
        assert!(h.rx.try_recv().is_err());
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let clock = Arc::new(ManualClock::new(session_open()));
        let book = Arc::new(RwLock::new(PositionBook::new()));
        let (tx, mut rx) = mpsc::channel(1);
        let processor = RealtimeEventProcessor::new(
            MonitorConfig::default(),
            book,
            Arc::new(CooldownRegistry::new()),
            None,
            clock,
            tx,
        );

        processor.on_tick(&tick("247540", dec!(31500), dec!(3.5)));
        processor.on_tick(&tick("005380", dec!(250000), dec!(4.0)));
        // Second intent was dropped; on_tick returned regardless.
        assert_eq!(rx.try_recv().unwrap().ticker, "247540");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn consume_drains_a_subscription() {
        let h = harness(None);
        let (tick_tx, tick_rx) = mpsc::channel(8);
        tick_tx
            .send(tick("247540", dec!(31500), dec!(3.5)))
            .await
            .unwrap();
        drop(tick_tx);

        let mut rx = h.rx;
        h.processor.consume(tick_rx).await;
        assert_eq!(rx.try_recv().unwrap().kind, AlertKind::Surge);
    }
}
