use log::info;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;
use vigil_core::AlertIntent;
use vigil_ports::Notifier;

/// Drains alert intents and hands formatted payloads to the notifier.
///
/// Fire-and-forget: delivery failures are the notifier's to log, and
/// nothing is ever retried. The loop ends when every intent sender is
/// dropped.
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub async fn run(self, mut intents: mpsc::Receiver<AlertIntent>) {
        info!("alert dispatcher started");
        while let Some(intent) = intents.recv().await {
            let kind = intent.kind.as_str();
            self.notifier.notify(kind, payload_for(&intent)).await;
        }
        info!("intent channel closed, alert dispatcher stopping");
    }
}

/// Flattens an intent into the notification payload. Prices keep two
/// decimal places; the holding block carries live profit against entry.
fn payload_for(intent: &AlertIntent) -> Value {
    let mut payload = json!({
        "id": intent.id,
        "kind": intent.kind.as_str(),
        "ticker": intent.ticker,
        "price": intent.price.round_dp(2),
        "change_pct": intent.change_pct.round_dp(2),
        "held": intent.holding.is_some(),
        "created_at": intent.created_at,
    });
    if let Some(score) = intent.score {
        payload["score"] = json!(score);
    }
    if let Some(holding) = &intent.holding {
        let profit_pct = if holding.entry_price > Decimal::ZERO {
            ((intent.price - holding.entry_price) / holding.entry_price
                * Decimal::ONE_HUNDRED)
                .round_dp(2)
        } else {
            Decimal::ZERO
        };
        payload["holding"] = json!({
            "class": holding.holding_class,
            "entry_price": holding.entry_price.round_dp(2),
            "quantity": holding.quantity,
            "profit_pct": profit_pct,
        });
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use vigil_core::{AlertKind, HoldingClass, HoldingSummary};

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, kind: &str, payload: Value) {
            self.events
                .lock()
                .unwrap()
                .push((kind.to_string(), payload));
        }
    }

    fn intent(kind: AlertKind) -> AlertIntent {
        AlertIntent::new(
            kind,
            "247540",
            dec!(31500),
            dec!(3.5),
            Utc.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap(),
        )
    }

    #[test]
    fn surge_payload_marks_unheld_tickers() {
        let payload = payload_for(&intent(AlertKind::Surge));
        assert_eq!(payload["kind"], "surge");
        assert_eq!(payload["held"], false);
        assert!(payload.get("holding").is_none());
        assert!(payload.get("score").is_none());
    }

    #[test]
    fn held_payload_carries_profit_against_entry() {
        let held = intent(AlertKind::TargetReached).with_holding(HoldingSummary {
            holding_class: HoldingClass::Swing,
            entry_price: dec!(30000),
            quantity: 10,
        });
        let payload = payload_for(&held);
        assert_eq!(payload["held"], true);
        assert_eq!(payload["holding"]["quantity"], 10);
        assert_eq!(payload["holding"]["profit_pct"], json!(dec!(5.00)));
    }

    #[test]
    fn score_is_included_when_present() {
        let scored = intent(AlertKind::Surge).with_score(72.0);
        assert_eq!(payload_for(&scored)["score"], json!(72.0));
    }

    #[tokio::test]
    async fn run_drains_until_senders_drop() {
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = AlertDispatcher::new(notifier.clone());
        let (tx, rx) = mpsc::channel(8);

        tx.send(intent(AlertKind::Surge)).await.unwrap();
        tx.send(intent(AlertKind::StopReached)).await.unwrap();
        drop(tx);
        dispatcher.run(rx).await;

        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "surge");
        assert_eq!(events[1].0, "stop_reached");
    }
}
