//! Scheduled job bodies.
//!
//! Each job is a free async function over the ports it needs, so the
//! bodies are testable without the scheduler. Transient provider
//! failures skip the cycle; only programming errors propagate.

use crate::config::RiskSettings;
use log::{debug, info, warn};
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;
use std::sync::RwLock;
use vigil_core::PositionBook;
use vigil_ports::{Clock, MarketDataProvider, Notifier, PortfolioReader, PricePoint};
use vigil_risk::{ReportHolding, ReportInputs, generate_report};
use vigil_scheduler::{AdaptiveScheduler, JobError, classify};

/// Macro refresh: read the volatility index, classify it, and let the
/// scheduler retune itself. A provider failure keeps the current
/// cadence until the next pulse.
pub async fn market_pulse(
    provider: &dyn MarketDataProvider,
    scheduler: &AdaptiveScheduler,
) -> Result<(), JobError> {
    let volatility = match provider.volatility_index().await {
        Ok(v) => v,
        Err(e) => {
            warn!("volatility index unavailable, keeping current cadence: {e}");
            return Ok(());
        }
    };
    let swapped = scheduler.reschedule(classify(volatility), volatility)?;
    debug!("market pulse: volatility {volatility:.1}, {swapped} timer(s) swapped");
    Ok(())
}

/// Pull a fresh portfolio snapshot and replace the book wholesale.
pub async fn refresh_positions(
    reader: &dyn PortfolioReader,
    book: &RwLock<PositionBook>,
) -> Result<(), JobError> {
    let positions = match reader.active_positions().await {
        Ok(p) => p,
        Err(e) => {
            warn!("portfolio snapshot unavailable, keeping stale book: {e}");
            return Ok(());
        }
    };
    let count = positions.len();
    let mut guard = book
        .write()
        .map_err(|_| JobError::from("position book lock poisoned"))?;
    guard.replace_all(positions);
    debug!("position book refreshed: {count} holdings");
    Ok(())
}

/// Build and deliver the scheduled risk report.
///
/// Holdings whose history cannot be fetched are dropped from this run
/// with a warning; the report itself degrades section by section.
pub async fn risk_report(
    provider: &dyn MarketDataProvider,
    reader: &dyn PortfolioReader,
    settings: &RiskSettings,
    clock: &dyn Clock,
    notifier: &dyn Notifier,
) -> Result<(), JobError> {
    let positions = match reader.active_positions().await {
        Ok(p) => p,
        Err(e) => {
            warn!("portfolio snapshot unavailable, skipping risk report: {e}");
            return Ok(());
        }
    };
    if positions.is_empty() {
        debug!("no active positions, skipping risk report");
        return Ok(());
    }

    let mut holdings = Vec::with_capacity(positions.len());
    for position in &positions {
        let history = match provider
            .price_history(&position.ticker, &settings.history_period)
            .await
        {
            Ok(h) => h,
            Err(e) => {
                warn!("no price history for {}, dropped from report: {e}", position.ticker);
                continue;
            }
        };
        let returns = daily_returns(&history);
        if returns.is_empty() {
            warn!(
                "history for {} too short ({} points), dropped from report",
                position.ticker,
                history.len()
            );
            continue;
        }
        let last_close = history
            .last()
            .and_then(|p| p.close.to_f64())
            .unwrap_or(0.0);
        holdings.push(ReportHolding {
            ticker: position.ticker.clone(),
            sector: settings.sector_of(&position.ticker),
            market_value: last_close * position.quantity as f64,
            returns,
        });
    }
    if holdings.is_empty() {
        warn!("no holding had usable history, skipping risk report");
        return Ok(());
    }

    let inputs = ReportInputs { holdings };
    let report = generate_report(&inputs, &settings.engine_config(), clock.now())?;
    let unavailable = report.unavailable_sections();
    if !unavailable.is_empty() {
        warn!("risk report degraded, missing sections: {unavailable:?}");
    }

    let mut payload = serde_json::to_value(&report).map_err(JobError::from)?;
    if let Some(object) = payload.as_object_mut() {
        object.insert("unavailable_sections".to_string(), json!(unavailable));
    }
    notifier.notify("risk_report", payload).await;
    info!(
        "risk report delivered: grade {}, score {}",
        report.grade, report.score
    );
    Ok(())
}

/// Simple daily returns from a closing-price history, skipping
/// non-positive closes.
fn daily_returns(history: &[PricePoint]) -> Vec<f64> {
    history
        .windows(2)
        .filter_map(|pair| {
            let prev = pair[0].close.to_f64()?;
            let next = pair[1].close.to_f64()?;
            (prev > 0.0).then(|| next / prev - 1.0)
        })
        .collect()
}
