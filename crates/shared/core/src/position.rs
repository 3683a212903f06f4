use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Investment horizon class for a held position
///
/// Drives the target/stop threshold table used by the sell rule.
/// `Auto` is what the portfolio collaborator assigns when the user
/// did not pick a horizon explicitly; it behaves like `Swing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldingClass {
    /// 1-3 day scalp
    Scalp,
    /// 1-2 week swing
    Swing,
    /// 1-3 month position trade
    Position,
    /// 3 months and beyond
    LongTerm,
    /// Horizon not declared; treated like Swing
    Auto,
}

impl HoldingClass {
    /// Target and stop thresholds as percent change from entry.
    ///
    /// Returns `(target_pct, stop_pct)`; target is always positive,
    /// stop always negative, so at most one can trigger per tick.
    pub fn thresholds(&self) -> (Decimal, Decimal) {
        match self {
            HoldingClass::Scalp => (dec!(3.0), dec!(-2.0)),
            HoldingClass::Swing => (dec!(5.0), dec!(-3.0)),
            HoldingClass::Position => (dec!(12.0), dec!(-7.0)),
            HoldingClass::LongTerm => (dec!(20.0), dec!(-10.0)),
            HoldingClass::Auto => (dec!(5.0), dec!(-3.0)),
        }
    }

    pub fn target_pct(&self) -> Decimal {
        self.thresholds().0
    }

    pub fn stop_pct(&self) -> Decimal {
        self.thresholds().1
    }
}

/// A held position, owned by the portfolio collaborator
///
/// The engine only ever reads positions; all mutation happens outside
/// the core and arrives as fresh snapshots via `PositionBook::replace_all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol (unique key within a book)
    pub ticker: String,

    /// Display name of the instrument
    pub name: String,

    /// Average entry price
    pub entry_price: Decimal,

    /// Held quantity (shares)
    pub quantity: u32,

    /// Investment horizon class
    pub holding_class: HoldingClass,

    /// When the position was opened
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        entry_price: Decimal,
        quantity: u32,
        holding_class: HoldingClass,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            entry_price,
            quantity,
            holding_class,
            opened_at,
        }
    }

    /// Percent change of `price` relative to the entry price.
    ///
    /// A non-positive entry price yields zero rather than a division
    /// error; such positions never trigger the sell rule.
    pub fn change_from_entry(&self, price: Decimal) -> Decimal {
        if self.entry_price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (price - self.entry_price) / self.entry_price * dec!(100)
    }
}

/// The set of currently held positions, keyed by ticker
///
/// Single source of truth for "what is held". At most one position per
/// ticker; replacing a snapshot wholesale is the only bulk mutation.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: HashMap<String, Position>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole book with a fresh snapshot from the portfolio
    /// collaborator. Duplicate tickers in the input collapse to the
    /// last occurrence, preserving the one-position-per-ticker invariant.
    pub fn replace_all(&mut self, positions: Vec<Position>) {
        self.positions = positions
            .into_iter()
            .map(|p| (p.ticker.clone(), p))
            .collect();
    }

    pub fn get(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.positions.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swing_position(entry: Decimal) -> Position {
        Position::new(
            "005930",
            "Samsung Electronics",
            entry,
            10,
            HoldingClass::Swing,
            Utc::now(),
        )
    }

    #[test]
    fn change_from_entry_is_percent() {
        let p = swing_position(dec!(10000));
        assert_eq!(p.change_from_entry(dec!(10510)), dec!(5.10));
        assert_eq!(p.change_from_entry(dec!(9650)), dec!(-3.50));
    }

    #[test]
    fn zero_entry_price_never_divides() {
        let p = swing_position(Decimal::ZERO);
        assert_eq!(p.change_from_entry(dec!(10000)), Decimal::ZERO);
    }

    #[test]
    fn thresholds_cover_every_class() {
        for class in [
            HoldingClass::Scalp,
            HoldingClass::Swing,
            HoldingClass::Position,
            HoldingClass::LongTerm,
            HoldingClass::Auto,
        ] {
            let (target, stop) = class.thresholds();
            assert!(target > Decimal::ZERO);
            assert!(stop < Decimal::ZERO);
        }
    }

    #[test]
    fn auto_defaults_to_swing_thresholds() {
        assert_eq!(
            HoldingClass::Auto.thresholds(),
            HoldingClass::Swing.thresholds()
        );
    }

    #[test]
    fn book_keeps_one_position_per_ticker() {
        let mut book = PositionBook::new();
        book.replace_all(vec![swing_position(dec!(10000)), swing_position(dec!(12000))]);
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("005930").unwrap().entry_price, dec!(12000));
    }

    #[test]
    fn replace_all_drops_liquidated_positions() {
        let mut book = PositionBook::new();
        book.replace_all(vec![swing_position(dec!(10000))]);
        assert!(book.contains("005930"));
        book.replace_all(vec![]);
        assert!(book.is_empty());
    }
}
