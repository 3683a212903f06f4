use chrono::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use vigil_core::Timestamp;

/// Which alert family a cooldown entry belongs to
///
/// A structured key rather than a formatted string, so "surge:XYZ" and
/// a hypothetical ticker literally named "surge:XYZ" can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKind {
    Surge,
    /// Shared between target-reached and stop-reached: once either
    /// fires, the ticker is silent for the whole window.
    Sell,
}

/// Per-ticker cooldown key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub kind: CooldownKind,
    pub ticker: String,
}

impl CooldownKey {
    pub fn surge(ticker: impl Into<String>) -> Self {
        Self {
            kind: CooldownKind::Surge,
            ticker: ticker.into(),
        }
    }

    pub fn sell(ticker: impl Into<String>) -> Self {
        Self {
            kind: CooldownKind::Sell,
            ticker: ticker.into(),
        }
    }
}

/// Generic per-key rate limiter
///
/// Entries are created lazily and never removed; they expire logically
/// via the window comparison, so memory stays bounded by the number of
/// distinct keys ever seen (tens to low hundreds of tickers).
/// Safe for concurrent `allow` calls from multiple workers.
#[derive(Debug, Default)]
pub struct CooldownRegistry {
    last_fired: DashMap<CooldownKey, Timestamp>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `now` if the key has never fired or the
    /// window has elapsed since it last fired; otherwise returns false
    /// without mutating state.
    ///
    /// The window is a call-site parameter, so different alert families
    /// can share the registry with distinct windows.
    pub fn allow(&self, key: CooldownKey, window: Duration, now: Timestamp) -> bool {
        match self.last_fired.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
            Entry::Occupied(mut slot) => {
                if now - *slot.get() >= window {
                    slot.insert(now);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Number of keys ever observed.
    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}
