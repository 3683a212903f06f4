use vigil_core::Regime;

/// Map a volatility index reading to a market regime.
///
/// Thresholds (boundary values belong to the higher band):
///
/// | volatility index | regime |
/// |---|---|
/// | < 18 | Calm |
/// | 18..25 | Normal |
/// | 25..30 | Fear |
/// | >= 30 | Panic |
///
/// NaN and other nonsense readings map to `Normal`. This feeds a
/// scheduling decision that must never halt, so there is no error path.
pub fn classify(volatility_index: f64) -> Regime {
    if volatility_index.is_nan() {
        return Regime::Normal;
    }
    if volatility_index < 18.0 {
        Regime::Calm
    } else if volatility_index < 25.0 {
        Regime::Normal
    } else if volatility_index < 30.0 {
        Regime::Fear
    } else {
        Regime::Panic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_threshold_table() {
        assert_eq!(classify(0.0), Regime::Calm);
        assert_eq!(classify(17.99), Regime::Calm);
        assert_eq!(classify(20.0), Regime::Normal);
        assert_eq!(classify(27.5), Regime::Fear);
        assert_eq!(classify(45.0), Regime::Panic);
    }

    #[test]
    fn boundaries_belong_to_higher_band() {
        assert_eq!(classify(18.0), Regime::Normal);
        assert_eq!(classify(25.0), Regime::Fear);
        assert_eq!(classify(30.0), Regime::Panic);
    }

    #[test]
    fn nan_and_extremes_fail_safe_to_normal() {
        assert_eq!(classify(f64::NAN), Regime::Normal);
        // Infinities are still ordered, so they land in a real band.
        assert_eq!(classify(f64::INFINITY), Regime::Panic);
        assert_eq!(classify(f64::NEG_INFINITY), Regime::Calm);
    }

    #[test]
    fn classification_is_monotonic() {
        let readings = [5.0, 17.9, 18.0, 24.9, 25.0, 29.9, 30.0, 80.0];
        let regimes: Vec<Regime> = readings.iter().map(|v| classify(*v)).collect();
        let mut sorted = regimes.clone();
        sorted.sort();
        assert_eq!(regimes, sorted);
    }
}
