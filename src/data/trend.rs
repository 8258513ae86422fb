//! Direction of short metric series.

use serde::{Deserialize, Serialize};

/// Relative change at or below which a series counts as flat.
pub const STABLE_TOLERANCE: f64 = 0.02;

/// Number of preceding samples averaged into the baseline.
const LOOKBACK: usize = 4;

/// Direction of a metric over its recent samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    /// Arrow for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        }
    }
}

/// Classify the direction of an ordered series.
///
/// The last value is compared with the mean of up to four values before
/// it. A change within [`STABLE_TOLERANCE`] of the baseline is `Stable`,
/// as is any series shorter than two points.
pub fn detect_trend(series: &[f64]) -> Trend {
    let Some((&last, previous)) = series.split_last() else {
        return Trend::Stable;
    };
    if previous.is_empty() || !last.is_finite() {
        return Trend::Stable;
    }

    let window = &previous[previous.len().saturating_sub(LOOKBACK)..];
    let baseline = window.iter().sum::<f64>() / window.len() as f64;
    if !baseline.is_finite() {
        return Trend::Stable;
    }

    if baseline == 0.0 {
        return if last > 0.0 {
            Trend::Up
        } else if last < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        };
    }

    let change = (last - baseline) / baseline.abs();
    if change.abs() <= STABLE_TOLERANCE {
        Trend::Stable
    } else if change > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_series_are_stable() {
        assert_eq!(detect_trend(&[]), Trend::Stable);
        assert_eq!(detect_trend(&[42.0]), Trend::Stable);
    }

    #[test]
    fn test_rising_and_falling() {
        assert_eq!(detect_trend(&[100.0, 110.0]), Trend::Up);
        assert_eq!(detect_trend(&[100.0, 90.0]), Trend::Down);
    }

    #[test]
    fn test_small_changes_are_stable() {
        assert_eq!(detect_trend(&[100.0, 102.0]), Trend::Stable);
        assert_eq!(detect_trend(&[100.0, 98.0]), Trend::Stable);
        assert_eq!(detect_trend(&[100.0, 103.0]), Trend::Up);
    }

    #[test]
    fn test_baseline_uses_recent_window() {
        // Only the last four samples before the final one count
        let series = [10.0, 10.0, 100.0, 100.0, 100.0, 100.0, 101.0];
        assert_eq!(detect_trend(&series), Trend::Stable);

        let transactions = [120.0, 135.0, 128.0, 142.0, 138.0, 145.0, 140.0, 135.0, 145.0];
        // baseline = (138 + 145 + 140 + 135) / 4 = 139.5, change ~ +3.9%
        assert_eq!(detect_trend(&transactions), Trend::Up);
    }

    #[test]
    fn test_zero_baseline() {
        assert_eq!(detect_trend(&[0.0, 0.0]), Trend::Stable);
        assert_eq!(detect_trend(&[0.0, 5.0]), Trend::Up);
    }

    #[test]
    fn test_non_finite_values_are_stable() {
        assert_eq!(detect_trend(&[1.0, f64::NAN]), Trend::Stable);
        assert_eq!(detect_trend(&[f64::INFINITY, 1.0]), Trend::Stable);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let t: Trend = serde_json::from_str(r#""up""#).unwrap();
        assert_eq!(t, Trend::Up);
    }

    proptest! {
        #[test]
        fn constant_series_is_stable(v in -1e6f64..1e6, n in 0usize..20) {
            let series = vec![v; n];
            prop_assert_eq!(detect_trend(&series), Trend::Stable);
        }
    }
}
