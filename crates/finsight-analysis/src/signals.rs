//! Moving-average crossover signals
//!
//! A golden cross (short MA crossing above the long MA) is a buy
//! signal; a death cross (short MA crossing below) is a sell signal.
//! Rolling means here use a strict warm-up: no value until a full
//! window is available, so crossings are detected on the same points a
//! spreadsheet rolling mean would produce.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
}

/// A crossover at a specific index of the input series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Index into the input series where the cross completed
    pub index: usize,
    pub kind: SignalKind,
    /// Closing price at the signal point
    pub price: f64,
}

/// Rolling mean with `None` during the warm-up prefix
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || window > values.len() {
        return vec![None; values.len()];
    }

    let mut out = vec![None; values.len()];
    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Detect golden/death crosses of two rolling means over closing prices.
pub fn crossover_signals(
    closes: &[f64],
    short_window: usize,
    long_window: usize,
) -> Result<Vec<Signal>> {
    if short_window < 2 || long_window < 2 {
        return Err(AnalysisError::InvalidWindow(
            "windows must be at least 2".to_string(),
        ));
    }
    if short_window >= long_window {
        return Err(AnalysisError::InvalidWindow(format!(
            "short window ({short_window}) must be smaller than long window ({long_window})"
        )));
    }
    if closes.len() <= long_window {
        return Err(AnalysisError::InsufficientData(format!(
            "need more than {long_window} prices, got {}",
            closes.len()
        )));
    }

    let short_ma = rolling_mean(closes, short_window);
    let long_ma = rolling_mean(closes, long_window);

    let mut signals = Vec::new();
    for i in 1..closes.len() {
        let (Some(s), Some(l), Some(ps), Some(pl)) =
            (short_ma[i], long_ma[i], short_ma[i - 1], long_ma[i - 1])
        else {
            continue;
        };

        if s > l && ps <= pl {
            signals.push(Signal {
                index: i,
                kind: SignalKind::Buy,
                price: closes[i],
            });
        } else if s < l && ps >= pl {
            signals.push(Signal {
                index: i,
                kind: SignalKind::Sell,
                price: closes[i],
            });
        }
    }

    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_warm_up() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let means = rolling_mean(&values, 3);

        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(2.0));
        assert_eq!(means[3], Some(3.0));
        assert_eq!(means[4], Some(4.0));
    }

    #[test]
    fn test_rolling_mean_window_larger_than_series() {
        let means = rolling_mean(&[1.0, 2.0], 5);
        assert!(means.iter().all(Option::is_none));
    }

    /// A series that declines and then rallies produces a death cross
    /// on the way down and a golden cross on the way up.
    #[test]
    fn test_crossover_round_trip() {
        let mut closes: Vec<f64> = Vec::new();
        closes.extend((0..10).map(|i| 100.0 + f64::from(i))); // rise
        closes.extend((0..10).map(|i| 110.0 - 3.0 * f64::from(i))); // sharp fall
        closes.extend((0..10).map(|i| 80.0 + 3.0 * f64::from(i))); // recovery

        let signals = crossover_signals(&closes, 3, 7).expect("signals compute");

        assert!(!signals.is_empty());
        let kinds: Vec<SignalKind> = signals.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&SignalKind::Sell), "expected a death cross");
        assert!(kinds.contains(&SignalKind::Buy), "expected a golden cross");

        // Sell must precede the recovery buy
        let first_sell = signals.iter().position(|s| s.kind == SignalKind::Sell);
        let last_buy = signals.iter().rposition(|s| s.kind == SignalKind::Buy);
        assert!(first_sell < last_buy);
    }

    #[test]
    fn test_monotone_series_has_no_signals() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i)).collect();
        let signals = crossover_signals(&closes, 5, 10).expect("signals compute");
        // Short MA stays above long MA the whole way; no crossings
        assert!(signals.is_empty());
    }

    #[test]
    fn test_window_validation() {
        let closes = vec![1.0; 50];
        assert!(matches!(
            crossover_signals(&closes, 10, 5),
            Err(AnalysisError::InvalidWindow(_))
        ));
        assert!(matches!(
            crossover_signals(&closes, 1, 5),
            Err(AnalysisError::InvalidWindow(_))
        ));
        assert!(matches!(
            crossover_signals(&closes[..5], 2, 10),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
