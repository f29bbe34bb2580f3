//! Technical indicators over closing-price series
//!
//! Indicators are computed with the `ta` crate's streaming types: each
//! price is fed through `next()`, producing a value per input point.
//! There is no NaN warm-up prefix; early values simply reflect the
//! shorter effective window.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ta::{
    Next,
    indicators::{
        ExponentialMovingAverage, RelativeStrengthIndex, SimpleMovingAverage, StandardDeviation,
    },
};

/// MACD parameters are the conventional 12/26/9
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

/// Supported technical indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Sma,
    Ema,
    Rsi,
    Macd,
    Volatility,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Volatility => "volatility",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(Self::Sma),
            "ema" => Ok(Self::Ema),
            "rsi" => Ok(Self::Rsi),
            "macd" => Ok(Self::Macd),
            "volatility" => Ok(Self::Volatility),
            other => Err(AnalysisError::UnknownIndicator(other.to_string())),
        }
    }
}

/// Computed indicator series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorOutput {
    pub indicator: Indicator,
    /// Window used; MACD ignores it in favor of the 12/26/9 convention
    pub window: usize,
    /// One value per input price (volatility: one per return, so len - 1)
    pub values: Vec<f64>,
    /// MACD signal line (EMA-9 of the MACD line); `None` for other indicators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Vec<f64>>,
    /// Most recent value, if any
    pub current: Option<f64>,
}

/// Calculate a technical indicator over closing prices ordered oldest
/// to newest.
pub fn indicator_series(
    prices: &[f64],
    indicator: Indicator,
    window: usize,
) -> Result<IndicatorOutput> {
    if prices.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "price series is empty".to_string(),
        ));
    }
    if window == 0 {
        return Err(AnalysisError::InvalidWindow(
            "window must be greater than 0".to_string(),
        ));
    }

    let (values, signal) = match indicator {
        Indicator::Sma => {
            let mut sma = SimpleMovingAverage::new(window)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            (prices.iter().map(|&p| sma.next(p)).collect(), None)
        }
        Indicator::Ema => {
            let mut ema = ExponentialMovingAverage::new(window)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            (prices.iter().map(|&p| ema.next(p)).collect(), None)
        }
        Indicator::Rsi => {
            let mut rsi = RelativeStrengthIndex::new(window)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            (prices.iter().map(|&p| rsi.next(p)).collect(), None)
        }
        Indicator::Macd => {
            let mut fast = ExponentialMovingAverage::new(MACD_FAST)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            let mut slow = ExponentialMovingAverage::new(MACD_SLOW)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            let macd_line: Vec<f64> = prices.iter().map(|&p| fast.next(p) - slow.next(p)).collect();

            let mut signal_ema = ExponentialMovingAverage::new(MACD_SIGNAL)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            let signal_line: Vec<f64> = macd_line.iter().map(|&m| signal_ema.next(m)).collect();

            (macd_line, Some(signal_line))
        }
        Indicator::Volatility => {
            if prices.len() < 2 {
                return Err(AnalysisError::InsufficientData(
                    "volatility needs at least 2 prices".to_string(),
                ));
            }
            let mut std_dev = StandardDeviation::new(window)
                .map_err(|e| AnalysisError::Indicator(e.to_string()))?;
            let values = prices
                .windows(2)
                .map(|w| {
                    let ret = if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] };
                    std_dev.next(ret)
                })
                .collect();
            (values, None)
        }
    };

    let current = last_value(&values);
    Ok(IndicatorOutput {
        indicator,
        window,
        values,
        signal,
        current,
    })
}

fn last_value(values: &[f64]) -> Option<f64> {
    values.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_parsing() {
        assert_eq!("SMA".parse::<Indicator>().expect("parses"), Indicator::Sma);
        assert_eq!(
            "volatility".parse::<Indicator>().expect("parses"),
            Indicator::Volatility
        );
        assert!("vwap".parse::<Indicator>().is_err());
    }

    #[test]
    fn test_sma_constant_series() {
        let prices = vec![50.0; 20];
        let out = indicator_series(&prices, Indicator::Sma, 5).expect("sma computes");

        assert_eq!(out.values.len(), prices.len());
        assert!(out.values.iter().all(|&v| (v - 50.0).abs() < 1e-9));
        assert_eq!(out.current, Some(50.0));
    }

    #[test]
    fn test_ema_tracks_trend() {
        let prices: Vec<f64> = (1..=30).map(f64::from).collect();
        let out = indicator_series(&prices, Indicator::Ema, 10).expect("ema computes");

        // EMA lags a rising series but stays below the latest price
        let current = out.current.expect("has current");
        assert!(current < 30.0);
        assert!(current > 20.0);
    }

    #[test]
    fn test_rsi_of_rising_series_is_high() {
        let prices: Vec<f64> = (1..=50).map(|i| 100.0 + f64::from(i)).collect();
        let out = indicator_series(&prices, Indicator::Rsi, 14).expect("rsi computes");

        let current = out.current.expect("has current");
        assert!(current > 90.0, "RSI of monotone gains should near 100, got {current}");
    }

    #[test]
    fn test_macd_includes_signal_line() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (f64::from(i) * 0.5).sin()).collect();
        let out = indicator_series(&prices, Indicator::Macd, 14).expect("macd computes");

        let signal = out.signal.expect("macd has signal line");
        assert_eq!(out.values.len(), prices.len());
        assert_eq!(signal.len(), prices.len());
    }

    #[test]
    fn test_volatility_of_constant_series_is_zero() {
        let prices = vec![75.0; 30];
        let out = indicator_series(&prices, Indicator::Volatility, 10).expect("vol computes");

        assert_eq!(out.values.len(), prices.len() - 1);
        assert!(out.values.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            indicator_series(&[], Indicator::Sma, 5),
            Err(AnalysisError::InsufficientData(_))
        ));
        assert!(matches!(
            indicator_series(&[1.0, 2.0], Indicator::Sma, 0),
            Err(AnalysisError::InvalidWindow(_))
        ));
        assert!(matches!(
            indicator_series(&[1.0], Indicator::Volatility, 5),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
