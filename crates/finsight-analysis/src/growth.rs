//! Growth rate calculations for time series (revenue, earnings, ...)

use serde::{Deserialize, Serialize};

/// Growth rates for a series ordered oldest to newest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRates {
    /// Compound growth rate per period, when derivable
    pub annualized: Option<f64>,
    /// Period-over-period growth; `None` where the previous value is zero
    pub period: Vec<Option<f64>>,
}

/// Calculate period-over-period and annualized growth rates.
///
/// Period growth is `(curr - prev) / |prev|` so that a move from a
/// negative base toward zero still reads as positive growth. The
/// annualized rate is the compound rate between first and last value
/// and is only defined when the series has at least two points, the
/// first value is non-zero, and the ratio is positive.
pub fn growth_rates(series: &[f64]) -> GrowthRates {
    let period = series
        .windows(2)
        .map(|w| {
            let (prev, curr) = (w[0], w[1]);
            if prev == 0.0 {
                None
            } else {
                Some((curr - prev) / prev.abs())
            }
        })
        .collect();

    let annualized = if series.len() > 1 && series[0] != 0.0 {
        let ratio = series[series.len() - 1] / series[0];
        if ratio > 0.0 {
            let periods = (series.len() - 1) as f64;
            Some(ratio.powf(1.0 / periods) - 1.0)
        } else {
            None
        }
    } else {
        None
    };

    GrowthRates { annualized, period }
}
