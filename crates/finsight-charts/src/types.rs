//! Chart input and output types

use crate::error::{ChartError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Price chart style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Candlestick,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Candlestick => "candlestick",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "candlestick" => Ok(Self::Candlestick),
            other => Err(ChartError::InvalidInput(format!(
                "Unknown chart type: {other} (expected line or candlestick)"
            ))),
        }
    }
}

/// A rendered chart: the PNG on disk plus its base64 encoding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOutput {
    pub file_path: PathBuf,
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_kind_parsing() {
        assert_eq!("line".parse::<ChartKind>().expect("parses"), ChartKind::Line);
        assert_eq!(
            "Candlestick".parse::<ChartKind>().expect("parses"),
            ChartKind::Candlestick
        );
        assert!("pie".parse::<ChartKind>().is_err());
    }
}
