//! Typed tool inputs
//!
//! Each tool takes one of these structs through rmcp's `Parameters`
//! wrapper; the derived JSON schema is what clients see in the tool
//! listing. Optional fields carry serde defaults so sparse payloads
//! deserialize cleanly.

use rmcp::schemars;
use serde::Deserialize;
use std::collections::BTreeMap;

fn default_interval() -> String {
    "1d".to_string()
}

fn default_chart_type() -> String {
    "line".to_string()
}

fn default_window() -> usize {
    14
}

fn default_short_window() -> usize {
    9
}

fn default_long_window() -> usize {
    21
}

/// One OHLCV bar as supplied by the client
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct PriceBar {
    /// Trading date in YYYY-MM-DD format
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct CurrentPriceRequest {
    /// Stock ticker symbol, e.g. "AAPL"
    pub ticker: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct HistoricalPricesRequest {
    /// Ticker symbols to fetch
    pub tickers: Vec<String>,
    /// Start date in YYYY-MM-DD format
    pub start_date: String,
    /// End date in YYYY-MM-DD format
    pub end_date: String,
    /// Bar interval: 1d, 1wk, or 1mo
    #[serde(default = "default_interval")]
    pub interval: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct DividendsRequest {
    pub ticker: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SplitsRequest {
    pub ticker: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct TickerInfoRequest {
    pub ticker: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct StatementsRequest {
    pub ticker: String,
    /// One of income_statement, balance_sheet, cash_flow
    pub statement: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GrowthRatesRequest {
    /// Values ordered oldest to newest, e.g. annual revenues
    pub series: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct IndicatorRequest {
    /// Closing prices ordered oldest to newest
    pub prices: Vec<f64>,
    /// One of sma, ema, rsi, macd, volatility
    pub indicator: String,
    /// Lookback window in periods (ignored by macd)
    #[serde(default = "default_window")]
    pub window: usize,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct MetricRequest {
    /// Statement data grouped by section: income_statement,
    /// balance_sheet, cash_flow, market; each a flat object of
    /// field name to number
    pub financial_data: serde_json::Value,
    /// Metric name, e.g. gross_margin, roe, pe_ratio
    pub metric: String,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct PriceChartRequest {
    pub prices: Vec<PriceBar>,
    /// line or candlestick
    #[serde(default = "default_chart_type")]
    pub chart_type: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Output filename; relative names land in the configured chart directory
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct MetricChartRequest {
    /// Period labels, one per value
    pub dates: Vec<String>,
    pub values: Vec<f64>,
    /// Name of the plotted metric, used for the y-axis
    pub metric_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ComparisonChartRequest {
    /// Period labels for the x-axis
    pub dates: Vec<String>,
    /// Named series, e.g. one entry per ticker
    pub series: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct TradingOpportunitiesRequest {
    pub prices: Vec<PriceBar>,
    /// Short moving-average window
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Long moving-average window
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_prices_defaults() {
        let request: HistoricalPricesRequest = serde_json::from_value(serde_json::json!({
            "tickers": ["AAPL", "MSFT"],
            "start_date": "2024-01-01",
            "end_date": "2024-06-30"
        }))
        .expect("deserializes");

        assert_eq!(request.interval, "1d");
        assert_eq!(request.tickers.len(), 2);
    }

    #[test]
    fn test_indicator_default_window() {
        let request: IndicatorRequest = serde_json::from_value(serde_json::json!({
            "prices": [1.0, 2.0, 3.0],
            "indicator": "rsi"
        }))
        .expect("deserializes");

        assert_eq!(request.window, 14);
    }

    #[test]
    fn test_trading_opportunities_defaults() {
        let request: TradingOpportunitiesRequest = serde_json::from_value(serde_json::json!({
            "prices": [
                {"date": "2024-01-02", "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5}
            ]
        }))
        .expect("deserializes");

        assert_eq!(request.short_window, 9);
        assert_eq!(request.long_window, 21);
        assert!(request.title.is_none());
        assert_eq!(request.prices[0].volume, 0);
    }

    #[test]
    fn test_price_chart_defaults() {
        let request: PriceChartRequest = serde_json::from_value(serde_json::json!({
            "prices": []
        }))
        .expect("deserializes");

        assert_eq!(request.chart_type, "line");
        assert!(request.filename.is_none());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let result: Result<CurrentPriceRequest, _> =
            serde_json::from_value(serde_json::json!({}));
        assert!(result.is_err());
    }
}
