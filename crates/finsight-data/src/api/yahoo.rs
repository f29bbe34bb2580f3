//! Yahoo Finance API client

use crate::error::{MarketError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
pub struct YahooClient {}

/// Stock quote data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// A single dividend payment event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: DateTime<Utc>,
    pub amount: f64,
}

/// A stock split event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitEvent {
    pub date: DateTime<Utc>,
    pub numerator: f64,
    pub denominator: f64,
}

/// Instrument metadata from the chart endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub symbol: String,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub instrument_type: Option<String>,
}

/// Intervals supported for historical queries. Yahoo's chart endpoint
/// restricts intraday intervals to short lookback periods, so the server
/// only exposes daily and coarser granularities.
pub const SUPPORTED_INTERVALS: &[&str] = &["1d", "1wk", "1mo"];

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| MarketError::YahooFinance(e.to_string()))
    }

    fn to_quote(symbol: &str, q: &yahoo::Quote) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or_else(Utc::now),
            open: q.open,
            high: q.high,
            low: q.low,
            close: q.close,
            volume: q.volume,
            adjclose: q.adjclose,
        }
    }

    /// Get the latest daily quote for a symbol
    pub async fn latest_quote(&self, symbol: &str) -> Result<Quote> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        Ok(Self::to_quote(symbol, &quote))
    }

    /// Get historical quotes between two instants at the given interval
    pub async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &str,
    ) -> Result<Vec<Quote>> {
        if !SUPPORTED_INTERVALS.contains(&interval) {
            return Err(MarketError::InvalidRange(format!(
                "Unsupported interval: {interval} (expected one of {SUPPORTED_INTERVALS:?})"
            )));
        }

        let provider = Self::connector()?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| MarketError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history_interval(symbol, start_odt, end_odt, interval)
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        Self::history_rows(symbol, &quotes)
    }

    /// An empty quote list from a successful chart response means the
    /// symbol has no data in the requested window.
    fn history_rows(symbol: &str, quotes: &[yahoo::Quote]) -> Result<Vec<Quote>> {
        if quotes.is_empty() {
            return Err(MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "No price data in the requested range".to_string(),
            });
        }
        Ok(quotes.iter().map(|q| Self::to_quote(symbol, q)).collect())
    }

    /// Get historical daily quotes for a named lookback range
    pub async fn history_range(&self, symbol: &str, range: &str) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = range_start(range, end)?;
        self.history(symbol, start, end, "1d").await
    }

    /// Get dividend payment history over the last ten years
    pub async fn dividends(&self, symbol: &str) -> Result<Vec<DividendEvent>> {
        let response = self.event_history(symbol).await?;

        let mut events: Vec<DividendEvent> = response
            .dividends()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?
            .iter()
            .map(|d| DividendEvent {
                date: DateTime::from_timestamp(d.date as i64, 0).unwrap_or_else(Utc::now),
                amount: d.amount,
            })
            .collect();
        events.sort_by_key(|e| e.date);

        Ok(events)
    }

    /// Get stock split history over the last ten years
    pub async fn splits(&self, symbol: &str) -> Result<Vec<SplitEvent>> {
        let response = self.event_history(symbol).await?;

        let mut events: Vec<SplitEvent> = response
            .splits()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?
            .iter()
            .map(|s| SplitEvent {
                date: DateTime::from_timestamp(s.date as i64, 0).unwrap_or_else(Utc::now),
                numerator: s.numerator,
                denominator: s.denominator,
            })
            .collect();
        events.sort_by_key(|e| e.date);

        Ok(events)
    }

    /// Get currency and exchange metadata for a symbol
    pub async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        let meta = response
            .metadata()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        Ok(QuoteSummary {
            symbol: symbol.to_string(),
            currency: meta.currency,
            exchange: Some(meta.exchange_name),
            instrument_type: Some(meta.instrument_type),
        })
    }

    /// Check that a symbol resolves to quote data; lookup failures
    /// surface as `InvalidSymbol`.
    pub async fn validate_symbol(&self, symbol: &str) -> Result<()> {
        match self.latest_quote(symbol).await {
            Ok(_) => Ok(()),
            Err(MarketError::YahooFinance(_)) => {
                Err(MarketError::InvalidSymbol(symbol.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Ten-year daily history; the chart response carries dividend and
    /// split events alongside the quotes.
    async fn event_history(&self, symbol: &str) -> Result<yahoo::YResponse> {
        let provider = Self::connector()?;
        let end = Utc::now();
        let start = end - chrono::Duration::days(3650);

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| MarketError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))
    }
}

/// Map a named range ("1mo", "1y", ...) to an absolute start instant
pub fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let start = match range {
        "1d" => end - chrono::Duration::days(1),
        "5d" => end - chrono::Duration::days(5),
        "1mo" => end - chrono::Duration::days(30),
        "3mo" => end - chrono::Duration::days(90),
        "6mo" => end - chrono::Duration::days(180),
        "1y" => end - chrono::Duration::days(365),
        "2y" => end - chrono::Duration::days(730),
        "5y" => end - chrono::Duration::days(1825),
        "10y" => end - chrono::Duration::days(3650),
        "ytd" => {
            let year = end.year();
            chrono::NaiveDate::from_ymd_opt(year, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| MarketError::InvalidRange("ytd".to_string()))?
        }
        "max" => end - chrono::Duration::days(36500), // ~100 years
        other => return Err(MarketError::InvalidRange(other.to_string())),
    };
    Ok(start)
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for YahooClient {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_start_mapping() {
        let end = Utc::now();

        let start = range_start("1mo", end).expect("1mo is valid");
        assert_eq!((end - start).num_days(), 30);

        let start = range_start("1y", end).expect("1y is valid");
        assert_eq!((end - start).num_days(), 365);

        let ytd = range_start("ytd", end).expect("ytd is valid");
        assert_eq!(ytd.year(), end.year());
        assert_eq!(ytd.month(), 1);
        assert_eq!(ytd.day(), 1);

        assert!(range_start("2fortnights", end).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_latest_quote() {
        let client = YahooClient::new();
        let quote = client.latest_quote("AAPL").await.expect("quote fetch");
        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.close > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_history_range() {
        let client = YahooClient::new();
        let quotes = client.history_range("AAPL", "1mo").await.expect("history fetch");
        assert!(!quotes.is_empty());
        assert_eq!(quotes[0].symbol, "AAPL");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_dividends_sorted() {
        let client = YahooClient::new();
        let dividends = client.dividends("AAPL").await.expect("dividend fetch");
        assert!(dividends.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_history_rows_empty_is_data_unavailable() {
        let result = YahooClient::history_rows("AAPL", &[]);
        assert!(matches!(
            result,
            Err(MarketError::DataUnavailable { symbol, .. }) if symbol == "AAPL"
        ));
    }

    #[test]
    fn test_history_rows_maps_quotes() {
        let raw = yahoo::Quote {
            timestamp: 1_704_153_600,
            open: 100.0,
            high: 102.0,
            low: 99.0,
            close: 101.5,
            volume: 1_000_000,
            adjclose: 101.5,
        };

        let rows = YahooClient::history_rows("AAPL", &[raw]).expect("non-empty maps");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "AAPL");
        assert_eq!(rows[0].close, 101.5);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_validate_symbol() {
        let client = YahooClient::new();
        client.validate_symbol("AAPL").await.expect("known symbol validates");

        let result = client.validate_symbol("ZZZZXQ99").await;
        assert!(matches!(result, Err(MarketError::InvalidSymbol(_))));
    }
}
