//! Tool handler implementations
//!
//! Each handler returns the structured JSON payload for one tool; the
//! server layer wraps it into an MCP `CallToolResult`. Market-data
//! handlers go through the tiered cache so repeated calls within the
//! TTL do not hit the upstream APIs.

use crate::params::{
    ComparisonChartRequest, CurrentPriceRequest, DividendsRequest, GrowthRatesRequest,
    HistoricalPricesRequest, IndicatorRequest, MetricChartRequest, MetricRequest, PriceBar,
    PriceChartRequest, SplitsRequest, StatementsRequest, TickerInfoRequest,
    TradingOpportunitiesRequest,
};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use finsight_analysis::{FinancialData, Indicator, Metric, financial_metric, growth_rates};
use finsight_charts::{ChartKind, PricePoint, resolve_path};
use finsight_data::{
    AlphaVantageClient, CacheKey, CacheManager, CompanyOverview, MarketConfig, MarketError,
    QuoteSummary, StatementKind, YahooClient,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Shared server state behind all tool handlers
pub struct AppState {
    pub config: MarketConfig,
    pub caches: CacheManager,
    pub yahoo: YahooClient,
    pub alpha_vantage: Option<AlphaVantageClient>,
}

impl AppState {
    /// Build the state from a validated configuration
    pub fn from_config(config: MarketConfig) -> Self {
        let alpha_vantage = config
            .alpha_vantage_api_key
            .as_ref()
            .map(|key| AlphaVantageClient::new(key.clone(), config.alpha_vantage_rate_limit));

        if alpha_vantage.is_none() {
            info!("No Alpha Vantage API key configured; fundamental tools are disabled");
        }

        Self {
            caches: CacheManager::from_config(&config),
            yahoo: YahooClient::new(),
            alpha_vantage,
            config,
        }
    }

    fn alpha_vantage(&self) -> Result<&AlphaVantageClient> {
        self.alpha_vantage.as_ref().context(
            "Alpha Vantage API key not configured; set ALPHA_VANTAGE_API_KEY or pass --alpha-vantage-key",
        )
    }

    pub async fn current_price(&self, request: CurrentPriceRequest) -> Result<Value> {
        let ticker = request.ticker;
        let key = CacheKey::new(&ticker, "current_price", json!({}));

        self.caches
            .realtime
            .get_or_fetch(key, || async {
                let quote = self.yahoo.latest_quote(&ticker).await?;
                let summary = self.yahoo.quote_summary(&ticker).await?;
                Ok::<_, anyhow::Error>(json!({
                    "symbol": quote.symbol,
                    "price": quote.close,
                    "currency": summary.currency,
                    "timestamp": quote.timestamp.to_rfc3339(),
                }))
            })
            .await
    }

    pub async fn historical_prices(&self, request: HistoricalPricesRequest) -> Result<Value> {
        let start = parse_date(&request.start_date)?;
        let end = parse_date(&request.end_date)?;
        if start >= end {
            bail!("start_date must be before end_date");
        }

        let mut by_ticker = serde_json::Map::new();
        for ticker in &request.tickers {
            let key = CacheKey::new(
                ticker,
                "history",
                json!({
                    "start": request.start_date,
                    "end": request.end_date,
                    "interval": request.interval,
                }),
            );

            let fetched = self
                .caches
                .realtime
                .get_or_fetch(key, || async {
                    let quotes = self
                        .yahoo
                        .history(ticker, start, end, &request.interval)
                        .await?;
                    debug!(ticker = %ticker, rows = quotes.len(), "Fetched price history");
                    let rows: Vec<Value> = quotes
                        .iter()
                        .map(|q| {
                            json!({
                                "date": q.timestamp.format("%Y-%m-%d").to_string(),
                                "open": q.open,
                                "high": q.high,
                                "low": q.low,
                                "close": q.close,
                                "volume": q.volume,
                                "adjclose": q.adjclose,
                            })
                        })
                        .collect();
                    Ok::<_, anyhow::Error>(Value::Array(rows))
                })
                .await;

            let rows = match fetched {
                Ok(rows) => rows,
                Err(err) => {
                    // A chart failure is often just a bad symbol; check
                    // so the caller gets the more specific error
                    if matches!(
                        err.downcast_ref::<MarketError>(),
                        Some(MarketError::YahooFinance(_))
                    ) {
                        self.yahoo.validate_symbol(ticker).await?;
                    }
                    return Err(err);
                }
            };

            by_ticker.insert(ticker.clone(), rows);
        }

        Ok(json!({ "interval": request.interval, "prices": by_ticker }))
    }

    pub async fn dividends(&self, request: DividendsRequest) -> Result<Value> {
        let ticker = request.ticker;
        let key = CacheKey::new(&ticker, "dividends", json!({}));

        self.caches
            .fundamental
            .get_or_fetch(key, || async {
                let events = self.yahoo.dividends(&ticker).await?;
                let rows: Vec<Value> = events
                    .iter()
                    .map(|d| {
                        json!({
                            "date": d.date.format("%Y-%m-%d").to_string(),
                            "amount": d.amount,
                        })
                    })
                    .collect();
                Ok::<_, anyhow::Error>(json!({ "symbol": ticker, "dividends": rows }))
            })
            .await
    }

    pub async fn splits(&self, request: SplitsRequest) -> Result<Value> {
        let ticker = request.ticker;
        let key = CacheKey::new(&ticker, "splits", json!({}));

        self.caches
            .fundamental
            .get_or_fetch(key, || async {
                let events = self.yahoo.splits(&ticker).await?;
                let rows: Vec<Value> = events
                    .iter()
                    .map(|s| {
                        json!({
                            "date": s.date.format("%Y-%m-%d").to_string(),
                            "numerator": s.numerator,
                            "denominator": s.denominator,
                        })
                    })
                    .collect();
                Ok::<_, anyhow::Error>(json!({ "symbol": ticker, "splits": rows }))
            })
            .await
    }

    /// Company profile assembled from the quote metadata plus, when an
    /// Alpha Vantage key is configured, the overview endpoint.
    pub async fn ticker_info(&self, request: TickerInfoRequest) -> Result<Value> {
        let ticker = request.ticker;
        let key = CacheKey::new(&ticker, "ticker_info", json!({}));

        self.caches
            .fundamental
            .get_or_fetch(key, || async {
                let summary = self.yahoo.quote_summary(&ticker).await?;

                // The quote metadata already succeeded, so an overview
                // failure degrades to a partial profile instead of
                // failing the tool
                let overview = match &self.alpha_vantage {
                    Some(client) => match client.company_overview(&ticker).await {
                        Ok(overview) => Some(overview),
                        Err(err) => {
                            warn!(
                                ticker = %ticker,
                                error = %err,
                                "Company overview unavailable; using quote metadata only"
                            );
                            None
                        }
                    },
                    None => None,
                };

                Ok::<_, anyhow::Error>(profile_payload(&summary, overview.as_ref()))
            })
            .await
    }

    pub async fn financial_statements(&self, request: StatementsRequest) -> Result<Value> {
        let kind: StatementKind = request.statement.parse()?;
        let client = self.alpha_vantage()?;
        let ticker = request.ticker;
        let key = CacheKey::new(&ticker, "statements", json!({ "kind": kind.as_str() }));

        self.caches
            .fundamental
            .get_or_fetch(key, || async {
                let reports = client.statements(&ticker, kind).await?;
                Ok::<_, anyhow::Error>(json!({
                    "symbol": ticker,
                    "statement": kind.as_str(),
                    "annual_reports": reports,
                }))
            })
            .await
    }

    pub fn growth(&self, request: GrowthRatesRequest) -> Result<Value> {
        if request.series.len() < 2 {
            bail!("series needs at least 2 values, got {}", request.series.len());
        }
        let rates = growth_rates(&request.series);
        Ok(json!({
            "annualized_growth_rate": rates.annualized,
            "period_growth_rates": rates.period,
        }))
    }

    pub fn technical_indicator(&self, request: IndicatorRequest) -> Result<Value> {
        let indicator: Indicator = request.indicator.parse()?;
        let output = finsight_analysis::indicator_series(&request.prices, indicator, request.window)?;
        Ok(serde_json::to_value(output)?)
    }

    pub fn metric(&self, request: MetricRequest) -> Result<Value> {
        let metric: Metric = request.metric.parse()?;
        let data: FinancialData = serde_json::from_value(request.financial_data)
            .context("financial_data must hold numeric statement sections")?;
        let result = financial_metric(&data, metric);
        Ok(json!({ "metric": metric.as_str(), "value": result.value }))
    }

    pub fn price_chart(&self, request: PriceChartRequest) -> Result<Value> {
        let kind: ChartKind = request.chart_type.parse()?;
        let points = bars_to_points(&request.prices)?;
        let title = request.title.unwrap_or_else(|| "Price Chart".to_string());
        let path = resolve_path(
            &self.config.chart_dir,
            request.filename.as_deref(),
            "price_chart.png",
        )?;

        let output = finsight_charts::price_chart(&points, kind, &title, path)?;
        info!(path = %output.file_path.display(), "Rendered price chart");
        Ok(serde_json::to_value(output)?)
    }

    pub fn metric_chart(&self, request: MetricChartRequest) -> Result<Value> {
        let title = request
            .title
            .unwrap_or_else(|| request.metric_name.clone());
        let path = resolve_path(
            &self.config.chart_dir,
            request.filename.as_deref(),
            "metric_chart.png",
        )?;

        let output = finsight_charts::metric_chart(
            &request.dates,
            &request.values,
            &request.metric_name,
            &title,
            path,
        )?;
        info!(path = %output.file_path.display(), "Rendered metric chart");
        Ok(serde_json::to_value(output)?)
    }

    pub fn comparison_chart(&self, request: ComparisonChartRequest) -> Result<Value> {
        let title = request.title.unwrap_or_else(|| "Comparison".to_string());
        let path = resolve_path(
            &self.config.chart_dir,
            request.filename.as_deref(),
            "comparison_chart.png",
        )?;

        let output = finsight_charts::comparison_chart(
            &request.dates,
            &request.series,
            "Value",
            &title,
            path,
        )?;
        info!(path = %output.file_path.display(), "Rendered comparison chart");
        Ok(serde_json::to_value(output)?)
    }

    pub fn trading_opportunities(&self, request: TradingOpportunitiesRequest) -> Result<Value> {
        let points = bars_to_points(&request.prices)?;
        let title = request
            .title
            .unwrap_or_else(|| "Trading Opportunities".to_string());
        let path = resolve_path(
            &self.config.chart_dir,
            request.filename.as_deref(),
            "trading_signals.png",
        )?;

        let chart = finsight_charts::signal_chart(
            &points,
            request.short_window,
            request.long_window,
            &title,
            path,
        )?;
        info!(
            path = %chart.output.file_path.display(),
            signals = chart.signals.len(),
            "Rendered signal chart"
        );
        Ok(json!({
            "file_path": chart.output.file_path,
            "base64": chart.output.base64,
            "width": chart.output.width,
            "height": chart.output.height,
            "signals": chart.signals,
        }))
    }
}

/// Company profile from quote metadata plus, when available, the
/// fundamental-data overview
fn profile_payload(summary: &QuoteSummary, overview: Option<&CompanyOverview>) -> Value {
    let numeric = |field: &Option<String>| CompanyOverview::numeric(field.as_deref());

    json!({
        "symbol": &summary.symbol,
        "name": overview.map(|o| o.name.clone()),
        "exchange": overview
            .and_then(|o| o.exchange.clone())
            .or_else(|| summary.exchange.clone()),
        "sector": overview.and_then(|o| o.sector.clone()),
        "industry": overview.and_then(|o| o.industry.clone()),
        "currency": &summary.currency,
        "market_cap": overview.and_then(|o| numeric(&o.market_cap)),
        "pe_ratio": overview.and_then(|o| numeric(&o.pe_ratio)),
        "dividend_yield": overview.and_then(|o| numeric(&o.dividend_yield)),
    })
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s} (expected YYYY-MM-DD)"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .context("Invalid date")
}

fn bars_to_points(bars: &[PriceBar]) -> Result<Vec<PricePoint>> {
    bars.iter()
        .map(|b| {
            let date = NaiveDate::parse_from_str(b.date.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid date: {} (expected YYYY-MM-DD)", b.date))?;
            Ok(PricePoint {
                date,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let chart_dir = std::env::temp_dir().join("finsight-handler-tests");
        let config = MarketConfig::builder()
            .chart_dir(&chart_dir)
            .build()
            .expect("config builds");
        AppState::from_config(config)
    }

    fn sample_bars(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.4).sin() * 8.0;
                PriceBar {
                    date: format!("2024-01-{:02}", (i % 28) + 1),
                    open: close - 1.0,
                    high: close + 1.5,
                    low: close - 1.5,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    }

    #[test]
    fn test_growth_payload_shape() {
        let state = test_state();
        let payload = state
            .growth(GrowthRatesRequest {
                series: vec![100.0, 110.0, 121.0],
            })
            .expect("growth computes");

        assert!(payload["annualized_growth_rate"].as_f64().is_some());
        assert_eq!(payload["period_growth_rates"].as_array().expect("array").len(), 2);
    }

    #[test]
    fn test_growth_rejects_short_series() {
        let state = test_state();
        assert!(state.growth(GrowthRatesRequest { series: vec![5.0] }).is_err());
    }

    #[test]
    fn test_technical_indicator_payload() {
        let state = test_state();
        let payload = state
            .technical_indicator(IndicatorRequest {
                prices: (1..=30).map(f64::from).collect(),
                indicator: "sma".to_string(),
                window: 5,
            })
            .expect("indicator computes");

        assert_eq!(payload["indicator"], "sma");
        assert_eq!(payload["values"].as_array().expect("array").len(), 30);
    }

    #[test]
    fn test_unknown_indicator_is_error() {
        let state = test_state();
        let result = state.technical_indicator(IndicatorRequest {
            prices: vec![1.0, 2.0],
            indicator: "vwap".to_string(),
            window: 5,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_metric_from_json_sections() {
        let state = test_state();
        let payload = state
            .metric(MetricRequest {
                financial_data: serde_json::json!({
                    "income_statement": { "revenue": 1000.0, "net_income": 200.0 }
                }),
                metric: "net_profit_margin".to_string(),
            })
            .expect("metric computes");

        assert_eq!(payload["metric"], "net_profit_margin");
        assert!((payload["value"].as_f64().expect("value") - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_metric_missing_inputs_is_null_not_error() {
        let state = test_state();
        let payload = state
            .metric(MetricRequest {
                financial_data: serde_json::json!({}),
                metric: "roe".to_string(),
            })
            .expect("metric computes");

        assert!(payload["value"].is_null());
    }

    #[test]
    fn test_price_chart_renders_to_chart_dir() {
        let state = test_state();
        let payload = state
            .price_chart(PriceChartRequest {
                prices: sample_bars(25),
                chart_type: "line".to_string(),
                title: None,
                filename: Some("handler_price.png".to_string()),
            })
            .expect("chart renders");

        let path = payload["file_path"].as_str().expect("path");
        assert!(path.ends_with("handler_price.png"));
        assert!(std::path::Path::new(path).exists());
    }

    #[test]
    fn test_trading_opportunities_includes_signals() {
        let state = test_state();
        let payload = state
            .trading_opportunities(TradingOpportunitiesRequest {
                prices: sample_bars(80),
                short_window: 5,
                long_window: 12,
                title: None,
                filename: Some("handler_signals.png".to_string()),
            })
            .expect("chart renders");

        assert!(payload["signals"].is_array());
        assert!(!payload["base64"].as_str().expect("base64").is_empty());
    }

    #[test]
    fn test_statements_without_key_is_error() {
        let state = test_state();
        let result = tokio_test::block_on(state.financial_statements(StatementsRequest {
            ticker: "AAPL".to_string(),
            statement: "income_statement".to_string(),
        }));
        let err = result.expect_err("no API key configured");
        assert!(err.to_string().contains("ALPHA_VANTAGE_API_KEY"));
    }

    #[test]
    fn test_historical_prices_date_validation() {
        let state = test_state();
        let result = tokio_test::block_on(state.historical_prices(HistoricalPricesRequest {
            tickers: vec!["AAPL".to_string()],
            start_date: "2024-06-30".to_string(),
            end_date: "2024-01-01".to_string(),
            interval: "1d".to_string(),
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2024-01-15").is_ok());
    }

    fn sample_summary() -> QuoteSummary {
        QuoteSummary {
            symbol: "AAPL".to_string(),
            currency: Some("USD".to_string()),
            exchange: Some("NMS".to_string()),
            instrument_type: Some("EQUITY".to_string()),
        }
    }

    #[test]
    fn test_profile_without_overview_keeps_quote_metadata() {
        let payload = profile_payload(&sample_summary(), None);

        assert_eq!(payload["symbol"], "AAPL");
        assert_eq!(payload["currency"], "USD");
        assert_eq!(payload["exchange"], "NMS");
        // Fundamental fields degrade to null, not an error
        assert!(payload["name"].is_null());
        assert!(payload["market_cap"].is_null());
    }

    #[test]
    fn test_profile_with_overview_fills_fundamentals() {
        let overview: CompanyOverview = serde_json::from_value(serde_json::json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "Exchange": "NASDAQ",
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "3400000000000",
            "PERatio": "34.5"
        }))
        .expect("overview deserializes");

        let payload = profile_payload(&sample_summary(), Some(&overview));

        assert_eq!(payload["name"], "Apple Inc");
        assert_eq!(payload["exchange"], "NASDAQ");
        assert_eq!(payload["sector"], "TECHNOLOGY");
        assert!((payload["pe_ratio"].as_f64().expect("number") - 34.5).abs() < 1e-9);
    }
}
