//! Alpha Vantage API client

use crate::error::{MarketError, Result};
use crate::statements::{StatementKind, StatementReport, normalize_report};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Company overview data
///
/// Numeric fields arrive as strings ("None" when absent), so they are
/// kept as `Option<String>` here and parsed where needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    #[serde(rename = "BookValue")]
    pub book_value: Option<String>,
    #[serde(rename = "SharesOutstanding")]
    pub shares_outstanding: Option<String>,
}

impl CompanyOverview {
    /// Parse one of the stringly-typed numeric fields
    pub fn numeric(field: Option<&str>) -> Option<f64> {
        let value = field?.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return None;
        }
        value.parse().ok()
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (free tier: 5)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let default_quota = NonZeroU32::new(5).expect("5 is non-zero");
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(default_quota));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            MarketError::Config("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key, 5))
    }

    /// Issue a query and surface API-level error payloads as typed errors
    async fn query(&self, params: &HashMap<&str, &str>) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(BASE_URL).query(params).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::AlphaVantage(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(MarketError::AlphaVantage(error.to_string()));
        }

        // Free-tier throttling responses come back as "Note" or "Information"
        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(MarketError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string(),
            });
        }

        Ok(data)
    }

    /// Get company overview (name, sector, valuation ratios)
    pub async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let mut params = HashMap::new();
        params.insert("function", "OVERVIEW");
        params.insert("symbol", symbol);
        params.insert("apikey", self.api_key.as_str());

        let data = self.query(&params).await?;

        // An empty object means the symbol is unknown to Alpha Vantage
        if data.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "No company overview available".to_string(),
            });
        }

        let overview: CompanyOverview = serde_json::from_value(data)?;
        Ok(overview)
    }

    /// Get annual financial statements, newest first
    pub async fn statements(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<Vec<StatementReport>> {
        let function = kind.alpha_vantage_function();
        let mut params = HashMap::new();
        params.insert("function", function);
        params.insert("symbol", symbol);
        params.insert("apikey", self.api_key.as_str());

        let data = self.query(&params).await?;

        let reports = data
            .get("annualReports")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("No annual {kind} reports available"),
            })?;

        reports
            .iter()
            .map(|raw| normalize_report(kind, raw))
            .collect()
    }
}
