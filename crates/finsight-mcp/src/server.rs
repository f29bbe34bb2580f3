//! MCP server wiring
//!
//! `FinsightServer` exposes the tool surface over rmcp's tool router.
//! Handler failures are returned as `is_error` tool results rather
//! than protocol errors, so a bad symbol or malformed input never
//! takes the server down.

use crate::handlers::AppState;
use crate::params::{
    ComparisonChartRequest, CurrentPriceRequest, DividendsRequest, GrowthRatesRequest,
    HistoricalPricesRequest, IndicatorRequest, MetricChartRequest, MetricRequest,
    PriceChartRequest, SplitsRequest, StatementsRequest, TickerInfoRequest,
    TradingOpportunitiesRequest,
};
use anyhow::anyhow;
use rmcp::{
    ErrorData as McpError, ServiceExt,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

const INSTRUCTIONS: &str = "Stock analysis server. Fetch prices, dividends, splits, company \
    info, and financial statements; compute growth rates, technical indicators, and financial \
    ratio metrics; render price, metric, comparison, and trading-signal charts as PNG files \
    returned with base64 content.";

#[derive(Clone)]
pub struct FinsightServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Wrap a handler outcome into a tool result. Errors become
/// `is_error: true` results carrying the message.
fn into_call_result(summary: &str, outcome: anyhow::Result<Value>) -> CallToolResult {
    match outcome {
        Ok(payload) => CallToolResult {
            content: vec![Content::text(summary.to_string())],
            structured_content: Some(payload),
            is_error: Some(false),
            meta: None,
        },
        Err(err) => {
            warn!(tool = summary, error = %err, "Tool call failed");
            CallToolResult {
                content: vec![Content::text(format!("{err:#}"))],
                structured_content: None,
                is_error: Some(true),
                meta: None,
            }
        }
    }
}

#[tool_router]
impl FinsightServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "get_current_price",
        description = "Get the latest price, currency, and timestamp for a ticker"
    )]
    async fn get_current_price(
        &self,
        params: Parameters<CurrentPriceRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.current_price(params.0).await;
        Ok(into_call_result("get_current_price", outcome))
    }

    #[tool(
        name = "get_historical_prices",
        description = "Get OHLCV history for one or more tickers between two dates"
    )]
    async fn get_historical_prices(
        &self,
        params: Parameters<HistoricalPricesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.historical_prices(params.0).await;
        Ok(into_call_result("get_historical_prices", outcome))
    }

    #[tool(
        name = "get_dividends",
        description = "Get dividend payment history for a ticker"
    )]
    async fn get_dividends(
        &self,
        params: Parameters<DividendsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.dividends(params.0).await;
        Ok(into_call_result("get_dividends", outcome))
    }

    #[tool(
        name = "get_splits",
        description = "Get stock split history for a ticker"
    )]
    async fn get_splits(
        &self,
        params: Parameters<SplitsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.splits(params.0).await;
        Ok(into_call_result("get_splits", outcome))
    }

    #[tool(
        name = "get_ticker_info",
        description = "Get company profile: name, exchange, sector, industry, valuation"
    )]
    async fn get_ticker_info(
        &self,
        params: Parameters<TickerInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.ticker_info(params.0).await;
        Ok(into_call_result("get_ticker_info", outcome))
    }

    #[tool(
        name = "get_financial_statements",
        description = "Get annual income statement, balance sheet, or cash flow data"
    )]
    async fn get_financial_statements(
        &self,
        params: Parameters<StatementsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.financial_statements(params.0).await;
        Ok(into_call_result("get_financial_statements", outcome))
    }

    #[tool(
        name = "calculate_growth_rates",
        description = "Calculate period-over-period and annualized growth rates for a series"
    )]
    async fn calculate_growth_rates(
        &self,
        params: Parameters<GrowthRatesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.growth(params.0);
        Ok(into_call_result("calculate_growth_rates", outcome))
    }

    #[tool(
        name = "calculate_technical_indicator",
        description = "Calculate sma, ema, rsi, macd, or volatility over closing prices"
    )]
    async fn calculate_technical_indicator(
        &self,
        params: Parameters<IndicatorRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.technical_indicator(params.0);
        Ok(into_call_result("calculate_technical_indicator", outcome))
    }

    #[tool(
        name = "calculate_financial_metric",
        description = "Calculate a financial ratio (margins, leverage, liquidity, returns, \
                       valuation) from statement data"
    )]
    async fn calculate_financial_metric(
        &self,
        params: Parameters<MetricRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.metric(params.0);
        Ok(into_call_result("calculate_financial_metric", outcome))
    }

    #[tool(
        name = "plot_price_chart",
        description = "Render a line or candlestick price chart to a PNG file"
    )]
    async fn plot_price_chart(
        &self,
        params: Parameters<PriceChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.price_chart(params.0);
        Ok(into_call_result("plot_price_chart", outcome))
    }

    #[tool(
        name = "plot_financial_metric",
        description = "Render a financial metric over time to a PNG file"
    )]
    async fn plot_financial_metric(
        &self,
        params: Parameters<MetricChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.metric_chart(params.0);
        Ok(into_call_result("plot_financial_metric", outcome))
    }

    #[tool(
        name = "plot_comparison_chart",
        description = "Render several named series on shared axes to a PNG file"
    )]
    async fn plot_comparison_chart(
        &self,
        params: Parameters<ComparisonChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.comparison_chart(params.0);
        Ok(into_call_result("plot_comparison_chart", outcome))
    }

    #[tool(
        name = "plot_trading_opportunities",
        description = "Render close prices with moving averages and golden/death cross \
                       buy/sell markers"
    )]
    async fn plot_trading_opportunities(
        &self,
        params: Parameters<TradingOpportunitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.trading_opportunities(params.0);
        Ok(into_call_result("plot_trading_opportunities", outcome))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for FinsightServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

impl FinsightServer {
    /// Run the server over stdio transport until the peer disconnects
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|err| anyhow!(err))?;

        service.waiting().await.map_err(|err| anyhow!(err))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result_shape() {
        let result = into_call_result("demo", Ok(serde_json::json!({"price": 42.0})));

        assert_eq!(result.is_error, Some(false));
        let payload = result.structured_content.expect("payload present");
        assert_eq!(payload["price"], 42.0);
    }

    #[test]
    fn test_error_result_shape() {
        let result = into_call_result("demo", Err(anyhow!("symbol not found")));

        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());
    }
}
