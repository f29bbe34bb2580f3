//! Financial analysis primitives for the finsight MCP server
//!
//! Pure, synchronous computations over caller-supplied series and
//! statement data:
//!
//! - Growth rates (period-over-period and annualized)
//! - Technical indicators (SMA, EMA, RSI, MACD, volatility) via the
//!   `ta` crate's streaming types
//! - Standard financial ratio metrics (margins, leverage, liquidity,
//!   returns, valuation)
//! - Moving-average crossover signals (golden/death cross)

pub mod error;
pub mod growth;
pub mod metrics;
pub mod signals;
pub mod technical;

// Re-export main types for convenience
pub use error::{AnalysisError, Result};
pub use growth::{GrowthRates, growth_rates};
pub use metrics::{FinancialData, Metric, MetricValue, financial_metric};
pub use signals::{Signal, SignalKind, crossover_signals, rolling_mean};
pub use technical::{Indicator, IndicatorOutput, indicator_series};
