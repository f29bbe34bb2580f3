//! Market data retrieval for the finsight MCP server
//!
//! This crate wraps the external market-data providers behind typed
//! clients and adds the ambient plumbing around them:
//!
//! - Yahoo Finance: quotes, price history, dividends, splits
//! - Alpha Vantage: company overview and annual financial statements
//! - TTL caching keyed by (symbol, endpoint, params)
//! - Rate limiting for the free-tier Alpha Vantage API
//! - Configuration with builder and environment loading

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod statements;

// Re-export main types for convenience
pub use api::{
    AlphaVantageClient, CompanyOverview, DividendEvent, Quote, QuoteSummary, SplitEvent,
    YahooClient,
};
pub use cache::{CacheKey, CacheManager, MarketCache};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use statements::{StatementKind, StatementReport};
