//! API clients for market data providers

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use yahoo::{DividendEvent, Quote, QuoteSummary, SplitEvent, YahooClient};
