//! MCP server exposing stock-analysis tools over stdio
//!
//! Thirteen tools across four groups: market data (prices, dividends,
//! splits, company info, statements), analysis (growth rates, technical
//! indicators, financial metrics), and charting (price, metric,
//! comparison, trading-signal charts).

pub mod handlers;
pub mod logging;
pub mod params;
pub mod server;

pub use handlers::AppState;
pub use server::FinsightServer;
