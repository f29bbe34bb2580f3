//! Chart rendering for stock analysis.
//!
//! Renders price history, moving-average signal overlays, metric
//! trends, and multi-symbol comparisons to PNG files, returning both
//! the file path and a base64 encoding of the image.

pub mod error;
pub mod output;
pub mod price;
pub mod series;
pub mod types;

pub use error::{ChartError, Result};
pub use output::{CHART_HEIGHT, CHART_WIDTH, resolve_path};
pub use price::{SignalChart, price_chart, signal_chart};
pub use series::{comparison_chart, metric_chart};
pub use types::{ChartKind, ChartOutput, PricePoint};
