//! Output path resolution and PNG encoding helpers

use crate::error::{ChartError, Result};
use crate::types::ChartOutput;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

/// Default chart dimensions in pixels
pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 500;

/// Resolve the output path for a chart.
///
/// Caller-supplied absolute paths are used as-is; relative names land
/// under `chart_dir`. Missing names fall back to `default_name`. The
/// parent directory is created if needed.
pub fn resolve_path(
    chart_dir: &Path,
    filename: Option<&str>,
    default_name: &str,
) -> Result<PathBuf> {
    let path = match filename {
        Some(name) if Path::new(name).is_absolute() => PathBuf::from(name),
        Some(name) => chart_dir.join(name),
        None => chart_dir.join(default_name),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(path)
}

/// Read back the rendered PNG and wrap it into a `ChartOutput`
pub fn finalize(path: PathBuf) -> Result<ChartOutput> {
    let bytes = std::fs::read(&path)?;
    if bytes.is_empty() {
        return Err(ChartError::Render(format!(
            "Rendered image at {} is empty",
            path.display()
        )));
    }

    Ok(ChartOutput {
        base64: STANDARD.encode(&bytes),
        file_path: path,
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
    })
}

/// Padded y-axis range over a set of values
pub fn value_range(values: impl Iterator<Item = f64>) -> Result<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }

    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::InvalidInput(
            "No finite values to plot".to_string(),
        ));
    }

    // Flat series still need a visible band
    let pad = if max > min { (max - min) * 0.05 } else { max.abs().max(1.0) * 0.05 };
    Ok((min - pad, max + pad))
}
