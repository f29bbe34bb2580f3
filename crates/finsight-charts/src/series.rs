//! Time-series charts for financial metrics and multi-symbol comparisons

use crate::error::{ChartError, Result};
use crate::output::{CHART_HEIGHT, CHART_WIDTH, finalize, value_range};
use crate::types::ChartOutput;
use plotters::prelude::*;
use plotters::style::Palette;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn render_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Render(e.to_string())
}

fn label_at(labels: &[String], idx: usize) -> String {
    labels.get(idx).cloned().unwrap_or_default()
}

/// Render a single metric over fiscal periods as a line with point markers
pub fn metric_chart(
    labels: &[String],
    values: &[f64],
    y_desc: &str,
    title: &str,
    path: PathBuf,
) -> Result<ChartOutput> {
    if values.is_empty() {
        return Err(ChartError::InvalidInput("No values to plot".to_string()));
    }
    if labels.len() != values.len() {
        return Err(ChartError::InvalidInput(format!(
            "Label count {} does not match value count {}",
            labels.len(),
            values.len()
        )));
    }

    let (y_min, y_max) = value_range(values.iter().copied())?;

    {
        let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..values.len(), y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(labels.len().min(10))
            .x_label_formatter(&|idx| label_at(labels, *idx))
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, &v)| (i, v)),
                &BLUE,
            ))
            .map_err(render_err)?;

        chart
            .draw_series(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| Circle::new((i, v), 4, BLUE.filled())),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    finalize(path)
}

/// Render several named series on shared axes, one color per series.
///
/// Series may have different lengths; each is plotted against its own
/// position index so the newest value of every series lands on the
/// right edge of its run.
pub fn comparison_chart(
    labels: &[String],
    series: &BTreeMap<String, Vec<f64>>,
    y_desc: &str,
    title: &str,
    path: PathBuf,
) -> Result<ChartOutput> {
    if series.is_empty() || series.values().all(Vec::is_empty) {
        return Err(ChartError::InvalidInput("No series to plot".to_string()));
    }

    let x_len = series.values().map(Vec::len).max().unwrap_or(0);
    let (y_min, y_max) = value_range(series.values().flatten().copied())?;

    {
        let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..x_len, y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(labels.len().min(10))
            .x_label_formatter(&|idx| label_at(labels, *idx))
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        for (idx, (name, values)) in series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, &v)| (i, v)),
                    color.stroke_width(2),
                ))
                .map_err(render_err)?
                .label(name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    finalize(path)
}
