//! Price history charts: line, candlestick, and signal overlays

use crate::error::{ChartError, Result};
use crate::output::{CHART_HEIGHT, CHART_WIDTH, finalize, value_range};
use crate::types::{ChartKind, ChartOutput, PricePoint};
use finsight_analysis::{Signal, SignalKind, crossover_signals, rolling_mean};
use plotters::prelude::*;
use std::path::PathBuf;

fn render_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Render(e.to_string())
}

fn date_label(points: &[PricePoint], idx: usize) -> String {
    points
        .get(idx)
        .map(|p| p.date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Render a price chart (close-price line or OHLC candlesticks)
pub fn price_chart(
    points: &[PricePoint],
    kind: ChartKind,
    title: &str,
    path: PathBuf,
) -> Result<ChartOutput> {
    if points.is_empty() {
        return Err(ChartError::InvalidInput("No price data to plot".to_string()));
    }

    let (y_min, y_max) = value_range(points.iter().flat_map(|p| [p.low, p.high]))?;

    {
        let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..points.len(), y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|idx| date_label(points, *idx))
            .y_desc("Price")
            .draw()
            .map_err(render_err)?;

        match kind {
            ChartKind::Line => {
                chart
                    .draw_series(LineSeries::new(
                        points.iter().enumerate().map(|(i, p)| (i, p.close)),
                        &BLUE,
                    ))
                    .map_err(render_err)?
                    .label("Close Price")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(render_err)?;
            }
            ChartKind::Candlestick => {
                chart
                    .draw_series(points.iter().enumerate().map(|(i, p)| {
                        CandleStick::new(
                            i,
                            p.open,
                            p.high,
                            p.low,
                            p.close,
                            GREEN.filled(),
                            RED.filled(),
                            6,
                        )
                    }))
                    .map_err(render_err)?;
            }
        }

        root.present().map_err(render_err)?;
    }

    finalize(path)
}

/// A rendered signal chart along with the crossovers it marks
#[derive(Debug, Clone)]
pub struct SignalChart {
    pub output: ChartOutput,
    pub signals: Vec<Signal>,
}

/// Render close prices with short/long moving averages and golden/death
/// cross markers.
pub fn signal_chart(
    points: &[PricePoint],
    short_window: usize,
    long_window: usize,
    title: &str,
    path: PathBuf,
) -> Result<SignalChart> {
    if points.is_empty() {
        return Err(ChartError::InvalidInput("No price data to plot".to_string()));
    }

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let signals = crossover_signals(&closes, short_window, long_window)
        .map_err(|e| ChartError::InvalidInput(e.to_string()))?;

    let short_ma = rolling_mean(&closes, short_window);
    let long_ma = rolling_mean(&closes, long_window);
    let (y_min, y_max) = value_range(closes.iter().copied())?;

    {
        let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..points.len(), y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|idx| date_label(points, *idx))
            .y_desc("Price")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                closes.iter().enumerate().map(|(i, &c)| (i, c)),
                &BLUE.mix(0.5),
            ))
            .map_err(render_err)?
            .label("Close Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        let ma_series = |ma: &[Option<f64>]| {
            ma.iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v)))
                .collect::<Vec<_>>()
        };

        chart
            .draw_series(LineSeries::new(ma_series(&short_ma), &full_palette::ORANGE))
            .map_err(render_err)?
            .label(format!("Short MA ({short_window})"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], full_palette::ORANGE));

        chart
            .draw_series(LineSeries::new(ma_series(&long_ma), &MAGENTA))
            .map_err(render_err)?
            .label(format!("Long MA ({long_window})"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MAGENTA));

        let buys = signals.iter().filter(|s| s.kind == SignalKind::Buy);
        chart
            .draw_series(
                buys.map(|s| TriangleMarker::new((s.index, s.price), 8, GREEN.filled())),
            )
            .map_err(render_err)?
            .label("Buy Signal")
            .legend(|(x, y)| TriangleMarker::new((x + 10, y), 6, GREEN.filled()));

        let sells = signals.iter().filter(|s| s.kind == SignalKind::Sell);
        chart
            .draw_series(sells.map(|s| Circle::new((s.index, s.price), 6, RED.filled())))
            .map_err(render_err)?
            .label("Sell Signal")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    Ok(SignalChart {
        output: finalize(path)?,
        signals,
    })
}
