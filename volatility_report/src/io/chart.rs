//! Dual-axis PNG chart: price on the left axis, volatility on the right.

use std::{fmt::Display, ops::Range, path::Path};

use chrono::{DateTime, NaiveDateTime, Utc};
use plotters::prelude::*;

use crate::io::{ChartSnafu, PriceVolatilityChart, SinkError};

fn chart_err<E: Display>(path: &Path) -> impl Fn(E) -> SinkError + '_ {
    move |e| {
        ChartSnafu {
            path,
            message: e.to_string(),
        }
        .build()
    }
}

fn utc(ts: NaiveDateTime) -> DateTime<Utc> {
    ts.and_utc()
}

/// Min..max of `values` with 10% headroom; a flat or empty series still
/// gets a non-degenerate range.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = (max - min).max(max.abs() * 0.01).max(1e-8);
    let padding = span * 0.1;
    (min - padding)..(max + padding)
}

/// Draws `chart` into a PNG at `path`. Needs at least two price points.
pub fn render_chart(
    path: &Path,
    chart: &PriceVolatilityChart,
    width: u32,
    height: u32,
) -> Result<(), SinkError> {
    let (Some(first), Some(last)) = (chart.prices.first(), chart.prices.last()) else {
        return ChartSnafu {
            path,
            message: "no price points",
        }
        .fail();
    };
    let x_range = utc(first.0)..utc(last.0);
    let price_range = padded_range(chart.prices.iter().map(|p| p.1));
    let vol_range = padded_range(chart.volatility.iter().map(|p| p.1));

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err(path))?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 28.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), price_range)
        .map_err(chart_err(path))?
        .set_secondary_coord(x_range, vol_range);

    ctx.configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|ts: &DateTime<Utc>| ts.format("%Y-%m-%d").to_string())
        .draw()
        .map_err(chart_err(path))?;

    ctx.configure_secondary_axes()
        .y_desc("Volatility")
        .draw()
        .map_err(chart_err(path))?;

    ctx.draw_series(LineSeries::new(
        chart.prices.iter().map(|(ts, v)| (utc(*ts), *v)),
        &BLUE,
    ))
    .map_err(chart_err(path))?
    .label("Price")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    ctx.draw_secondary_series(LineSeries::new(
        chart.volatility.iter().map(|(ts, v)| (utc(*ts), *v)),
        &RED,
    ))
    .map_err(chart_err(path))?
    .label("Volatility")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(chart_err(path))?;

    root.present().map_err(chart_err(path))?;
    Ok(())
}
