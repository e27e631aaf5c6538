//! Plotters-powered SVG charts.
//!
//! Separate layout splits the canvas into a two-column grid with one chart per
//! metric; merged layout draws every metric on one chart with a legend. The x
//! axis is the day offset from the first date, labelled with ISO dates.

use std::path::Path;

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{Layout, Metric, SeriesBundle, SeriesKind};
use crate::error::AppError;

/// Canvas size for one panel row.
const PANEL_HEIGHT: u32 = 260;
const CANVAS_WIDTH: u32 = 1000;

/// Write one series kind of a bundle as an SVG file.
pub fn write_svg(
    path: &Path,
    title: &str,
    bundle: &SeriesBundle,
    kind: SeriesKind,
    metrics: &[Metric],
    layout: Layout,
) -> Result<(), AppError> {
    let index = bundle.date_index(kind, metrics);
    if index.is_empty() {
        return Err(AppError::new(3, format!("Nothing to draw for '{title}': all series are empty.")));
    }

    let heading = format!("{} / {}", title.to_uppercase(), kind.label());
    let rows = match layout {
        Layout::Separate => metrics.len().div_ceil(2).max(1),
        Layout::Merged => 2,
    };
    let size = (CANVAS_WIDTH, PANEL_HEIGHT * rows as u32 + 40);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let body = root.titled(&heading, ("sans-serif", 22)).map_err(draw_err)?;

    match layout {
        Layout::Merged => {
            let series: Vec<(Metric, Vec<f64>)> = metrics
                .iter()
                .map(|&m| (m, bundle.aligned(kind, m, &index)))
                .collect();
            draw_chart(&body, "", &index, &series)?;
        }
        Layout::Separate => {
            let panels = body.split_evenly((rows, 2));
            for (panel, &metric) in panels.iter().zip(metrics) {
                let series = [(metric, bundle.aligned(kind, metric, &index))];
                draw_chart(panel, metric.column(), &index, &series)?;
            }
        }
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_chart(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    caption: &str,
    index: &[NaiveDate],
    series: &[(Metric, Vec<f64>)],
) -> Result<(), AppError> {
    let start = index[0];
    let x_max = (index.len().max(2) - 1) as f64;
    let (y0, y1) = y_bounds(series);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 14))
        .margin(8)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(0f64..x_max, y0..y1)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|v| {
            (start + Duration::days(v.round() as i64))
                .format("%Y-%m-%d")
                .to_string()
        })
        .draw()
        .map_err(draw_err)?;

    for (i, (metric, values)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(x, &y)| (x as f64, y)),
                color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(metric.column())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;
    }

    Ok(())
}

fn y_bounds(series: &[(Metric, Vec<f64>)]) -> (f64, f64) {
    let (lo, hi) = series
        .iter()
        .flat_map(|(_, v)| v.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let span = (hi - lo).max(1.0);
    (lo - span * 0.05, hi + span * 0.05)
}

fn draw_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::new(4, format!("Failed to draw SVG chart: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> SeriesBundle {
        let metrics = [Metric::Deces, Metric::Gueris, Metric::Reanimation];
        let mut b = SeriesBundle::empty(&metrics);
        let start = NaiveDate::from_ymd_opt(2020, 3, 18).unwrap();
        for i in 0..10 {
            let date = start + Duration::days(i);
            b.diff.get_mut(&Metric::Deces).unwrap().insert(date, i as f64);
            b.diff.get_mut(&Metric::Gueris).unwrap().insert(date, (i * 2) as f64);
        }
        b
    }

    #[test]
    fn writes_separate_and_merged_svg() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = [Metric::Deces, Metric::Gueris, Metric::Reanimation];
        for layout in [Layout::Separate, Layout::Merged] {
            let path = dir.path().join(format!("{layout:?}.svg"));
            write_svg(&path, "Bretagne", &bundle(), SeriesKind::Diff, &metrics, layout).unwrap();
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"));
            assert!(svg.contains("BRETAGNE / DIFF"));
        }
    }

    #[test]
    fn empty_bundle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let b = SeriesBundle::empty(&[Metric::Deces]);
        let err = write_svg(&path, "x", &b, SeriesKind::Cumul, &[Metric::Deces], Layout::Merged).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
