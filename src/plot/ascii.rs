//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x axis is the bundle's date index (the union of the plotted metrics'
//! dates, gaps zero-filled), one step per date.

use chrono::NaiveDate;

use crate::domain::{Layout, Metric, SeriesBundle, SeriesKind};

/// Glyphs assigned to metrics in merged plots, in metric order.
const GLYPHS: [char; 7] = ['*', 'o', '+', 'x', '#', '@', '%'];

/// Render one series kind of a bundle.
///
/// `Separate` draws one panel per metric; `Merged` overlays every metric in a
/// single panel with a legend.
pub fn render_bundle(
    title: &str,
    bundle: &SeriesBundle,
    kind: SeriesKind,
    metrics: &[Metric],
    layout: Layout,
    width: usize,
    height: usize,
) -> String {
    let mut out = format!("{} / {}\n", title.to_uppercase(), kind.label());

    let index = bundle.date_index(kind, metrics);
    if index.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    match layout {
        Layout::Separate => {
            for &metric in metrics {
                let values = bundle.aligned(kind, metric, &index);
                out.push_str(&format!("[{}] ", metric.column()));
                out.push_str(&render_panel(&index, &[(GLYPHS[0], values)], width, height));
            }
        }
        Layout::Merged => {
            let lines: Vec<(char, Vec<f64>)> = metrics
                .iter()
                .enumerate()
                .map(|(i, &m)| (GLYPHS[i % GLYPHS.len()], bundle.aligned(kind, m, &index)))
                .collect();
            let legend: Vec<String> = metrics
                .iter()
                .zip(lines.iter())
                .map(|(m, (g, _))| format!("{g}={}", m.column()))
                .collect();
            out.push_str(&format!("legend: {}\n", legend.join(" ")));
            out.push_str(&render_panel(&index, &lines, width, height));
        }
    }

    out
}

fn render_panel(index: &[NaiveDate], lines: &[(char, Vec<f64>)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(lines).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (glyph, values) in lines {
        draw_values(&mut grid, values, y_min, y_max, *glyph);
    }

    let first = index.first().map(|d| d.to_string()).unwrap_or_default();
    let last = index.last().map(|d| d.to_string()).unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("dates=[{first}, {last}] | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(lines: &[(char, Vec<f64>)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (_, values) in lines {
        for &v in values {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: center it instead of collapsing the range.
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_values(grid: &mut [Vec<char>], values: &[f64], y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (i, &v) in values.iter().enumerate() {
        let x = map_x(i, values.len(), width);
        let y = map_y(v, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
            None => draw_line(grid, x, y, x, y, ch),
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written, so
/// earlier series stay visible under later ones.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bundle() -> SeriesBundle {
        let mut b = SeriesBundle::empty(&[Metric::Deces, Metric::Gueris]);
        let deces = b.cumul.get_mut(&Metric::Deces).unwrap();
        deces.insert(d(2021, 1, 1), 0.0);
        deces.insert(d(2021, 1, 2), 5.0);
        deces.insert(d(2021, 1, 3), 10.0);
        b
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_bundle("Paris", &bundle(), SeriesKind::Cumul, &[Metric::Deces], Layout::Separate, 10, 5);
        let expected = concat!(
            "PARIS / CUMUL\n",
            "[deces] dates=[2021-01-01, 2021-01-03] | y=[-0.50, 10.50]\n",
            "        **\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "**        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn merged_plot_has_legend_and_both_glyphs() {
        let mut b = bundle();
        b.cumul.get_mut(&Metric::Gueris).unwrap().insert(d(2021, 1, 2), 3.0);
        let txt = render_bundle(
            "idf",
            &b,
            SeriesKind::Cumul,
            &[Metric::Deces, Metric::Gueris],
            Layout::Merged,
            20,
            8,
        );
        assert!(txt.starts_with("IDF / CUMUL\nlegend: *=deces o=gueris\n"));
        assert!(txt.contains('*'));
        assert!(txt.contains('o'));
    }

    #[test]
    fn empty_bundle_says_so() {
        let b = SeriesBundle::empty(&[Metric::Deces]);
        let txt = render_bundle("x", &b, SeriesKind::Diff, &[Metric::Deces], Layout::Merged, 20, 8);
        assert_eq!(txt, "X / DIFF\n(no data)\n");
    }
}
