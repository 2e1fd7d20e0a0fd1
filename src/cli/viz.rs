//! Terminal visualization using braille graphics
//!
//! Provides terminal renderings of capability histograms, fitted normal
//! curves and moving-range charts.

use console::style;
use drawille::Canvas;

use crate::analysis::capability::{Histogram, NormalCurve};

/// Default canvas size for curve and chart plots (braille dots)
pub const PLOT_WIDTH: u32 = 120;
pub const PLOT_HEIGHT: u32 = 40;

/// Width of histogram bars in characters
const BAR_MAX_WIDTH: usize = 50;

/// Map `value` from `[lo, hi]` onto `0..=span` canvas dots
fn scale(value: f64, lo: f64, hi: f64, span: u32) -> u32 {
    if hi <= lo {
        return span / 2;
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    (t * span as f64).round() as u32
}

/// Render a density histogram with LSL/USL markers
///
/// # Example Output
/// ```text
///      48.400 │████████████          │ 0.2500
///      49.200 │████████████          │ 0.2500 ◄LSL
/// ```
pub fn render_histogram(hist: &Histogram, lsl: Option<f64>, usl: Option<f64>) -> String {
    if hist.values.is_empty() || hist.bins.len() != hist.values.len() + 1 {
        return "   (no data)".to_string();
    }

    let max_density = hist.values.iter().cloned().fold(0.0_f64, f64::max);
    let mut lines = Vec::with_capacity(hist.values.len() + 2);

    for (i, &density) in hist.values.iter().enumerate() {
        let lo = hist.bins[i];
        let hi = hist.bins[i + 1];
        let center = (lo + hi) / 2.0;
        let last = i + 1 == hist.values.len();
        let contains = |limit: f64| limit >= lo && (limit < hi || (last && limit <= hi));

        let bar_width = if max_density > 0.0 {
            (density / max_density * BAR_MAX_WIDTH as f64).round() as usize
        } else {
            0
        };

        let in_spec = lsl.map_or(true, |l| center >= l) && usl.map_or(true, |u| center <= u);
        let bar = if in_spec {
            style("█".repeat(bar_width)).green()
        } else {
            style("░".repeat(bar_width)).red()
        };

        let marker = match (lsl.is_some_and(contains), usl.is_some_and(contains)) {
            (true, true) => " ◄LSL/USL",
            (true, false) => " ◄LSL",
            (false, true) => " ◄USL",
            (false, false) => "",
        };

        lines.push(format!(
            "   {:>10.4} │{}{}│ {:.4}{}",
            center,
            bar,
            " ".repeat(BAR_MAX_WIDTH - bar_width),
            density,
            style(marker).cyan()
        ));
    }

    lines.push(format!("   {:>10} └{}┘", "", "─".repeat(BAR_MAX_WIDTH)));
    lines.push(format!(
        "   {} bins, edges {:.4} to {:.4}  (█ in-spec, ░ out-of-spec)",
        hist.values.len(),
        hist.bins[0],
        hist.bins[hist.bins.len() - 1]
    ));
    lines.join("\n")
}

/// Render the fitted normal curve with specification limits
///
/// Spec limits inside the plotted range are drawn as vertical lines.
pub fn render_normal_curve(
    curve: &NormalCurve,
    lsl: Option<f64>,
    usl: Option<f64>,
    width: u32,
    height: u32,
) -> String {
    if curve.x.len() < 2 || curve.x.len() != curve.y.len() {
        return "   (no curve - too few values or zero spread)".to_string();
    }

    let x_lo = curve.x[0];
    let x_hi = curve.x[curve.x.len() - 1];
    let y_hi = curve.y.iter().cloned().fold(0.0_f64, f64::max);
    let max_x = width.saturating_sub(1);
    let max_y = height.saturating_sub(1);

    let mut canvas = Canvas::new(width, height);
    let to_point = |x: f64, y: f64| {
        (
            scale(x, x_lo, x_hi, max_x),
            max_y - scale(y, 0.0, y_hi, max_y),
        )
    };

    for pair in curve.x.iter().zip(&curve.y).collect::<Vec<_>>().windows(2) {
        let (x1, y1) = to_point(*pair[0].0, *pair[0].1);
        let (x2, y2) = to_point(*pair[1].0, *pair[1].1);
        canvas.line(x1, y1, x2, y2);
    }

    for limit in [lsl, usl].into_iter().flatten() {
        if limit >= x_lo && limit <= x_hi {
            let px = scale(limit, x_lo, x_hi, max_x);
            // Dashed so it reads differently from the curve
            for py in (0..height).step_by(3) {
                canvas.set(px, py);
            }
        }
    }

    let mut output = String::new();
    output.push_str(&canvas.frame());
    output.push_str(&format!(
        "\n  x: {:.4} .. {:.4}   LSL: {}   USL: {}",
        x_lo,
        x_hi,
        lsl.map_or("-".to_string(), |v| format!("{:.4}", v)),
        usl.map_or("-".to_string(), |v| format!("{:.4}", v)),
    ));
    output
}

/// Render a moving-range chart with its upper control limit
///
/// Gaps in the ranges break the plotted line.
pub fn render_moving_range_chart(ranges: &[Option<f64>], ucl: f64, width: u32, height: u32) -> String {
    let valid_max = ranges.iter().flatten().cloned().fold(0.0_f64, f64::max);
    if ranges.len() < 2 || (valid_max <= 0.0 && ucl <= 0.0) {
        return "   (no moving ranges to plot)".to_string();
    }

    let y_hi = valid_max.max(ucl) * 1.1;
    let max_x = width.saturating_sub(1);
    let max_y = height.saturating_sub(1);
    let last_index = (ranges.len() - 1) as f64;

    let mut canvas = Canvas::new(width, height);
    let to_point = |i: usize, y: f64| {
        (
            scale(i as f64, 0.0, last_index, max_x),
            max_y - scale(y, 0.0, y_hi, max_y),
        )
    };

    let mut previous: Option<(u32, u32)> = None;
    for (i, range) in ranges.iter().enumerate() {
        match range {
            Some(r) => {
                let point = to_point(i, *r);
                match previous {
                    Some((px, py)) => canvas.line(px, py, point.0, point.1),
                    None => canvas.set(point.0, point.1),
                }
                previous = Some(point);
            }
            None => previous = None,
        }
    }

    let ucl_y = max_y - scale(ucl, 0.0, y_hi, max_y);
    for px in (0..width).step_by(4) {
        canvas.set(px, ucl_y);
    }

    let mut output = String::new();
    output.push_str(&canvas.frame());
    output.push_str(&format!(
        "\n  {} points   UCL (dotted) = {:.4}   max MR = {:.4}",
        ranges.len(),
        ucl,
        valid_max
    ));
    output
}

/// Render a simple 1D range bar of observed values against spec limits
pub fn render_range_bar(min: f64, max: f64, lower_limit: f64, upper_limit: f64) -> String {
    let bar_width: usize = 60;

    // Show 10% beyond whichever is wider, the limits or the data
    let lo = min.min(lower_limit);
    let hi = max.max(upper_limit);
    let margin = ((hi - lo) * 0.1).max(f64::EPSILON);
    let view_min = lo - margin;
    let view_max = hi + margin;

    let span = (bar_width - 1) as u32;
    let pos = |v: f64| scale(v, view_min, view_max, span) as usize;

    let mut bar: Vec<char> = vec!['─'; bar_width];
    let (pos_min, pos_max) = (pos(min), pos(max));
    for cell in bar.iter_mut().take(pos_max + 1).skip(pos_min) {
        *cell = '═';
    }
    bar[pos_min] = '[';
    bar[pos_max] = ']';
    for limit_pos in [pos(lower_limit), pos(upper_limit)] {
        bar[limit_pos] = if bar[limit_pos] == '─' { '│' } else { '╋' };
    }

    let bar_str: String = bar.into_iter().collect();
    format!(
        "  LSL={:.4}  USL={:.4}\n  {}\n  Min={:.4}  Max={:.4}",
        lower_limit, upper_limit, bar_str, min, max
    )
}
