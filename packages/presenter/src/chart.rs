//! Horizontal bar charts and character-grid line charts.

use std::fmt::Write as _;

use console::style;

use crate::format_count;

const BAR_CHAR: char = '█';
const POINT_CHAR: char = '•';

/// One bar of a bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Category label.
    pub label: String,
    /// Length driver; bars scale against the largest value.
    pub value: f64,
    /// Text printed after the bar.
    pub annotation: String,
}

impl Bar {
    /// Creates a bar annotated with its value.
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64, annotation: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            annotation: annotation.into(),
        }
    }

    /// Creates a bar for a count, annotated with thousands separators.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn count(label: impl Into<String>, count: u64) -> Self {
        let annotation = i64::try_from(count).map_or_else(|_| count.to_string(), format_count);
        Self::new(label, count as f64, annotation)
    }
}

/// Renders a horizontal bar chart `width` columns wide.
///
/// Bars keep the given order. Labels are left-aligned and padded to the
/// longest label.
#[must_use]
pub fn bar_chart(title: &str, bars: &[Bar], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(title).bold());

    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);

    for bar in bars {
        let len = bar_length(bar.value, max, width);
        let _ = writeln!(
            out,
            "{:<label_width$} │{} {}",
            bar.label,
            style(BAR_CHAR.to_string().repeat(len)).cyan(),
            bar.annotation
        );
    }

    out
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_length(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    let len = (value / max * width as f64).round() as usize;
    len.clamp(1, width)
}

/// One point of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    /// X-axis label (typically a date).
    pub label: String,
    /// Y value, `None` for a gap.
    pub value: Option<f64>,
}

impl LinePoint {
    /// Creates a point.
    #[must_use]
    pub fn new(label: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Picks at most `width` points, taking the last point of each equal-size
/// bucket.
fn downsample(points: &[LinePoint], width: usize) -> Vec<Option<f64>> {
    if width == 0 || points.is_empty() {
        return Vec::new();
    }
    let bucket = points.len().div_ceil(width);
    points
        .chunks(bucket)
        .filter_map(|chunk| chunk.last().map(|p| p.value))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn axis_label(value: f64) -> String {
    if value.fract() == 0.0 || value.abs() >= 1000.0 {
        format_count(value.round() as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Renders a line chart on a `height` × `width` character grid.
///
/// The y axis shows the minimum and maximum of the plotted values; the x
/// axis shows the first and last labels. Missing values leave a blank
/// column.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn line_chart(title: &str, points: &[LinePoint], height: usize, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(title).bold());

    let columns = downsample(points, width);
    let present = columns.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if height == 0 || !min.is_finite() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }

    let levels: Vec<Option<usize>> = columns
        .iter()
        .map(|v| {
            v.map(|v| {
                if max > min {
                    ((v - min) / (max - min) * (height - 1) as f64).round() as usize
                } else {
                    0
                }
            })
        })
        .collect();

    let top = axis_label(max);
    let bottom = axis_label(min);
    let label_width = top.chars().count().max(bottom.chars().count());

    for row in (0..height).rev() {
        let label = if row == height - 1 {
            top.as_str()
        } else if row == 0 {
            bottom.as_str()
        } else {
            ""
        };
        let cells: String = levels
            .iter()
            .map(|level| {
                if *level == Some(row) {
                    POINT_CHAR
                } else {
                    ' '
                }
            })
            .collect();
        let _ = writeln!(
            out,
            "{label:>label_width$} ┤{}",
            style(cells.trim_end()).green()
        );
    }

    let _ = writeln!(out, "{:>label_width$} └{}", "", "─".repeat(columns.len()));

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let used = first.label.chars().count() + last.label.chars().count();
        let gap = columns.len().saturating_sub(used).max(1);
        let _ = writeln!(
            out,
            "{:>label_width$}  {}{}{}",
            "",
            first.label,
            " ".repeat(gap),
            last.label
        );
    }

    out
}
