//! SVG charts for per-subject rates and the confusion matrix.

use std::fs;
use std::path::{Path, PathBuf};

use keyprint_eval::{ConfusionMatrix, Statistics, SubjectIndex, SubjectMetric};
use plotters::coord::Shift;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info, instrument};

use crate::IoError;

/// File name of the confusion-matrix heatmap.
pub const CONFUSION_MATRIX_FILE: &str = "confusion_matrix.svg";

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Writes one bar chart per [`SubjectMetric`] plus a confusion heatmap.
///
/// Files land in the output directory as `<metric file stem>.svg` and
/// [`CONFUSION_MATRIX_FILE`]; existing files are overwritten.
pub struct ReportRenderer {
    output_dir: PathBuf,
}

impl ReportRenderer {
    /// Create a renderer targeting `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Paths of every file [`ReportRenderer::render`] writes, in drawing order.
    #[must_use]
    pub fn output_paths(&self) -> Vec<PathBuf> {
        SubjectMetric::ALL
            .iter()
            .map(|m| self.metric_path(*m))
            .chain(std::iter::once(self.output_dir.join(CONFUSION_MATRIX_FILE)))
            .collect()
    }

    fn metric_path(&self, metric: SubjectMetric) -> PathBuf {
        self.output_dir.join(format!("{}.svg", metric.file_stem()))
    }

    /// Draw all charts.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SubjectCountMismatch`] | `stats` or `confusion` is sized for a different subject count |
    /// | [`IoError::Draw`] | a chart cannot be drawn or written |
    #[instrument(skip_all, fields(dir = %self.output_dir.display(), n_subjects = subjects.len()))]
    pub fn render(
        &self,
        stats: &Statistics,
        subjects: &SubjectIndex,
        confusion: &ConfusionMatrix,
    ) -> Result<(), IoError> {
        for got in [stats.n_subjects(), confusion.n_subjects()] {
            if got != subjects.len() {
                return Err(IoError::SubjectCountMismatch {
                    expected: subjects.len(),
                    got,
                });
            }
        }
        let names = subjects.names();

        for metric in SubjectMetric::ALL {
            let path = self.metric_path(metric);
            draw_to_file(&path, bar_chart_size(names.len()), |root| {
                bar_chart(root, metric.title(), &names, stats.series(metric))
            })?;
            debug!(path = %path.display(), "bar chart written");
        }

        let path = self.output_dir.join(CONFUSION_MATRIX_FILE);
        let side = heatmap_side(names.len());
        draw_to_file(&path, (side, side), |root| heatmap(root, &names, confusion))?;

        info!(n_charts = SubjectMetric::ALL.len() + 1, "report rendered");
        Ok(())
    }
}

/// Open an SVG surface at `path`, run `draw` on it, and present it.
///
/// The surface is presented whether or not `draw` succeeds.
fn draw_to_file<F>(path: &Path, size: (u32, u32), draw: F) -> Result<(), IoError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    let root = SVGBackend::new(path, size).into_drawing_area();
    let drawn = match root.fill(&WHITE) {
        Ok(()) => draw(&root),
        Err(e) => Err(e.into()),
    };
    let presented = root.present();
    let to_error = |message: String| IoError::Draw {
        path: path.to_path_buf(),
        message,
    };
    drawn.map_err(|e| to_error(e.to_string()))?;
    presented.map_err(|e| to_error(e.to_string()))
}

fn bar_chart_size(n_subjects: usize) -> (u32, u32) {
    ((n_subjects as u32 * 24 + 160).max(800), 600)
}

fn heatmap_side(n_subjects: usize) -> u32 {
    (n_subjects as u32 * 36 + 200).max(600)
}

/// `WithKeyPoints` over an `f64` axis, delegating value formatting to the
/// inner coordinate so the mesh can be configured.
struct SlotAxis(WithKeyPoints<RangedCoordf64>);

impl Ranged for SlotAxis {
    type ValueType = f64;
    type FormatOption = NoDefaultFormatting;

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

impl ValueFormatter<f64> for SlotAxis {
    fn format(value: &f64) -> String {
        <RangedCoordf64 as ValueFormatter<f64>>::format(value)
    }
}

/// Axis of `n` unit-wide slots over `0..n`, ticked at slot centres.
fn slot_axis(n: usize) -> SlotAxis {
    SlotAxis((0.0..n as f64).with_key_points((0..n).map(|i| i as f64 + 0.5).collect()))
}

/// Slot holding `v`, if any.
fn slot_of(v: f64, n: usize) -> Option<usize> {
    let i = v.floor();
    (i >= 0.0 && i < n as f64).then_some(i as usize)
}

fn slot_name<'a>(names: &[&'a str], v: f64) -> &'a str {
    slot_of(v, names.len()).map_or("", |i| names[i])
}

fn rotated_labels() -> TextStyle<'static> {
    ("sans-serif", 12)
        .into_font()
        .transform(FontTransform::Rotate90)
        .into()
}

fn bar_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    names: &[&str],
    values: &[f64],
) -> DrawResult {
    let y_max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(100.0_f64, f64::max)
        * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(slot_axis(names.len()), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|v| slot_name(names, *v).to_string())
        .x_label_style(rotated_labels())
        .x_desc("Subject")
        .y_desc("%")
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let height = if v.is_finite() { v } else { 0.0 };
        let x = i as f64;
        let mut bar = Rectangle::new(
            [(x, 0.0), (x + 1.0, height)],
            BLUE.mix(0.8).filled(),
        );
        bar.set_margin(0, 0, 2, 2);
        bar
    }))?;

    Ok(())
}

/// White-to-blue ramp over `t` in `[0, 1]`.
fn heat_color(t: f64) -> RGBColor {
    let lerp = |from: u8, to: u8| (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u8;
    RGBColor(lerp(247, 8), lerp(251, 48), lerp(255, 107))
}

fn heatmap(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    names: &[&str],
    confusion: &ConfusionMatrix,
) -> DrawResult {
    let n = names.len();
    // Row 0 is drawn at the top.
    let flip = |i: usize| (n - 1 - i) as f64;
    let y_name = |v: f64| slot_of(v, n).map_or("", |y| names[n - 1 - y]);

    let mut chart = ChartBuilder::on(root)
        .caption("Confusion matrix", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(80)
        .y_label_area_size(80)
        .build_cartesian_2d(slot_axis(n), slot_axis(n))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|v| slot_name(names, *v).to_string())
        .y_label_formatter(&|v| y_name(*v).to_string())
        .x_label_style(rotated_labels())
        .x_desc("Predicted label")
        .y_desc("True label")
        .draw()?;

    let max = confusion.max_count().max(1) as f64;
    let cells = confusion.as_rows().iter().enumerate().flat_map(|(i, row)| {
        row.iter().enumerate().map(move |(j, &count)| (i, j, count))
    });

    chart.draw_series(cells.clone().map(|(i, j, count)| {
        let (x, y) = (j as f64, flip(i));
        Rectangle::new(
            [(x, y), (x + 1.0, y + 1.0)],
            heat_color(count as f64 / max).filled(),
        )
    }))?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    chart.draw_series(cells.map(|(i, j, count)| {
        let t = count as f64 / max;
        let color = if t > 0.5 { WHITE } else { BLACK };
        Text::new(
            count.to_string(),
            (j as f64 + 0.5, flip(i) + 0.5),
            ("sans-serif", 12).into_font().color(&color).pos(centered),
        )
    }))?;

    Ok(())
}
