use std::error::Error;
use std::ffi::OsString;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use scopeguard::ScopeGuard;
use tracing::{debug, info, warn};

use crate::error::PlotError;
use crate::results::SeriesGroup;

pub const TITLE: &str = "Benchmark Results for Different Lock Types";
pub const X_LABEL: &str = "Number of Threads";
pub const Y_LABEL: &str = "Average Time (ms)";

// 10x6 figure at 100 dpi
pub const PLOT_WIDTH: u32 = 1000;
pub const PLOT_HEIGHT: u32 = 600;

const FONT: &str = "sans-serif";

// matplotlib "tab10" cycle
const SERIES_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// One line on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(u32, f64)>,
}

/// Everything needed to draw the chart, independent of any backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub size: (u32, u32),
    pub series: Vec<Series>,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub size: (u32, u32),
    /// Collapse rows sharing a thread count into their mean.
    pub average: bool,
    /// Draw each series in ascending thread count instead of file order.
    pub sort_threads: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: TITLE.to_string(),
            size: (PLOT_WIDTH, PLOT_HEIGHT),
            average: false,
            sort_threads: false,
        }
    }
}

pub fn render(groups: &[SeriesGroup], options: &RenderOptions) -> Chart {
    let series = groups
        .iter()
        .map(|group| {
            let mut points = if options.average {
                group.mean_points()
            } else {
                group.points()
            };
            let before = points.len();
            points.retain(|&(_, time)| time.is_finite());
            if points.len() < before {
                warn!(
                    "series {:?}: skipping {} non-finite times",
                    group.lock_type,
                    before - points.len()
                );
            }
            if options.sort_threads {
                points.sort_by_key(|&(threads, _)| threads);
            }
            debug!("series {:?}: {} points", group.lock_type, points.len());
            Series {
                label: group.lock_type.to_string(),
                points,
            }
        })
        .collect();

    Chart {
        title: options.title.clone(),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        size: options.size,
        series,
    }
}

impl Chart {
    /// Legend entries, one per series.
    pub fn legend(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    fn points(&self) -> impl Iterator<Item = &(u32, f64)> + '_ {
        self.series.iter().flat_map(|s| s.points.iter())
    }

    fn x_range(&self) -> Range<u32> {
        let x_min = self.points().map(|p| p.0).min();
        let x_max = self.points().map(|p| p.0).max();

        match (x_min, x_max) {
            (Some(lo), Some(hi)) if lo < hi => lo..hi,
            (Some(v), Some(_)) => v.saturating_sub(1)..v.saturating_add(1),
            _ => 0..1,
        }
    }

    fn y_range(&self) -> Range<f64> {
        let finite = || self.points().map(|p| p.1).filter(|y| y.is_finite());
        let y_min = finite().fold(f64::INFINITY, f64::min);
        let y_max = finite().fold(f64::NEG_INFINITY, f64::max);

        if !y_min.is_finite() || !y_max.is_finite() {
            return 0.0..1.0;
        }

        let y_diff = y_max - y_min;
        let y_padding = if y_diff > 0.0 {
            y_diff * 0.05
        } else {
            (y_max.abs() * 0.05).max(0.5)
        };

        y_min - y_padding..y_max + y_padding
    }
}

/// Draws `chart` to `path`, replacing whatever is there, and returns the
/// path written. A path without an extension gets `.png`. Nothing is left
/// at the target or beside it if drawing fails.
pub fn persist(chart: &Chart, path: &Path) -> Result<PathBuf, PlotError> {
    let path = &output_path(path);
    let output_err = |reason: String| PlotError::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };

    let staging = scopeguard::guard(staging_path(path), |staging| {
        let _ = fs::remove_file(staging);
    });

    draw(chart, &staging).map_err(|e| output_err(e.to_string()))?;
    fs::rename(&*staging, path).map_err(|e| output_err(e.to_string()))?;
    ScopeGuard::into_inner(staging);

    info!("wrote {}", path.display());
    Ok(path.to_path_buf())
}

fn output_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension("png"),
    }
}

/// `dir/name.png` -> `dir/.name.tmp.png`, keeping the extension so the
/// encoder can still pick the image format.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_stem().unwrap_or_default());
    name.push(".tmp");
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

fn draw(chart: &Chart, path: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, chart.size).into_drawing_area();

    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(10)
        .caption(&chart.title, (FONT, 24))
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(chart.x_range(), chart.y_range())?;

    ctx.configure_mesh()
        .x_label_formatter(&|v| format!("{}", v))
        .y_label_formatter(&|v| format!("{:.1}", v))
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    for (i, series) in chart.series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        ctx.draw_series(LineSeries::new(
            series.points.iter().copied(),
            color.stroke_width(2),
        ))?
        .label(series.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !chart.series.is_empty() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font((FONT, 13))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
