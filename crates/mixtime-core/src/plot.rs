//! Chart rendering for estimates and mixing-time histograms
//!
//! The output format follows the file extension: `.svg` writes an SVG
//! document, anything else a PNG bitmap. Bitmap output is drawn without a
//! system font, so only SVG charts carry their captions and axis labels.

use crate::density::estimator::MixingTimeResult;
use crate::error::PlotError;
use crate::signal::Signal;
use crate::stats::Histogram;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Pixel size of the impulse response / echo density figure
pub const ESTIMATE_SIZE: (u32, u32) = (1000, 600);

/// Pixel size of the histogram figure
pub const HISTOGRAM_SIZE: (u32, u32) = (1000, 600);

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Image format chosen from the output path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Png,
    Svg,
}

impl PlotFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => PlotFormat::Svg,
            _ => PlotFormat::Png,
        }
    }
}

/// Impulse response with the mixing time marked, above its echo density
///
/// The dashed marker sits at `mixing_time_ms`, so a pre-delay shifts it left
/// of the crossing sample. It is omitted when no mixing time was found or the
/// time falls outside the signal.
pub fn plot_estimate(
    path: &Path,
    signal: &Signal,
    result: &MixingTimeResult,
) -> Result<(), PlotError> {
    if signal.is_empty() {
        return Err(PlotError::Empty("signal has no samples"));
    }

    let drawn = match PlotFormat::from_path(path) {
        PlotFormat::Svg => {
            let root = SVGBackend::new(path, ESTIMATE_SIZE).into_drawing_area();
            draw_estimate(root, signal, result).map_err(|e| e.to_string())
        }
        PlotFormat::Png => {
            let root = BitMapBackend::new(path, ESTIMATE_SIZE).into_drawing_area();
            draw_estimate(root, signal, result).map_err(|e| e.to_string())
        }
    };
    drawn.map_err(|message| PlotError::Draw {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::info!(path = %path.display(), "Estimate plot saved");
    Ok(())
}

/// Bar chart of `histogram`, titled after the plotted column
pub fn plot_histogram(path: &Path, histogram: &Histogram, column: &str) -> Result<(), PlotError> {
    let drawn = match PlotFormat::from_path(path) {
        PlotFormat::Svg => {
            let root = SVGBackend::new(path, HISTOGRAM_SIZE).into_drawing_area();
            draw_histogram(root, histogram, column).map_err(|e| e.to_string())
        }
        PlotFormat::Png => {
            let root = BitMapBackend::new(path, HISTOGRAM_SIZE).into_drawing_area();
            draw_histogram(root, histogram, column).map_err(|e| e.to_string())
        }
    };
    drawn.map_err(|message| PlotError::Draw {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::info!(path = %path.display(), bins = histogram.bins(), "Histogram plot saved");
    Ok(())
}

fn draw_estimate<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    signal: &Signal,
    result: &MixingTimeResult,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    let duration = signal.duration_secs();
    let peak = signal
        .samples
        .iter()
        .fold(0.0f64, |m, &x| m.max((x as f64).abs()))
        .max(1e-6)
        * 1.05;

    let mut chart_ir = ChartBuilder::on(&panels[0])
        .caption("Impulse Response", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..duration, -peak..peak)?;

    chart_ir
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Amplitude")
        .draw()?;

    let ir_points = signal.time_axis().zip(signal.samples.iter().map(|&x| x as f64));
    chart_ir
        .draw_series(LineSeries::new(ir_points, &BLUE))?
        .label("Impulse Response")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    let marker = result.is_found().then(|| result.mixing_time_ms() / 1000.0);
    if let Some(t) = marker.filter(|t| (0.0..=duration).contains(t)) {
        chart_ir
            .draw_series(dashed_vertical(t, -peak, peak, RED))?
            .label(format!(
                "Mixing Time (t_abel): {:.2} ms",
                result.mixing_time_ms()
            ))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart_ir
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let density_max = result.curve.peak().max(1.0) * 1.1;
    let mut chart_density = ChartBuilder::on(&panels[1])
        .caption("Echo Density", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..duration, 0.0..density_max)?;

    chart_density
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Echo Density")
        .draw()?;

    let density_points = signal.time_axis().zip(result.curve.values().iter().copied());
    chart_density.draw_series(LineSeries::new(density_points, &GREEN))?;

    root.present()?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    histogram: &Histogram,
    column: &str,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let lo = histogram.edges[0];
    let hi = histogram.edges[histogram.bins()];
    let y_max = histogram.counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Histogram of {}", column), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Frequency")
        .draw()?;

    let bars = || {
        histogram
            .counts
            .iter()
            .zip(histogram.edges.windows(2))
            .map(|(&count, edge)| [(edge[0], 0.0), (edge[1], count as f64)])
    };
    chart.draw_series(bars().map(|corners| Rectangle::new(corners, SKY_BLUE.filled())))?;
    chart.draw_series(bars().map(|corners| Rectangle::new(corners, BLACK.stroke_width(1))))?;

    root.present()?;
    Ok(())
}

/// Vertical dashed line at `x` from `y0` to `y1`
fn dashed_vertical(
    x: f64,
    y0: f64,
    y1: f64,
    color: RGBColor,
) -> impl Iterator<Item = PathElement<(f64, f64)>> {
    const DASHES: usize = 20;
    let dash = (y1 - y0) / (2 * DASHES) as f64;
    (0..DASHES).map(move |i| {
        let start = y0 + dash * (2 * i) as f64;
        PathElement::new(vec![(x, start), (x, start + dash)], color)
    })
}
