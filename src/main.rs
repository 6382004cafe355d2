//! Mixtime - mixing-time estimation for room impulse responses
//!
//! Entry point for the command line tool.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mixtime::batch::boundary::{
    derive_boundary_column, DEFAULT_BOUNDARY_COLUMN, DEFAULT_BOUNDARY_SAMPLE_RATE,
};
use mixtime::batch::{read_numeric_column, run_batch};
use mixtime::export::{write_curve_csv, EstimateReport};
use mixtime::io::{load_wav, write_wav};
use mixtime::plot::{plot_estimate, plot_histogram};
use mixtime::stats::histogram::DEFAULT_BINS;
use mixtime::stats::{Histogram, Summary};
use mixtime::{EchoDensityEstimator, MixtimeConfig, NoiseGenerator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "mixtime",
    version,
    long_version = mixtime::LONG_VERSION,
    about = "Estimate the mixing time of room impulse responses from normalized echo density"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate the mixing time of a single WAV impulse response
    Estimate(EstimateArgs),
    /// Estimate every file listed in a CSV table and write the results back
    Batch(BatchArgs),
    /// Add a boundary sample column derived from a mixing time column
    Boundary(BoundaryArgs),
    /// Print a histogram and summary of a numeric CSV column
    Histogram(HistogramArgs),
    /// Write a synthetic impulse response for trying out the estimator
    Synth(SynthArgs),
}

#[derive(Debug, Args)]
struct AnalysisArgs {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Analysis window length in samples (even)
    #[arg(short = 'n', long)]
    window_length: Option<usize>,
    /// Pre-delay in samples subtracted from the detected mixing time
    #[arg(short, long)]
    pre_delay: Option<usize>,
}

impl AnalysisArgs {
    /// Config file (or defaults) with command line overrides applied
    fn resolve(&self) -> Result<MixtimeConfig> {
        let mut config = match &self.config {
            Some(path) => MixtimeConfig::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => MixtimeConfig::default(),
        };
        if let Some(n) = self.window_length {
            config.analysis.window_length = n;
        }
        if let Some(p) = self.pre_delay {
            config.analysis.pre_delay_samples = p;
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
struct EstimateArgs {
    /// Impulse response WAV file
    file: PathBuf,
    #[command(flatten)]
    analysis: AnalysisArgs,
    /// Export time, amplitude and echo density to this CSV file
    #[arg(long)]
    curve_csv: Option<PathBuf>,
    /// Draw the impulse response and echo density to this PNG or SVG file
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// CSV table with a column of WAV paths
    csv: PathBuf,
    #[command(flatten)]
    analysis: AnalysisArgs,
    /// Output CSV (default: update the input in place)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Worker threads
    #[arg(short, long)]
    workers: Option<usize>,
    /// Column holding the WAV paths
    #[arg(long)]
    path_column: Option<String>,
    /// Column receiving the mixing times
    #[arg(long)]
    output_column: Option<String>,
    /// Base directory for relative WAV paths
    #[arg(long)]
    audio_root: Option<PathBuf>,
    /// Write the per-row report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BoundaryArgs {
    /// CSV table with a mixing time column
    csv: PathBuf,
    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,
    /// Column holding mixing times in milliseconds
    #[arg(long, default_value = "t_abel")]
    source_column: String,
    /// Name of the boundary column to add
    #[arg(long, default_value = DEFAULT_BOUNDARY_COLUMN)]
    column: String,
    /// Sample rate of the boundary index in Hz
    #[arg(short = 'r', long, default_value_t = DEFAULT_BOUNDARY_SAMPLE_RATE)]
    sample_rate: f64,
}

#[derive(Debug, Args)]
struct HistogramArgs {
    /// CSV table
    csv: PathBuf,
    /// Numeric column to plot
    #[arg(long, default_value = "t_abel")]
    column: String,
    /// Number of bins
    #[arg(short, long, default_value_t = DEFAULT_BINS)]
    bins: usize,
    /// Longest bar in characters
    #[arg(long, default_value_t = 50)]
    width: usize,
    /// Draw the histogram to this PNG or SVG file
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Print histogram and summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SynthArgs {
    /// Output WAV file
    output: PathBuf,
    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value_t = 48000)]
    sample_rate: u32,
    /// Total duration in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f64,
    /// Silence before the direct sound in milliseconds
    #[arg(long, default_value_t = 5.0)]
    pre_delay_ms: f64,
    /// Reverberation time (60 dB decay) in seconds
    #[arg(long, default_value_t = 0.6)]
    rt60: f64,
    /// Noise seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Serialize)]
struct HistogramOutput<'a> {
    column: &'a str,
    summary: Option<Summary>,
    histogram: Option<Histogram>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mixtime=info".parse()?)
                .add_directive("mixtime_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Estimate(args) => run_estimate(args),
        Command::Batch(args) => run_batch_command(args),
        Command::Boundary(args) => run_boundary(args),
        Command::Histogram(args) => run_histogram(args),
        Command::Synth(args) => run_synth(args),
    }
}

fn run_estimate(args: EstimateArgs) -> Result<()> {
    let config = args.analysis.resolve()?;
    let estimator = EchoDensityEstimator::new(config.analysis.estimator_config())
        .context("Invalid analysis configuration")?;

    let signal = load_wav(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    info!(
        file = %args.file.display(),
        sample_rate = signal.sample_rate,
        duration_secs = signal.duration_secs(),
        "Loaded impulse response"
    );

    let result = estimator
        .estimate(
            &signal.samples,
            signal.sample_rate,
            config.analysis.pre_delay_samples,
        )
        .with_context(|| format!("Failed to estimate mixing time of {}", args.file.display()))?;

    if !result.is_found() {
        warn!(file = %args.file.display(), "{}", result.diagnostic());
    }

    if let Some(path) = &args.curve_csv {
        write_curve_csv(path, &signal, &result)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if let Some(path) = &args.plot {
        plot_estimate(path, &signal, &result)?;
    }

    let report = EstimateReport::new(
        Some(args.file.as_path()),
        config.analysis.window_length,
        &result,
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &EstimateReport) {
    if let Some(file) = &report.file {
        println!("File:          {}", file);
    }
    println!(
        "Samples:       {} @ {} Hz ({:.3} s)",
        report.samples,
        report.sample_rate,
        report.samples as f64 / report.sample_rate
    );
    println!("Window:        {} samples", report.window_length);
    println!("Pre-delay:     {} samples", report.pre_delay_samples);
    println!("Peak density:  {:.3}", report.peak_density);
    match report.crossing_index {
        Some(index) => println!(
            "Mixing time:   {:.2} ms (sample {})",
            report.mixing_time_ms, index
        ),
        None => println!("Mixing time:   {} ({})", report.mixing_time_ms, report.diagnostic),
    }
}

fn run_batch_command(args: BatchArgs) -> Result<()> {
    let mut config = args.analysis.resolve()?;
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
    if let Some(column) = args.path_column {
        config.batch.path_column = column;
    }
    if let Some(column) = args.output_column {
        config.batch.output_column = column;
    }
    if let Some(root) = args.audio_root {
        config.batch.audio_root = Some(root);
    }

    let output = args.output.unwrap_or_else(|| args.csv.clone());
    let report = run_batch(&args.csv, &output, &config.analysis, &config.batch)
        .with_context(|| format!("Batch over {} failed", args.csv.display()))?;

    if let Some(path) = &args.report {
        write_json(path, &report)?;
    }

    println!("Updated CSV file saved to {}", output.display());
    println!(
        "Rows: {}  found: {}  not found: {}  failed: {}",
        report.total, report.succeeded, report.not_found, report.failed
    );
    Ok(())
}

fn run_boundary(args: BoundaryArgs) -> Result<()> {
    let converted = derive_boundary_column(
        &args.csv,
        &args.output,
        &args.source_column,
        &args.column,
        args.sample_rate,
    )
    .with_context(|| format!("Failed to derive boundary column from {}", args.csv.display()))?;

    println!(
        "New file saved to {} ({} rows converted)",
        args.output.display(),
        converted
    );
    Ok(())
}

fn run_histogram(args: HistogramArgs) -> Result<()> {
    let values = read_numeric_column(&args.csv, &args.column)
        .with_context(|| format!("Failed to read column {}", args.column))?;

    let output = HistogramOutput {
        column: &args.column,
        summary: Summary::from_values(&values),
        histogram: Histogram::new(&values, args.bins),
    };

    if let Some(path) = &args.plot {
        let histogram = output
            .histogram
            .as_ref()
            .with_context(|| format!("No numeric values in column {} to plot", args.column))?;
        plot_histogram(path, histogram, &args.column)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match (&output.summary, &output.histogram) {
        (Some(summary), Some(histogram)) => {
            println!("Histogram of {}", args.column);
            println!();
            print!("{}", histogram.render_text(args.width));
            println!();
            println!(
                "n = {}  min = {:.2}  max = {:.2}  mean = {:.2}  std = {:.2}",
                summary.count, summary.min, summary.max, summary.mean, summary.std_dev
            );
        }
        _ => println!("No numeric values in column {}", args.column),
    }
    Ok(())
}

fn run_synth(args: SynthArgs) -> Result<()> {
    let rate = args.sample_rate as f64;
    let len = (args.duration * rate).round() as usize;
    let pre_delay = (args.pre_delay_ms / 1000.0 * rate).round() as usize;

    let signal = NoiseGenerator::new(args.seed).decaying_rir(pre_delay, len, args.rt60, rate);
    write_wav(&args.output, &signal)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} samples ({} Hz, pre-delay {} samples, RT60 {} s) to {}",
        len,
        args.sample_rate,
        pre_delay,
        args.rt60,
        args.output.display()
    );
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
