use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fanskid_lib::{
    dashboard::{Dashboard, View},
    fleet::FleetConfig,
    io::{readings as readings_io, text as text_io, DEFAULT_COLUMNS},
    plot::{figure_from_series, figure_from_spectrum, Figure, PlotBackend, Series as PlotSeries},
    signal::Series,
    spectrum::{compute_spectrum, SpectrumOptions, Window},
    synth::{synthesize, SeriesLength, SynthParams},
    LoadError,
};
use log::{info, warn};
use plotters::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

const MAX_PLOT_POINTS: usize = 4096;

#[derive(Parser)]
#[command(
    name = "fanskid",
    version,
    about = "Fanskid condition monitoring: spectra, synthetic data and fleet views"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum WindowArg {
    #[value(name = "rect")]
    Rectangular,
    #[value(name = "hann")]
    Hann,
}

impl From<WindowArg> for Window {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Rectangular => Window::Rectangular,
            WindowArg::Hann => Window::Hann,
        }
    }
}

/// Where samples come from: a sensor record file, a newline-delimited file, or stdin.
#[derive(Args)]
struct SourceArgs {
    /// Tab-delimited sensor record file (reading, bearing_block, driven_pulley)
    #[arg(long, conflicts_with = "values")]
    input: Option<PathBuf>,
    /// Newline-delimited samples; stdin is read when neither --input nor --values is given
    #[arg(long)]
    values: Option<PathBuf>,
    #[arg(long, default_value = "reading")]
    column: String,
    #[arg(long, default_value_t = 1000.0)]
    fs: f64,
}

#[derive(Args)]
struct SpectrumArgs {
    #[arg(long, value_enum, default_value = "rect")]
    window: WindowArg,
    #[arg(long, default_value_t = 1)]
    zero_padding: usize,
    #[arg(long)]
    max_frequency: Option<f64>,
    /// Scale samples by their peak absolute value before transforming
    #[arg(long)]
    normalize: bool,
}

impl SpectrumArgs {
    fn options(&self) -> SpectrumOptions {
        SpectrumOptions {
            window: self.window.into(),
            zero_padding: self.zero_padding,
            max_frequency: self.max_frequency,
            normalize: self.normalize,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// One-sided magnitude spectrum as JSON
    Spectrum {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        spectrum: SpectrumArgs,
    },
    /// Generate a sine-plus-noise test series, optionally calibrated to a real recording
    Synthesize {
        #[arg(long, conflicts_with = "minutes")]
        count: Option<usize>,
        #[arg(long)]
        minutes: Option<f64>,
        #[arg(long, default_value_t = 1000.0)]
        fs: f64,
        #[arg(long, default_value_t = 50.0)]
        frequency: f64,
        #[arg(long, default_value_t = 1.0)]
        amplitude: f64,
        #[arg(long, default_value_t = 0.2)]
        noise_fraction: f64,
        #[arg(long)]
        clip: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
        /// Sensor record file whose mean/std calibrate the synthetic series
        #[arg(long)]
        reference: Option<PathBuf>,
        #[arg(long, default_value = "reading")]
        reference_column: String,
        #[arg(long, default_value_t = 10_000_000)]
        max_samples: usize,
    },
    /// Fleet summary view
    Summary {
        #[arg(long)]
        config: PathBuf,
        /// Limit the view to these device ids (repeatable); all devices when omitted
        #[arg(long = "id")]
        ids: Vec<String>,
    },
    /// Detail view for one device of the fleet
    Device {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        id: String,
    },
    /// Render the time series (or its spectrum) to a PNG via plotters
    Plot {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        spectrum_args: SpectrumArgs,
        /// Plot the frequency domain instead of the time domain
        #[arg(long)]
        spectrum: bool,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Spectrum { source, spectrum } => cmd_spectrum(&source, &spectrum)?,
        Commands::Synthesize {
            count,
            minutes,
            fs,
            frequency,
            amplitude,
            noise_fraction,
            clip,
            seed,
            reference,
            reference_column,
            max_samples,
        } => {
            let length = match (count, minutes) {
                (_, Some(minutes)) => SeriesLength::Minutes(minutes),
                (Some(count), None) => SeriesLength::Count(count),
                (None, None) => SynthParams::default().length,
            };
            let params = SynthParams {
                reference: None,
                length,
                sampling_rate: fs,
                signal_frequency: frequency,
                amplitude,
                noise_fraction,
                clip,
                max_samples,
            };
            cmd_synthesize(params, seed, reference.as_deref(), &reference_column)?
        }
        Commands::Summary { config, ids } => {
            let devices = (!ids.is_empty()).then_some(ids);
            cmd_view(&config, View::Summary { devices })?
        }
        Commands::Device { config, id } => cmd_view(&config, View::Detail(id))?,
        Commands::Plot {
            source,
            spectrum_args,
            spectrum,
            out,
        } => cmd_plot(&source, &spectrum_args, spectrum, &out)?,
    }
    Ok(())
}

/// Missing or empty sources degrade to an empty series with a warning.
fn recover_missing(result: Result<Vec<f64>, LoadError>) -> Result<Vec<f64>> {
    match result {
        Ok(values) => Ok(values),
        Err(err) if err.is_missing_data() => {
            warn!("{}; continuing with no samples", err);
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

fn load_series(source: &SourceArgs) -> Result<Series> {
    if let Some(path) = source.input.as_deref() {
        let table = match readings_io::load_sensor_table(path, &DEFAULT_COLUMNS) {
            Ok(table) => table,
            Err(err) if err.is_missing_data() => {
                warn!("{}; continuing with an empty table", err);
                readings_io::SensorTable::empty(&DEFAULT_COLUMNS)
            }
            Err(err) => {
                return Err(err).with_context(|| format!("loading {}", path.display()));
            }
        };
        return table.series(&source.column, source.fs).ok_or_else(|| {
            anyhow!(
                "unknown column '{}' (expected one of {:?})",
                source.column,
                DEFAULT_COLUMNS
            )
        });
    }
    let values = match source.values.as_deref() {
        Some(path) => recover_missing(text_io::read_f64_series(path))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            recover_missing(text_io::parse_f64_series(&buf))?
        }
    };
    Ok(Series::from_values(source.fs, values))
}

fn cmd_spectrum(source: &SourceArgs, args: &SpectrumArgs) -> Result<()> {
    let series = load_series(source)?;
    let spectrum = compute_spectrum(&series.values, series.fs, &args.options())?;
    println!("{}", serde_json::to_string(&spectrum)?);
    Ok(())
}

fn cmd_synthesize(
    mut params: SynthParams,
    seed: Option<u64>,
    reference: Option<&Path>,
    reference_column: &str,
) -> Result<()> {
    if let Some(path) = reference {
        let (table, err) = readings_io::load_sensor_table_or_empty(path, &DEFAULT_COLUMNS);
        if let Some(err) = err {
            warn!("reference unavailable ({}); using default amplitude", err);
        }
        let column = table.column(reference_column).ok_or_else(|| {
            anyhow!(
                "unknown column '{}' (expected one of {:?})",
                reference_column,
                DEFAULT_COLUMNS
            )
        })?;
        params.reference = fanskid_lib::ReferenceStats::from_values(column);
        if let Some(stats) = params.reference {
            info!(
                "calibrating to reference mean {:.4}, std {:.4}",
                stats.mean, stats.std
            );
        }
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let series = synthesize(&params, &mut rng)?;
    println!("{}", serde_json::to_string(&series)?);
    Ok(())
}

fn cmd_view(config: &Path, view: View) -> Result<()> {
    let fleet = FleetConfig::load(config)?;
    let mut dashboard = Dashboard::new(fleet);
    let report = dashboard.render(&view)?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_plot(source: &SourceArgs, args: &SpectrumArgs, spectrum: bool, out: &Path) -> Result<()> {
    let series = load_series(source)?;
    let fig = if spectrum {
        let spectrum = compute_spectrum(&series.values, series.fs, &args.options())?;
        figure_from_spectrum(
            &format!("FFT of {}", source.column),
            &spectrum,
            MAX_PLOT_POINTS,
        )
    } else {
        figure_from_series(&source.column, &series, MAX_PLOT_POINTS, 0x1F77B4)
    };
    PngBackend::new(out).draw(&fig)?;
    info!("wrote {}", out.display());
    Ok(())
}

struct PngBackend {
    path: PathBuf,
    size: (u32, u32),
}

impl PngBackend {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            size: (800, 480),
        }
    }
}

impl PlotBackend for PngBackend {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) =
            fig.bounds().unwrap_or((0.0, 1.0, 0.0, 1.0));
        if x_max <= x_min {
            x_max = x_min + 1.0;
        }
        if y_max <= y_min {
            y_min -= 0.5;
            y_max += 0.5;
        }
        if !(x_min.is_finite() && x_max.is_finite()) {
            (x_min, x_max) = (0.0, 1.0);
        }
        if !(y_min.is_finite() && y_max.is_finite()) {
            (y_min, y_max) = (0.0, 1.0);
        }
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Plot".into()),
                ("sans-serif", 24),
            )
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        let mut mesh = chart.configure_mesh();
        if let Some(label) = fig.x.label.as_deref() {
            mesh.x_desc(label);
        }
        if let Some(label) = fig.y.label.as_deref() {
            mesh.y_desc(label);
        }
        mesh.draw()?;
        for series in &fig.series {
            match series {
                PlotSeries::Line(line) => {
                    let (r, g, b) = line.style.color.rgb();
                    chart.draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        RGBColor(r, g, b).stroke_width(line.style.width.round().max(1.0) as u32),
                    ))?;
                }
            }
        }
        root.present()?;
        Ok(())
    }
}
