//! ALCF command-line tool.
//!
//! Normalizes lidar files, extracts model columns along a track and
//! calibrates lidar backscatter.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use netcdf_parser::NetcdfStore;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::TrackSource;

#[derive(Parser, Debug)]
#[command(name = "alcf")]
#[command(about = "Automatic lidar and ceilometer framework")]
struct Cli {
    /// Configuration file path (YAML). Environment variables are used when absent.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides configuration)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert raw lidar files into the canonical format
    Lidar {
        /// Lidar type (chm15k, cosp)
        lidar_type: String,
        /// Input directory of raw files
        input: PathBuf,
        /// Output directory
        output: PathBuf,
    },

    /// Extract model columns along a track
    Model {
        /// Model type (amps)
        model_type: String,
        /// Input directory of model output files
        input: PathBuf,
        /// Output file
        output: PathBuf,
        #[command(flatten)]
        track: TrackArgs,
    },

    /// Calibrate lidar backscatter from stratocumulus time periods
    Calibrate {
        /// Lidar type (chm15k)
        lidar_type: String,
        /// Time periods file, one `<start> <end>` pair per line
        time_periods: PathBuf,
        /// Input directory of normalized files holding `lr`
        input: PathBuf,
        /// Output calibration file
        output: PathBuf,
        /// Also print the record as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct TrackArgs {
    /// Fixed site position
    #[arg(long, num_args = 2, value_names = ["LON", "LAT"], allow_negative_numbers = true,
          conflicts_with = "track", requires_all = ["start", "end"])]
    point: Option<Vec<f64>>,

    /// Start time of a fixed site (YYYY-MM-DD[THH:MM[:SS]])
    #[arg(long)]
    start: Option<String>,

    /// End time of a fixed site (YYYY-MM-DD[THH:MM[:SS]])
    #[arg(long)]
    end: Option<String>,

    /// Track file with time, lon and lat variables
    #[arg(long, required_unless_present = "point")]
    track: Option<PathBuf>,
}

impl TrackArgs {
    fn source(self) -> Result<TrackSource> {
        match (self.point, self.start, self.end, self.track) {
            (_, _, _, Some(path)) => Ok(TrackSource::File(path)),
            (Some(point), Some(start), Some(end), None) => match point.as_slice() {
                [lon, lat] => Ok(TrackSource::Point {
                    lon: *lon,
                    lat: *lat,
                    start,
                    end,
                }),
                _ => anyhow::bail!("--point takes exactly LON and LAT"),
            },
            _ => anyhow::bail!(
                "either --point LON LAT --start T --end T or --track FILE is required"
            ),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level.to_lowercase();
    }
    config.log_json |= cli.log_json;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    // Initialize tracing
    let level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!(lidar_variables = ?config.lidar_variables, "Loaded configuration");

    let store = NetcdfStore::new();
    match cli.command {
        Command::Lidar {
            lidar_type,
            input,
            output,
        } => {
            let summary = commands::lidar(&store, &config, &lidar_type, &input, &output)?;
            if !summary.is_success() {
                anyhow::bail!(
                    "{} of {} files failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.processed.len()
                );
            }
        }
        Command::Model {
            model_type,
            input,
            output,
            track,
        } => {
            commands::model(&store, &model_type, &input, &output, &track.source()?)?;
        }
        Command::Calibrate {
            lidar_type,
            time_periods,
            input,
            output,
            json,
        } => {
            let record = commands::calibrate(&store, &lidar_type, &time_periods, &input, &output)?;
            if json {
                println!("{}", record.to_json()?);
            }
        }
    }

    Ok(())
}
