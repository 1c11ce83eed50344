//! Subcommand implementations.
//!
//! Each command takes the array store explicitly so it can be exercised
//! against an in-memory store.

use std::fs;
use std::path::{Path, PathBuf};

use alcf_common::time::{cf_to_julian, parse_iso, JULIAN_UNITS};
use alcf_common::{Array, Track};
use anyhow::{Context, Result};
use calibration::{read_time_periods, CalibrationRecord};
use ingestion::{LidarPipeline, LidarType, ModelPipeline, ModelType, PipelineConfig, PipelineSummary};
use netcdf_parser::ArrayStore;
use tracing::info;

/// Where the observation track comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSource {
    /// A fixed site observed between two calendar times
    Point {
        lon: f64,
        lat: f64,
        start: String,
        end: String,
    },
    /// A file with `time`, `lon` and `lat` variables
    File(PathBuf),
}

/// `alcf lidar <type> <input> <output>`
pub fn lidar(
    store: &dyn ArrayStore,
    config: &PipelineConfig,
    lidar_type: &str,
    input: &Path,
    output: &Path,
) -> Result<PipelineSummary> {
    let lidar: LidarType = lidar_type.parse()?;
    create_dir(output)?;
    let summary = LidarPipeline::new(store, lidar, config).run(input, output)?;
    Ok(summary)
}

/// `alcf model <type> <input> <output> (--point ... | --track FILE)`
pub fn model(
    store: &dyn ArrayStore,
    model_type: &str,
    input: &Path,
    output: &Path,
    source: &TrackSource,
) -> Result<Option<PathBuf>> {
    let model: ModelType = model_type.parse()?;
    let track = load_track(store, source)?;
    info!(
        model = %model,
        start = track.start(),
        end = track.end(),
        points = track.points().len(),
        "Loaded track"
    );

    if let Some(parent) = output.parent() {
        create_dir(parent)?;
    }
    Ok(ModelPipeline::new(store, model).run(input, &track, output)?)
}

/// `alcf calibrate <type> <time_periods> <input> <output>`
pub fn calibrate(
    store: &dyn ArrayStore,
    lidar_type: &str,
    time_periods: &Path,
    input: &Path,
    output: &Path,
) -> Result<CalibrationRecord> {
    let lidar: LidarType = lidar_type.parse()?;
    let periods = read_time_periods(time_periods)?;
    let record = calibration::calibrate(store, lidar, &periods, input)?;
    if let Some(parent) = output.parent() {
        create_dir(parent)?;
    }
    record.write_record(output)?;
    println!("{}", record);
    Ok(record)
}

fn load_track(store: &dyn ArrayStore, source: &TrackSource) -> Result<Track> {
    match source {
        TrackSource::Point {
            lon,
            lat,
            start,
            end,
        } => {
            let start = parse_iso(start).with_context(|| format!("invalid --start '{}'", start))?;
            let end = parse_iso(end).with_context(|| format!("invalid --end '{}'", end))?;
            Ok(Track::stationary(*lon, *lat, start, end)?)
        }
        TrackSource::File(path) => {
            let mut ds = store.read(path, &["time", "lon", "lat"])?;
            let context = path.display().to_string();

            // Track files written by other tools may carry CF time units
            if let Some(units) = ds.attribute("time", "units").map(str::to_string) {
                if units != JULIAN_UNITS {
                    let time = ds.require("time", &context)?;
                    let julian = cf_to_julian(&time.data, &units)
                        .with_context(|| format!("{}: unsupported time units", context))?;
                    let dim = time.dims.first().cloned().unwrap_or_else(|| "time".to_string());
                    ds.insert("time", Array::from_vec(&dim, julian));
                }
            }
            Ok(Track::from_dataset(&ds, &context)?)
        }
    }
}

fn create_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcf_common::Dataset;
    use netcdf_parser::MemoryStore;
    use test_utils::{
        amps_store, assert_approx_eq, attributes, chm15k_store, lidar_ratio, require_test_file,
        seed, temp_test_dir_with_prefix, AmpsGrid, TIME_PERIODS,
    };

    const JD_2016: f64 = 2457388.5;

    #[test]
    fn test_lidar_command() {
        let scratch = temp_test_dir_with_prefix("alcf_");
        let input = Path::new("/data/chm15k");
        let output = scratch.path().join("lidar");
        let store = chm15k_store(input, 2, 3, 4);

        let summary =
            lidar(&store, &PipelineConfig::default(), "chm15k", input, &output).unwrap();
        assert_eq!(summary.processed.len(), 2);
        assert!(output.is_dir());
    }

    #[test]
    fn test_unknown_lidar_type() {
        let store = MemoryStore::new();
        let err = lidar(
            &store,
            &PipelineConfig::default(),
            "cl99",
            Path::new("/in"),
            Path::new(""),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cl99"));
    }

    #[test]
    fn test_model_command_point() {
        let scratch = temp_test_dir_with_prefix("alcf_");
        let input = Path::new("/data/amps");
        let store = amps_store(input, &AmpsGrid::default(), &[6.0]);
        let output = scratch.path().join("model").join("amps.nc");
        let source = TrackSource::Point {
            lon: 167.0,
            lat: -77.0,
            start: "2016-01-01".to_string(),
            end: "2016-01-02".to_string(),
        };

        let written = model(&store, "amps", input, &output, &source).unwrap();
        assert_eq!(written, Some(output.clone()));
        assert!(output.parent().unwrap().is_dir());
    }

    #[test]
    fn test_track_file_with_cf_units() {
        let store = MemoryStore::new();
        let mut track = Dataset::new();
        track.insert("time", Array::from_vec("time", vec![0.0, 12.0]));
        track.insert("lon", Array::from_vec("time", vec![166.0, 167.0]));
        track.insert("lat", Array::from_vec("time", vec![-78.0, -77.0]));
        track.attributes.insert(
            "time".to_string(),
            attributes(&[("units", "hours since 2016-01-01 00:00:00")]),
        );
        let paths = seed(&store, Path::new("/tracks"), [("ship.nc", track)]);

        let track = load_track(&store, &TrackSource::File(paths[0].clone())).unwrap();
        assert_approx_eq!(track.start(), JD_2016, 1e-9);
        assert_approx_eq!(track.end(), JD_2016 + 0.5, 1e-9);
    }

    #[test]
    fn test_track_file_in_julian_days() {
        let store = MemoryStore::new();
        let mut track = Dataset::new();
        track
            .insert_canonical("time", Array::from_vec("time", vec![JD_2016, JD_2016 + 1.0]))
            .unwrap();
        track
            .insert_canonical("lon", Array::from_vec("time", vec![0.0, 1.0]))
            .unwrap();
        track
            .insert_canonical("lat", Array::from_vec("time", vec![0.0, 1.0]))
            .unwrap();
        let paths = seed(&store, Path::new("/tracks"), [("ship.nc", track)]);

        let track = load_track(&store, &TrackSource::File(paths[0].clone())).unwrap();
        assert_eq!(track.start(), JD_2016);
        assert_eq!(track.end(), JD_2016 + 1.0);
    }

    #[test]
    fn test_invalid_point_time() {
        let store = MemoryStore::new();
        let source = TrackSource::Point {
            lon: 0.0,
            lat: 0.0,
            start: "yesterday".to_string(),
            end: "2016-01-02".to_string(),
        };
        let err = load_track(&store, &source).unwrap_err();
        assert!(err.to_string().contains("--start"));
    }

    #[test]
    fn test_calibrate_command() {
        let scratch = temp_test_dir_with_prefix("alcf_");
        let periods = scratch.path().join("time_periods.txt");
        fs::write(&periods, TIME_PERIODS).unwrap();
        let output = scratch.path().join("calibration.txt");

        let input = Path::new("/data/lidar");
        let store = MemoryStore::new();
        seed(
            &store,
            input,
            [("a.nc", lidar_ratio(&[JD_2016, JD_2016 + 0.1], &[18.2, 18.2]))],
        );

        let record = calibrate(&store, "chm15k", &periods, input, &output).unwrap();
        assert_approx_eq!(record.calibration_coeff, 0.2, 1e-12);
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "lidar: chm15k wavelength: 1064 calibration_coeff: 0.200000 lr_median: 18.200000\n"
        );
    }

    #[test]
    fn test_real_chm15k_sample() {
        let path = require_test_file!("chm15k_sample.nc");
        let store = netcdf_parser::NetcdfStore::new();
        let ds = LidarType::Chm15k
            .reader()
            .read(&store, &path, &["time", "backscatter", "zfull"])
            .unwrap();
        ds.validate().unwrap();
        assert!(!ds.is_empty());
    }
}
