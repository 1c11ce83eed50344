//! End-to-end calibration tests on synthetic lidar-ratio files.

use std::path::Path;

use alcf_common::{AlcfError, TimePeriod};
use calibration::{calibrate, parse_time_periods, read_time_periods};
use ingestion::LidarType;
use netcdf_parser::MemoryStore;
use test_utils::{
    assert_approx_eq, lidar_ratio, seed, temp_test_dir_with_prefix, TIME_PERIODS,
};

/// Julian day of 2016-01-01T00:00:00Z.
const JD_2016: f64 = 2457388.5;
const HOUR: f64 = 1.0 / 24.0;

fn two_file_store(dir: &Path) -> MemoryStore {
    let store = MemoryStore::new();
    seed(
        &store,
        dir,
        [
            (
                "a.nc",
                lidar_ratio(&[JD_2016, JD_2016 + HOUR, JD_2016 + 2.0 * HOUR], &[10.0, 20.0, 30.0]),
            ),
            (
                "b.nc",
                lidar_ratio(&[JD_2016 + 3.0 * HOUR, JD_2016 + 4.0 * HOUR], &[25.0, 35.0]),
            ),
        ],
    );
    store
}

fn whole_day() -> Vec<TimePeriod> {
    vec![TimePeriod::new(JD_2016, JD_2016 + 1.0)]
}

#[test]
fn test_concrete_scenario() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);

    let record = calibrate(&store, LidarType::Chm15k, &whole_day(), dir).unwrap();
    assert_eq!(record.lr_median, 25.0);
    assert_eq!(record.samples, 5);
    assert_eq!(record.wavelength, 1064);
    assert_approx_eq!(record.calibration_coeff, 0.274725, 1e-6);
}

#[test]
fn test_calibration_is_deterministic() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);

    let first = calibrate(&store, LidarType::Chm15k, &whole_day(), dir).unwrap();
    let second = calibrate(&store, LidarType::Chm15k, &whole_day(), dir).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_periods_select_samples() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);

    // [00:00, 01:00) and [03:00, 05:00) keep 10, 25 and 35
    let periods = vec![
        TimePeriod::new(JD_2016, JD_2016 + HOUR),
        TimePeriod::new(JD_2016 + 3.0 * HOUR, JD_2016 + 5.0 * HOUR),
    ];
    let record = calibrate(&store, LidarType::Chm15k, &periods, dir).unwrap();
    assert_eq!(record.samples, 3);
    assert_eq!(record.lr_median, 25.0);
}

#[test]
fn test_overlapping_periods_count_once() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);

    let periods = parse_time_periods(TIME_PERIODS).unwrap();
    let record = calibrate(&store, LidarType::Chm15k, &periods, dir).unwrap();
    assert_eq!(record.samples, 5);
}

#[test]
fn test_non_finite_samples_dropped() {
    let dir = Path::new("/data/lidar");
    let store = MemoryStore::new();
    seed(
        &store,
        dir,
        [(
            "a.nc",
            lidar_ratio(&[JD_2016, JD_2016 + HOUR, JD_2016 + 2.0 * HOUR], &[f64::NAN, 20.0, 30.0]),
        )],
    );

    let record = calibrate(&store, LidarType::Chm15k, &whole_day(), dir).unwrap();
    assert_eq!(record.samples, 2);
    assert_eq!(record.lr_median, 25.0);
}

#[test]
fn test_empty_overlap_is_insufficient_data() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);

    let periods = vec![TimePeriod::new(JD_2016 + 10.0, JD_2016 + 11.0)];
    let err = calibrate(&store, LidarType::Chm15k, &periods, dir).unwrap_err();
    assert!(err.is_insufficient_data());
    assert!(err.to_string().contains("2 files"));
}

#[test]
fn test_empty_directory_is_insufficient_data() {
    let store = MemoryStore::new();
    let err = calibrate(&store, LidarType::Chm15k, &whole_day(), Path::new("/empty")).unwrap_err();
    assert!(err.is_insufficient_data());
}

#[test]
fn test_instrument_without_reference_ratio() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);
    let err = calibrate(&store, LidarType::Cosp, &whole_day(), dir).unwrap_err();
    assert!(matches!(err, AlcfError::UnsupportedInstrument(_)));
}

#[test]
fn test_missing_lr_is_format_error() {
    let dir = Path::new("/data/lidar");
    let store = MemoryStore::new();
    let mut ds = lidar_ratio(&[JD_2016], &[20.0]);
    ds.variables.remove("lr");
    ds.meta.remove("lr");
    seed(&store, dir, [("a.nc", ds)]);

    let err = calibrate(&store, LidarType::Chm15k, &whole_day(), dir).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("lr"));
}

#[test]
fn test_read_periods_file() {
    let dir = temp_test_dir_with_prefix("alcf_");
    let path = dir.path().join("time_periods.txt");
    std::fs::write(&path, TIME_PERIODS).unwrap();

    let periods = read_time_periods(&path).unwrap();
    assert_eq!(periods.len(), 2);
    assert_approx_eq!(periods[0].start, JD_2016, 1e-9);
    assert_approx_eq!(periods[1].end, JD_2016 + 0.5, 1e-9);
}

#[test]
fn test_reversed_period_contributes_nothing() {
    let dir = Path::new("/data/lidar");
    let store = two_file_store(dir);
    let periods = parse_time_periods(
        "2016-01-01T04:30 2016-01-01T00:00\n2016-01-01T02:30 2016-01-01T04:30\n",
    )
    .unwrap();

    let record = calibrate(&store, LidarType::Chm15k, &periods, dir).unwrap();
    assert_eq!(record.samples, 2);
    assert_approx_eq!(record.lr_median, 30.0, 1e-12);
}
