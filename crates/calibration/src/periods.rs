//! Calibration time-periods files.
//!
//! One period per line, start and end separated by whitespace:
//!
//! ```text
//! 2016-01-01T00:00:00 2016-01-01T06:00:00
//! 2016-01-02 2016-01-02T12:00
//! ```
//!
//! Timestamps are `YYYY-MM-DD[THH:MM[:SS]]` in UTC. Blank lines are ignored.
//! Periods are half-open and may overlap. A period that ends before it starts
//! is kept and selects nothing.

use std::fs;
use std::path::Path;

use alcf_common::{AlcfError, AlcfResult, TimePeriod};
use tracing::{debug, warn};

/// Parse time periods from text.
pub fn parse_time_periods(text: &str) -> AlcfResult<Vec<TimePeriod>> {
    parse(text, "time periods")
}

/// Read time periods from a file.
///
/// Any malformed line fails the whole file.
pub fn read_time_periods(path: &Path) -> AlcfResult<Vec<TimePeriod>> {
    let text = fs::read_to_string(path)?;
    let periods = parse(&text, &path.display().to_string())?;
    debug!(path = %path.display(), periods = periods.len(), "Read time periods");
    Ok(periods)
}

fn parse(text: &str, context: &str) -> AlcfResult<Vec<TimePeriod>> {
    let mut periods = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bad_line = |message: String| {
            AlcfError::format(context, format!("line {}: {}", i + 1, message))
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [start, end] = fields.as_slice() else {
            return Err(bad_line(format!(
                "expected '<start> <end>', got {} fields",
                fields.len()
            )));
        };
        let period = TimePeriod::parse(start, end).map_err(|e| bad_line(e.to_string()))?;
        if period.end < period.start {
            warn!(
                source = context,
                line = i + 1,
                start = *start,
                end = *end,
                "Time period ends before it starts and selects nothing"
            );
        }
        periods.push(period);
    }
    Ok(periods)
}
