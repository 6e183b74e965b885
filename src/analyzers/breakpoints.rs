//! Breakpoint, AQI-scale and threshold tables.
//!
//! The defaults are the published constants. A JSON file can override any
//! section:
//! ```json
//! {
//!   "aqi_ranges": [[0, 50], [51, 100], [101, 150], [151, 200], [201, 300], [301, 400], [401, 500]],
//!   "breakpoints": { "PM2.5": [[0, 12], [12.1, 35.4], ...] },
//!   "thresholds": { "PM10": 50, "PM2.5": 25 }
//! }
//! ```
//! Tables are validated when built, so scoring never meets a misaligned
//! table or a zero-width interval.

use crate::analyzers::subindex::{Interval, interpolate};
use crate::analyzers::types::{Exceedance, Pollutant};
use crate::error::{AqiError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// The shared AQI scale every breakpoint table maps onto.
pub const AQI_RANGES: [Interval; 7] = [
    (0.0, 50.0),
    (51.0, 100.0),
    (101.0, 150.0),
    (151.0, 200.0),
    (201.0, 300.0),
    (301.0, 400.0),
    (401.0, 500.0),
];

static BREAKPOINTS: &[(Pollutant, [Interval; 7])] = &[
    (
        Pollutant::Pm25,
        [
            (0.0, 12.0),
            (12.1, 35.4),
            (35.5, 55.4),
            (55.5, 150.4),
            (150.5, 250.4),
            (250.5, 350.4),
            (350.5, 500.4),
        ],
    ),
    (
        Pollutant::Pm10,
        [
            (0.0, 54.0),
            (55.0, 154.0),
            (155.0, 254.0),
            (255.0, 354.0),
            (355.0, 424.0),
            (425.0, 504.0),
            (505.0, 604.0),
        ],
    ),
    (
        Pollutant::No2,
        [
            (0.0, 53.0),
            (54.0, 100.0),
            (101.0, 360.0),
            (361.0, 649.0),
            (650.0, 1249.0),
            (1250.0, 1649.0),
            (1650.0, 2049.0),
        ],
    ),
    (
        Pollutant::Co,
        [
            (0.0, 4.4),
            (4.5, 9.4),
            (9.5, 12.4),
            (12.5, 15.4),
            (15.5, 30.4),
            (30.5, 40.4),
            (40.5, 50.4),
        ],
    ),
    (
        Pollutant::So2,
        [
            (0.0, 35.0),
            (36.0, 75.0),
            (76.0, 185.0),
            (186.0, 304.0),
            (305.0, 604.0),
            (605.0, 804.0),
            (805.0, 1004.0),
        ],
    ),
    (
        Pollutant::O3,
        [
            (0.0, 54.0),
            (55.0, 70.0),
            (71.0, 85.0),
            (86.0, 105.0),
            (106.0, 200.0),
            (201.0, 300.0),
            (301.0, 400.0),
        ],
    ),
    (
        Pollutant::Nh3,
        [
            (0.0, 200.0),
            (201.0, 400.0),
            (401.0, 800.0),
            (801.0, 1200.0),
            (1201.0, 1800.0),
            (1801.0, 2400.0),
            (2401.0, 3000.0),
        ],
    ),
];

/// Safety thresholds for the exceed/safe check. Unrelated to AQI scoring.
static THRESHOLDS: &[(Pollutant, f64)] = &[
    (Pollutant::Pm10, 50.0),
    (Pollutant::Pm25, 25.0),
    (Pollutant::No2, 40.0),
    (Pollutant::Nh3, 35.0),
    (Pollutant::So2, 20.0),
    (Pollutant::Co, 10.0),
    (Pollutant::O3, 100.0),
];

/// On-disk shape of the override file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
struct ScoringFile {
    aqi_ranges: Option<Vec<Interval>>,
    #[serde(default)]
    breakpoints: HashMap<Pollutant, Vec<Interval>>,
    #[serde(default)]
    thresholds: HashMap<Pollutant, f64>,
}

/// Validated scoring tables: one breakpoint table per pollutant, the shared
/// AQI scale, and the threshold table.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    aqi_ranges: Vec<Interval>,
    breakpoints: HashMap<Pollutant, Vec<Interval>>,
    thresholds: HashMap<Pollutant, f64>,
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self {
            aqi_ranges: AQI_RANGES.to_vec(),
            breakpoints: BREAKPOINTS
                .iter()
                .map(|(pollutant, table)| (*pollutant, table.to_vec()))
                .collect(),
            thresholds: THRESHOLDS.iter().copied().collect(),
        }
    }
}

impl ScoringTables {
    /// Builds tables from explicit parts, failing fast on any inconsistency.
    pub fn new(
        aqi_ranges: Vec<Interval>,
        breakpoints: HashMap<Pollutant, Vec<Interval>>,
        thresholds: HashMap<Pollutant, f64>,
    ) -> Result<Self> {
        let tables = Self {
            aqi_ranges,
            breakpoints,
            thresholds,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Loads the JSON override file at `path` on top of the defaults.
    #[tracing::instrument]
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tables = Self::from_json(&content)?;
        info!(path, "Loaded scoring tables");
        Ok(tables)
    }

    /// Parses override JSON on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ScoringFile = serde_json::from_str(json)?;
        let mut tables = Self::default();

        if let Some(aqi_ranges) = file.aqi_ranges {
            tables.aqi_ranges = aqi_ranges;
        }
        for (pollutant, intervals) in file.breakpoints {
            debug!(%pollutant, intervals = intervals.len(), "Overriding breakpoints");
            tables.breakpoints.insert(pollutant, intervals);
        }
        tables.thresholds.extend(file.thresholds);

        tables.validate()?;
        Ok(tables)
    }

    pub fn breakpoints(&self, pollutant: Pollutant) -> &[Interval] {
        self.breakpoints
            .get(&pollutant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn threshold(&self, pollutant: Pollutant) -> Option<f64> {
        self.thresholds.get(&pollutant).copied()
    }

    /// Sub-index of `concentration` for `pollutant`, `None` when undefined.
    pub fn sub_index(&self, pollutant: Pollutant, concentration: f64) -> Option<f64> {
        interpolate(concentration, self.breakpoints(pollutant), &self.aqi_ranges)
    }

    /// Classifies a peak reading against the pollutant's threshold.
    ///
    /// Strictly greater than the threshold is `Exceeded`; equal is `Safe`.
    pub fn classify(&self, pollutant: Pollutant, peak: f64) -> Exceedance {
        match self.threshold(pollutant) {
            Some(threshold) if peak > threshold => Exceedance::Exceeded,
            _ => Exceedance::Safe,
        }
    }

    fn validate(&self) -> Result<()> {
        check_intervals("AQI scale", &self.aqi_ranges)?;

        for pollutant in Pollutant::ALL {
            let Some(intervals) = self.breakpoints.get(&pollutant) else {
                return Err(AqiError::Configuration(format!(
                    "no breakpoint table for {pollutant}"
                )));
            };
            if intervals.len() != self.aqi_ranges.len() {
                return Err(AqiError::Configuration(format!(
                    "{pollutant} has {} breakpoint intervals but the AQI scale has {}",
                    intervals.len(),
                    self.aqi_ranges.len()
                )));
            }
            check_intervals(pollutant.id(), intervals)?;

            match self.thresholds.get(&pollutant) {
                Some(t) if t.is_finite() => {}
                Some(t) => {
                    return Err(AqiError::Configuration(format!(
                        "{pollutant} threshold {t} is not finite"
                    )));
                }
                None => {
                    return Err(AqiError::Configuration(format!(
                        "no threshold for {pollutant}"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Intervals must be finite, strictly wider than zero, ascending, and may
/// touch but not overlap. Gaps are allowed.
fn check_intervals(name: &str, intervals: &[Interval]) -> Result<()> {
    if intervals.is_empty() {
        return Err(AqiError::Configuration(format!("{name} table is empty")));
    }

    for (i, (low, high)) in intervals.iter().enumerate() {
        if !low.is_finite() || !high.is_finite() {
            return Err(AqiError::Configuration(format!(
                "{name} interval {i} ({low}, {high}) is not finite"
            )));
        }
        if low >= high {
            return Err(AqiError::Configuration(format!(
                "{name} interval {i} ({low}, {high}) is empty or inverted"
            )));
        }
    }

    for (i, pair) in intervals.windows(2).enumerate() {
        let (_, prev_high) = pair[0];
        let (next_low, _) = pair[1];
        if next_low < prev_high {
            return Err(AqiError::Configuration(format!(
                "{name} intervals {i} and {} overlap",
                i + 1
            )));
        }
    }

    Ok(())
}
