//! The read-only measurement table.
//!
//! Loaded once from CSV, then only filtered. City filters compare
//! case-insensitively; state filters are exact and case-sensitive, matching
//! how the reference data spells state names.

use crate::analyzers::types::Pollutant;
use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info, warn};

/// One CSV row. Extra columns in the file are ignored.
#[derive(Debug, Deserialize)]
struct MeasurementRow {
    state: String,
    city: String,
    pollutant_id: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pollutant_avg: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pollutant_max: Option<f64>,
}

/// A single pollutant measurement at a station in a city.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub state: String,
    pub city: String,
    pub pollutant_id: String,
    /// `None` when `pollutant_id` is not one of the scored pollutants.
    pub pollutant: Option<Pollutant>,
    pub pollutant_avg: Option<f64>,
    pub pollutant_max: Option<f64>,
}

impl Measurement {
    pub fn new(
        state: &str,
        city: &str,
        pollutant_id: &str,
        pollutant_avg: Option<f64>,
        pollutant_max: Option<f64>,
    ) -> Self {
        Self {
            state: state.to_string(),
            city: city.to_string(),
            pollutant_id: pollutant_id.to_string(),
            pollutant: pollutant_id.parse().ok(),
            pollutant_avg,
            pollutant_max,
        }
    }
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        Self {
            pollutant: row.pollutant_id.parse().ok(),
            state: row.state,
            city: row.city,
            pollutant_id: row.pollutant_id,
            pollutant_avg: row.pollutant_avg,
            pollutant_max: row.pollutant_max,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    records: Vec<Measurement>,
}

impl MeasurementTable {
    pub fn new(records: Vec<Measurement>) -> Self {
        Self { records }
    }

    /// Reads a headed CSV stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a row is missing `state`, `city` or `pollutant_id`,
    /// or the stream is not valid CSV. Non-numeric concentrations load as missing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in rdr.deserialize() {
            let row: MeasurementRow = result?;
            records.push(Measurement::from(row));
        }

        let table = Self::new(records);
        table.log_summary();
        Ok(table)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(bytes)
    }

    fn log_summary(&self) {
        let mut unrecognised: HashMap<&str, usize> = HashMap::new();
        for record in self.records.iter().filter(|r| r.pollutant.is_none()) {
            *unrecognised.entry(record.pollutant_id.as_str()).or_default() += 1;
        }

        for (pollutant_id, rows) in &unrecognised {
            warn!(pollutant_id, rows, "Unrecognised pollutant id, rows will not be scored");
        }

        info!(
            rows = self.records.len(),
            states = self.states().len(),
            "Measurement table loaded"
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    /// Distinct states in order of first appearance.
    pub fn states(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.state.as_str()))
    }

    /// Distinct cities of `state` in order of first appearance. Empty for an unknown state.
    pub fn cities(&self, state: &str) -> Vec<&str> {
        distinct(self.in_state(state).map(|r| r.city.as_str()))
    }

    /// Rows whose state equals `state` exactly.
    pub fn in_state<'a>(&'a self, state: &str) -> impl Iterator<Item = &'a Measurement> {
        self.records.iter().filter(move |r| r.state == state)
    }

    /// Rows of `state` whose city matches `city` ignoring case.
    pub fn in_city<'a>(&'a self, state: &str, city: &str) -> Vec<&'a Measurement> {
        let city = city.to_lowercase();
        let rows: Vec<_> = self
            .in_state(state)
            .filter(|r| r.city.to_lowercase() == city)
            .collect();
        debug!(state, city = %city, rows = rows.len(), "Filtered city rows");
        rows
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
