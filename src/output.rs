//! Output formatting and export for query results.
//!
//! Supports pretty-printing, JSON files, and a flat per-city CSV.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{Pollutant, StateBreakdown};
use csv::WriterBuilder;
use std::fs::File;

/// Prints a query result to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON to `path`, replacing any existing file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path, "Wrote JSON");
    Ok(())
}

/// One row of the per-city CSV export.
#[derive(Debug, Serialize)]
struct CityRow<'a> {
    state: &'a str,
    city: &'a str,
    composite_aqi: Option<f64>,
    state_aqi: Option<f64>,
    #[serde(rename = "PM10")]
    pm10: Option<f64>,
    #[serde(rename = "PM2.5")]
    pm25: Option<f64>,
    #[serde(rename = "NO2")]
    no2: Option<f64>,
    #[serde(rename = "NH3")]
    nh3: Option<f64>,
    #[serde(rename = "SO2")]
    so2: Option<f64>,
    #[serde(rename = "CO")]
    co: Option<f64>,
    #[serde(rename = "O3")]
    o3: Option<f64>,
}

/// Writes one CSV row per city: composite, state AQI and every sub-index.
///
/// Undefined values are left as empty cells.
pub fn write_city_csv(path: &str, states: &[StateBreakdown]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    let mut rows = 0usize;

    for state in states {
        for city in &state.cities {
            let sub = |p: Pollutant| city.sub_indices.get(&p).copied();
            writer.serialize(CityRow {
                state: &state.state,
                city: &city.city,
                composite_aqi: city.composite,
                state_aqi: state.state_aqi,
                pm10: sub(Pollutant::Pm10),
                pm25: sub(Pollutant::Pm25),
                no2: sub(Pollutant::No2),
                nh3: sub(Pollutant::Nh3),
                so2: sub(Pollutant::So2),
                co: sub(Pollutant::Co),
                o3: sub(Pollutant::O3),
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    debug!(path, rows, "Wrote city CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{CityAqi, CityComposite};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn breakdown() -> StateBreakdown {
        let mut sub_indices = CityAqi::new();
        sub_indices.insert(Pollutant::Pm25, 80.0);
        sub_indices.insert(Pollutant::No2, 120.0);
        StateBreakdown {
            state: "Delhi".to_string(),
            state_aqi: Some(120.0),
            cities: vec![
                CityComposite {
                    city: "Delhi".to_string(),
                    sub_indices,
                    composite: Some(120.0),
                },
                CityComposite {
                    city: "Nowhere".to_string(),
                    sub_indices: CityAqi::new(),
                    composite: None,
                },
            ],
        }
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&breakdown()).unwrap();
    }

    #[test]
    fn test_write_json_roundtrips_fields() {
        let path = temp_path("aqi_rater_test_report.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &breakdown()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["state_aqi"], 120.0);
        assert_eq!(value["cities"][0]["sub_indices"]["PM2.5"], 80.0);
        assert!(value["cities"][1]["composite"].is_null());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_city_csv_one_row_per_city() {
        let path = temp_path("aqi_rater_test_cities.csv");
        let _ = fs::remove_file(&path);

        write_city_csv(&path, &[breakdown()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 2 cities
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "state,city,composite_aqi,state_aqi,PM10,PM2.5,NO2,NH3,SO2,CO,O3"
        );
        assert_eq!(lines[1], "Delhi,Delhi,120.0,120.0,,80.0,120.0,,,,");
        assert_eq!(lines[2], "Delhi,Nowhere,,120.0,,,,,,,");

        fs::remove_file(&path).unwrap();
    }
}
