//! Data types used by the AQI pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The seven pollutants the service scores.
///
/// Declaration order is the reporting order used by every per-pollutant map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "NH3")]
    Nh3,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "O3", alias = "OZONE")]
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm10,
        Pollutant::Pm25,
        Pollutant::No2,
        Pollutant::Nh3,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// The identifier used in the measurement data and in JSON output.
    pub fn id(self) -> &'static str {
        match self {
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::No2 => "NO2",
            Pollutant::Nh3 => "NH3",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a pollutant identifier is not one of the seven known ids.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pollutant id '{0}'")]
pub struct UnknownPollutant(pub String);

impl FromStr for Pollutant {
    type Err = UnknownPollutant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PM10" => Ok(Pollutant::Pm10),
            "PM2.5" => Ok(Pollutant::Pm25),
            "NO2" => Ok(Pollutant::No2),
            "NH3" => Ok(Pollutant::Nh3),
            "SO2" => Ok(Pollutant::So2),
            "CO" => Ok(Pollutant::Co),
            // Some exports spell ozone out.
            "O3" | "OZONE" => Ok(Pollutant::O3),
            other => Err(UnknownPollutant(other.to_string())),
        }
    }
}

/// Result of comparing a pollutant's peak reading against its safety threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Exceedance {
    Exceeded,
    Safe,
}

/// Pollutant → sub-index for one city. Pollutants without a defined sub-index are absent.
pub type CityAqi = BTreeMap<Pollutant, f64>;

/// Pollutant → exceedance classification for one city; always holds all seven pollutants.
pub type PollutionCheck = BTreeMap<Pollutant, Exceedance>;

/// Per-pollutant sub-indices and composite AQI of one city within a state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityComposite {
    pub city: String,
    pub sub_indices: CityAqi,
    /// `None` when the city has no defined sub-index for any pollutant.
    pub composite: Option<f64>,
}

/// Composite AQI of a single city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeAqi {
    #[serde(rename = "Composite_AQI")]
    pub composite: Option<f64>,
}

/// State-level AQI: mean composite over the cities that have one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAqi {
    #[serde(rename = "State_AQI")]
    pub state_aqi: Option<f64>,
}

/// A city's per-pollutant AQI together with its state's AQI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAndStateAqi {
    #[serde(rename = "City_AQI")]
    pub city_aqi: CityAqi,
    #[serde(rename = "State_AQI")]
    pub state_aqi: Option<f64>,
}

/// Per-city breakdown used by the chart and the state report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBreakdown {
    pub state: String,
    pub state_aqi: Option<f64>,
    pub cities: Vec<CityComposite>,
}

/// Every state's breakdown, written out by the `report` command.
#[derive(Debug, Serialize)]
pub struct AqiReport {
    pub generated_at: DateTime<Utc>,
    pub states: Vec<StateBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pollutant_ids() {
        assert_eq!("PM2.5".parse::<Pollutant>(), Ok(Pollutant::Pm25));
        assert_eq!("OZONE".parse::<Pollutant>(), Ok(Pollutant::O3));

        let err = "CO2".parse::<Pollutant>().unwrap_err();
        assert_eq!(err, UnknownPollutant("CO2".to_string()));
        assert_eq!(err.to_string(), "unknown pollutant id 'CO2'");
    }
}
