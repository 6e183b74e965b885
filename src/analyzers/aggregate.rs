use crate::analyzers::breakpoints::ScoringTables;
use crate::analyzers::types::{
    CityAndStateAqi, CityAqi, CityComposite, CompositeAqi, Pollutant, PollutionCheck, StateAqi,
    StateBreakdown,
};
use crate::analyzers::utility::{max, mean};
use crate::error::{AqiError, Result, Scope};
use crate::table::{Measurement, MeasurementTable};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Answers AQI and threshold queries against a loaded measurement table.
///
/// Both the table and the scoring tables are immutable once built; the
/// aggregator only reads them, so one instance can serve any number of
/// concurrent requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Aggregator {
    table: Arc<MeasurementTable>,
    scoring: Arc<ScoringTables>,
}

impl Aggregator {
    pub fn new(table: Arc<MeasurementTable>, scoring: Arc<ScoringTables>) -> Self {
        Self { table, scoring }
    }

    pub fn table(&self) -> &MeasurementTable {
        &self.table
    }

    /// Exceeded/Safe for all seven pollutants of one city.
    ///
    /// The peak is the largest `pollutant_max` over the city's rows. A
    /// pollutant with no reading counts as a peak of 0 and is reported Safe.
    #[tracing::instrument(skip(self))]
    pub fn check_pollution(&self, state: &str, city: &str) -> Result<PollutionCheck> {
        let rows = self.city_rows(state, city)?;

        let result = Pollutant::ALL
            .into_iter()
            .map(|pollutant| {
                let peak = max(
                    rows.iter()
                        .filter(|r| r.pollutant == Some(pollutant))
                        .filter_map(|r| r.pollutant_max),
                )
                .unwrap_or(0.0);
                (pollutant, self.scoring.classify(pollutant, peak))
            })
            .collect();

        Ok(result)
    }

    /// Sub-index per pollutant for one city, from the mean `pollutant_avg`.
    ///
    /// Pollutants without readings or with an undefined sub-index are left out.
    #[tracing::instrument(skip(self))]
    pub fn city_aqi(&self, state: &str, city: &str) -> Result<CityAqi> {
        let rows = self.city_rows(state, city)?;
        Ok(self.sub_indices(&rows))
    }

    /// Composite AQI of one city: the largest of its sub-indices.
    #[tracing::instrument(skip(self))]
    pub fn composite_aqi(&self, state: &str, city: &str) -> Result<CompositeAqi> {
        let sub_indices = self.city_aqi(state, city)?;
        Ok(CompositeAqi {
            composite: composite(&sub_indices),
        })
    }

    /// Sub-indices and composite of every city in `state`, sorted by city name.
    ///
    /// Cities are grouped by their name as spelled in the data.
    #[tracing::instrument(skip(self))]
    pub fn city_composites(&self, state: &str) -> Result<Vec<CityComposite>> {
        let mut by_city: BTreeMap<&str, Vec<&Measurement>> = BTreeMap::new();
        for row in self.table.in_state(state) {
            by_city.entry(row.city.as_str()).or_default().push(row);
        }

        if by_city.is_empty() {
            debug!(state, "No rows for state");
            return Err(AqiError::NotFound(Scope::State));
        }

        let composites = by_city
            .into_iter()
            .map(|(city, rows)| {
                let sub_indices = self.sub_indices(&rows);
                CityComposite {
                    city: city.to_string(),
                    composite: composite(&sub_indices),
                    sub_indices,
                }
            })
            .collect();

        Ok(composites)
    }

    /// State AQI: the mean composite over cities that have one.
    #[tracing::instrument(skip(self))]
    pub fn state_aqi(&self, state: &str) -> Result<StateAqi> {
        let breakdown = self.state_breakdown(state)?;
        Ok(StateAqi {
            state_aqi: breakdown.state_aqi,
        })
    }

    /// Per-city composites of `state` together with the state AQI.
    pub fn state_breakdown(&self, state: &str) -> Result<StateBreakdown> {
        let cities = self.city_composites(state)?;
        let state_aqi = mean(cities.iter().filter_map(|c| c.composite));

        info!(
            state,
            cities = cities.len(),
            scored = cities.iter().filter(|c| c.composite.is_some()).count(),
            ?state_aqi,
            "State AQI computed"
        );

        Ok(StateBreakdown {
            state: state.to_string(),
            state_aqi,
            cities,
        })
    }

    /// A city's per-pollutant AQI alongside its state's AQI.
    ///
    /// Only a missing city is reported as not found; the state is then known to exist.
    #[tracing::instrument(skip(self))]
    pub fn city_and_state_aqi(&self, state: &str, city: &str) -> Result<CityAndStateAqi> {
        let city_aqi = self.city_aqi(state, city)?;
        let StateAqi { state_aqi } = self.state_aqi(state)?;
        Ok(CityAndStateAqi {
            city_aqi,
            state_aqi,
        })
    }

    /// Breakdown of every state in the table, in order of first appearance.
    pub fn all_states(&self) -> Result<Vec<StateBreakdown>> {
        self.table
            .states()
            .into_iter()
            .map(|state| self.state_breakdown(state))
            .collect()
    }

    fn city_rows<'a>(&'a self, state: &str, city: &str) -> Result<Vec<&'a Measurement>> {
        let rows = self.table.in_city(state, city);
        if rows.is_empty() {
            debug!(state, city, "No rows for city");
            return Err(AqiError::NotFound(Scope::City));
        }
        Ok(rows)
    }

    fn sub_indices(&self, rows: &[&Measurement]) -> CityAqi {
        let mut averages: BTreeMap<Pollutant, Vec<f64>> = BTreeMap::new();
        for row in rows {
            if let (Some(pollutant), Some(avg)) = (row.pollutant, row.pollutant_avg) {
                averages.entry(pollutant).or_default().push(avg);
            }
        }

        averages
            .into_iter()
            .filter_map(|(pollutant, values)| {
                let concentration = mean(values)?;
                let sub_index = self.scoring.sub_index(pollutant, concentration);
                if sub_index.is_none() {
                    debug!(%pollutant, concentration, "Concentration outside every breakpoint");
                }
                sub_index.map(|value| (pollutant, value))
            })
            .collect()
    }
}

/// Largest sub-index, `None` if there are none.
pub fn composite(sub_indices: &CityAqi) -> Option<f64> {
    max(sub_indices.values().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Exceedance;

    fn aggregator(records: Vec<Measurement>) -> Aggregator {
        Aggregator::new(
            Arc::new(MeasurementTable::new(records)),
            Arc::new(ScoringTables::default()),
        )
    }

    fn row(state: &str, city: &str, pollutant: &str, avg: f64, max: f64) -> Measurement {
        Measurement::new(state, city, pollutant, Some(avg), Some(max))
    }

    #[test]
    fn test_city_aqi_uses_mean_concentration() {
        // PM2.5 mean of 0 and 12 is 6 -> 25.
        let agg = aggregator(vec![
            row("Delhi", "Delhi", "PM2.5", 0.0, 10.0),
            row("Delhi", "Delhi", "PM2.5", 12.0, 10.0),
        ]);
        let aqi = agg.city_aqi("Delhi", "Delhi").unwrap();
        assert_eq!(aqi.get(&Pollutant::Pm25), Some(&25.0));
        assert_eq!(aqi.len(), 1);
    }

    #[test]
    fn test_undefined_sub_index_is_omitted() {
        let agg = aggregator(vec![
            row("Delhi", "Delhi", "PM2.5", 600.0, 700.0),
            row("Delhi", "Delhi", "NO2", 0.0, 0.0),
        ]);
        let aqi = agg.city_aqi("Delhi", "Delhi").unwrap();
        assert!(!aqi.contains_key(&Pollutant::Pm25));
        assert_eq!(aqi.get(&Pollutant::No2), Some(&0.0));
    }

    #[test]
    fn test_composite_is_max_not_sum() {
        // PM2.5 mean 6 -> 25, NO2 53 -> 50, SO2 36 -> 51.
        let agg = aggregator(vec![
            row("Goa", "Panaji", "PM2.5", 6.0, 6.0),
            row("Goa", "Panaji", "NO2", 53.0, 53.0),
            row("Goa", "Panaji", "SO2", 36.0, 36.0),
        ]);
        let composite = agg.composite_aqi("Goa", "Panaji").unwrap();
        assert_eq!(composite.composite, Some(51.0));
    }

    #[test]
    fn test_composite_of_120_and_80() {
        let sub_indices: CityAqi = [(Pollutant::Pm25, 80.0), (Pollutant::No2, 120.0)]
            .into_iter()
            .collect();
        assert_eq!(composite(&sub_indices), Some(120.0));
        assert_eq!(composite(&CityAqi::new()), None);
    }

    #[test]
    fn test_state_aqi_excludes_cities_without_sub_index() {
        let agg = aggregator(vec![
            // Composite 50.
            row("Kerala", "Kochi", "PM2.5", 12.0, 12.0),
            // Composite 100.
            row("Kerala", "Kollam", "PM10", 154.0, 154.0),
            // No defined sub-index at all.
            row("Kerala", "Thrissur", "PM2.5", 9000.0, 9000.0),
            row("Kerala", "Thrissur", "CO2", 1.0, 1.0),
        ]);

        let composites = agg.city_composites("Kerala").unwrap();
        assert_eq!(composites.len(), 3);
        let thrissur = composites.iter().find(|c| c.city == "Thrissur").unwrap();
        assert_eq!(thrissur.composite, None);

        let state = agg.state_aqi("Kerala").unwrap();
        assert_eq!(state.state_aqi, Some(75.0));
    }

    #[test]
    fn test_state_without_any_composite() {
        let agg = aggregator(vec![row("Kerala", "Kochi", "PM2.5", -1.0, 1.0)]);
        assert_eq!(agg.state_aqi("Kerala").unwrap().state_aqi, None);
    }

    #[test]
    fn test_city_composites_sorted_by_city() {
        let agg = aggregator(vec![
            row("Kerala", "Kollam", "PM10", 10.0, 10.0),
            row("Kerala", "Alappuzha", "PM10", 10.0, 10.0),
        ]);
        let cities: Vec<_> = agg
            .city_composites("Kerala")
            .unwrap()
            .into_iter()
            .map(|c| c.city)
            .collect();
        assert_eq!(cities, vec!["Alappuzha", "Kollam"]);
    }

    #[test]
    fn test_check_pollution_reports_all_pollutants() {
        let agg = aggregator(vec![
            row("Delhi", "Delhi", "PM2.5", 10.0, 20.0),
            row("Delhi", "Delhi", "PM2.5", 10.0, 30.0),
            row("Delhi", "Delhi", "CO", 1.0, 10.0),
        ]);
        let check = agg.check_pollution("Delhi", "delhi").unwrap();

        assert_eq!(check.len(), 7);
        assert_eq!(check[&Pollutant::Pm25], Exceedance::Exceeded);
        // Equal to the threshold is not an exceedance.
        assert_eq!(check[&Pollutant::Co], Exceedance::Safe);
        // No readings at all.
        assert_eq!(check[&Pollutant::O3], Exceedance::Safe);
    }

    #[test]
    fn test_check_pollution_missing_max_is_safe() {
        let agg = aggregator(vec![Measurement::new(
            "Delhi", "Delhi", "NO2", Some(500.0), None,
        )]);
        let check = agg.check_pollution("Delhi", "Delhi").unwrap();
        assert_eq!(check[&Pollutant::No2], Exceedance::Safe);
    }

    #[test]
    fn test_infinite_reading_is_not_skipped() {
        let agg = aggregator(vec![
            row("Delhi", "Delhi", "PM2.5", f64::INFINITY, f64::INFINITY),
            row("Delhi", "Delhi", "PM2.5", 6.0, 10.0),
        ]);
        // The mean concentration is infinite, so no sub-index.
        assert!(!agg.city_aqi("Delhi", "Delhi").unwrap().contains_key(&Pollutant::Pm25));
        let check = agg.check_pollution("Delhi", "Delhi").unwrap();
        assert_eq!(check[&Pollutant::Pm25], Exceedance::Exceeded);
    }

    #[test]
    fn test_threshold_and_aqi_are_independent() {
        // NO2 peak 45 exceeds the 40 threshold but its AQI stays in the first band.
        let agg = aggregator(vec![row("Delhi", "Delhi", "NO2", 45.0, 45.0)]);
        let check = agg.check_pollution("Delhi", "Delhi").unwrap();
        let aqi = agg.city_aqi("Delhi", "Delhi").unwrap();
        assert_eq!(check[&Pollutant::No2], Exceedance::Exceeded);
        assert!(aqi[&Pollutant::No2] < 50.0);
    }

    #[test]
    fn test_city_case_insensitive() {
        let agg = aggregator(vec![row("Delhi", "Delhi", "PM10", 54.0, 54.0)]);
        for city in ["Delhi", "DELHI", "delhi"] {
            assert_eq!(agg.city_aqi("Delhi", city).unwrap()[&Pollutant::Pm10], 50.0);
        }
    }

    #[test]
    fn test_not_found() {
        let agg = aggregator(vec![row("Delhi", "Delhi", "PM10", 54.0, 54.0)]);

        let err = agg.city_aqi("Delhi", "Mumbai").unwrap_err();
        assert!(matches!(err, AqiError::NotFound(Scope::City)));

        let err = agg.check_pollution("delhi", "Delhi").unwrap_err();
        assert!(matches!(err, AqiError::NotFound(Scope::City)));

        let err = agg.state_aqi("Maharashtra").unwrap_err();
        assert!(matches!(err, AqiError::NotFound(Scope::State)));

        let err = agg.city_and_state_aqi("Delhi", "Pune").unwrap_err();
        assert!(matches!(err, AqiError::NotFound(Scope::City)));
    }

    #[test]
    fn test_found_city_with_no_scoreable_data() {
        let agg = aggregator(vec![row("Delhi", "Delhi", "CO2", 1.0, 1.0)]);
        assert!(agg.city_aqi("Delhi", "Delhi").unwrap().is_empty());
        assert_eq!(agg.composite_aqi("Delhi", "Delhi").unwrap().composite, None);
    }

    #[test]
    fn test_city_and_state_aqi() {
        let agg = aggregator(vec![
            row("Kerala", "Kochi", "PM2.5", 12.0, 12.0),
            row("Kerala", "Kollam", "PM10", 154.0, 154.0),
        ]);
        let combined = agg.city_and_state_aqi("Kerala", "KOCHI").unwrap();
        assert_eq!(combined.city_aqi[&Pollutant::Pm25], 50.0);
        assert_eq!(combined.state_aqi, Some(75.0));
    }

    #[test]
    fn test_all_states() {
        let agg = aggregator(vec![
            row("Kerala", "Kochi", "PM2.5", 12.0, 12.0),
            row("Goa", "Panaji", "PM10", 54.0, 54.0),
        ]);
        let states = agg.all_states().unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].state, "Kerala");
        assert_eq!(states[1].state_aqi, Some(50.0));
    }
}
