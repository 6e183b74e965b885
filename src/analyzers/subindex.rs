use crate::error::{AqiError, Result};

/// A closed `(low, high)` interval, either of concentrations or of AQI values.
pub type Interval = (f64, f64);

/// Maps a concentration onto the AQI scale by linear interpolation.
///
/// The first breakpoint interval with `low <= concentration <= high` is used,
/// so a value sitting on a boundary shared by two intervals scores in the
/// lower one. Returns `Ok(None)` when no interval contains the concentration
/// (negative, above the top breakpoint, inside a gap between intervals, or
/// not finite).
///
/// # Errors
///
/// Returns [`AqiError::Configuration`] if the two tables differ in length or
/// the matching interval has zero width.
pub fn sub_index(
    concentration: f64,
    breakpoints: &[Interval],
    aqi_ranges: &[Interval],
) -> Result<Option<f64>> {
    if breakpoints.len() != aqi_ranges.len() {
        return Err(AqiError::Configuration(format!(
            "{} breakpoint intervals but {} AQI ranges",
            breakpoints.len(),
            aqi_ranges.len()
        )));
    }

    if let Some((low, high)) = breakpoints
        .iter()
        .find(|(low, high)| *low <= concentration && concentration <= *high)
    {
        if low == high {
            return Err(AqiError::Configuration(format!(
                "zero-width breakpoint interval ({low}, {high})"
            )));
        }
    }

    Ok(interpolate(concentration, breakpoints, aqi_ranges))
}

/// Interpolation over tables already checked by [`crate::analyzers::breakpoints`].
pub(crate) fn interpolate(
    concentration: f64,
    breakpoints: &[Interval],
    aqi_ranges: &[Interval],
) -> Option<f64> {
    breakpoints
        .iter()
        .zip(aqi_ranges)
        .find(|((bp_low, bp_high), _)| *bp_low <= concentration && concentration <= *bp_high)
        .map(|((bp_low, bp_high), (aqi_low, aqi_high))| {
            (concentration - bp_low) / (bp_high - bp_low) * (aqi_high - aqi_low) + aqi_low
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PM25: [Interval; 7] = [
        (0.0, 12.0),
        (12.1, 35.4),
        (35.5, 55.4),
        (55.5, 150.4),
        (150.5, 250.4),
        (250.5, 350.4),
        (350.5, 500.4),
    ];

    const SCALE: [Interval; 7] = [
        (0.0, 50.0),
        (51.0, 100.0),
        (101.0, 150.0),
        (151.0, 200.0),
        (201.0, 300.0),
        (301.0, 400.0),
        (401.0, 500.0),
    ];

    #[test]
    fn test_lower_bound_of_second_interval() {
        assert_eq!(sub_index(12.1, &PM25, &SCALE).unwrap(), Some(51.0));
    }

    #[test]
    fn test_out_of_range_is_undefined() {
        assert_eq!(sub_index(-5.0, &PM25, &SCALE).unwrap(), None);
        assert_eq!(sub_index(600.0, &PM25, &SCALE).unwrap(), None);
        assert_eq!(sub_index(f64::NAN, &PM25, &SCALE).unwrap(), None);
    }

    #[test]
    fn test_gap_between_intervals_is_undefined() {
        assert_eq!(sub_index(12.05, &PM25, &SCALE).unwrap(), None);
    }

    #[test]
    fn test_boundaries_are_exact() {
        for ((low, high), (aqi_low, aqi_high)) in PM25.iter().zip(SCALE.iter()) {
            assert_eq!(sub_index(*low, &PM25, &SCALE).unwrap(), Some(*aqi_low));
            assert_eq!(sub_index(*high, &PM25, &SCALE).unwrap(), Some(*aqi_high));
        }
    }

    #[test]
    fn test_interior_values_stay_in_range_and_increase() {
        for ((low, high), (aqi_low, aqi_high)) in PM25.iter().zip(SCALE.iter()) {
            let mut previous = *aqi_low;
            for step in 1..10 {
                let c = low + (high - low) * step as f64 / 10.0;
                let value = sub_index(c, &PM25, &SCALE).unwrap().unwrap();
                assert!(value >= *aqi_low && value <= *aqi_high);
                assert!(value >= previous);
                previous = value;
            }
        }
    }

    #[test]
    fn test_midpoint_of_first_interval() {
        assert_eq!(sub_index(6.0, &PM25, &SCALE).unwrap(), Some(25.0));
    }

    #[test]
    fn test_shared_boundary_scores_in_lower_interval() {
        let touching = [(0.0, 10.0), (10.0, 20.0)];
        let scale = [(0.0, 50.0), (51.0, 100.0)];
        assert_eq!(sub_index(10.0, &touching, &scale).unwrap(), Some(50.0));
    }

    #[test]
    fn test_length_mismatch_is_configuration_error() {
        let err = sub_index(1.0, &PM25, &SCALE[..6]).unwrap_err();
        assert!(matches!(err, AqiError::Configuration(_)));
    }

    #[test]
    fn test_zero_width_interval_is_configuration_error() {
        let degenerate = [(5.0, 5.0)];
        let scale = [(0.0, 50.0)];
        let err = sub_index(5.0, &degenerate, &scale).unwrap_err();
        assert!(matches!(err, AqiError::Configuration(_)));
    }
}
