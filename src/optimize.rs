//! Annual Angle Optimization
//!
//! Finds the panel orientation that maximizes the annual sum of clear-sky
//! plane-of-array irradiance. Exactly one angle is searched per run: azimuth
//! when the tilt is fixed by the caller, pitch otherwise. The two are never
//! searched jointly.

use crate::error::CalcError;
use crate::geo::Location;
use crate::model::{ClearSkySeries, IrradianceModel, SolarPositionSeries};
use crate::time;

// Candidate grids
const AZ_GRID_STEP: f64 = 10.0;
const AZ_CANDIDATES: usize = 36; // 0..=350, 360 equals 0
const PITCH_GRID_STEP: f64 = 5.0;
const PITCH_CANDIDATES: usize = 19; // 0..=90

/// Ground albedo used for the reflected component (grass/soil)
pub const ALBEDO: f64 = 0.2;

// ===================== TYPES =====================

/// Panel orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Tilt from horizontal (0 = flat, 90 = vertical)
    pub pitch_deg: f64,
    /// Facing direction clockwise from north (180 = south)
    pub azimuth_deg: f64,
}

impl Orientation {
    /// Both angles rounded to 2 decimal places.
    pub fn rounded(self) -> Self {
        Self { pitch_deg: round2(self.pitch_deg), azimuth_deg: round2(self.azimuth_deg) }
    }
}

/// Which angle a search run varies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAxis {
    /// Pitch held at the requested fixed tilt
    Azimuth,
    /// Azimuth held at the equator-facing seed
    Pitch,
}

#[derive(Debug, Clone, Copy)]
pub struct AngleOptimum {
    pub orientation: Orientation,
    pub axis: SearchAxis,
    /// Winning annual POA sum (Wh/m² for hourly samples)
    pub annual_poa: f64,
    pub evaluations: usize,
}

/// Round to 2 decimal places. `+ 0.0` normalizes -0.0 to 0.0.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0 + 0.0
}

// ===================== INITIAL GUESS =====================

/// Rule-of-thumb orientation: face the equator, tilt by latitude.
///
/// # Arguments
/// * `latitude` - Latitude in degrees
/// * `fixed_tilt` - Tilt requested by the caller, if any
pub fn initial_orientation(latitude: f64, fixed_tilt: Option<f64>) -> Orientation {
    let azimuth_deg = if latitude >= 0.0 { 180.0 } else { 0.0 };
    let pitch_deg = fixed_tilt.unwrap_or(latitude.abs());
    Orientation { pitch_deg, azimuth_deg }
}

// ===================== GRID SEARCH =====================

pub fn azimuth_candidates() -> impl Iterator<Item = f64> {
    (0..AZ_CANDIDATES).map(|i| i as f64 * AZ_GRID_STEP)
}

pub fn pitch_candidates() -> impl Iterator<Item = f64> {
    (0..PITCH_CANDIDATES).map(|i| i as f64 * PITCH_GRID_STEP)
}

/// Return the candidate with the strictly greatest score.
///
/// Candidates are visited in order; a later candidate that merely ties the
/// current best does not replace it. A non-finite score aborts the search.
pub fn grid_search<I, F>(candidates: I, mut score: F) -> Result<(f64, f64), CalcError>
where
    I: IntoIterator<Item = f64>,
    F: FnMut(f64) -> Result<f64, CalcError>,
{
    let mut best: Option<(f64, f64)> = None;

    for candidate in candidates {
        let value = score(candidate)?;
        if !value.is_finite() {
            return Err(CalcError::DataUnavailable(format!(
                "annual POA for candidate {}° is {}",
                candidate, value
            )));
        }
        tracing::trace!(candidate, annual_poa = value, "evaluated candidate");

        if best.is_none_or(|(_, best_value)| value > best_value) {
            best = Some((candidate, value));
        }
    }

    best.ok_or_else(|| CalcError::InternalInvariant("empty candidate grid".into()))
}

/// Sum of per-timestamp POA irradiance over the whole series.
pub fn annual_poa<M: IrradianceModel + ?Sized>(
    model: &M,
    orientation: Orientation,
    positions: &SolarPositionSeries,
    clearsky: &ClearSkySeries,
) -> Result<f64, CalcError> {
    let poa = model.poa_irradiance(
        orientation.pitch_deg,
        orientation.azimuth_deg,
        positions,
        clearsky,
        ALBEDO,
    )?;
    Ok(poa.iter().sum())
}

/// Search one axis over precomputed series, starting from `seed`.
///
/// Only the searched angle of `seed` is replaced; the result is not rounded.
pub fn optimize_series<M: IrradianceModel + ?Sized>(
    model: &M,
    seed: Orientation,
    axis: SearchAxis,
    positions: &SolarPositionSeries,
    clearsky: &ClearSkySeries,
) -> Result<AngleOptimum, CalcError> {
    let mut evaluations = 0;

    let mut calc_energy = |orientation: Orientation| -> Result<f64, CalcError> {
        evaluations += 1;
        annual_poa(model, orientation, positions, clearsky)
    };

    let (orientation, annual_poa) = match axis {
        SearchAxis::Azimuth => {
            let (best_az, best_poa) = grid_search(azimuth_candidates(), |az| {
                calc_energy(Orientation { azimuth_deg: az, ..seed })
            })?;
            (Orientation { azimuth_deg: best_az, ..seed }, best_poa)
        }
        SearchAxis::Pitch => {
            let (best_pitch, best_poa) = grid_search(pitch_candidates(), |pitch| {
                calc_energy(Orientation { pitch_deg: pitch, ..seed })
            })?;
            (Orientation { pitch_deg: best_pitch, ..seed }, best_poa)
        }
    };

    Ok(AngleOptimum { orientation, axis, annual_poa, evaluations })
}

/// Find the best orientation for `location` over the hours of `year`.
///
/// With a fixed tilt only azimuth is searched, otherwise only pitch with the
/// azimuth held equator-facing. Angles are returned unrounded.
///
/// # Errors
/// * `DataUnavailable` if the model cannot produce the year's series
pub fn optimize<M: IrradianceModel + ?Sized>(
    model: &M,
    location: &Location,
    fixed_tilt: Option<f64>,
    year: i32,
) -> Result<AngleOptimum, CalcError> {
    let times = time::year_hours(location.tz, year)?;
    let positions = model.solar_position(location, &times)?;
    let clearsky = model.clear_sky(location, &times, &positions)?;

    let seed = initial_orientation(location.latitude, fixed_tilt);
    let axis = if fixed_tilt.is_some() { SearchAxis::Azimuth } else { SearchAxis::Pitch };

    tracing::debug!(
        tz = location.tz.name(),
        samples = times.len(),
        ?axis,
        seed_pitch = seed.pitch_deg,
        seed_azimuth = seed.azimuth_deg,
        "searching orientation"
    );

    let optimum = optimize_series(model, seed, axis, &positions, &clearsky)?;

    tracing::debug!(
        pitch = optimum.orientation.pitch_deg,
        azimuth = optimum.orientation.azimuth_deg,
        annual_poa = optimum.annual_poa,
        evaluations = optimum.evaluations,
        "orientation found"
    );

    Ok(optimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irradiance::ClearSky;
    use crate::model::ClearSkyModel;
    use crate::solar::SunAngles;
    use crate::time::TimeSeries;
    use chrono_tz::Tz;

    /// Deterministic model: one sample per timestamp, POA is a caller-chosen
    /// function of the orientation.
    struct FakeModel<F: Fn(f64, f64) -> f64> {
        poa: F,
    }

    impl<F: Fn(f64, f64) -> f64> IrradianceModel for FakeModel<F> {
        fn solar_position(
            &self,
            _location: &Location,
            times: &TimeSeries,
        ) -> Result<SolarPositionSeries, CalcError> {
            Ok(vec![SunAngles { apparent_zenith_deg: 45.0, azimuth_deg: 180.0 }; times.len()])
        }

        fn clear_sky(
            &self,
            _location: &Location,
            times: &TimeSeries,
            _positions: &SolarPositionSeries,
        ) -> Result<ClearSkySeries, CalcError> {
            Ok(vec![ClearSky::default(); times.len()])
        }

        fn poa_irradiance(
            &self,
            pitch_deg: f64,
            azimuth_deg: f64,
            positions: &SolarPositionSeries,
            _clearsky: &ClearSkySeries,
            albedo: f64,
        ) -> Result<Vec<f64>, CalcError> {
            assert_eq!(albedo, ALBEDO);
            Ok(vec![(self.poa)(pitch_deg, azimuth_deg); positions.len()])
        }
    }

    struct BrokenModel;

    impl IrradianceModel for BrokenModel {
        fn solar_position(
            &self,
            _location: &Location,
            _times: &TimeSeries,
        ) -> Result<SolarPositionSeries, CalcError> {
            Err(CalcError::DataUnavailable("no ephemeris".into()))
        }

        fn clear_sky(
            &self,
            _location: &Location,
            _times: &TimeSeries,
            _positions: &SolarPositionSeries,
        ) -> Result<ClearSkySeries, CalcError> {
            unreachable!()
        }

        fn poa_irradiance(
            &self,
            _pitch_deg: f64,
            _azimuth_deg: f64,
            _positions: &SolarPositionSeries,
            _clearsky: &ClearSkySeries,
            _albedo: f64,
        ) -> Result<Vec<f64>, CalcError> {
            unreachable!()
        }
    }

    fn utc_location(latitude: f64) -> Location {
        Location::with_timezone(latitude, 0.0, 0.0, Tz::UTC)
    }

    #[test]
    fn test_initial_orientation_hemispheres() {
        assert_eq!(initial_orientation(45.0, None).azimuth_deg, 180.0);
        assert_eq!(initial_orientation(0.0, None).azimuth_deg, 180.0);
        assert_eq!(initial_orientation(-33.9, None).azimuth_deg, 0.0);
    }

    #[test]
    fn test_initial_orientation_pitch() {
        assert_eq!(initial_orientation(45.0, Some(10.0)).pitch_deg, 10.0);
        assert_eq!(initial_orientation(45.0, None).pitch_deg, 45.0);
        assert_eq!(initial_orientation(-33.9, None).pitch_deg, 33.9);
        // An explicit zero tilt is a real request, not "unset"
        assert_eq!(initial_orientation(45.0, Some(0.0)).pitch_deg, 0.0);
    }

    #[test]
    fn test_candidate_grids() {
        let az: Vec<f64> = azimuth_candidates().collect();
        assert_eq!(az.len(), 36);
        assert_eq!(az.first(), Some(&0.0));
        assert_eq!(az.last(), Some(&350.0));

        let pitch: Vec<f64> = pitch_candidates().collect();
        assert_eq!(pitch.len(), 19);
        assert_eq!(pitch.first(), Some(&0.0));
        assert_eq!(pitch.last(), Some(&90.0));
    }

    #[test]
    fn test_grid_search_first_tie_wins() {
        let (best, value) = grid_search([0.0, 10.0, 20.0, 30.0], |x| {
            Ok(if x == 10.0 || x == 20.0 { 5.0 } else { 1.0 })
        })
        .unwrap();

        assert_eq!(best, 10.0);
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_grid_search_all_equal_returns_first() {
        let (best, _) = grid_search(pitch_candidates(), |_| Ok(0.0)).unwrap();
        assert_eq!(best, 0.0);
    }

    #[test]
    fn test_grid_search_rejects_nan() {
        let result = grid_search([0.0, 5.0], |x| Ok(if x == 5.0 { f64::NAN } else { 1.0 }));
        assert!(matches!(result, Err(CalcError::DataUnavailable(_))));
    }

    #[test]
    fn test_grid_search_propagates_model_error() {
        let result = grid_search([0.0], |_| Err(CalcError::DataUnavailable("x".into())));
        assert_eq!(result, Err(CalcError::DataUnavailable("x".into())));
    }

    #[test]
    fn test_fixed_tilt_searches_azimuth_only() {
        // Peak at 120°, pitch must not matter to the winner
        let model = FakeModel { poa: |_pitch: f64, az: f64| 1000.0 - (az - 120.0).abs() };
        let optimum = optimize(&model, &utc_location(45.0), Some(10.0), 2025).unwrap();

        assert_eq!(optimum.axis, SearchAxis::Azimuth);
        assert_eq!(optimum.orientation.pitch_deg, 10.0);
        assert_eq!(optimum.orientation.azimuth_deg, 120.0);
        assert_eq!(optimum.evaluations, 36);
    }

    #[test]
    fn test_free_tilt_searches_pitch_only() {
        let model = FakeModel { poa: |pitch: f64, _az: f64| 1000.0 - (pitch - 37.0).abs() };
        let optimum = optimize(&model, &utc_location(45.0), None, 2025).unwrap();

        assert_eq!(optimum.axis, SearchAxis::Pitch);
        assert_eq!(optimum.orientation.azimuth_deg, 180.0);
        assert_eq!(optimum.orientation.pitch_deg, 35.0);
        assert_eq!(optimum.evaluations, 19);
    }

    #[test]
    fn test_southern_free_tilt_keeps_north_azimuth() {
        let model = FakeModel { poa: |pitch: f64, _az: f64| -(pitch - 30.0).powi(2) };
        let optimum = optimize(&model, &utc_location(-33.9), None, 2025).unwrap();

        assert_eq!(optimum.orientation.azimuth_deg, 0.0);
        assert_eq!(optimum.orientation.pitch_deg, 30.0);
    }

    #[test]
    fn test_tie_returns_smaller_angle() {
        // Symmetric around 180°: 170 and 190 tie, 170 comes first
        let model = FakeModel { poa: |_p: f64, az: f64| if az == 170.0 || az == 190.0 { 2.0 } else { 1.0 } };
        let optimum = optimize(&model, &utc_location(45.0), Some(20.0), 2025).unwrap();

        assert_eq!(optimum.orientation.azimuth_deg, 170.0);
    }

    #[test]
    fn test_annual_poa_sums_every_hour() {
        let model = FakeModel { poa: |_p: f64, _a: f64| 1.5 };
        let optimum = optimize(&model, &utc_location(10.0), None, 2024).unwrap();

        assert_eq!(optimum.annual_poa, 1.5 * 366.0 * 24.0);
    }

    #[test]
    fn test_fixed_tilt_passes_through_unrounded() {
        let model = FakeModel { poa: |_p: f64, _a: f64| 1.0 };
        let optimum = optimize(&model, &utc_location(45.0), Some(12.3456), 2025).unwrap();

        assert_eq!(optimum.orientation.pitch_deg, 12.3456);
        assert_eq!(optimum.orientation.rounded().pitch_deg, 12.35);
    }

    #[test]
    fn test_model_failure_propagates() {
        let result = optimize(&BrokenModel, &utc_location(45.0), None, 2025);
        assert_eq!(result.unwrap_err(), CalcError::DataUnavailable("no ephemeris".into()));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.899999), 33.9);
        assert_eq!(round2(-0.001), 0.0);
        assert!(round2(-0.001).is_sign_positive());
    }

    #[test]
    fn test_clear_sky_pitch_optimum_near_latitude() {
        use chrono_tz::America::Toronto;

        let loc = Location::with_timezone(45.0, -75.0, 0.0, Toronto);
        let optimum = optimize(&ClearSkyModel::default(), &loc, None, 2025).unwrap();

        assert_eq!(optimum.orientation.azimuth_deg, 180.0);
        assert!(
            (30.0..=50.0).contains(&optimum.orientation.pitch_deg),
            "Expected annual optimum tilt near latitude, got {:.1}°",
            optimum.orientation.pitch_deg
        );
    }

    #[test]
    fn test_clear_sky_azimuth_optimum_faces_equator() {
        use chrono_tz::America::Toronto;

        let loc = Location::with_timezone(45.0, -75.0, 0.0, Toronto);
        let optimum = optimize(&ClearSkyModel::default(), &loc, Some(10.0), 2025).unwrap();

        assert_eq!(optimum.orientation.pitch_deg, 10.0);
        assert!(
            (170.0..=190.0).contains(&optimum.orientation.azimuth_deg),
            "Expected south-facing azimuth, got {:.1}°",
            optimum.orientation.azimuth_deg
        );
    }
}
