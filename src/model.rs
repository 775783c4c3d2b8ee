//! Irradiance Model Boundary
//!
//! The search never computes physics itself; it asks an [`IrradianceModel`]
//! for solar positions, clear-sky components and plane-of-array irradiance.
//! [`ClearSkyModel`] is the production implementation.

use chrono::Datelike;

use crate::error::CalcError;
use crate::geo::Location;
use crate::irradiance::{self, ClearSky, DEFAULT_LINKE_TURBIDITY};
use crate::solar::{SolarCalc, SunAngles};
use crate::time::TimeSeries;

/// One `SunAngles` per timestamp of a `TimeSeries`
pub type SolarPositionSeries = Vec<SunAngles>;

/// One `ClearSky` triple per timestamp of a `TimeSeries`
pub type ClearSkySeries = Vec<ClearSky>;

/// Solar geometry and irradiance provider consumed by the angle search.
pub trait IrradianceModel {
    /// Apparent sun position for every timestamp.
    fn solar_position(
        &self,
        location: &Location,
        times: &TimeSeries,
    ) -> Result<SolarPositionSeries, CalcError>;

    /// Clear-sky components for every timestamp.
    fn clear_sky(
        &self,
        location: &Location,
        times: &TimeSeries,
        positions: &SolarPositionSeries,
    ) -> Result<ClearSkySeries, CalcError>;

    /// Plane-of-array irradiance for every timestamp, for one orientation.
    fn poa_irradiance(
        &self,
        pitch_deg: f64,
        azimuth_deg: f64,
        positions: &SolarPositionSeries,
        clearsky: &ClearSkySeries,
        albedo: f64,
    ) -> Result<Vec<f64>, CalcError>;
}

// ===================== CLEAR-SKY MODEL =====================

/// NREL SPA positions, Ineichen-Perez clear sky, isotropic transposition.
#[derive(Debug, Clone, Copy)]
pub struct ClearSkyModel {
    /// Linke turbidity factor (atmospheric clarity, 2-7 typical)
    pub linke_turbidity: f64,
}

impl Default for ClearSkyModel {
    fn default() -> Self {
        Self { linke_turbidity: DEFAULT_LINKE_TURBIDITY }
    }
}

impl ClearSkyModel {
    pub fn with_linke_turbidity(mut self, lt: f64) -> Self {
        self.linke_turbidity = lt;
        self
    }
}

impl IrradianceModel for ClearSkyModel {
    fn solar_position(
        &self,
        location: &Location,
        times: &TimeSeries,
    ) -> Result<SolarPositionSeries, CalcError> {
        let Some(first) = times.first() else {
            return Err(CalcError::DataUnavailable("empty time series".into()));
        };
        let calc = SolarCalc::for_year(location, first.year())?;

        times.iter().map(|t| calc.sun_angles(*t)).collect()
    }

    fn clear_sky(
        &self,
        location: &Location,
        times: &TimeSeries,
        positions: &SolarPositionSeries,
    ) -> Result<ClearSkySeries, CalcError> {
        if times.len() != positions.len() {
            return Err(CalcError::DataUnavailable(format!(
                "{} timestamps but {} solar positions",
                times.len(),
                positions.len()
            )));
        }

        Ok(times
            .iter()
            .zip(positions)
            .map(|(t, pos)| {
                irradiance::ineichen_perez_clearsky(
                    pos.apparent_zenith_deg,
                    location.altitude_m,
                    t.ordinal(),
                    self.linke_turbidity,
                )
            })
            .collect())
    }

    fn poa_irradiance(
        &self,
        pitch_deg: f64,
        azimuth_deg: f64,
        positions: &SolarPositionSeries,
        clearsky: &ClearSkySeries,
        albedo: f64,
    ) -> Result<Vec<f64>, CalcError> {
        if positions.len() != clearsky.len() {
            return Err(CalcError::DataUnavailable(format!(
                "{} solar positions but {} clear-sky samples",
                positions.len(),
                clearsky.len()
            )));
        }

        Ok(positions
            .iter()
            .zip(clearsky)
            .map(|(pos, sky)| {
                irradiance::plane_of_array_irradiance(
                    *sky,
                    pos.apparent_zenith_deg,
                    pos.azimuth_deg,
                    pitch_deg,
                    azimuth_deg,
                    albedo,
                )
            })
            .collect())
    }
}
