//! Solar Position Calculation Module
//!
//! Provides the solar calculation context used to sample the sun's apparent
//! position over a time series.
//! Uses the NREL SPA (Solar Position Algorithm) for high-precision calculations.

use chrono::DateTime;
use chrono_tz::Tz;
use solar_positioning::{spa, time::DeltaT, types::RefractionCorrection};

use crate::error::CalcError;
use crate::geo::Location;

// ===================== TYPES =====================

/// Apparent sun angles at one timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunAngles {
    /// Apparent (refraction-corrected) zenith angle in degrees
    pub apparent_zenith_deg: f64,
    /// Sun azimuth in degrees clockwise from north
    pub azimuth_deg: f64,
}

// ===================== SOLAR CALCULATION CONTEXT =====================

/// Context for solar position calculations.
///
/// Encapsulates observer location, altitude, ΔT and atmospheric correction so
/// every timestamp of a series is evaluated consistently.
#[derive(Clone, Copy)]
pub struct SolarCalc {
    /// Observer latitude in degrees
    pub lat: f64,
    /// Observer longitude in degrees
    pub lon: f64,
    /// Observer altitude in meters
    pub alt: f64,
    /// Delta-T correction for TT-UT1 difference
    pub delta_t: f64,
    /// Atmospheric refraction correction
    pub refr: Option<RefractionCorrection>,
}

impl SolarCalc {
    /// Build a context for `location`, estimating ΔT at the middle of `year`.
    pub fn for_year(location: &Location, year: i32) -> Result<Self, CalcError> {
        let delta_t = DeltaT::estimate_from_date(year, 7)
            .map_err(|e| CalcError::DataUnavailable(format!("delta T for {}: {}", year, e)))?;

        Ok(Self {
            lat: location.latitude,
            lon: location.longitude,
            alt: location.altitude_m,
            delta_t,
            refr: Some(RefractionCorrection::standard()),
        })
    }

    /// Get the solar position at a given time.
    pub fn position(&self, t: DateTime<Tz>) -> Result<solar_positioning::SolarPosition, CalcError> {
        spa::solar_position(t, self.lat, self.lon, self.alt, self.delta_t, self.refr)
            .map_err(|e| CalcError::DataUnavailable(format!("solar position at {}: {}", t, e)))
    }

    /// Apparent zenith and azimuth at a given time.
    pub fn sun_angles(&self, t: DateTime<Tz>) -> Result<SunAngles, CalcError> {
        let pos = self.position(t)?;
        Ok(SunAngles { apparent_zenith_deg: 90.0 - pos.elevation_angle(), azimuth_deg: pos.azimuth() })
    }
}

// ===================== TESTS =====================
