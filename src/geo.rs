//! Geographic Location Module
//!
//! The request-scoped observer location: coordinates plus the timezone
//! resolved for them.

use chrono_tz::Tz;

use crate::error::CalcError;
use crate::time::TimezoneResolver;

/// Observer location. Built once per request and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
    /// Altitude above mean sea level in meters
    pub altitude_m: f64,
    /// Timezone resolved from the coordinates
    pub tz: Tz,
}

impl Location {
    /// Look up the timezone for the coordinates and build the location.
    ///
    /// # Errors
    /// `CalcError::LocationResolution` if `resolver` has no timezone for the coordinates
    pub fn resolve(
        latitude: f64,
        longitude: f64,
        altitude_m: f64,
        resolver: TimezoneResolver,
    ) -> Result<Self, CalcError> {
        let tz = resolver(longitude, latitude)
            .ok_or(CalcError::LocationResolution { latitude, longitude })?;
        Ok(Self::with_timezone(latitude, longitude, altitude_m, tz))
    }

    /// Build a location with a known timezone, skipping the lookup.
    pub fn with_timezone(latitude: f64, longitude: f64, altitude_m: f64, tz: Tz) -> Self {
        Self { latitude, longitude, altitude_m, tz }
    }
}
