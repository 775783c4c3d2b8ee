//! Command-Line Interface Module
//!
//! Handles argument parsing and request validation. Nothing out of range
//! gets past this module.

use std::io::Read;

use clap::Parser;
use serde::Deserialize;

use crate::error::CalcError;
use crate::irradiance::DEFAULT_LINKE_TURBIDITY;
use crate::strategy::AngleRequest;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Site latitude in decimal degrees (-90 to 90)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_latitude, env = "SOLAR_ANGLES_LATITUDE",
          required_unless_present = "request")]
    pub latitude: Option<f64>,
    /// Site longitude in decimal degrees (-180 to 180)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_longitude, env = "SOLAR_ANGLES_LONGITUDE",
          required_unless_present = "request")]
    pub longitude: Option<f64>,
    /// Fixed panel tilt in degrees (0 to 90); 0 or absent means "optimize the tilt"
    #[arg(long, value_parser = parse_offset_angle, env = "SOLAR_ANGLES_OFFSET_ANGLE")]
    pub offset_angle: Option<f64>,
    /// Treat --offset-angle as a fixed tilt even when it is 0 (flat panel)
    #[arg(long)]
    pub fix_tilt: bool,

    /// Read the request as JSON ({"latitude", "longitude", "offset_angle"})
    /// from a file, or "-" for stdin. Takes precedence over --latitude and
    /// --longitude from any source.
    #[arg(long)]
    pub request: Option<String>,

    /// Calendar year to simulate; defaults to the current year at the site
    #[arg(long, value_parser = parse_year, env = "SOLAR_ANGLES_YEAR")]
    pub year: Option<i32>,
    /// Site altitude above mean sea level (meters, may be negative)
    /// Valid range: -500m (Dead Sea) to 11000m (Troposphere limit for ISA formula)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_altitude, env = "SOLAR_ANGLES_ALTITUDE")]
    pub altitude: f64,
    /// Linke turbidity factor for clear-sky model (2-7 typical, 3 = clear)
    #[arg(long, default_value_t = DEFAULT_LINKE_TURBIDITY, value_parser = parse_turbidity, env = "SOLAR_ANGLES_LINKE_TURBIDITY")]
    pub linke_turbidity: f64,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"], env = "SOLAR_ANGLES_FORMAT")]
    pub format: String,
}

impl Args {
    /// Build the validated core request from the arguments or the JSON request.
    ///
    /// A JSON request replaces the coordinates given by flags or environment.
    /// Its offset angle is never merged with `--offset-angle`; giving both is
    /// rejected.
    pub fn angle_request(&self) -> Result<AngleRequest, CalcError> {
        let base = match self.request.as_deref() {
            Some(source) => {
                if let Some(offset) = self.offset_angle {
                    return Err(CalcError::Validation(vec![format!(
                        "offset_angle: --offset-angle {} cannot be combined with --request; \
                         put offset_angle in the request body",
                        offset
                    )]));
                }
                let req = SolarRequest::load(source)?.validated()?;
                req.angle_request(self.fix_tilt)
            }
            None => {
                let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
                    return Err(CalcError::Validation(vec![
                        "latitude and longitude are required".into(),
                    ]));
                };
                let offset = self.offset_angle.unwrap_or(0.0);
                AngleRequest::new(latitude, longitude, fixed_tilt(offset, self.fix_tilt))
            }
        };

        let base = base.with_altitude(self.altitude);
        Ok(match self.year {
            Some(year) => base.with_year(year),
            None => base,
        })
    }
}

/// Map the wire-level offset angle to an explicit fixed tilt.
///
/// An offset of 0 means "no fixed tilt" unless `force` is set.
pub fn fixed_tilt(offset_angle: f64, force: bool) -> Option<f64> {
    if force || offset_angle != 0.0 { Some(offset_angle) } else { None }
}

// ===================== JSON REQUEST =====================

/// Request body as accepted on the wire
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct SolarRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub offset_angle: f64,
}

impl SolarRequest {
    /// Parse a request from a file path, or stdin when `source` is "-".
    pub fn load(source: &str) -> Result<Self, CalcError> {
        let text = if source == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CalcError::Validation(vec![format!("request: {}", e)]))?;
            buf
        } else {
            std::fs::read_to_string(source)
                .map_err(|e| CalcError::Validation(vec![format!("request {}: {}", source, e)]))?
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, CalcError> {
        serde_json::from_str(text).map_err(|e| CalcError::Validation(vec![format!("request: {}", e)]))
    }

    /// Check every field, reporting all violations at once.
    pub fn validated(self) -> Result<Self, CalcError> {
        let errors: Vec<String> = [
            ("latitude", check_range("Latitude", self.latitude, -90.0, 90.0)),
            ("longitude", check_range("Longitude", self.longitude, -180.0, 180.0)),
            ("offset_angle", check_range("Offset angle", self.offset_angle, 0.0, 90.0)),
        ]
        .into_iter()
        .filter_map(|(field, res)| res.err().map(|msg| format!("{}: {}", field, msg)))
        .collect();

        if errors.is_empty() { Ok(self) } else { Err(CalcError::Validation(errors)) }
    }

    pub fn angle_request(&self, force_fixed_tilt: bool) -> AngleRequest {
        AngleRequest::new(
            self.latitude,
            self.longitude,
            fixed_tilt(self.offset_angle, force_fixed_tilt),
        )
    }
}

// ===================== CLI VALUE PARSERS =====================

fn check_range(what: &str, v: f64, min: f64, max: f64) -> Result<f64, String> {
    if !(min..=max).contains(&v) {
        return Err(format!("{} must be between {} and {}, got {}", what, min, max, v));
    }
    Ok(v)
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse().map_err(|_| format!("Invalid number: {}", s))
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    check_range("Latitude", parse_f64(s)?, -90.0, 90.0)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    check_range("Longitude", parse_f64(s)?, -180.0, 180.0)
}

fn parse_offset_angle(s: &str) -> Result<f64, String> {
    check_range("Offset angle", parse_f64(s)?, 0.0, 90.0)
}

fn parse_altitude(s: &str) -> Result<f64, String> {
    let v = parse_f64(s)?;
    if !(-500.0..=11000.0).contains(&v) {
        return Err(format!("Altitude must be between -500 and 11000 meters, got {}", v));
    }
    Ok(v)
}

fn parse_turbidity(s: &str) -> Result<f64, String> {
    let v = parse_f64(s)?;
    if !(1.0..=10.0).contains(&v) {
        return Err(format!("Linke turbidity must be between 1.0 and 10.0, got {}", v));
    }
    Ok(v)
}

fn parse_year(s: &str) -> Result<i32, String> {
    let v: i32 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    // Range where the ΔT estimate stays meaningful
    if !(-500..=3000).contains(&v) {
        return Err(format!("Year must be between -500 and 3000, got {}", v));
    }
    Ok(v)
}

// ===================== TESTS =====================
