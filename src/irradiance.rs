//! Clear-Sky and Plane-of-Array Irradiance
//!
//! Implements the Ineichen-Perez clear-sky model for estimating irradiance
//! components and the isotropic-sky transposition onto a tilted plane.
//!
//! References:
//! - Ineichen, P. and Perez, R. (2002). "A new airmass independent formulation
//!   for the Linke turbidity coefficient"
//! - Liu, B. and Jordan, R. (1963). "The long-term average performance of
//!   flat-plate solar-energy collectors"

use std::f64::consts::PI;

// ===================== CONSTANTS =====================

/// Solar constant (Total Solar Irradiance) in W/m²
const SOLAR_CONSTANT: f64 = 1361.0;

/// Default Linke turbidity factor for clear atmosphere
/// Typical values: 2-3 for very clear, 4-6 for industrial areas
pub const DEFAULT_LINKE_TURBIDITY: f64 = 3.0;

// ===================== RESULTS =====================

/// Clear-sky irradiance components at one timestamp (W/m²)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearSky {
    /// Direct Normal Irradiance
    pub dni: f64,
    /// Global Horizontal Irradiance
    pub ghi: f64,
    /// Diffuse Horizontal Irradiance
    pub dhi: f64,
}

// ===================== GEOMETRY =====================

/// Calculate angle of incidence between sun rays and panel normal
///
/// # Arguments
/// * `sun_zenith_deg` - Sun zenith angle in degrees (0 = overhead)
/// * `sun_azimuth_deg` - Sun azimuth in degrees (0 = North, 90 = East, 180 = South)
/// * `panel_tilt_deg` - Panel tilt from horizontal in degrees
/// * `panel_azimuth_deg` - Panel facing direction in degrees (180 = South)
///
/// # Returns
/// Angle of incidence in degrees (0 = sun perpendicular to panel)
pub fn angle_of_incidence(
    sun_zenith_deg: f64,
    sun_azimuth_deg: f64,
    panel_tilt_deg: f64,
    panel_azimuth_deg: f64,
) -> f64 {
    let sun_zenith = sun_zenith_deg.to_radians();
    let sun_az = sun_azimuth_deg.to_radians();
    let tilt = panel_tilt_deg.to_radians();
    let panel_az = panel_azimuth_deg.to_radians();

    let cos_aoi =
        sun_zenith.cos() * tilt.cos() + sun_zenith.sin() * tilt.sin() * (sun_az - panel_az).cos();

    cos_aoi.clamp(-1.0, 1.0).acos().to_degrees()
}

// ===================== ATMOSPHERIC CALCULATIONS =====================

/// Calculate absolute air mass (pressure-corrected)
///
/// Uses Kasten-Young (1989) relative air mass model combined with
/// International Standard Atmosphere (ISA) pressure correction.
pub fn air_mass(sun_zenith_deg: f64, altitude_m: f64) -> f64 {
    if sun_zenith_deg >= 90.0 {
        return f64::INFINITY;
    }

    let zenith_rad = sun_zenith_deg.to_radians();

    // Relative air mass, accurate for zenith angles up to ~89°
    let am_relative =
        1.0 / (zenith_rad.cos() + 0.50572 * (96.07995 - sun_zenith_deg).powf(-1.6364));

    // P / P0 = (1 - 2.25577e-5 * h)^5.25588
    let pressure_ratio =
        if altitude_m.abs() < 1e-5 { 1.0 } else { (1.0 - 2.25577e-5 * altitude_m).powf(5.25588) };

    am_relative * pressure_ratio
}

/// Calculate extraterrestrial irradiance corrected for Earth-Sun distance
///
/// Uses Spencer (1971) formula for orbital eccentricity correction
///
/// # Arguments
/// * `day_of_year` - Day of year (1-366)
///
/// # Returns
/// Extraterrestrial irradiance in W/m²
pub fn extraterrestrial_irradiance(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (day_of_year as f64 - 1.0) / 365.0;

    let eccentricity_correction = 1.000110
        + 0.034221 * b.cos()
        + 0.001280 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();

    SOLAR_CONSTANT * eccentricity_correction
}

// ===================== INEICHEN-PEREZ CLEAR SKY MODEL =====================

/// Calculate clear-sky irradiance using Ineichen-Perez model
///
/// # Arguments
/// * `apparent_zenith_deg` - Apparent sun zenith in degrees
/// * `altitude_m` - Observer altitude in meters
/// * `day_of_year` - Day of year (1-366)
/// * `linke_turbidity` - Linke turbidity factor (typical 2-7)
pub fn ineichen_perez_clearsky(
    apparent_zenith_deg: f64,
    altitude_m: f64,
    day_of_year: u32,
    linke_turbidity: f64,
) -> ClearSky {
    if apparent_zenith_deg >= 90.0 {
        return ClearSky::default();
    }

    let am = air_mass(apparent_zenith_deg, altitude_m);
    if !am.is_finite() || am <= 0.0 {
        return ClearSky::default();
    }

    let i0 = extraterrestrial_irradiance(day_of_year);
    let cos_zenith = apparent_zenith_deg.to_radians().cos();

    // Clamp altitude for atmospheric coefficients to prevent model drift/NaN
    let clamped_alt = altitude_m.clamp(-500.0, 11000.0);

    // Altitude correction coefficients (Ineichen 2002)
    let fh1 = (-clamped_alt / 8000.0).exp();
    let fh2 = (-clamped_alt / 1250.0).exp();

    let altitude_km = clamped_alt / 1000.0;
    let tl = (linke_turbidity - 0.15 * altitude_km).max(1.0);

    let cg1 = 5.09e-5 * clamped_alt + 0.868;
    let cg2 = 3.92e-5 * clamped_alt + 0.0387;

    let b = 0.664 + 0.163 / fh1;
    let exponent = -cg2 * am * (fh1 + fh2 * (tl - 1.0));
    let dni = (b * i0 * exponent.exp()).max(0.0).min(i0);

    let ghi_raw = (cg1 * i0 * cos_zenith * (exponent * 1.1).exp()).max(0.0);

    // GHI cannot be less than the direct beam component hitting the ground.
    let direct_horizontal = dni * cos_zenith;
    let ghi = ghi_raw.max(direct_horizontal);
    let dhi = (ghi - direct_horizontal).max(0.0);

    ClearSky { dni, ghi, dhi }
}

// ===================== PLANE OF ARRAY IRRADIANCE =====================

/// Transpose clear-sky components onto a tilted plane (isotropic sky).
///
/// Sum of beam, sky-diffuse and ground-reflected irradiance in W/m².
///
/// # Arguments
/// * `sky` - Clear-sky components
/// * `sun_zenith_deg` - Apparent sun zenith in degrees
/// * `sun_azimuth_deg` - Sun azimuth in degrees
/// * `panel_tilt_deg` - Panel tilt from horizontal in degrees
/// * `panel_azimuth_deg` - Panel azimuth in degrees
/// * `albedo` - Ground reflectance (0-1)
pub fn plane_of_array_irradiance(
    sky: ClearSky,
    sun_zenith_deg: f64,
    sun_azimuth_deg: f64,
    panel_tilt_deg: f64,
    panel_azimuth_deg: f64,
    albedo: f64,
) -> f64 {
    let aoi_deg =
        angle_of_incidence(sun_zenith_deg, sun_azimuth_deg, panel_tilt_deg, panel_azimuth_deg);

    let cos_aoi = aoi_deg.to_radians().cos();
    let tilt_cos = panel_tilt_deg.to_radians().cos();

    let poa_beam =
        if cos_aoi > 0.0 && sun_zenith_deg < 90.0 { sky.dni * cos_aoi } else { 0.0 };
    let poa_sky_diffuse = sky.dhi * (1.0 + tilt_cos) / 2.0;
    let poa_ground_diffuse = sky.ghi * albedo * (1.0 - tilt_cos) / 2.0;

    poa_beam + poa_sky_diffuse + poa_ground_diffuse
}

// ===================== TESTS =====================
