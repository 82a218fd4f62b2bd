//! Airspeed conversions used by the descent simulation.
//!
//! IAS is treated as calibrated airspeed. Pressure altitude follows the
//! standard atmosphere; temperature comes from the weather profile when one
//! is available and from ISA otherwise.

use thiserror::Error;

use crate::weather::WindVector;

/// Sea-level pressure in inHg
const P0_INHG: f64 = 29.92126;
/// Speed of sound at sea level in knots
const CS0_KT: f64 = 661.4786;
/// Temperature lapse divided by sea-level temperature, per foot
const LAPSE_RATIO: f64 = 6.8755856e-6;
const PRESSURE_EXPONENT: f64 = 5.2558797;
/// Speed of sound in knots per sqrt(kelvin)
const SOUND_SPEED_FACTOR: f64 = 38.967854;
const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AirspeedError {
    #[error("supersonic TAS to IAS conversion not supported (M={mach:.3})")]
    Supersonic { mach: f64 },
}

/// ISA temperature at the given altitude, 15 °C at sea level minus 2 °C per 1000 ft
pub fn standard_temperature_c(altitude_ft: f64) -> f64 {
    15.0 - altitude_ft * 2.0 / 1000.0
}

/// Local speed of sound in knots for a static air temperature
pub fn speed_of_sound_kt(temperature_c: f64) -> f64 {
    SOUND_SPEED_FACTOR * (temperature_c + KELVIN_OFFSET).max(0.0).sqrt()
}

fn pressure_ratio(pressure_altitude_ft: f64) -> f64 {
    (1.0 - LAPSE_RATIO * pressure_altitude_ft)
        .max(0.0)
        .powf(PRESSURE_EXPONENT)
}

/// Convert indicated airspeed to true airspeed using the subsonic pitot equation
pub fn ias_to_tas(ias_kt: f64, pressure_altitude_ft: f64, temperature_c: f64) -> f64 {
    let ratio = pressure_ratio(pressure_altitude_ft);
    if ratio <= 0.0 {
        return ias_kt;
    }
    let impact = (1.0 + 0.2 * (ias_kt / CS0_KT).powi(2)).powf(3.5) - 1.0;
    let mach = (5.0 * ((impact / ratio + 1.0).powf(2.0 / 7.0) - 1.0)).sqrt();
    mach * speed_of_sound_kt(temperature_c)
}

/// Convert true airspeed to indicated airspeed.
///
/// Fails for supersonic true airspeeds, where the subsonic pitot relation no
/// longer holds.
pub fn tas_to_ias(
    tas_kt: f64,
    pressure_altitude_ft: f64,
    temperature_c: f64,
) -> Result<f64, AirspeedError> {
    let mach = tas_kt / speed_of_sound_kt(temperature_c);
    if mach > 1.0 {
        return Err(AirspeedError::Supersonic { mach });
    }
    Ok(mach_to_ias_unchecked(mach, pressure_altitude_ft))
}

/// Convert a Mach number to indicated airspeed at the given pressure altitude
pub fn mach_to_ias(mach: f64, pressure_altitude_ft: f64) -> Result<f64, AirspeedError> {
    if mach > 1.0 {
        return Err(AirspeedError::Supersonic { mach });
    }
    Ok(mach_to_ias_unchecked(mach, pressure_altitude_ft))
}

fn mach_to_ias_unchecked(mach: f64, pressure_altitude_ft: f64) -> f64 {
    let ratio = pressure_ratio(pressure_altitude_ft);
    let impact = ratio * ((1.0 + mach * mach / 5.0).powf(3.5) - 1.0);
    CS0_KT * (5.0 * ((1.0 + impact).powf(2.0 / 7.0) - 1.0)).sqrt()
}

/// Ground speed along `track_deg` for an aircraft flying `tas_kt` through `wind`.
///
/// The heading is corrected for crosswind so the aircraft holds the track.
/// When the crosswind exceeds the airspeed the track cannot be held and only the
/// along-track wind component is applied.
pub fn ground_speed(tas_kt: f64, wind: &WindVector, track_deg: f64) -> f64 {
    if wind.speed_kt <= 0.0 {
        return tas_kt;
    }
    let relative = (wind.direction_deg - track_deg).to_radians();
    let headwind = wind.speed_kt * relative.cos();
    let crosswind = wind.speed_kt * relative.sin();

    if tas_kt <= crosswind.abs() {
        return (tas_kt - headwind).max(0.0);
    }
    let correction = (crosswind / tas_kt).asin();
    (tas_kt * correction.cos() - headwind).max(0.0)
}
