//! # Constants and type aliases for astroframes
//!
//! This module centralizes the **unit conversions**, **reference epochs** and
//! **frame-bias parameters** used by the rotation, frame and ephemeris modules.
//!
//! All transform quantities in this crate are expressed in SI units
//! (m, m/s, m/s², rad, rad/s, rad/s²). Ephemeris segments follow the SPK
//! convention (km, km/s).

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

// -------------------------------------------------------------------------------------------------
// Reference epochs
// -------------------------------------------------------------------------------------------------

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Julian Date of J2000.0 (TDB), origin of SPK ephemeris time
pub const J2000_JD: f64 = 2_451_545.0;

// -------------------------------------------------------------------------------------------------
// IERS 2000 frame bias (GCRF → EME2000)
// -------------------------------------------------------------------------------------------------

/// Frame bias in longitude dψ_B (arcseconds)
pub const D_PSI_BIAS: ArcSec = -0.041775;

/// Frame bias in obliquity dε_B (arcseconds)
pub const D_EPSILON_BIAS: ArcSec = -0.0068192;

/// ICRS right ascension of the J2000.0 mean equinox α₀ (arcseconds)
pub const ALPHA_0_BIAS: ArcSec = -0.0146;

/// Obliquity of the ecliptic at J2000.0 ε₀ (arcseconds)
pub const EPSILON_0: ArcSec = 84381.448;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

pub type Radian = f64;
pub type ArcSec = f64;

/// NAIF integer code of a solar-system body or barycenter
pub type BodyId = i32;
