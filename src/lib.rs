//! # astroframes
//!
//! Reference frames and planetary ephemerides for astrodynamics:
//!
//! * [`rotation`] – unit-quaternion rotations with explicit vector/frame
//!   conventions and Euler/Cardan angle extraction.
//! * [`transform`] – kinematic transforms (position, velocity, acceleration)
//!   between frames, and the [`transform::TransformProvider`] capability.
//! * [`frames`] – frame trees, lazily initialized frame proxies and the
//!   built-in GCRF / EME2000 / MOD / TOD frames.
//! * [`ephemeris`] – shortest-path resolution of body positions over the
//!   segments of a JPL SPK kernel.
pub mod astro_errors;
pub mod constants;
pub mod ephemeris;
pub mod frames;
pub mod precession_nutation;
pub mod rotation;
pub mod transform;
