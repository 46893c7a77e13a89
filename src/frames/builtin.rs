//! # Built-in celestial frames
//!
//! ```text
//! GCRF
//!  └── EME2000        fixed IERS 2000 frame bias
//!       └── MOD_IAU1976      IAU 1976 precession
//!            └── TOD_IAU1980      IAU 1980 nutation
//! ```
//!
//! The frames live in one process-wide [`FrameTree`] built on first use and
//! are exposed as static [`FrameProxy`] handles. Custom frames can be hung
//! below them by starting from [`builtin_tree_builder`].
use hifitime::Epoch;
use once_cell::sync::Lazy;

use crate::{
    astro_errors::AstroError,
    constants::{ALPHA_0_BIAS, D_EPSILON_BIAS, D_PSI_BIAS, EPSILON_0, RADSEC},
    precession_nutation::{mjd_tt, nutation_rotation, precession_rotation},
    rotation::{Convention, Rotation, RotationOrder},
    transform::{FixedTransformProvider, Transform, TransformProvider},
};

use super::{Frame, FrameProxy, FrameTree, FrameTreeBuilder};

pub const GCRF_NAME: &str = "GCRF";
pub const EME2000_NAME: &str = "EME2000";
pub const MOD_IAU1976_NAME: &str = "MOD_IAU1976";
pub const TOD_IAU1980_NAME: &str = "TOD_IAU1980";

/// Geocentric Celestial Reference Frame, root of the built-in tree.
pub static GCRF: FrameProxy = FrameProxy::with_factory(|| builtin_frame(GCRF_NAME));

/// Mean equator and equinox of J2000.0.
pub static EME2000: FrameProxy = FrameProxy::with_factory(|| builtin_frame(EME2000_NAME));

/// Mean equator and equinox of date, IAU 1976 precession.
pub static MOD_IAU1976: FrameProxy =
    FrameProxy::with_factory(|| builtin_frame(MOD_IAU1976_NAME));

/// True equator and equinox of date, IAU 1980 nutation.
pub static TOD_IAU1980: FrameProxy =
    FrameProxy::with_factory(|| builtin_frame(TOD_IAU1980_NAME));

static BUILTIN_TREE: Lazy<Result<FrameTree, AstroError>> =
    Lazy::new(|| builtin_tree_builder().map(FrameTreeBuilder::build));

fn builtin_frame(name: &str) -> Result<Frame<'static>, AstroError> {
    frame_in(Lazy::force(&BUILTIN_TREE), name)
}

/// Frame `name` of a tree, or the error the tree was built with.
fn frame_in<'t>(
    tree: &'t Result<FrameTree, AstroError>,
    name: &str,
) -> Result<Frame<'t>, AstroError> {
    tree.as_ref().map_err(Clone::clone)?.frame_by_name(name)
}

/// Frame bias rotation from GCRF to EME2000.
///
/// Composition of three small rotations: dε_B around X, −dψ_B·sin ε₀ around
/// Y and −α₀ around Z.
pub fn frame_bias() -> Rotation {
    Rotation::from_euler_angles(
        RotationOrder::XYZ,
        D_EPSILON_BIAS * RADSEC,
        -D_PSI_BIAS * RADSEC * (EPSILON_0 * RADSEC).sin(),
        -ALPHA_0_BIAS * RADSEC,
        Convention::Vector,
    )
}

/// IAU 1976 precession from EME2000 to the mean equator of date.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecessionIau1976Provider;

impl TransformProvider for PrecessionIau1976Provider {
    fn get_transform(&self, date: &Epoch) -> Transform {
        Transform::from_rotation(*date, precession_rotation(mjd_tt(date)))
    }
}

/// IAU 1980 nutation from the mean to the true equator of date.
#[derive(Debug, Clone, Copy, Default)]
pub struct NutationIau1980Provider;

impl TransformProvider for NutationIau1980Provider {
    fn get_transform(&self, date: &Epoch) -> Transform {
        Transform::from_rotation(*date, nutation_rotation(mjd_tt(date)))
    }
}

/// Builder already holding the four built-in frames.
pub fn builtin_tree_builder() -> Result<FrameTreeBuilder, AstroError> {
    let mut builder = FrameTreeBuilder::new();

    let gcrf = builder.add_root(GCRF_NAME, FixedTransformProvider::identity(), true)?;
    let eme2000 = builder.add_frame(
        gcrf,
        EME2000_NAME,
        FixedTransformProvider::from_rotation(frame_bias()),
        true,
    )?;
    let mod_iau1976 =
        builder.add_frame(eme2000, MOD_IAU1976_NAME, PrecessionIau1976Provider, true)?;
    builder.add_frame(mod_iau1976, TOD_IAU1980_NAME, NutationIau1980Provider, true)?;

    Ok(builder)
}
