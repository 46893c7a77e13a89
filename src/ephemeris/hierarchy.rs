//! NAIF body-id hierarchy.
//!
//! ```text
//! 0 (solar system barycenter)
//! ├── 1..=9  planetary barycenters
//! │    └── B01..B99  planet (B99) and its satellites
//! └── 10  Sun
//! ```
//!
//! Ids outside these ranges (spacecraft, small bodies) have no known parent.
use crate::{astro_errors::AstroError, constants::BodyId};

pub const SOLAR_SYSTEM_BARYCENTER: BodyId = 0;
pub const SUN: BodyId = 10;

/// Parent of `body` in the NAIF hierarchy, `None` for the solar system
/// barycenter and unknown ids.
pub fn parent(body: BodyId) -> Option<BodyId> {
    match body {
        1..=SUN => Some(SOLAR_SYSTEM_BARYCENTER),
        100..=999 => Some(body / 100),
        _ => None,
    }
}

/// `[body, parent(body), …]` up to the last known ancestor.
pub fn parents(body: BodyId) -> Vec<BodyId> {
    std::iter::successors(Some(body), |&b| parent(b)).collect()
}

/// Paths from the closest common ancestor of `origin` and `target` down to
/// each of them, as `(origin_path, target_path)`.
///
/// When `origin` is an ancestor of `target` (or the same body), the whole
/// chain goes into `origin_path`, from `origin` to `target`, and
/// `target_path` is empty.
///
/// ```text
/// hierarchy_paths(399, 301) == ([3, 399], [3, 301])
/// hierarchy_paths(0, 301)   == ([0, 3, 301], [])
/// ```
///
/// Fails with [`AstroError::UnknownPair`] when the two bodies share no
/// ancestor.
pub fn hierarchy_paths(
    origin: BodyId,
    target: BodyId,
) -> Result<(Vec<BodyId>, Vec<BodyId>), AstroError> {
    let mut origin_chain = parents(origin);
    let mut target_chain = parents(target);
    origin_chain.reverse();
    target_chain.reverse();

    let common = origin_chain
        .iter()
        .zip(&target_chain)
        .take_while(|(o, t)| o == t)
        .count();
    if common == 0 {
        return Err(AstroError::UnknownPair(origin, target));
    }

    if common == origin_chain.len() {
        return Ok((target_chain[common - 1..].to_vec(), Vec::new()));
    }

    Ok((
        origin_chain[common - 1..].to_vec(),
        target_chain[common - 1..].to_vec(),
    ))
}
