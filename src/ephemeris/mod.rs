//! # Planetary ephemerides
//!
//! [`JplEphemeris`] answers "where is body `target` relative to body
//! `origin`" from a kernel of directly computable segments, chaining them
//! along the shortest path of the segment graph when no single segment links
//! the two bodies.
//!
//! ## Components
//! -----------------
//! * [`Segment`] / [`SegmentKernel`] – capabilities consumed by the resolver.
//! * [`spk`] – reader for binary NAIF SPK kernels, the usual kernel.
//! * [`hierarchy`] – NAIF id hierarchy (barycenters, planets, satellites).
//! * [`kernel_source`] – where to find the kernel file.
//!
//! ## Example
//! -----------------
//! ```rust, ignore
//! use astroframes::ephemeris::{kernel_source::EphemerisSource, JplEphemeris};
//!
//! let ephem = JplEphemeris::from_source(&"naif:DE440".parse()?)?;
//! // Moon relative to the Earth, km and km/s
//! let (r, v) = ephem.rv(399, 301, 2451545.0, 0.25)?;
//! ```
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hifitime::Epoch;
use itertools::Itertools;
use log::{debug, trace, warn};
use nalgebra::Vector3;

use crate::{
    astro_errors::AstroError,
    constants::{BodyId, J2000_JD, SECONDS_PER_DAY},
};

pub mod hierarchy;
pub mod kernel_source;
pub mod spk;

use kernel_source::EphemerisSource;
use spk::SpkKernel;

/// Position and velocity, km and km/s for SPK kernels.
pub type StateVector = (Vector3<f64>, Vector3<f64>);

/// Directly computable trajectory of one body relative to another.
pub trait Segment {
    /// State of the segment target relative to its center at the TDB Julian
    /// date `tdb + tdb2`.
    fn compute_and_differentiate(&self, tdb: f64, tdb2: f64) -> Result<StateVector, AstroError>;
}

/// Collection of segments keyed by `(center, target)`.
pub trait SegmentKernel {
    fn pairs(&self) -> Vec<(BodyId, BodyId)>;

    fn segment(&self, center: BodyId, target: BodyId) -> Option<&dyn Segment>;
}

type PathTable = BTreeMap<BodyId, BTreeMap<BodyId, Vec<BodyId>>>;

/// Shortest-path resolver over the segments of a kernel.
#[derive(Debug, Clone)]
pub struct JplEphemeris<K> {
    kernel: K,
    paths: PathTable,
}

impl JplEphemeris<SpkKernel> {
    /// Open the SPK kernel designated by `source` and build the path table.
    pub fn from_source(source: &EphemerisSource) -> Result<Self, AstroError> {
        let path = source.resolve()?;
        Ok(JplEphemeris::new(SpkKernel::open(&path)?))
    }
}

impl<K: SegmentKernel> JplEphemeris<K> {
    pub fn new(kernel: K) -> Self {
        let mut ephemeris = JplEphemeris {
            kernel,
            paths: PathTable::new(),
        };
        ephemeris.generate_paths();
        ephemeris
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Rebuild the all-pairs shortest path table from the kernel pairs.
    ///
    /// The segment graph is undirected. Each table row is a breadth-first
    /// search visiting neighbours by increasing id, so among paths of equal
    /// length the one through the lowest ids wins.
    pub fn generate_paths(&mut self) {
        let pairs = self.kernel.pairs();
        let mut graph: BTreeMap<BodyId, BTreeSet<BodyId>> = BTreeMap::new();
        for &(center, target) in &pairs {
            graph.entry(center).or_default().insert(target);
            graph.entry(target).or_default().insert(center);
        }

        let directed: BTreeSet<_> = pairs.iter().copied().collect();
        for &(center, target) in &pairs {
            if center < target && directed.contains(&(target, center)) {
                warn!(
                    "segments {center} -> {target} and {target} -> {center} both present, \
                     each hop uses the one in its own direction"
                );
            }
        }

        self.paths = graph
            .keys()
            .map(|&source| (source, shortest_paths_from(&graph, source)))
            .collect();

        debug!(
            "ephemeris path table generated: {} bodies, {} segments",
            graph.len(),
            pairs.len()
        );
    }

    /// Bodies visited going from `origin` to `target`, both included.
    pub fn path(&self, origin: BodyId, target: BodyId) -> Option<&[BodyId]> {
        self.paths
            .get(&origin)?
            .get(&target)
            .map(Vec::as_slice)
    }

    /// State of `target` relative to `origin` at the TDB Julian date
    /// `tdb + tdb2`.
    ///
    /// Fails with [`AstroError::UnknownPair`] when either body is not in the
    /// kernel or no chain of segments links them.
    pub fn rv(
        &self,
        origin: BodyId,
        target: BodyId,
        tdb: f64,
        tdb2: f64,
    ) -> Result<StateVector, AstroError> {
        if !self.paths.contains_key(&origin) || !self.paths.contains_key(&target) {
            return Err(AstroError::UnknownPair(origin, target));
        }
        let path = self
            .path(origin, target)
            .ok_or(AstroError::UnknownPair(origin, target))?;
        self.compute_path(path, tdb, tdb2)
    }

    /// [`Self::rv`] at a hifitime epoch.
    pub fn rv_at(
        &self,
        origin: BodyId,
        target: BodyId,
        epoch: &Epoch,
    ) -> Result<StateVector, AstroError> {
        self.rv(
            origin,
            target,
            J2000_JD,
            epoch.to_et_seconds() / SECONDS_PER_DAY,
        )
    }

    /// State of `target` relative to `origin` following the NAIF id
    /// hierarchy instead of the kernel graph.
    ///
    /// Both bodies are reached from their closest common ancestor along
    /// [`hierarchy::hierarchy_paths`]; every hop of these paths must be a
    /// kernel segment, in either direction.
    pub fn rv_through_hierarchy(
        &self,
        origin: BodyId,
        target: BodyId,
        tdb: f64,
        tdb2: f64,
    ) -> Result<StateVector, AstroError> {
        let (origin_path, target_path) = hierarchy::hierarchy_paths(origin, target)?;
        let (ro, vo) = self.compute_path(&origin_path, tdb, tdb2)?;
        if target_path.is_empty() {
            return Ok((ro, vo));
        }
        let (rt, vt) = self.compute_path(&target_path, tdb, tdb2)?;
        Ok((rt - ro, vt - vo))
    }

    fn compute_segment(
        &self,
        origin: BodyId,
        target: BodyId,
        tdb: f64,
        tdb2: f64,
    ) -> Result<StateVector, AstroError> {
        trace!("evaluating hop {origin} -> {target}");
        if let Some(segment) = self.kernel.segment(origin, target) {
            return segment.compute_and_differentiate(tdb, tdb2);
        }
        let segment = self
            .kernel
            .segment(target, origin)
            .ok_or(AstroError::UnknownSegment(origin, target))?;
        let (r, v) = segment.compute_and_differentiate(tdb, tdb2)?;
        Ok((-r, -v))
    }

    fn compute_path(&self, path: &[BodyId], tdb: f64, tdb2: f64) -> Result<StateVector, AstroError> {
        if let [origin, target] = *path {
            return self.compute_segment(origin, target, tdb, tdb2);
        }
        path.iter().tuple_windows().try_fold(
            (Vector3::zeros(), Vector3::zeros()),
            |(r, v), (&origin, &target)| {
                let (rs, vs) = self.compute_segment(origin, target, tdb, tdb2)?;
                Ok((r + rs, v + vs))
            },
        )
    }
}

/// Breadth-first shortest paths from `source` to every reachable body.
fn shortest_paths_from(
    graph: &BTreeMap<BodyId, BTreeSet<BodyId>>,
    source: BodyId,
) -> BTreeMap<BodyId, Vec<BodyId>> {
    let mut paths = BTreeMap::from([(source, vec![source])]);
    let mut queue = VecDeque::from([source]);

    while let Some(node) = queue.pop_front() {
        let Some(neighbours) = graph.get(&node) else {
            continue;
        };
        for &next in neighbours {
            if paths.contains_key(&next) {
                continue;
            }
            let mut path = paths.get(&node).cloned().unwrap_or_default();
            path.push(next);
            paths.insert(next, path);
            queue.push_back(next);
        }
    }
    paths
}

#[cfg(test)]
mod test_jpl_ephemeris {
    use std::collections::HashMap;

    use approx::assert_abs_diff_eq;
    use hifitime::TimeScale;

    use super::*;

    /// Segment moving linearly: `r = r0 + v0 * (t - J2000)` with `t` in days.
    struct LinearSegment {
        r0: Vector3<f64>,
        v0: Vector3<f64>,
    }

    impl Segment for LinearSegment {
        fn compute_and_differentiate(&self, tdb: f64, tdb2: f64) -> Result<StateVector, AstroError> {
            let days = (tdb - J2000_JD) + tdb2;
            Ok((self.r0 + self.v0 * days, self.v0))
        }
    }

    struct MockKernel {
        segments: HashMap<(BodyId, BodyId), LinearSegment>,
    }

    impl SegmentKernel for MockKernel {
        fn pairs(&self) -> Vec<(BodyId, BodyId)> {
            self.segments.keys().copied().sorted().collect()
        }

        fn segment(&self, center: BodyId, target: BodyId) -> Option<&dyn Segment> {
            self.segments
                .get(&(center, target))
                .map(|segment| segment as &dyn Segment)
        }
    }

    fn linear(r0: [f64; 3], v0: [f64; 3]) -> LinearSegment {
        LinearSegment {
            r0: Vector3::from(r0),
            v0: Vector3::from(v0),
        }
    }

    fn mock_kernel(entries: Vec<((BodyId, BodyId), LinearSegment)>) -> MockKernel {
        MockKernel {
            segments: entries.into_iter().collect(),
        }
    }

    fn solar_system() -> JplEphemeris<MockKernel> {
        JplEphemeris::new(mock_kernel(vec![
            ((0, 3), linear([1.5e8, 1.0e6, -2.0e5], [-1.0e5, 2.5e6, 1.0e3])),
            ((3, 399), linear([-4.6e3, 3.0e2, 1.0e1], [2.0, -3.0, 0.5])),
            ((3, 301), linear([3.7e5, 1.2e4, -9.0e3], [-1.0e3, 8.0e4, 3.0e2])),
            ((0, 4), linear([2.0e8, -1.0e8, 3.0e6], [1.0e6, 1.5e6, -2.0e4])),
            ((0, 10), linear([1.0e5, -3.0e5, 2.0e3], [10.0, 5.0, -1.0])),
        ]))
    }

    #[test]
    fn test_direct_segment() {
        let ephem = solar_system();
        let (r, v) = ephem.rv(0, 3, J2000_JD, 0.5).unwrap();
        assert_eq!(r, Vector3::new(1.5e8 - 0.5e5, 1.0e6 + 1.25e6, -2.0e5 + 500.0));
        assert_eq!(v, Vector3::new(-1.0e5, 2.5e6, 1.0e3));
    }

    #[test]
    fn test_chained_segments() {
        let ephem = solar_system();
        assert_eq!(ephem.path(0, 399), Some(&[0, 3, 399][..]));
        assert_eq!(ephem.path(399, 4), Some(&[399, 3, 0, 4][..]));

        let (r03, v03) = ephem.rv(0, 3, J2000_JD, 1.0).unwrap();
        let (r3e, v3e) = ephem.rv(3, 399, J2000_JD, 1.0).unwrap();
        let (r, v) = ephem.rv(0, 399, J2000_JD, 1.0).unwrap();
        assert_abs_diff_eq!(r, r03 + r3e, epsilon = 1e-6);
        assert_abs_diff_eq!(v, v03 + v3e, epsilon = 1e-9);
    }

    #[test]
    fn test_reverse_is_exact_negation() {
        let ephem = solar_system();
        for (origin, target) in [(0, 3), (0, 399), (399, 301), (10, 3)] {
            let (r, v) = ephem.rv(origin, target, J2000_JD, 12.25).unwrap();
            let (r_back, v_back) = ephem.rv(target, origin, J2000_JD, 12.25).unwrap();
            assert_eq!(r_back, -r, "{origin} -> {target}");
            assert_eq!(v_back, -v, "{origin} -> {target}");
        }
    }

    #[test]
    fn test_same_body() {
        let ephem = solar_system();
        assert_eq!(ephem.path(399, 399), Some(&[399][..]));
        let (r, v) = ephem.rv(399, 399, J2000_JD, 0.0).unwrap();
        assert_eq!(r, Vector3::zeros());
        assert_eq!(v, Vector3::zeros());
    }

    #[test]
    fn test_unknown_pair() {
        let ephem = solar_system();
        assert_eq!(
            ephem.rv(0, 5, J2000_JD, 0.0),
            Err(AstroError::UnknownPair(0, 5))
        );
        assert_eq!(
            ephem.rv(5, 399, J2000_JD, 0.0),
            Err(AstroError::UnknownPair(5, 399))
        );
    }

    #[test]
    fn test_disconnected_bodies() {
        let ephem = JplEphemeris::new(mock_kernel(vec![
            ((0, 3), linear([1.0, 0.0, 0.0], [0.0; 3])),
            ((1000, 1001), linear([0.0, 1.0, 0.0], [0.0; 3])),
        ]));
        assert_eq!(ephem.path(0, 1001), None);
        assert_eq!(
            ephem.rv(0, 1001, J2000_JD, 0.0),
            Err(AstroError::UnknownPair(0, 1001))
        );
    }

    #[test]
    fn test_tie_break_on_lowest_ids() {
        // two paths of length 2 from 0 to 3
        let ephem = JplEphemeris::new(mock_kernel(vec![
            ((0, 2), linear([0.0; 3], [0.0; 3])),
            ((0, 1), linear([0.0; 3], [0.0; 3])),
            ((2, 3), linear([0.0; 3], [0.0; 3])),
            ((1, 3), linear([0.0; 3], [0.0; 3])),
        ]));
        assert_eq!(ephem.path(0, 3), Some(&[0, 1, 3][..]));
        assert_eq!(ephem.path(3, 0), Some(&[3, 1, 0][..]));
    }

    #[test]
    fn test_forward_segment_preferred() {
        let ephem = JplEphemeris::new(mock_kernel(vec![
            ((0, 3), linear([1.0, 2.0, 3.0], [0.0; 3])),
            ((3, 0), linear([10.0, 20.0, 30.0], [0.0; 3])),
        ]));
        let (r, _) = ephem.rv(0, 3, J2000_JD, 0.0).unwrap();
        assert_eq!(r, Vector3::new(1.0, 2.0, 3.0));
        let (r, _) = ephem.rv(3, 0, J2000_JD, 0.0).unwrap();
        assert_eq!(r, Vector3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_rv_through_hierarchy() {
        let ephem = solar_system();
        let (tdb, tdb2) = (J2000_JD, 3.5);

        let (r_em, v_em) = ephem.rv_through_hierarchy(399, 301, tdb, tdb2).unwrap();
        let (r, v) = ephem.rv(399, 301, tdb, tdb2).unwrap();
        assert_abs_diff_eq!(r_em, r, epsilon = 1e-6);
        assert_abs_diff_eq!(v_em, v, epsilon = 1e-9);

        let (r_down, _) = ephem.rv_through_hierarchy(0, 301, tdb, tdb2).unwrap();
        let (r, _) = ephem.rv(0, 301, tdb, tdb2).unwrap();
        assert_abs_diff_eq!(r_down, r, epsilon = 1e-6);

        let (r_up, _) = ephem.rv_through_hierarchy(301, 3, tdb, tdb2).unwrap();
        let (r, _) = ephem.rv(3, 301, tdb, tdb2).unwrap();
        assert_abs_diff_eq!(r_up, -r, epsilon = 1e-9);

        assert_eq!(
            ephem.rv_through_hierarchy(399, 502, tdb, tdb2),
            Err(AstroError::UnknownSegment(0, 5))
        );
    }

    #[test]
    fn test_rv_at_epoch() {
        let ephem = solar_system();
        let epoch = Epoch::from_gregorian(2000, 1, 2, 12, 0, 0, 0, TimeScale::TDB);
        let (r, _) = ephem.rv_at(0, 10, &epoch).unwrap();
        let (expected, _) = ephem.rv(0, 10, J2000_JD, 1.0).unwrap();
        assert_abs_diff_eq!(r, expected, epsilon = 1e-3);
    }
}
