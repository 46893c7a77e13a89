//! Frame arena and frame handles.
//!
//! Frames live in a [`FrameTree`], an immutable arena built once with a
//! [`FrameTreeBuilder`]. Each node stores its parent id, its depth and the
//! [`TransformProvider`] giving the parent → child transform. A [`Frame`] is a
//! cheap `Copy` handle (tree reference + id) on which all queries are made.
use std::{
    fmt,
    ops::{Bound, RangeBounds},
};

use hifitime::Epoch;
use log::trace;
use once_cell::sync::OnceCell;

use crate::{
    astro_errors::AstroError,
    transform::{Transform, TransformProvider},
};

use super::AsFrame;

/// Index of a frame inside its [`FrameTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct FrameNode {
    name: String,
    parent: Option<FrameId>,
    depth: usize,
    provider: Box<dyn TransformProvider + Send + Sync>,
    pseudo_inertial: bool,
    /// `[self, parent, grandparent, …, root]`, filled on first access
    ancestors: OnceCell<Vec<FrameId>>,
}

/// Immutable tree of frames.
pub struct FrameTree {
    nodes: Vec<FrameNode>,
}

#[derive(Default)]
pub struct FrameTreeBuilder {
    nodes: Vec<FrameNode>,
}

impl FrameTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame without parent.
    pub fn add_root(
        &mut self,
        name: impl Into<String>,
        provider: impl TransformProvider + Send + Sync + 'static,
        pseudo_inertial: bool,
    ) -> Result<FrameId, AstroError> {
        self.push(name.into(), None, Box::new(provider), pseudo_inertial)
    }

    /// Add a frame below `parent`.
    ///
    /// `provider` returns the transform from `parent` to the new frame.
    ///
    /// Return
    /// ----------
    /// * The id of the new frame, [`AstroError::FrameNotFound`] if `parent`
    ///   is not part of this builder, [`AstroError::DuplicateFrameName`] if
    ///   the name is already taken.
    pub fn add_frame(
        &mut self,
        parent: FrameId,
        name: impl Into<String>,
        provider: impl TransformProvider + Send + Sync + 'static,
        pseudo_inertial: bool,
    ) -> Result<FrameId, AstroError> {
        if parent.0 >= self.nodes.len() {
            return Err(AstroError::FrameNotFound(format!("#{}", parent.0)));
        }
        self.push(name.into(), Some(parent), Box::new(provider), pseudo_inertial)
    }

    /// Id of an already added frame.
    pub fn find(&self, name: &str) -> Option<FrameId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(FrameId)
    }

    fn push(
        &mut self,
        name: String,
        parent: Option<FrameId>,
        provider: Box<dyn TransformProvider + Send + Sync>,
        pseudo_inertial: bool,
    ) -> Result<FrameId, AstroError> {
        if self.find(&name).is_some() {
            return Err(AstroError::DuplicateFrameName(name));
        }

        let depth = parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        self.nodes.push(FrameNode {
            name,
            parent,
            depth,
            provider,
            pseudo_inertial,
            ancestors: OnceCell::new(),
        });
        Ok(FrameId(self.nodes.len() - 1))
    }

    pub fn build(self) -> FrameTree {
        FrameTree { nodes: self.nodes }
    }
}

impl FrameTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn frame(&self, id: FrameId) -> Result<Frame<'_>, AstroError> {
        if id.0 < self.nodes.len() {
            Ok(Frame { tree: self, id })
        } else {
            Err(AstroError::FrameNotFound(format!("#{}", id.0)))
        }
    }

    pub fn frame_by_name(&self, name: &str) -> Result<Frame<'_>, AstroError> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(|index| Frame {
                tree: self,
                id: FrameId(index),
            })
            .ok_or_else(|| AstroError::FrameNotFound(name.to_string()))
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame<'_>> {
        (0..self.nodes.len()).map(move |index| Frame {
            tree: self,
            id: FrameId(index),
        })
    }

    fn node(&self, id: FrameId) -> &FrameNode {
        &self.nodes[id.0]
    }
}

impl fmt::Debug for FrameTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|node| &node.name))
            .finish()
    }
}

/// Handle on a frame of a [`FrameTree`].
///
/// Two handles are equal when they point to the same node of the same tree.
#[derive(Clone, Copy)]
pub struct Frame<'t> {
    tree: &'t FrameTree,
    id: FrameId,
}

impl<'a, 'b> PartialEq<Frame<'b>> for Frame<'a> {
    fn eq(&self, other: &Frame<'b>) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Frame<'_> {}

impl<'t> Frame<'t> {
    fn node(&self) -> &'t FrameNode {
        self.tree.node(self.id)
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn tree(&self) -> &'t FrameTree {
        self.tree
    }

    pub fn name(&self) -> &'t str {
        &self.node().name
    }

    pub fn parent(&self) -> Option<Frame<'t>> {
        self.node().parent.map(|id| Frame {
            tree: self.tree,
            id,
        })
    }

    /// Number of hops to the root (0 for a root frame).
    pub fn depth(&self) -> usize {
        self.node().depth
    }

    pub fn is_pseudo_inertial(&self) -> bool {
        self.node().pseudo_inertial
    }

    /// Provider of the transform from the parent frame to this frame.
    pub fn transform_provider(&self) -> &'t (dyn TransformProvider + Send + Sync) {
        self.node().provider.as_ref()
    }

    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors { frame: *self }
    }

    /// Lowest common ancestor of `self` and `other`.
    ///
    /// The deeper frame is first lifted to the depth of the shallower one,
    /// then both climb in lockstep until they meet.
    pub fn find_common_ancestor(&self, other: &Frame<'_>) -> Result<Frame<'t>, AstroError> {
        if !std::ptr::eq(self.tree, other.tree) {
            return Err(self.unrelated(other));
        }
        let other = Frame {
            tree: self.tree,
            id: other.id,
        };

        let (mut current_from, mut current_to) = if self.depth() > other.depth() {
            (self.ancestors().get(self.depth() - other.depth())?, other)
        } else {
            (*self, other.ancestors().get(other.depth() - self.depth())?)
        };

        while current_from != current_to {
            match (current_from.parent(), current_to.parent()) {
                (Some(from), Some(to)) => {
                    current_from = from;
                    current_to = to;
                }
                _ => return Err(self.unrelated(&other)),
            }
        }

        Ok(current_from)
    }

    /// Transform from `self` to `destination` at `date`.
    ///
    /// The result maps coordinates expressed in `self` into `destination`.
    /// It is built as `!(common → self) + (common → destination)` where
    /// `common` is the lowest common ancestor of both frames.
    ///
    /// Arguments
    /// -----------------
    /// * `destination`: target frame (a [`Frame`] or a [`super::FrameProxy`]).
    /// * `date`: date of the transform.
    ///
    /// Return
    /// ----------
    /// * The transform, or [`AstroError::UnrelatedFrames`] when both frames do
    ///   not share a root.
    pub fn get_transform_to<F: AsFrame + ?Sized>(
        &self,
        destination: &F,
        date: &Epoch,
    ) -> Result<Transform, AstroError> {
        let destination = destination.as_frame()?;

        if *self == destination {
            return Ok(Transform::identity(*date));
        }

        let common = self.find_common_ancestor(&destination)?;

        let common_to_instance = self.transform_from(&common, date);
        let common_to_destination = destination.transform_from(&common, date);

        Ok(!common_to_instance + common_to_destination)
    }

    /// Chain the provider transforms from `ancestor` down to `self`.
    fn transform_from(&self, ancestor: &Frame<'_>, date: &Epoch) -> Transform {
        self.ancestors()
            .iter()
            .take_while(|frame| frame != ancestor)
            .fold(Transform::identity(*date), |acc, frame| {
                trace!("chaining {} into {}", frame.name(), self.name());
                frame.transform_provider().get_transform(date) + acc
            })
    }

    fn unrelated(&self, other: &Frame<'_>) -> AstroError {
        AstroError::UnrelatedFrames(self.name().to_string(), other.name().to_string())
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Frame name='{}'>", self.name())
    }
}

impl fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("name", &self.name())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Sequence `[frame, parent, grandparent, …, root]` of a frame's ancestors.
///
/// Index 0 is the frame itself; `len()` is `depth + 1`.
#[derive(Clone, Copy)]
pub struct Ancestors<'t> {
    frame: Frame<'t>,
}

impl<'t> Ancestors<'t> {
    fn ids(&self) -> &'t [FrameId] {
        let tree = self.frame.tree;
        tree.node(self.frame.id)
            .ancestors
            .get_or_init(|| {
                let mut chain = Vec::with_capacity(self.frame.depth() + 1);
                let mut current = Some(self.frame.id);
                while let Some(id) = current {
                    chain.push(id);
                    current = tree.node(id).parent;
                }
                chain
            })
            .as_slice()
    }

    pub fn len(&self) -> usize {
        self.frame.depth() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ancestor at `index`, failing with [`AstroError::FrameHasNoParent`]
    /// (naming the root) past the root.
    pub fn get(&self, index: usize) -> Result<Frame<'t>, AstroError> {
        let ids = self.ids();
        match ids.get(index) {
            Some(id) => Ok(self.wrap(*id)),
            None => {
                let root = ids.last().copied().unwrap_or(self.frame.id);
                Err(AstroError::FrameHasNoParent(
                    self.frame.tree.node(root).name.clone(),
                ))
            }
        }
    }

    /// Ancestors in `range`, clamped to the chain length.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Vec<Frame<'t>> {
        let ids = self.ids();
        let start = match range.start_bound() {
            Bound::Included(s) => *s,
            Bound::Excluded(s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(e) => e + 1,
            Bound::Excluded(e) => *e,
            Bound::Unbounded => ids.len(),
        }
        .min(ids.len());

        if start >= end {
            return Vec::new();
        }
        ids[start..end].iter().map(|id| self.wrap(*id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Frame<'t>> + 't {
        let tree = self.frame.tree;
        self.ids().iter().map(move |id| Frame { tree, id: *id })
    }

    fn wrap(&self, id: FrameId) -> Frame<'t> {
        Frame {
            tree: self.frame.tree,
            id,
        }
    }
}

#[cfg(test)]
mod test_frame_tree {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;
    use hifitime::TimeScale;
    use nalgebra::Vector3;

    use super::*;
    use crate::{
        rotation::{Convention, Rotation},
        transform::FixedTransformProvider,
    };

    fn date() -> Epoch {
        Epoch::from_gregorian(2010, 3, 1, 0, 0, 0, 0, TimeScale::UTC)
    }

    fn translation(x: f64, y: f64, z: f64) -> FixedTransformProvider {
        FixedTransformProvider::new(
            Transform::identity(date()).with_translation(Vector3::new(x, y, z)),
        )
    }

    /// root → A → B and root → C
    fn sample_tree() -> FrameTree {
        let mut builder = FrameTreeBuilder::new();
        let root = builder
            .add_root("root", FixedTransformProvider::identity(), true)
            .unwrap();
        let a = builder
            .add_frame(root, "A", translation(1.0, 0.0, 0.0), true)
            .unwrap();
        let quarter_turn =
            Rotation::from_axis_angle(&Vector3::z(), FRAC_PI_2, Convention::Vector).unwrap();
        builder
            .add_frame(a, "B", FixedTransformProvider::from_rotation(quarter_turn), false)
            .unwrap();
        builder
            .add_frame(root, "C", translation(0.0, 0.0, 2.0), true)
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_depth_and_parent() {
        let tree = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        assert_eq!(b.depth(), 2);
        assert_eq!(b.parent().unwrap().name(), "A");
        assert!(tree.frame_by_name("root").unwrap().parent().is_none());
        assert!(!b.is_pseudo_inertial());
        assert_eq!(b.to_string(), "<Frame name='B'>");
    }

    #[test]
    fn test_ancestors() {
        let tree = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        let ancestors = b.ancestors();

        assert_eq!(ancestors.len(), 3);
        assert_eq!(ancestors.get(0).unwrap(), b);
        assert_eq!(ancestors.get(1).unwrap().name(), "A");
        assert_eq!(ancestors.get(2).unwrap().name(), "root");
        assert_eq!(
            ancestors.get(3),
            Err(AstroError::FrameHasNoParent("root".to_string()))
        );

        let names: Vec<_> = ancestors.slice(1..).iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["A", "root"]);
        assert_eq!(ancestors.slice(..10).len(), 3);
        assert!(ancestors.slice(5..).is_empty());
    }

    #[test]
    fn test_common_ancestor() {
        let tree = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        let c = tree.frame_by_name("C").unwrap();
        let a = tree.frame_by_name("A").unwrap();

        assert_eq!(b.find_common_ancestor(&c).unwrap().name(), "root");
        assert_eq!(c.find_common_ancestor(&b).unwrap().name(), "root");
        assert_eq!(b.find_common_ancestor(&a).unwrap(), a);
        assert_eq!(b.find_common_ancestor(&b).unwrap(), b);
    }

    #[test]
    fn test_transform_through_root() {
        let tree = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        let c = tree.frame_by_name("C").unwrap();

        // (1, 0, 0) in B is (0, -1, 0) in A, (-1, -1, 0) in root, (-1, -1, 2) in C
        let t = b.get_transform_to(&c, &date()).unwrap();
        assert_abs_diff_eq!(
            t.transform_position(&Vector3::new(1.0, 0.0, 0.0)),
            Vector3::new(-1.0, -1.0, 2.0),
            epsilon = 1e-15
        );

        let back = c.get_transform_to(&b, &date()).unwrap();
        assert_abs_diff_eq!(
            back.transform_position(&Vector3::new(-1.0, -1.0, 2.0)),
            Vector3::new(1.0, 0.0, 0.0),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_transform_matches_manual_composition() {
        let tree = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        let c = tree.frame_by_name("C").unwrap();
        let a = tree.frame_by_name("A").unwrap();

        let root_to_b = a.transform_provider().get_transform(&date())
            + b.transform_provider().get_transform(&date());
        let root_to_c = c.transform_provider().get_transform(&date());
        let expected = !root_to_b + root_to_c;

        let t = b.get_transform_to(&c, &date()).unwrap();
        assert_abs_diff_eq!(t.translation(), expected.translation(), epsilon = 1e-15);
        assert_abs_diff_eq!(
            t.rotation().distance_to(expected.rotation()),
            0.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_identity_to_self() {
        let tree = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        assert_eq!(
            b.get_transform_to(&b, &date()).unwrap(),
            Transform::identity(date())
        );
    }

    #[test]
    fn test_unrelated_frames() {
        let tree = sample_tree();
        let other = sample_tree();
        let b = tree.frame_by_name("B").unwrap();
        let c = other.frame_by_name("C").unwrap();
        assert_eq!(
            b.get_transform_to(&c, &date()),
            Err(AstroError::UnrelatedFrames("B".to_string(), "C".to_string()))
        );

        let mut builder = FrameTreeBuilder::new();
        builder
            .add_root("first", FixedTransformProvider::identity(), true)
            .unwrap();
        builder
            .add_root("second", FixedTransformProvider::identity(), true)
            .unwrap();
        let forest = builder.build();
        let first = forest.frame_by_name("first").unwrap();
        let second = forest.frame_by_name("second").unwrap();
        assert_eq!(
            first.find_common_ancestor(&second),
            Err(AstroError::UnrelatedFrames(
                "first".to_string(),
                "second".to_string()
            ))
        );
    }

    #[test]
    fn test_builder_errors() {
        let mut builder = FrameTreeBuilder::new();
        let root = builder
            .add_root("root", FixedTransformProvider::identity(), true)
            .unwrap();
        assert_eq!(
            builder.add_frame(root, "root", FixedTransformProvider::identity(), true),
            Err(AstroError::DuplicateFrameName("root".to_string()))
        );
        assert_eq!(
            builder.add_frame(FrameId(7), "X", FixedTransformProvider::identity(), true),
            Err(AstroError::FrameNotFound("#7".to_string()))
        );
        assert_eq!(builder.find("root"), Some(root));

        let tree = builder.build();
        assert_eq!(
            tree.frame_by_name("nope"),
            Err(AstroError::FrameNotFound("nope".to_string()))
        );
        assert_eq!(tree.len(), 1);
    }
}
