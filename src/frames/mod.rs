//! # Reference frames
//!
//! Frames are organized as trees: every frame but the root has a parent and a
//! [`TransformProvider`](crate::transform::TransformProvider) returning, for
//! any date, the transform from that parent to the frame. The transform
//! between two arbitrary frames is obtained by climbing to their lowest
//! common ancestor and chaining the per-hop transforms.
//!
//! ## Components
//! -----------------
//! * [`FrameTree`] / [`FrameTreeBuilder`] – arena holding the frame nodes.
//! * [`Frame`] – `Copy` handle on a node; all queries go through it.
//! * [`Ancestors`] – the `[frame, parent, …, root]` chain of a frame.
//! * [`FrameProxy`] – lazily initialized `'static` frame, for global frames.
//! * [`builtin`] – GCRF, EME2000, MOD (IAU 1976) and TOD (IAU 1980).
//!
//! ## Example
//! -----------------
//! ```rust, ignore
//! use astroframes::frames::builtin::{EME2000, GCRF};
//!
//! let t = GCRF.get_transform_to(&EME2000, &epoch)?;
//! let (p, v, _) = t.transform(&p_gcrf, &v_gcrf, None);
//! ```
use crate::astro_errors::AstroError;

pub mod builtin;
pub mod proxy;
pub mod tree;

pub use proxy::{FrameFactory, FrameProxy};
pub use tree::{Ancestors, Frame, FrameId, FrameTree, FrameTreeBuilder};

/// Anything that resolves to a [`Frame`]: frames themselves and proxies.
pub trait AsFrame {
    fn as_frame(&self) -> Result<Frame<'_>, AstroError>;
}

impl AsFrame for Frame<'_> {
    fn as_frame(&self) -> Result<Frame<'_>, AstroError> {
        Ok(*self)
    }
}

impl AsFrame for FrameProxy {
    fn as_frame(&self) -> Result<Frame<'_>, AstroError> {
        self.frame()
    }
}
