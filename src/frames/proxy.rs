//! Lazily initialized frame handles.
//!
//! A [`FrameProxy`] wraps a factory function returning a `'static` frame.
//! The factory runs once, on first use; every later access reuses the frame it
//! returned. Proxies are meant to be declared as `static` items:
//!
//! ```rust, ignore
//! static MY_FRAME: FrameProxy = FrameProxy::with_factory(|| MY_TREE.frame_by_name("MY_FRAME"));
//! ```
//!
//! or declared empty with [`FrameProxy::new`] and wired later with
//! [`FrameProxy::register_factory`].
use std::fmt;

use hifitime::Epoch;
use log::debug;
use once_cell::sync::OnceCell;

use crate::{astro_errors::AstroError, transform::Transform};

use super::{tree::Ancestors, AsFrame, Frame};

pub type FrameFactory = fn() -> Result<Frame<'static>, AstroError>;

pub struct FrameProxy {
    builtin_factory: Option<FrameFactory>,
    registered_factory: OnceCell<FrameFactory>,
    frame: OnceCell<Frame<'static>>,
}

impl Default for FrameProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameProxy {
    /// Proxy without factory; one must be registered before first use.
    pub const fn new() -> Self {
        FrameProxy {
            builtin_factory: None,
            registered_factory: OnceCell::new(),
            frame: OnceCell::new(),
        }
    }

    pub const fn with_factory(factory: FrameFactory) -> Self {
        FrameProxy {
            builtin_factory: Some(factory),
            registered_factory: OnceCell::new(),
            frame: OnceCell::new(),
        }
    }

    /// Attach the factory of a proxy created with [`FrameProxy::new`].
    ///
    /// Fails with [`AstroError::FactoryAlreadyRegistered`] if the proxy
    /// already has one.
    pub fn register_factory(&self, factory: FrameFactory) -> Result<(), AstroError> {
        if self.builtin_factory.is_some() {
            return Err(AstroError::FactoryAlreadyRegistered);
        }
        self.registered_factory
            .set(factory)
            .map_err(|_| AstroError::FactoryAlreadyRegistered)
    }

    pub fn is_initialized(&self) -> bool {
        self.frame.get().is_some()
    }

    /// The proxied frame, running the factory on first access.
    ///
    /// Concurrent first accesses run the factory at most once.
    pub fn frame(&self) -> Result<Frame<'static>, AstroError> {
        self.frame
            .get_or_try_init(|| {
                let factory = self
                    .builtin_factory
                    .or_else(|| self.registered_factory.get().copied())
                    .ok_or(AstroError::FactoryNotRegistered)?;
                let frame = factory()?;
                debug!("frame proxy initialized with {}", frame.name());
                Ok(frame)
            })
            .copied()
    }

    pub fn name(&self) -> Result<&'static str, AstroError> {
        Ok(self.frame()?.name())
    }

    pub fn parent(&self) -> Result<Option<Frame<'static>>, AstroError> {
        Ok(self.frame()?.parent())
    }

    pub fn depth(&self) -> Result<usize, AstroError> {
        Ok(self.frame()?.depth())
    }

    pub fn is_pseudo_inertial(&self) -> Result<bool, AstroError> {
        Ok(self.frame()?.is_pseudo_inertial())
    }

    pub fn ancestors(&self) -> Result<Ancestors<'static>, AstroError> {
        Ok(self.frame()?.ancestors())
    }

    pub fn find_common_ancestor<F: AsFrame + ?Sized>(
        &self,
        other: &F,
    ) -> Result<Frame<'static>, AstroError> {
        self.frame()?.find_common_ancestor(&other.as_frame()?)
    }

    pub fn get_transform_to<F: AsFrame + ?Sized>(
        &self,
        destination: &F,
        date: &Epoch,
    ) -> Result<Transform, AstroError> {
        self.frame()?.get_transform_to(destination, date)
    }
}

impl fmt::Debug for FrameProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame.get() {
            Some(frame) => write!(f, "FrameProxy({frame:?})"),
            None => write!(f, "FrameProxy(<uninitialized>)"),
        }
    }
}

#[cfg(test)]
mod test_frame_proxy {
    use once_cell::sync::Lazy;

    use super::*;
    use crate::frames::tree::{FrameTree, FrameTreeBuilder};
    use crate::transform::FixedTransformProvider;

    static TREE: Lazy<FrameTree> = Lazy::new(|| {
        let mut builder = FrameTreeBuilder::new();
        let root = builder
            .add_root("ROOT", FixedTransformProvider::identity(), true)
            .expect("root");
        builder
            .add_frame(root, "CHILD", FixedTransformProvider::identity(), true)
            .expect("child");
        builder.build()
    });

    fn root_factory() -> Result<Frame<'static>, AstroError> {
        Lazy::force(&TREE).frame_by_name("ROOT")
    }

    fn child_factory() -> Result<Frame<'static>, AstroError> {
        Lazy::force(&TREE).frame_by_name("CHILD")
    }

    #[test]
    fn test_lazy_initialization() {
        static CHILD: FrameProxy = FrameProxy::with_factory(child_factory);
        assert!(!CHILD.is_initialized());
        assert_eq!(CHILD.depth().unwrap(), 1);
        assert!(CHILD.is_initialized());
        assert_eq!(CHILD.parent().unwrap().unwrap().name(), "ROOT");
        assert_eq!(CHILD.name().unwrap(), "CHILD");
    }

    #[test]
    fn test_unregistered_factory() {
        let proxy = FrameProxy::new();
        assert_eq!(proxy.frame(), Err(AstroError::FactoryNotRegistered));
        assert_eq!(proxy.name(), Err(AstroError::FactoryNotRegistered));
        assert!(!proxy.is_initialized());
    }

    #[test]
    fn test_register_factory_once() {
        let proxy = FrameProxy::new();
        proxy.register_factory(root_factory).unwrap();
        assert_eq!(
            proxy.register_factory(child_factory),
            Err(AstroError::FactoryAlreadyRegistered)
        );
        assert_eq!(proxy.name().unwrap(), "ROOT");

        let builtin = FrameProxy::with_factory(root_factory);
        assert_eq!(
            builtin.register_factory(child_factory),
            Err(AstroError::FactoryAlreadyRegistered)
        );
    }

    #[test]
    fn test_proxy_to_proxy_transform() {
        let root = FrameProxy::with_factory(root_factory);
        let child = FrameProxy::with_factory(child_factory);
        let date = Epoch::from_mjd_in_time_scale(55000.0, hifitime::TimeScale::TT);

        let t = child.get_transform_to(&root, &date).unwrap();
        assert_eq!(t, Transform::identity(date));
        assert_eq!(child.find_common_ancestor(&root).unwrap().name(), "ROOT");
        assert_eq!(root.frame().unwrap(), TREE.frame_by_name("ROOT").unwrap());
    }
}
