use std::ops::{Deref, DerefMut};

use crate::device::GraphicsDevice;
use crate::error::Result;

use super::RenderSurface;

/// An open frame on a [`RenderSurface`].
///
/// Dereferences to the surface, so draws and `present` go through the guard.
/// The frame ends when the guard is dropped, including on early return and
/// unwinding. The exclusive borrow rules out overlapping frames.
pub struct Frame<'s, D: GraphicsDevice> {
    surface: &'s mut RenderSurface<D>,
}

impl<'s, D: GraphicsDevice> Frame<'s, D> {
    pub(super) fn begin(surface: &'s mut RenderSurface<D>) -> Result<Self> {
        surface.device_mut().begin_frame()?;
        log::trace!("frame begin");
        Ok(Self { surface })
    }

    /// Ends the frame now.
    pub fn finish(self) {}
}

impl<D: GraphicsDevice> Deref for Frame<'_, D> {
    type Target = RenderSurface<D>;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<D: GraphicsDevice> DerefMut for Frame<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl<D: GraphicsDevice> Drop for Frame<'_, D> {
    fn drop(&mut self) {
        self.surface.device_mut().end_frame();
        log::trace!("frame end");
    }
}
