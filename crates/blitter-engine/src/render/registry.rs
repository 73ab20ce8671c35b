use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use state::InitCell;

use crate::error::{RenderError, Result};

static GLOBAL: InitCell<Arc<SurfaceRegistry>> = InitCell::new();

/// Allows at most one live [`RenderSurface`](super::RenderSurface) per registry.
///
/// [`SurfaceRegistry::global`] is the process-wide default. Tests and embedders
/// that need independent surfaces pass their own registry to
/// [`RenderSurface::with_registry`](super::RenderSurface::with_registry).
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    claimed: AtomicBool,
}

impl SurfaceRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(SurfaceRegistry::new))
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Takes the slot until the returned claim is dropped.
    pub(crate) fn claim(self: &Arc<Self>) -> Result<SurfaceClaim> {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RenderError::AlreadyInitialized)?;
        Ok(SurfaceClaim {
            registry: Arc::clone(self),
        })
    }
}

/// Held by a live surface; frees the registry slot on drop.
#[derive(Debug)]
pub(crate) struct SurfaceClaim {
    registry: Arc<SurfaceRegistry>,
}

impl Drop for SurfaceClaim {
    fn drop(&mut self) {
        self.registry.claimed.store(false, Ordering::Release);
    }
}
