//! Device backends.
//!
//! A backend is whatever actually pulls samples out of a [`Renderer`] and can
//! be told to stop and start doing so. [`CpalBackend`](crate::CpalBackend)
//! (feature `cpal_sink`) drives real hardware; [`OfflineBackend`] is pulled by
//! hand, which is how the tests and benchmarks run the effect.

use crate::context::Renderer;
use crate::error::{Error, Result};

/// Start/stop control over the device that pulls from a [`Renderer`].
///
/// Both calls return once the device has acknowledged the transition.
pub trait Backend {
    fn suspend(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
}

/// A backend without hardware. Audio is rendered on demand with [`render`](Self::render).
///
/// The device can be marked unavailable to exercise transition failures.
pub struct OfflineBackend {
    renderer: Renderer,
    available: bool,
}

impl OfflineBackend {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer, available: true }
    }

    /// Make subsequent transitions succeed (`true`) or fail with
    /// [`Error::DeviceUnavailable`] (`false`).
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Pull mono samples, as a device callback would. Returns `false` if the
    /// context is suspended (the buffer is then silent).
    pub fn render(&mut self, out: &mut [f32]) -> bool {
        self.renderer.render(out)
    }

    fn check_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(Error::DeviceUnavailable("offline device disabled".into()))
        }
    }
}

impl Backend for OfflineBackend {
    fn suspend(&mut self) -> Result<()> {
        self.check_available()
    }

    fn resume(&mut self) -> Result<()> {
        self.check_available()
    }
}
