//! Shared processing timeline.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Whether the context is delivering audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContextState {
    Suspended,
    Running,
}

#[derive(Debug)]
struct ClockInner {
    frames: AtomicU64,
    running: AtomicBool,
}

/// The context timeline, shared between the control thread and the renderer.
///
/// Time is measured in rendered frames: it only advances when the renderer
/// produces a block, so it is frozen while suspended and advances at the
/// device's pace while running. Cloning is cheap; all clones see the same clock.
#[derive(Clone, Debug)]
pub struct Clock {
    inner: Arc<ClockInner>,
    sample_rate: u32,
}

impl Clock {
    /// A new clock at time zero, suspended.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            inner: Arc::new(ClockInner {
                frames: AtomicU64::new(0),
                running: AtomicBool::new(false),
            }),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.inner.frames.load(Ordering::Acquire)
    }

    /// Current context time in seconds.
    ///
    /// This is the time of the next sample the renderer will produce, so a
    /// parameter update stamped with it takes effect at the very next block.
    #[inline]
    pub fn current_time(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ContextState {
        if self.is_running() {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.inner.running.store(running, Ordering::Release);
    }

    /// Called by the renderer after each block.
    #[inline]
    pub(crate) fn advance(&self, frames: u64) {
        self.inner.frames.fetch_add(frames, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_suspended_at_zero() {
        let clock = Clock::new(48_000);
        assert_eq!(clock.state(), ContextState::Suspended);
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn clones_share_the_timeline() {
        let clock = Clock::new(48_000);
        let other = clock.clone();
        clock.advance(24_000);
        other.set_running(true);
        assert_eq!(other.current_time(), 0.5);
        assert_eq!(clock.state(), ContextState::Running);
    }
}
