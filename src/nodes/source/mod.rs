//! Audio source nodes (generators with no audio inputs)
//!
//! [`Oscillator`] and [`ConstantSource`] are *scheduled* sources: they output
//! zeros until they receive [`Lifecycle::Start`], and go back to zeros for good
//! after [`Lifecycle::Stop`]. [`SourceHandle`] enforces that each is started
//! exactly once from the control side.

mod carrier;
mod constant;
mod oscillator;

pub use carrier::CarrierInput;
pub use constant::{ConstantMessage, ConstantSource};
pub use oscillator::Oscillator;

use crate::error::{Error, Result};
use crate::graph::Handle;

/// Start/stop commands for scheduled sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Start,
    Stop,
}

/// Where a scheduled source is in its one-way lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Idle,
    Playing,
    Stopped,
}

impl Playback {
    /// Apply a lifecycle command. Out-of-order commands are ignored:
    /// a stopped source cannot be restarted.
    pub fn apply(&mut self, cmd: Lifecycle) {
        *self = match (*self, cmd) {
            (Playback::Idle, Lifecycle::Start) => Playback::Playing,
            (Playback::Playing, Lifecycle::Stop) | (Playback::Idle, Lifecycle::Stop) => Playback::Stopped,
            (state, _) => state,
        };
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        *self == Playback::Playing
    }
}

/// Control-side handle to a scheduled source.
///
/// Tracks the lifecycle so `start` can only succeed once, mirroring the
/// node's own state without reading it back from the audio thread.
pub struct SourceHandle<M: From<Lifecycle> + Send + 'static> {
    handle: Handle<M>,
    name: &'static str,
    playback: Playback,
}

impl<M: From<Lifecycle> + Send + 'static> SourceHandle<M> {
    pub fn new(handle: Handle<M>, name: &'static str) -> Self {
        Self { handle, name, playback: Playback::Idle }
    }

    /// Start the source. Fails with [`Error::AlreadyStarted`] on a second call.
    pub fn start(&mut self) -> Result<()> {
        if self.playback != Playback::Idle {
            return Err(Error::AlreadyStarted(self.name));
        }
        self.send(Lifecycle::Start)?;
        self.playback = Playback::Playing;
        Ok(())
    }

    /// Stop the source for good. Stopping twice is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        match self.playback {
            Playback::Idle => Err(Error::NotStarted(self.name)),
            Playback::Stopped => Ok(()),
            Playback::Playing => {
                self.send(Lifecycle::Stop)?;
                self.playback = Playback::Stopped;
                Ok(())
            }
        }
    }

    pub fn handle_mut(&mut self) -> &mut Handle<M> {
        &mut self.handle
    }

    fn send(&mut self, cmd: Lifecycle) -> Result<()> {
        self.handle
            .send(M::from(cmd))
            .map_err(|_| Error::QueueFull(self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AudioGraph;

    #[test]
    fn playback_is_one_way() {
        let mut p = Playback::default();
        p.apply(Lifecycle::Stop);
        assert_eq!(p, Playback::Stopped);
        p.apply(Lifecycle::Start);
        assert_eq!(p, Playback::Stopped);

        let mut p = Playback::default();
        p.apply(Lifecycle::Start);
        assert!(p.is_playing());
        p.apply(Lifecycle::Start);
        assert!(p.is_playing());
    }

    #[test]
    fn start_only_once() {
        let mut graph = AudioGraph::new(48_000);
        let mut osc = SourceHandle::new(graph.add(Oscillator::new()), "oscillator");

        assert!(matches!(osc.stop(), Err(Error::NotStarted("oscillator"))));
        assert!(osc.start().is_ok());
        assert!(matches!(osc.start(), Err(Error::AlreadyStarted("oscillator"))));
        assert!(osc.stop().is_ok());
        assert!(osc.stop().is_ok());
        assert!(matches!(osc.start(), Err(Error::AlreadyStarted(_))));
    }
}
