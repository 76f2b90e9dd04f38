//! The audio context: timeline, run state and the render side of the graph.

use dasp_graph::Buffer;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::clock::{Clock, ContextState};
use crate::error::Result;
use crate::graph::AudioGraph;

/// Pulls audio out of a finished graph, one sample at a time.
///
/// The renderer is what an audio device callback owns. It processes the graph
/// in 64-sample blocks, hands the destination's output out sample by sample
/// (device buffers don't have to be a multiple of 64), and advances the
/// [`Clock`] by one block each time it processes one.
///
/// While the clock is suspended the renderer writes silence and leaves the
/// graph untouched, so no sample leaves the graph and the timeline stays frozen.
pub struct Renderer {
    graph: AudioGraph,
    clock: Clock,
    block: Buffer,
    cursor: usize,
}

impl Renderer {
    pub(crate) fn new(graph: AudioGraph, clock: Clock) -> Self {
        Self {
            graph,
            clock,
            block: Buffer::default(),
            cursor: Buffer::LEN,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.graph.sample_rate()
    }

    /// Fill a mono buffer. Returns `false` (and writes silence) while suspended.
    pub fn render(&mut self, out: &mut [f32]) -> bool {
        self.render_with(out, 1, 0.0, |s| s)
    }

    /// Fill an interleaved buffer, writing the same sample to every channel of a frame.
    ///
    /// `convert` maps the graph's `f32` output to the device sample type.
    /// Returns `false` (and writes `silence`) while suspended.
    pub fn render_with<T: Copy>(
        &mut self,
        out: &mut [T],
        channels: usize,
        silence: T,
        convert: impl Fn(f32) -> T,
    ) -> bool {
        if !self.clock.is_running() {
            out.iter_mut().for_each(|s| *s = silence);
            return false;
        }

        for frame in out.chunks_mut(channels.max(1)) {
            let sample = convert(self.next_sample());
            frame.iter_mut().for_each(|s| *s = sample);
        }
        true
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        if self.cursor == Buffer::LEN {
            self.render_block();
        }
        let sample = self.block[self.cursor];
        self.cursor += 1;
        sample
    }

    fn render_block(&mut self) {
        self.graph.process(self.clock.current_time());

        match self.graph.terminal_output().and_then(|buffers| buffers.first()) {
            Some(out) => self.block.copy_from_slice(out),
            None => self.block.iter_mut().for_each(|s| *s = 0.0),
        }

        self.clock.advance(Buffer::LEN as u64);
        self.cursor = 0;
    }
}

/// The owning context of the effect: timeline plus the device backend.
///
/// Created once, suspended. It only leaves `Suspended` through
/// [`resume`](Self::resume), which the [`Transport`](crate::Transport) calls in
/// response to a user toggle.
pub struct AudioContext<B: Backend> {
    clock: Clock,
    backend: B,
}

impl<B: Backend> AudioContext<B> {
    /// Wrap a backend. The context always starts suspended.
    pub(crate) fn new(clock: Clock, backend: B) -> Self {
        clock.set_running(false);
        Self { clock, backend }
    }

    pub fn state(&self) -> ContextState {
        self.clock.state()
    }

    /// Context time in seconds; frozen while suspended.
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Stop delivering audio. No-op when already suspended.
    ///
    /// The render gate closes before the device is asked to stop, so nothing
    /// reaches the sink after this call starts. If the device rejects the
    /// transition the context stays running.
    pub fn suspend(&mut self) -> Result<()> {
        if self.state() == ContextState::Suspended {
            return Ok(());
        }

        self.clock.set_running(false);
        if let Err(e) = self.backend.suspend() {
            warn!(error = %e, "device refused to suspend");
            self.clock.set_running(true);
            return Err(e);
        }

        info!(time = self.current_time(), "context suspended");
        Ok(())
    }

    /// Start delivering audio. No-op when already running.
    ///
    /// If the device is unavailable the context stays suspended and the error
    /// is returned; calling again later retries.
    pub fn resume(&mut self) -> Result<()> {
        if self.state() == ContextState::Running {
            return Ok(());
        }

        if let Err(e) = self.backend.resume() {
            warn!(error = %e, "device refused to resume");
            return Err(e);
        }
        self.clock.set_running(true);

        info!(time = self.current_time(), "context running");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OfflineBackend;
    use crate::nodes::sink::Destination;
    use crate::nodes::source::{ConstantMessage, ConstantSource, Lifecycle};

    fn constant_renderer(value: f32) -> Renderer {
        let clock = Clock::new(48_000);
        let mut graph = AudioGraph::new(48_000);
        let mut source = graph.add(ConstantSource::new(value));
        let dest = graph.add(Destination::new());
        graph.connect(&source, &dest);
        graph.set_terminal(&dest);
        assert!(source.send(ConstantMessage::Lifecycle(Lifecycle::Start)).is_ok());
        Renderer::new(graph, clock)
    }

    #[test]
    fn suspended_renderer_is_silent_and_frozen() {
        let mut renderer = constant_renderer(0.5);
        let mut out = [1.0f32; 100];
        assert!(!renderer.render(&mut out));
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(renderer.clock().frames(), 0);
    }

    #[test]
    fn running_renderer_spans_block_boundaries() {
        let mut renderer = constant_renderer(0.5);
        renderer.clock().set_running(true);

        let mut out = [0.0f32; 100];
        assert!(renderer.render(&mut out));
        assert!(out.iter().all(|&s| s == 0.5));
        // two blocks were needed for 100 samples
        assert_eq!(renderer.clock().frames(), 128);
    }

    #[test]
    fn interleaved_output_duplicates_frames() {
        let mut renderer = constant_renderer(0.25);
        renderer.clock().set_running(true);

        let mut out = [0i32; 8];
        renderer.render_with(&mut out, 2, 0, |s| (s * 100.0) as i32);
        assert_eq!(out, [25; 8]);
    }

    #[test]
    fn context_transitions_are_idempotent() {
        let renderer = constant_renderer(0.5);
        let clock = renderer.clock().clone();
        let mut ctx = AudioContext::new(clock, OfflineBackend::new(renderer));

        assert_eq!(ctx.state(), ContextState::Suspended);
        assert!(ctx.suspend().is_ok());
        assert!(ctx.resume().is_ok());
        assert!(ctx.resume().is_ok());
        assert_eq!(ctx.state(), ContextState::Running);
        assert!(ctx.suspend().is_ok());
        assert!(ctx.suspend().is_ok());
        assert_eq!(ctx.state(), ContextState::Suspended);
    }

    #[test]
    fn unavailable_device_keeps_state() {
        let renderer = constant_renderer(0.5);
        let clock = renderer.clock().clone();
        let mut ctx = AudioContext::new(clock, OfflineBackend::new(renderer));

        ctx.backend_mut().set_available(false);
        assert!(matches!(ctx.resume(), Err(crate::Error::DeviceUnavailable(_))));
        assert_eq!(ctx.state(), ContextState::Suspended);

        ctx.backend_mut().set_available(true);
        assert!(ctx.resume().is_ok());

        ctx.backend_mut().set_available(false);
        assert!(ctx.suspend().is_err());
        assert_eq!(ctx.state(), ContextState::Running);
    }

    #[test]
    fn time_freezes_while_suspended() {
        let renderer = constant_renderer(0.5);
        let clock = renderer.clock().clone();
        let mut ctx = AudioContext::new(clock, OfflineBackend::new(renderer));
        let mut out = [0.0f32; 64];

        ctx.resume().unwrap();
        ctx.backend_mut().render(&mut out);
        let t = ctx.current_time();
        assert!(t > 0.0);

        ctx.suspend().unwrap();
        ctx.backend_mut().render(&mut out);
        assert_eq!(ctx.current_time(), t);
    }
}
