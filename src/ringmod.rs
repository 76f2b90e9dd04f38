//! The ring modulator: fixed topology plus the control entry points.

use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::automation::{AutomationEvent, ParamControl};
use crate::backend::{Backend, OfflineBackend};
use crate::clock::{Clock, ContextState};
use crate::config::RingModConfig;
use crate::context::{AudioContext, Renderer};
use crate::error::Result;
use crate::graph::{AudioGraph, Handle};
use crate::level::{db_to_gain, format_level, format_rate};
use crate::nodes::{
    CarrierInput, ConstantMessage, ConstantSource, Destination, Gain, Lifecycle, Oscillator,
    RingModulator, SourceHandle,
};
use crate::transport::{Transport, TransportState};

/// Control handles into a freshly wired graph.
struct Patch {
    graph: AudioGraph,
    rate_source: SourceHandle<ConstantMessage>,
    oscillator: SourceHandle<Lifecycle>,
    ring: Handle<AutomationEvent>,
    output: Handle<AutomationEvent>,
}

impl Patch {
    /// Wire the effect:
    ///
    /// ```text
    /// rate ─► oscillator ─┐
    /// carrier ────────────┴► ring(depth) ─► output gain ─► destination
    /// ```
    ///
    /// Both scheduled sources are started here, before any renderer exists,
    /// so they are running by the time the context can first leave `Suspended`.
    fn build(
        carrier: CarrierInput,
        sample_rate: u32,
        queue_size: usize,
        rate_hz: f32,
        depth: f32,
        output_gain: f32,
    ) -> Result<Self> {
        let mut graph = AudioGraph::new(sample_rate);

        let carrier = graph.add_with_queue_size(carrier, 1);
        let rate_source = graph.add_with_queue_size(ConstantSource::new(rate_hz), queue_size);
        let oscillator = graph.add_with_queue_size(Oscillator::new(), queue_size);
        let ring = graph.add_with_queue_size(RingModulator::new(depth), queue_size);
        let output = graph.add_with_queue_size(Gain::new(output_gain), queue_size);
        let destination = graph.add(Destination::new());

        graph.connect(&rate_source, &oscillator);
        graph.connect(&carrier, &ring);
        graph.connect(&oscillator, &ring);
        graph.connect(&ring, &output);
        graph.connect(&output, &destination);
        graph.set_terminal(&destination);

        let mut rate_source = SourceHandle::new(rate_source, "rate source");
        let mut oscillator = SourceHandle::new(oscillator, "oscillator");
        rate_source.start()?;
        oscillator.start()?;

        Ok(Self { graph, rate_source, oscillator, ring, output })
    }
}

/// A live ring modulator.
///
/// Owns the [`AudioContext`] (and through it the device and every node) plus
/// the control-side handles. The host calls the `on_*` methods in response to
/// UI events; the audio itself runs on the backend's thread.
///
/// # Initial State
///
/// Suspended and silent, rate 5 Hz, depth 0.0, output 0 dBFS (as configured).
/// Nothing is heard until [`on_transport_toggle`](Self::on_transport_toggle).
pub struct RingMod<B: Backend> {
    context: AudioContext<B>,
    transport: Transport,
    rate_source: SourceHandle<ConstantMessage>,
    oscillator: SourceHandle<Lifecycle>,
    ring: Handle<AutomationEvent>,
    output: Handle<AutomationEvent>,
    rate: ParamControl,
    depth: ParamControl,
    level: ParamControl,
    dropouts: Arc<AtomicU64>,
}

impl<B: Backend> RingMod<B> {
    /// Build the graph around `carrier` and hand its renderer to `open`,
    /// which returns the backend that will pull from it.
    ///
    /// Fails without side effects if the configuration is invalid, the capture
    /// constraints aren't raw or the backend can't be opened.
    pub fn with_backend(
        config: &RingModConfig,
        carrier: CarrierInput,
        sample_rate: u32,
        open: impl FnOnce(Renderer) -> Result<B>,
    ) -> Result<Self> {
        config.validate()?;

        let rate = ParamControl::new("rate", config.rate_hz, 0.0, config.max_rate_hz);
        let depth = ParamControl::new("depth", config.depth, 0.0, 1.0);
        let level = ParamControl::new(
            "output level",
            config.output_db,
            config.min_output_db,
            config.max_output_db,
        );

        let dropouts = carrier.dropout_counter();
        let patch = Patch::build(
            carrier,
            sample_rate,
            config.queue_size,
            rate.target(),
            depth.target(),
            db_to_gain(level.target()),
        )?;

        let clock = Clock::new(sample_rate);
        let backend = open(Renderer::new(patch.graph, clock.clone()))?;
        let context = AudioContext::new(clock, backend);
        let transport = Transport::new(&context);

        info!(
            sample_rate,
            rate = %format_rate(rate.target()),
            depth = depth.target(),
            level = %format_level(level.target()),
            "ring modulator ready"
        );

        Ok(Self {
            context,
            transport,
            rate_source: patch.rate_source,
            oscillator: patch.oscillator,
            ring: patch.ring,
            output: patch.output,
            rate,
            depth,
            level,
            dropouts,
        })
    }

    /// Start/stop trigger from the UI. Returns the new transport state.
    ///
    /// On failure the state is unchanged and the error should be shown to the
    /// operator; toggling again retries.
    pub fn on_transport_toggle(&mut self) -> Result<TransportState> {
        self.transport.toggle(&mut self.context)
    }

    /// New modulator rate in Hz. Negative values clamp to 0, NaN is ignored.
    ///
    /// Returns the rate now being ramped to.
    pub fn on_rate_change(&mut self, hz: f32) -> Result<f32> {
        let now = self.context.current_time();
        self.rate
            .schedule(self.rate_source.handle_mut(), hz, now, ConstantMessage::Offset)
    }

    /// New modulation depth, clamped to `[0, 1]`.
    pub fn on_depth_change(&mut self, depth: f32) -> Result<f32> {
        let now = self.context.current_time();
        self.depth.schedule(&mut self.ring, depth, now, |event| event)
    }

    /// New output level in dBFS, clamped to the configured range.
    ///
    /// The gain stage receives `10^(dBFS/20)`. Returns the level (in dBFS) now
    /// being ramped to.
    pub fn on_output_level_change(&mut self, db: f32) -> Result<f32> {
        let now = self.context.current_time();
        self.level.schedule(&mut self.output, db, now, |event| AutomationEvent {
            value: db_to_gain(event.value),
            ..event
        })
    }

    /// Whether audio is currently reaching the device.
    pub fn is_audible(&self) -> bool {
        self.context.state() == ContextState::Running
    }

    pub fn state(&self) -> ContextState {
        self.context.state()
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn current_time(&self) -> f64 {
        self.context.current_time()
    }

    pub fn rate_hz(&self) -> f32 {
        self.rate.target()
    }

    pub fn depth(&self) -> f32 {
        self.depth.target()
    }

    pub fn output_db(&self) -> f32 {
        self.level.target()
    }

    /// e.g. `"5.0 Hz"`
    pub fn rate_label(&self) -> String {
        format_rate(self.rate.target())
    }

    /// e.g. `"-20 dBFS"`
    pub fn level_label(&self) -> String {
        format_level(self.level.target())
    }

    /// Carrier samples that were missing when the graph needed them.
    pub fn carrier_dropouts(&self) -> u64 {
        self.dropouts.load(Ordering::Relaxed)
    }

    /// Read-only view of the context. Transitions go through
    /// [`on_transport_toggle`](Self::on_transport_toggle).
    pub fn context(&self) -> &AudioContext<B> {
        &self.context
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.context.backend_mut()
    }

    /// Shut the effect down: suspend the context, then stop both scheduled
    /// sources. Dropping the effect afterwards releases the device.
    pub fn close(mut self) -> Result<()> {
        self.context.suspend()?;
        self.rate_source.stop()?;
        self.oscillator.stop()?;
        info!(time = self.context.current_time(), "ring modulator closed");
        Ok(())
    }
}

impl RingMod<OfflineBackend> {
    /// A device-less ring modulator, rendered with [`render`](Self::render).
    pub fn offline(config: &RingModConfig, carrier: CarrierInput) -> Result<Self> {
        Self::with_backend(config, carrier, config.offline_sample_rate(), |renderer| {
            Ok(OfflineBackend::new(renderer))
        })
    }

    /// Pull mono output. Returns `false` (silence) while suspended.
    pub fn render(&mut self, out: &mut [f32]) -> bool {
        self.context.backend_mut().render(out)
    }
}
