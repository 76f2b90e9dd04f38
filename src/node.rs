//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call. Besides the sample rate it carries
/// the timeline position of the block, which is what lets automated
/// parameters ramp with sample accuracy.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Context time in seconds of the first sample in this block
    pub time: f64,
}

impl ProcessContext {
    /// Context time of sample `index` within the current block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }
}

/// Unique identifier for a node within a graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: Generate audio (0 inputs, 1 output) - capture, oscillators, constants
/// - **Effects**: Process audio (1+ inputs, 1 output) - ring modulator, gain
/// - **Sinks**: Terminate the graph - the destination
///
/// # Message-Based Parameters
///
/// Nodes never share mutable state with the control thread. Parameter updates
/// arrive as messages and are drained at the start of `process()`.
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates.
    ///
    /// Use a custom enum for nodes with parameters, or `()` for nodes without.
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// Your implementation should:
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write to `outputs`
    ///
    /// Must not block or allocate; this runs on the device callback.
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );
}
