//! Live capture input

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, ProcessContext};

/// The carrier: raw capture samples, read from a lock-free ring buffer.
///
/// The capture side (a device callback, or a test) pushes mono samples into the
/// paired [`Producer`]; this node pops one block's worth per process call and
/// passes them through untouched. When the ring buffer runs dry the missing
/// samples are silent and counted as dropouts.
pub struct CarrierInput {
    samples: Consumer<f32>,
    dropouts: Arc<AtomicU64>,
}

impl CarrierInput {
    pub fn new(samples: Consumer<f32>) -> Self {
        Self {
            samples,
            dropouts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a carrier along with the producer that feeds it.
    pub fn channel(capacity: usize) -> (Producer<f32>, Self) {
        let (producer, consumer) = RingBuffer::new(capacity);
        (producer, Self::new(consumer))
    }

    /// Shared counter of samples that were missing when the graph needed them.
    ///
    /// Grab this before the node is moved into a graph.
    pub fn dropout_counter(&self) -> Arc<AtomicU64> {
        self.dropouts.clone()
    }
}

impl AudioNode for CarrierInput {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let Some(out) = outputs.first_mut() else {
            return;
        };

        let mut missing = 0u64;
        for sample in out.iter_mut() {
            *sample = self.samples.pop().unwrap_or_else(|_| {
                missing += 1;
                0.0
            });
        }

        if missing > 0 {
            self.dropouts.fetch_add(missing, Ordering::Relaxed);
        }
    }
}
