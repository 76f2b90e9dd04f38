//! Ring modulation: sample-by-sample multiplication of signals

/*
Ring Modulation
===============

    output[t] = carrier[t] × modulator[t] × depth(t)

This is multiplication, not mixing. With a sine modulator at f_m the carrier's
spectrum is shifted to (f_c - f_m) and (f_c + f_m) and the original f_c
disappears:

    sin(A) × sin(B) = ½[cos(A - B) - cos(A + B)]

At LFO rates (a few Hz) the result sounds like a deep, zero-crossing tremolo;
at audio rates it turns metallic.

depth = 0 gives silence, not the dry carrier. Nothing is clamped; the output
stage may clip if pushed past full scale.

The product is commutative, so the node doesn't care which input is the
carrier and which is the modulator. That matters because the graph doesn't
guarantee input order.
*/

use dasp_graph::{Buffer, Input};

use crate::automation::{AutomatedParam, AutomationEvent};
use crate::node::{AudioNode, ProcessContext};

/// Multiply a signal by a modulator, writing the result into the signal buffer.
#[inline]
pub(crate) fn multiply_in_place(signal: &mut [f32], modulator: &[f32]) {
    debug_assert_eq!(signal.len(), modulator.len());

    for (s, &m) in signal.iter_mut().zip(modulator.iter()) {
        *s *= m;
    }
}

/// Multiplies all connected inputs together and scales the product by an
/// automated `depth`.
///
/// Wire the carrier and the modulator oscillator into it. Depth changes arrive
/// as [`AutomationEvent`]s and are ramped.
pub struct RingModulator {
    depth: AutomatedParam,
}

impl RingModulator {
    pub fn new(depth: f32) -> Self {
        Self {
            depth: AutomatedParam::new(depth),
        }
    }
}

impl AudioNode for RingModulator {
    type Message = AutomationEvent;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = AutomationEvent>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for event in messages {
            self.depth.apply(event, ctx.time);
        }

        let Some(out) = outputs.first_mut() else {
            return;
        };

        let mut signals = inputs.iter().filter_map(|input| input.buffers().first());

        match signals.next() {
            Some(first) => out.copy_from_slice(first),
            None => {
                out.iter_mut().for_each(|s| *s = 0.0);
                return;
            }
        }
        for signal in signals {
            multiply_in_place(out, signal);
        }

        let mut depth = [0.0f32; Buffer::LEN];
        let depth = &mut depth[..out.len()];
        self.depth.fill(ctx, depth);
        multiply_in_place(out, depth);
    }
}
