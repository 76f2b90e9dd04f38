//! Sine oscillator with an audio-rate frequency input

use dasp_graph::{Buffer, Input};

use super::{Lifecycle, Playback};
use crate::node::{AudioNode, ProcessContext};

/// A full-scale sine oscillator (mono source).
///
/// The instantaneous frequency is the oscillator's own `frequency` (0 Hz by
/// default) plus the sum of everything connected to its input, read sample by
/// sample. Connect a [`ConstantSource`](super::ConstantSource) to drive the
/// rate from an automated control value.
///
/// Outputs silence until started.
pub struct Oscillator {
    frequency: f32,
    phase: f32,
    playback: Playback,
}

impl Oscillator {
    pub fn new() -> Self {
        Self {
            frequency: 0.0,
            phase: 0.0,
            playback: Playback::Idle,
        }
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for Oscillator {
    type Message = Lifecycle;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Lifecycle>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            self.playback.apply(msg);
        }

        let Some(out) = outputs.first_mut() else {
            return;
        };

        if !self.playback.is_playing() {
            out.iter_mut().for_each(|s| *s = 0.0);
            return;
        }

        let inv_rate = 1.0 / ctx.sample_rate as f32;

        for (i, sample) in out.iter_mut().enumerate() {
            let control: f32 = inputs
                .iter()
                .filter_map(|input| input.buffers().first())
                .map(|buffer| buffer[i])
                .sum();
            let frequency = self.frequency + control;

            *sample = (self.phase * core::f32::consts::TAU).sin();

            // rem_euclid keeps the phase in [0, 1) for negative frequencies too
            self.phase = (self.phase + frequency * inv_rate).rem_euclid(1.0);
        }
    }
}
