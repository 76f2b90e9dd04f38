//! Gain/volume control effect

use dasp_graph::{Buffer, Input};

use crate::automation::{AutomatedParam, AutomationEvent};
use crate::node::{AudioNode, ProcessContext};

/// A gain (volume) control that passes audio through with amplitude scaling
///
/// Inputs are summed, then multiplied by the gain. Gain changes arrive as
/// [`AutomationEvent`]s carrying a *linear* value and are ramped, so level
/// changes never step.
pub struct Gain {
    gain: AutomatedParam,
}

impl Gain {
    /// Create a new gain node with the specified linear gain
    pub fn new(gain: f32) -> Self {
        Self {
            gain: AutomatedParam::new(gain),
        }
    }
}

impl AudioNode for Gain {
    type Message = AutomationEvent;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = AutomationEvent>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for event in messages {
            self.gain.apply(event, ctx.time);
        }

        let Some(out) = outputs.first_mut() else {
            return;
        };

        out.iter_mut().for_each(|s| *s = 0.0);
        for buffer in inputs.iter().filter_map(|input| input.buffers().first()) {
            for (o, &i) in out.iter_mut().zip(buffer.iter()) {
                *o += i;
            }
        }

        if self.gain.is_ramping() {
            for (i, sample) in out.iter_mut().enumerate() {
                *sample *= self.gain.value_at(ctx.sample_time(i));
            }
        } else {
            let gain = self.gain.value();
            out.iter_mut().for_each(|s| *s *= gain);
        }
    }
}
