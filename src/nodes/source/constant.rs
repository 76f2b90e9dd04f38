//! Constant control source with an automatable offset

use dasp_graph::{Buffer, Input};

use super::{Lifecycle, Playback};
use crate::automation::{AutomatedParam, AutomationEvent};
use crate::node::{AudioNode, ProcessContext};

/// Messages to control a [`ConstantSource`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstantMessage {
    Lifecycle(Lifecycle),
    /// Ramp the offset to a new value
    Offset(AutomationEvent),
}

impl From<Lifecycle> for ConstantMessage {
    fn from(cmd: Lifecycle) -> Self {
        ConstantMessage::Lifecycle(cmd)
    }
}

/// Outputs its `offset` on every sample (mono source).
///
/// Used as the rate control for the modulator: its output is wired into the
/// [`Oscillator`](super::Oscillator)'s frequency input, so ramping the offset
/// glides the LFO rate. Outputs silence until started.
pub struct ConstantSource {
    offset: AutomatedParam,
    playback: Playback,
}

impl ConstantSource {
    pub fn new(offset: f32) -> Self {
        Self {
            offset: AutomatedParam::new(offset),
            playback: Playback::Idle,
        }
    }
}

impl AudioNode for ConstantSource {
    type Message = ConstantMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = ConstantMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                ConstantMessage::Lifecycle(cmd) => self.playback.apply(cmd),
                ConstantMessage::Offset(event) => self.offset.apply(event, ctx.time),
            }
        }

        let Some(out) = outputs.first_mut() else {
            return;
        };

        if self.playback.is_playing() {
            self.offset.fill(ctx, out);
        } else {
            out.iter_mut().for_each(|s| *s = 0.0);
        }
    }
}
