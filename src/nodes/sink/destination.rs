//! Graph terminal

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// The end of the graph.
///
/// Sums everything connected to it into its single buffer. The
/// [`Renderer`](crate::Renderer) reads that buffer after each block and hands
/// it to the device, so whatever isn't connected here is never heard.
#[derive(Default)]
pub struct Destination;

impl Destination {
    pub fn new() -> Self {
        Self
    }
}

impl AudioNode for Destination {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let Some(out) = outputs.first_mut() else {
            return;
        };

        out.iter_mut().for_each(|s| *s = 0.0);
        for buffer in inputs.iter().filter_map(|input| input.buffers().first()) {
            for (o, &i) in out.iter_mut().zip(buffer.iter()) {
                *o += i;
            }
        }
    }
}
