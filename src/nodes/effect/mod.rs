//! Audio effect nodes (processors with audio inputs and outputs)

mod gain;
mod ring_modulator;

pub use gain::Gain;
pub use ring_modulator::RingModulator;
