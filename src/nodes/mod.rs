//! Built-in audio nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Generate audio with no audio inputs:
//! - [`CarrierInput`] - Live capture samples read from a ring buffer
//! - [`Oscillator`] - Sine oscillator whose frequency is driven by its input
//! - [`ConstantSource`] - Steady, automatable control value
//!
//! ## Effects ([`effect`])
//!
//! Process audio (inputs → output):
//! - [`RingModulator`] - Multiplies its inputs, scaled by an automated depth
//! - [`Gain`] - Automated linear gain
//!
//! ## Sinks ([`sink`])
//!
//! - [`Destination`] - Graph terminal; the renderer hands its block to the device
//!
//! # Message Types
//!
//! - [`Lifecycle`] - Start/stop a scheduled source ([`Oscillator`], [`ConstantSource`])
//! - [`ConstantMessage`] - Lifecycle or offset automation for [`ConstantSource`]
//! - [`AutomationEvent`](crate::automation::AutomationEvent) - Depth for [`RingModulator`], gain for [`Gain`]
//!
//! Nodes without parameters ([`CarrierInput`], [`Destination`]) use `()` as their message type.

pub mod source;
pub mod effect;
pub mod sink;

// Re-export common types at the top level for convenience
pub use source::{CarrierInput, ConstantMessage, ConstantSource, Lifecycle, Oscillator, SourceHandle};
pub use effect::{Gain, RingModulator};
pub use sink::Destination;
