//! # ringmod
//!
//! A real-time ring modulator built on a small message-passing audio graph.
//!
//! A live capture signal (the carrier) is multiplied sample-by-sample with a
//! low-frequency sine oscillator (the modulator). The oscillator rate, the
//! modulation depth and the output level can all be changed while audio is
//! playing; every change is applied as a short linear ramp so it never clicks.
//!
//! ## Topology
//!
//! ```text
//! ConstantSource(rate) ──► Oscillator.frequency
//!                                │
//! CarrierInput ──► RingModulator(depth) ◄─┘
//!                        │
//!                        ▼
//!                  Gain(output level) ──► Destination ──► device
//! ```
//!
//! The topology is fixed and built by [`RingMod`]; the graph and its nodes are
//! internal. Hosts bring their own audio I/O by implementing [`Backend`] and
//! handing [`RingMod::with_backend`] a [`CarrierInput`] to capture into.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "cpal_sink")]
//! # fn main() -> Result<(), ringmod::Error> {
//! use ringmod::{RingMod, RingModConfig};
//!
//! let mut fx = RingMod::from_default_devices(&RingModConfig::default().with_depth(1.0))?;
//!
//! fx.on_transport_toggle()?;          // start audio (user gesture)
//! fx.on_rate_change(12.0)?;           // ramps to 12 Hz over 10ms
//! fx.on_output_level_change(-20.0)?;  // ramps to 0.1 linear gain
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cpal_sink"))]
//! # fn main() {}
//! ```
//!
//! ## Control vs. Audio Thread
//!
//! All parameter updates travel through lock-free `rtrb` queues and are applied
//! at the start of the next 64-sample block. The render path never blocks,
//! never allocates, and only ever reads the current value of a ramp.
//!
//! ## Feature Flags
//!
//! - `cpal_sink` - Enables live audio I/O via CPAL and builds the `ringmod`
//!   binary (pulls in `clap` and `tracing-subscriber`)
//! - `serde` - Serialize/deserialize [`RingModConfig`]

extern crate alloc;

mod node;
mod graph;
mod automation;
mod clock;
mod context;
mod nodes;
mod ringmod;

pub mod backend;
pub mod config;
pub mod error;
pub mod level;
pub mod transport;

#[cfg(feature = "cpal_sink")]
pub mod device;

pub use clock::{Clock, ContextState};
pub use context::{AudioContext, Renderer};
pub use ringmod::RingMod;
pub use automation::RAMP_TIME;
pub use nodes::CarrierInput;
pub use backend::{Backend, OfflineBackend};
pub use config::{CaptureConstraints, RingModConfig};
pub use error::{Error, Result};
pub use transport::{Transport, TransportState};

#[cfg(feature = "cpal_sink")]
pub use device::{CpalBackend, CpalDevice};

/// Number of samples processed per graph block.
pub const BLOCK_SIZE: usize = dasp_graph::Buffer::LEN;
