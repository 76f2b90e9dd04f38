//! Error types.
//!
//! Failures fall into three groups:
//!
//! - **Setup failures** ([`Error::NoInputDevice`], [`Error::Capture`],
//!   [`Error::CaptureProcessing`], [`Error::InvalidConfig`], ...) mean the graph cannot be built at all.
//!   There is no fallback carrier; these always reach the caller.
//! - **Transition failures** ([`Error::DeviceUnavailable`]) are recoverable.
//!   The context and transport keep their previous state and the next toggle
//!   simply tries again.
//! - **Control failures** ([`Error::QueueFull`], [`Error::AlreadyStarted`], ...)
//!   report misuse of node handles.
//!
//! Invalid numeric UI input is not an error: the `on_*` methods of
//! [`RingMod`](crate::RingMod) clamp it or ignore it.

use thiserror::Error;

/// Everything that can go wrong while building or driving the effect.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no audio input device available")]
    NoInputDevice,

    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("audio capture failed: {0}")]
    Capture(String),

    #[error("capture must be raw, but {0} was requested")]
    CaptureProcessing(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported stream configuration: {0}")]
    UnsupportedConfig(String),

    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("{0} was already started")]
    AlreadyStarted(&'static str),

    #[error("{0} was never started")]
    NotStarted(&'static str),

    #[error("message queue for {0} is full")]
    QueueFull(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
