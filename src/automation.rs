//! Click-free parameter automation.
//!
//! Every control value in the effect (oscillator rate, modulation depth,
//! output gain) changes the same way: cancel whatever ramp is in flight, then
//! ramp linearly from the value the parameter has *right now* to the new target,
//! arriving [`RAMP_TIME`] after the update was issued.
//!
//! The work is split across the two threads:
//!
//! - [`ParamControl`] lives on the control thread. It sanitizes UI input, stamps
//!   it with the context time and sends an [`AutomationEvent`] to the node.
//! - [`AutomatedParam`] lives inside the node on the audio thread. It applies
//!   events at block start and evaluates the ramp once per sample.
//!
//! Times are context times (see [`Clock`](crate::Clock)), not wall-clock times,
//! so a ramp that was scheduled right before a suspend picks up exactly where
//! it left off after resume.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::Handle;
use crate::node::ProcessContext;

/// Duration of every parameter ramp, in seconds.
pub const RAMP_TIME: f64 = 0.010;

/// A request to move a parameter to `value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutomationEvent {
    /// Target value
    pub value: f32,
    /// Context time at which the update was issued; the ramp completes at
    /// `issued_at + RAMP_TIME`
    pub issued_at: f64,
}

impl AutomationEvent {
    pub fn new(value: f32, issued_at: f64) -> Self {
        Self { value, issued_at }
    }

    #[inline]
    pub fn completes_at(&self) -> f64 {
        self.issued_at + RAMP_TIME
    }
}

#[derive(Clone, Copy, Debug)]
struct LinearRamp {
    from: f32,
    to: f32,
    start: f64,
    end: f64,
}

impl LinearRamp {
    #[inline]
    fn value_at(&self, t: f64) -> f32 {
        let frac = ((t - self.start) / (self.end - self.start)).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * frac as f32
    }
}

/// Audio-thread side of an automatable parameter.
///
/// Holds the current value and at most one in-flight ramp. Applying a new
/// event always replaces the ramp; ramps never stack.
#[derive(Clone, Debug)]
pub struct AutomatedParam {
    value: f32,
    ramp: Option<LinearRamp>,
}

impl AutomatedParam {
    pub fn new(value: f32) -> Self {
        Self { value, ramp: None }
    }

    /// Value at the last evaluated instant.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }

    /// Cancel the current ramp at `now` and start a new one towards the event's value.
    ///
    /// The new ramp starts from the instantaneous value at `now`. If the event
    /// is so old that its completion time has already passed, the parameter
    /// jumps straight to the target. Non-finite values are ignored.
    pub fn apply(&mut self, event: AutomationEvent, now: f64) {
        if !event.value.is_finite() {
            return;
        }

        let from = self.value_at(now);
        let start = now.max(event.issued_at);
        let end = event.completes_at();

        if end <= start {
            self.value = event.value;
            self.ramp = None;
        } else {
            self.ramp = Some(LinearRamp { from, to: event.value, start, end });
        }
    }

    /// Evaluate the parameter at context time `t`.
    ///
    /// Times must be non-decreasing between calls; a finished ramp is dropped.
    #[inline]
    pub fn value_at(&mut self, t: f64) -> f32 {
        if let Some(ramp) = self.ramp {
            if t >= ramp.end {
                self.value = ramp.to;
                self.ramp = None;
            } else {
                self.value = ramp.value_at(t);
            }
        }
        self.value
    }

    /// Write one value per sample of the current block into `out`.
    pub fn fill(&mut self, ctx: &ProcessContext, out: &mut [f32]) {
        if self.ramp.is_none() {
            out.iter_mut().for_each(|s| *s = self.value);
            return;
        }
        for (i, s) in out.iter_mut().enumerate() {
            *s = self.value_at(ctx.sample_time(i));
        }
    }
}

/// Control-thread side of an automatable parameter.
///
/// Remembers the last scheduled target and the valid range. Out-of-range input
/// is clamped and NaN is dropped, so the node only ever ramps towards finite,
/// in-range values.
#[derive(Clone, Debug)]
pub struct ParamControl {
    name: &'static str,
    target: f32,
    min: f32,
    max: f32,
}

impl ParamControl {
    pub fn new(name: &'static str, initial: f32, min: f32, max: f32) -> Self {
        let mut control = Self { name, target: initial, min, max };
        control.target = control.sanitize(initial).unwrap_or(min);
        control
    }

    /// Last value handed to the node.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Clamp `value` into range; `None` for NaN.
    ///
    /// The range must be ordered, which [`RingModConfig::validate`](crate::RingModConfig::validate)
    /// checks before any control is built.
    pub fn sanitize(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            None
        } else {
            Some(value.clamp(self.min, self.max))
        }
    }

    /// Schedule a ramp to `value`, issued at context time `now`.
    ///
    /// `wrap` turns the event into the node's message type. Returns the target
    /// that is now in effect, which is the previous target if `value` was rejected.
    pub fn schedule<M: Send + 'static>(
        &mut self,
        handle: &mut Handle<M>,
        value: f32,
        now: f64,
        wrap: impl FnOnce(AutomationEvent) -> M,
    ) -> Result<f32> {
        let Some(target) = self.sanitize(value) else {
            warn!(param = self.name, "ignoring non-numeric update");
            return Ok(self.target);
        };
        if target != value {
            warn!(param = self.name, requested = value, clamped = target, "update out of range");
        }

        let event = AutomationEvent::new(target, now);
        handle.send(wrap(event)).map_err(|_| {
            warn!(param = self.name, "automation queue full, update dropped");
            Error::QueueFull(self.name)
        })?;

        debug!(param = self.name, from = self.target, to = target, at = now, "ramp scheduled");
        self.target = target;
        Ok(target)
    }
}
