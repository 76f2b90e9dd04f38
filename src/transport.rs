//! Play/stop state machine.

use tracing::{info, warn};

use crate::backend::Backend;
use crate::clock::ContextState;
use crate::context::AudioContext;
use crate::error::Result;

/// What the UI shows on the transport button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportState {
    Off,
    On,
}

impl TransportState {
    pub fn label(&self) -> &'static str {
        match self {
            TransportState::Off => "Off",
            TransportState::On => "On",
        }
    }
}

impl From<ContextState> for TransportState {
    fn from(state: ContextState) -> Self {
        match state {
            ContextState::Running => TransportState::On,
            ContextState::Suspended => TransportState::Off,
        }
    }
}

/// Toggles an [`AudioContext`] between suspended and running.
///
/// The state only flips after the context has confirmed the transition. A
/// failed transition leaves it untouched so the next toggle retries. Toggling
/// takes `&mut self` and the context by `&mut`, so transitions on one context
/// can never overlap.
#[derive(Debug)]
pub struct Transport {
    state: TransportState,
}

impl Transport {
    /// Start in whatever state the context is actually in.
    pub fn new<B: Backend>(ctx: &AudioContext<B>) -> Self {
        Self { state: ctx.state().into() }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Handle one external toggle.
    ///
    /// The direction is taken from the context's actual state, so a context
    /// that was suspended or resumed behind the transport's back toggles the
    /// way the user would expect.
    pub fn toggle<B: Backend>(&mut self, ctx: &mut AudioContext<B>) -> Result<TransportState> {
        let actual = TransportState::from(ctx.state());
        if actual != self.state {
            warn!(shown = self.state.label(), actual = actual.label(), "transport out of sync, resyncing");
            self.state = actual;
        }

        let result = match self.state {
            TransportState::Off => ctx.resume(),
            TransportState::On => ctx.suspend(),
        };

        if let Err(e) = result {
            warn!(error = %e, state = self.state.label(), "transport toggle failed");
            return Err(e);
        }

        self.state = match self.state {
            TransportState::Off => TransportState::On,
            TransportState::On => TransportState::Off,
        };
        info!(state = self.state.label(), "transport toggled");
        Ok(self.state)
    }
}
