//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, feed a display, etc.

use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// A humidity sample was taken.
    Reading { raw: u16, percent: u8 },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The valve opened (carries the reading that triggered it).
    ValveOpened { humidity_percent: u8 },

    /// The valve closed at the end of the watering stage.
    ValveClosed,

    /// The cooldown lockout released; the station is eligible again.
    CycleComplete { cycles_completed: u32 },
}
