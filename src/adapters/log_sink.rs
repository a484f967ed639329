//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! logger (which goes to UART / USB-CDC in production). The formatted
//! status line the Reporter emits is separate — this sink is for humans
//! reading the boot console.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Reading { raw, percent } => {
                info!("SOIL  | raw={:4} | humidity={:3}%", raw, percent);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ValveOpened { humidity_percent } => {
                info!("VALVE | open (humidity {}% below threshold)", humidity_percent);
            }
            AppEvent::ValveClosed => {
                info!("VALVE | closed");
            }
            AppEvent::CycleComplete { cycles_completed } => {
                info!("CYCLE | complete ({} total), eligible to irrigate", cycles_completed);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
