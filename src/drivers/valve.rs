//! Irrigation valve relay driver.
//!
//! The relay is wired inverted: driving the GPIO **LOW energises the coil
//! and opens the valve**; driving it HIGH closes the valve. The inversion
//! lives here and nowhere else — the rest of the system speaks open/closed.
//!
//! Idempotent by construction: repeating the current command never touches
//! the pin again, so callers may re-assert the desired position every
//! dispatch without glitching the output.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the relay GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValvePosition {
    Open,
    Closed,
}

pub struct ValveDriver {
    position: ValvePosition,
}

impl ValveDriver {
    /// Construct the driver with the valve closed (relay line HIGH).
    pub fn new() -> Self {
        hw_init::gpio_write(pins::VALVE_RELAY_GPIO, true);
        Self {
            position: ValvePosition::Closed,
        }
    }

    pub fn open(&mut self) {
        if self.position == ValvePosition::Open {
            return;
        }
        hw_init::gpio_write(pins::VALVE_RELAY_GPIO, false); // LOW opens
        self.position = ValvePosition::Open;
    }

    pub fn close(&mut self) {
        if self.position == ValvePosition::Closed {
            return;
        }
        hw_init::gpio_write(pins::VALVE_RELAY_GPIO, true); // HIGH closes
        self.position = ValvePosition::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.position == ValvePosition::Open
    }

    pub fn position(&self) -> ValvePosition {
        self.position
    }
}
