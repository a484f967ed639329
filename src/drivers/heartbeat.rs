//! Heartbeat LED driver.
//!
//! One digital output pulsed by the sampling scheduler's blank/lit windows
//! as coarse visual feedback that the tick source is alive. Not a
//! functional dependency of the state machine.

use crate::drivers::hw_init;
use crate::pins;

pub struct HeartbeatLed {
    lit: bool,
}

impl HeartbeatLed {
    pub fn new() -> Self {
        hw_init::gpio_write(pins::HEARTBEAT_LED_GPIO, false);
        Self { lit: false }
    }

    pub fn set(&mut self, lit: bool) {
        if self.lit == lit {
            return;
        }
        hw_init::gpio_write(pins::HEARTBEAT_LED_GPIO, lit);
        self.lit = lit;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
