//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the moisture probe and the actuator drivers, exposing them through
//! [`SensorPort`], [`ActuatorPort`] and [`TimerPort`]. Together with the
//! `drivers` modules this is the only code in the system that touches
//! actual hardware. On non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort, TimerPort};
use crate::drivers::countdown;
use crate::drivers::heartbeat::HeartbeatLed;
use crate::drivers::valve::ValveDriver;
use crate::sensors::moisture::{MoistureReading, MoistureSensor};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    moisture: MoistureSensor,
    valve: ValveDriver,
    heartbeat: HeartbeatLed,
}

impl HardwareAdapter {
    pub fn new(moisture: MoistureSensor, valve: ValveDriver, heartbeat: HeartbeatLed) -> Self {
        Self {
            moisture,
            valve,
            heartbeat,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_moisture(&mut self) -> MoistureReading {
        self.moisture.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn open_valve(&mut self) {
        self.valve.open();
    }

    fn close_valve(&mut self) {
        self.valve.close();
    }

    fn is_valve_open(&self) -> bool {
        self.valve.is_open()
    }

    fn set_heartbeat(&mut self, lit: bool) {
        self.heartbeat.set(lit);
    }

    fn all_off(&mut self) {
        self.valve.close();
        self.heartbeat.off();
    }
}

// ── TimerPort implementation ──────────────────────────────────

impl TimerPort for HardwareAdapter {
    fn arm_countdown(&mut self, stage_one_secs: u32, stage_two_secs: u32) {
        countdown::arm(stage_one_secs, stage_two_secs);
    }
}
