//! Mock hardware adapter for integration tests.
//!
//! Records every actuator/timer call so tests can assert on the full
//! command history without touching real GPIO or esp_timer handles.

use irristation::app::events::AppEvent;
use irristation::app::ports::{ActuatorPort, ByteSink, EventSink, SensorPort, TimerPort};
use irristation::sensors::moisture::{humidity_percent, MoistureReading, ADC_FULL_SCALE};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwCall {
    OpenValve,
    CloseValve,
    SetHeartbeat(bool),
    ArmCountdown { stage_one_secs: u32, stage_two_secs: u32 },
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    /// Raw ADC value the next `read_moisture` returns.
    pub moisture_raw: u16,
    valve_open: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            moisture_raw: 0, // saturated soil
            valve_open: false,
        }
    }

    /// Set the soil humidity the probe will report (inverse of the
    /// dryness-complement conversion, then re-checked through it).
    pub fn set_humidity(&mut self, percent: u8) {
        // 0% is unreachable through the truncating conversion (raw 4095
        // already maps to 1%), so the mock refuses it too.
        assert!((1..=100).contains(&percent));
        // Smallest raw whose truncated conversion yields `percent`.
        let raw = ((100 - u32::from(percent)) * u32::from(ADC_FULL_SCALE)).div_ceil(100) as u16;
        let raw = raw.min(ADC_FULL_SCALE - 1);
        debug_assert_eq!(humidity_percent(raw), percent);
        self.moisture_raw = raw;
    }

    pub fn arm_calls(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::ArmCountdown {
                    stage_one_secs,
                    stage_two_secs,
                } => Some((*stage_one_secs, *stage_two_secs)),
                _ => None,
            })
            .collect()
    }

    pub fn valve_open(&self) -> bool {
        self.valve_open
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_moisture(&mut self) -> MoistureReading {
        let raw = self.moisture_raw & (ADC_FULL_SCALE - 1);
        MoistureReading {
            raw,
            percent: humidity_percent(raw),
        }
    }
}

impl ActuatorPort for MockHardware {
    fn open_valve(&mut self) {
        // Mirror the driver's idempotence: only a position change is a call.
        if !self.valve_open {
            self.valve_open = true;
            self.calls.push(HwCall::OpenValve);
        }
    }

    fn close_valve(&mut self) {
        if self.valve_open {
            self.valve_open = false;
            self.calls.push(HwCall::CloseValve);
        }
    }

    fn is_valve_open(&self) -> bool {
        self.valve_open
    }

    fn set_heartbeat(&mut self, lit: bool) {
        self.calls.push(HwCall::SetHeartbeat(lit));
    }

    fn all_off(&mut self) {
        self.valve_open = false;
        self.calls.push(HwCall::AllOff);
    }
}

impl TimerPort for MockHardware {
    fn arm_countdown(&mut self, stage_one_secs: u32, stage_two_secs: u32) {
        self.calls.push(HwCall::ArmCountdown {
            stage_one_secs,
            stage_two_secs,
        });
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct LogSink {
    pub events: Vec<String>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events.iter().any(|e| e.contains(needle))
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(format!("{:?}", event));
    }
}

// ── Byte sinks ────────────────────────────────────────────────

/// Captures every byte the reporter emits.
pub struct CaptureSink {
    pub bytes: Vec<u8>,
}

#[allow(dead_code)]
impl CaptureSink {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }
}

impl ByteSink for CaptureSink {
    fn write_byte(&mut self, byte: u8) -> bool {
        self.bytes.push(byte);
        true
    }
}

/// Refuses every byte — a permanently stalled serial line.
pub struct StalledSink;

impl ByteSink for StalledSink {
    fn write_byte(&mut self, _byte: u8) -> bool {
        false
    }
}
