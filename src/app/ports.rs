//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (the moisture probe, the valve relay, the countdown
//! timer, event sinks) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::sensors::moisture::MoistureReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the soil reading.
pub trait SensorPort {
    /// Sample the moisture probe once.
    fn read_moisture(&mut self) -> MoistureReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
/// Implementations must be idempotent — repeating the current command is a
/// no-op at the output pin.
pub trait ActuatorPort {
    /// Open the irrigation valve.
    fn open_valve(&mut self);

    /// Close the irrigation valve.
    fn close_valve(&mut self);

    /// Query the last commanded valve position.
    fn is_valve_open(&self) -> bool;

    /// Drive the heartbeat liveness LED.
    fn set_heartbeat(&mut self, lit: bool);

    /// Close the valve and blank the LED — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: domain → countdown hardware)
// ───────────────────────────────────────────────────────────────

/// Arms the dual-match countdown. Both durations are offsets from the arm
/// instant; the implementation must deliver `StageOneExpired` strictly
/// before `StageTwoExpired` and each at most once per arming.
pub trait TimerPort {
    fn arm_countdown(&mut self, stage_one_secs: u32, stage_two_secs: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Byte sink port (domain → serial status line)
// ───────────────────────────────────────────────────────────────

/// Non-blocking byte-oriented output. `write_byte` returns `false` when the
/// sink cannot accept the byte right now — the byte is dropped, never
/// retried, so a stalled line can never stall the caller.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Sample delegate (decouples the sampling scheduler from the event queue)
// ───────────────────────────────────────────────────────────────

/// Callback trait the [`SamplingScheduler`](crate::scheduler::SamplingScheduler)
/// invokes when a sampling period elapses. The main loop implements this by
/// forwarding to [`push_event`](crate::events::push_event), but the
/// scheduler itself knows nothing about events, queues, or ISRs.
pub trait SampleDelegate {
    /// Called exactly once per sampling period.
    fn on_sample_due(&mut self);
}
