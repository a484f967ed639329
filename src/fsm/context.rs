//! Shared mutable context threaded through every FSM handler.
//!
//! `IrrigationContext` is the single struct that state handlers read from
//! and write to. It carries the input being dispatched, the most recent
//! humidity reading, the valve command outputs, and configuration. All of
//! it is owned by the `AppService` on the single consumer side of the event
//! queue — there are no ambient globals.

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Control inputs (one per dispatched event)
// ---------------------------------------------------------------------------

/// The inputs the state machine reacts to. Exactly one is dispatched per
/// event popped off the queue; stage expiries are one-shot edges, never
/// levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    /// A sampling period elapsed and the probe was read (humidity percent).
    Sample(u8),
    /// First countdown match point — watering duration over.
    StageOneExpired,
    /// Second countdown match point — cooldown over.
    StageTwoExpired,
}

// ---------------------------------------------------------------------------
// Valve commands (written by state handlers; consumed by AppService)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuation.
/// The service applies these through the actuator/timer ports after each
/// dispatch.
#[derive(Debug, Clone, Copy)]
pub struct ValveCommands {
    /// Desired valve position: `true` = open.
    pub valve_open: bool,
    /// One-shot request to arm the dual-match countdown. Consumed (reset)
    /// by the service when it forwards the arm to the timer port.
    pub arm_countdown: bool,
}

impl Default for ValveCommands {
    fn default() -> Self {
        Self {
            valve_open: false,
            arm_countdown: false,
        }
    }
}

impl ValveCommands {
    /// Valve closed, nothing armed — safe default.
    pub fn closed() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// IrrigationContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct IrrigationContext {
    /// The input currently being dispatched. Set by the engine before each
    /// `on_update` call.
    pub input: ControlInput,

    /// Most recent humidity reading (percent). Updated on every sample,
    /// including those that do not cause a transition.
    pub last_humidity: u8,

    /// Commands to be applied after the dispatch.
    pub commands: ValveCommands,

    /// System configuration (loaded once at boot).
    pub config: SystemConfig,

    /// Completed water-then-cooldown cycles since boot.
    pub cycles_completed: u32,
}

impl IrrigationContext {
    /// Create a new context with the given configuration.
    ///
    /// The initial reading is 100% (saturated soil) so the controller can
    /// never trigger before the first real sample arrives.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            input: ControlInput::Sample(100),
            last_humidity: 100,
            commands: ValveCommands::closed(),
            config,
            cycles_completed: 0,
        }
    }

    /// Whether the most recent reading is below the watering threshold.
    pub fn soil_is_dry(&self) -> bool {
        self.last_humidity < self.config.moisture_threshold_percent
    }
}
