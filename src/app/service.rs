//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM and its context and exposes a clean,
//! hardware-agnostic API: one entry point per queue event. All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │ ──▶ ByteSink (status line)
//! ActuatorPort ◀──│   FSM · Reporter        │
//!   TimerPort ◀── └────────────────────────┘
//! ```

use log::info;

use crate::config::SystemConfig;
use crate::fsm::context::{ControlInput, IrrigationContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::report::Reporter;
use crate::sensors::moisture::MoistureReading;

use super::events::AppEvent;
use super::ports::{ActuatorPort, ByteSink, EventSink, TimerPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: IrrigationContext,
    reporter: Reporter,
    sample_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = IrrigationContext::new(config);
        let state_table = build_state_table();
        let fsm = Fsm::new(state_table, StateId::Idle);

        Self {
            fsm,
            ctx,
            reporter: Reporter::new(),
            sample_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Idle, valve closed).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-event orchestration ───────────────────────────────

    /// Handle one humidity sample: report the reading, dispatch it into the
    /// FSM, and apply the resulting commands.
    pub fn on_sample(
        &mut self,
        reading: MoistureReading,
        hw: &mut (impl ActuatorPort + TimerPort),
        sink: &mut impl EventSink,
        status: &mut impl ByteSink,
    ) {
        self.sample_count += 1;

        // The reading is always reported, whatever the state machine does
        // with it.
        self.reporter.report(reading.percent, status);
        sink.emit(&AppEvent::Reading {
            raw: reading.raw,
            percent: reading.percent,
        });

        self.dispatch(ControlInput::Sample(reading.percent), hw, sink);
    }

    /// Handle the first countdown match point — watering duration over.
    pub fn on_stage_one_expired(
        &mut self,
        hw: &mut (impl ActuatorPort + TimerPort),
        sink: &mut impl EventSink,
    ) {
        self.dispatch(ControlInput::StageOneExpired, hw, sink);
    }

    /// Handle the second countdown match point — cooldown over.
    pub fn on_stage_two_expired(
        &mut self,
        hw: &mut (impl ActuatorPort + TimerPort),
        sink: &mut impl EventSink,
    ) {
        self.dispatch(ControlInput::StageTwoExpired, hw, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Most recent humidity reading (percent).
    pub fn last_humidity(&self) -> u8 {
        self.ctx.last_humidity
    }

    /// Samples processed since startup.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Completed water-then-cooldown cycles since startup.
    pub fn cycles_completed(&self) -> u32 {
        self.ctx.cycles_completed
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> SystemConfig {
        self.ctx.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Dispatch one input and translate the FSM's commands into port calls.
    fn dispatch(
        &mut self,
        input: ControlInput,
        hw: &mut (impl ActuatorPort + TimerPort),
        sink: &mut impl EventSink,
    ) {
        let prev_state = self.fsm.current_state();
        self.fsm.dispatch(input, &mut self.ctx);
        let new_state = self.fsm.current_state();

        self.apply_commands(hw);

        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
            match (prev_state, new_state) {
                (StateId::Idle, StateId::Watering) => sink.emit(&AppEvent::ValveOpened {
                    humidity_percent: self.ctx.last_humidity,
                }),
                (StateId::Watering, StateId::Cooldown) => sink.emit(&AppEvent::ValveClosed),
                (StateId::Cooldown, StateId::Idle) => sink.emit(&AppEvent::CycleComplete {
                    cycles_completed: self.ctx.cycles_completed,
                }),
                _ => {}
            }
        }
    }

    /// Translate FSM commands into port calls.
    fn apply_commands(&mut self, hw: &mut (impl ActuatorPort + TimerPort)) {
        let cmds = &mut self.ctx.commands;

        // Arm before opening: an open valve must always have a live
        // countdown guarding its closure. Both match points are armed here
        // in one shot, so there is no mid-cycle re-arm that could be missed.
        if cmds.arm_countdown {
            cmds.arm_countdown = false;
            hw.arm_countdown(
                u32::from(self.ctx.config.watering_duration_secs),
                self.ctx.config.cooldown_duration_secs,
            );
        }

        if cmds.valve_open {
            hw.open_valve();
        } else {
            hw.close_valve();
        }
    }
}
