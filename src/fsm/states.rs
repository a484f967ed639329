//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap. This is the classic embedded C FSM pattern expressed
//! in safe Rust.
//!
//! ```text
//!  IDLE ──[sample: humidity < threshold]──▶ WATERING
//!    ▲                                         │
//!    │                                 [stage one expired]
//!    │                                         ▼
//!    └────────[stage two expired]───────── COOLDOWN
//! ```
//!
//! A sample arriving while not Idle only refreshes the reported reading;
//! it never restarts or cancels the active cycle. Both countdown match
//! points are offsets from the same arm instant, so the cooldown release
//! is measured from valve-open time, not valve-close time.

use super::context::{ControlInput, IrrigationContext};
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Watering
        StateDescriptor {
            id: StateId::Watering,
            name: "Watering",
            on_enter: Some(watering_enter),
            on_exit: None,
            on_update: watering_update,
        },
        // Index 2 — Cooldown
        StateDescriptor {
            id: StateId::Cooldown,
            name: "Cooldown",
            on_enter: Some(cooldown_enter),
            on_exit: Some(cooldown_exit),
            on_update: cooldown_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state — valve closed, eligible to water
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut IrrigationContext) {
    ctx.commands.valve_open = false;
}

fn idle_update(ctx: &mut IrrigationContext) -> Option<StateId> {
    match ctx.input {
        ControlInput::Sample(humidity) => {
            ctx.last_humidity = humidity;
            if ctx.soil_is_dry() {
                info!(
                    "IDLE: humidity {}% below {}% threshold, watering",
                    humidity, ctx.config.moisture_threshold_percent
                );
                return Some(StateId::Watering);
            }
            None
        }
        // A stage expiry with no cycle in flight is stale; nothing to do.
        ControlInput::StageOneExpired | ControlInput::StageTwoExpired => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  WATERING state — valve open, countdown armed
// ═══════════════════════════════════════════════════════════════════════════

fn watering_enter(ctx: &mut IrrigationContext) {
    ctx.commands.valve_open = true;
    ctx.commands.arm_countdown = true;
    info!(
        "WATERING: valve open for {}s, eligible again {}s after trigger",
        ctx.config.watering_duration_secs, ctx.config.cooldown_duration_secs
    );
}

fn watering_update(ctx: &mut IrrigationContext) -> Option<StateId> {
    match ctx.input {
        // Re-triggering is suppressed unconditionally while a cycle runs;
        // the sample only refreshes the reported reading.
        ControlInput::Sample(humidity) => {
            ctx.last_humidity = humidity;
            None
        }
        ControlInput::StageOneExpired => Some(StateId::Cooldown),
        // Cannot precede stage one — the queue is FIFO and the countdown
        // pushes the stages in order. Ignore rather than jump states.
        ControlInput::StageTwoExpired => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLDOWN state — valve closed, not yet eligible
// ═══════════════════════════════════════════════════════════════════════════

fn cooldown_enter(ctx: &mut IrrigationContext) {
    ctx.commands.valve_open = false;
    info!("COOLDOWN: valve closed, waiting out the lockout");
}

fn cooldown_exit(ctx: &mut IrrigationContext) {
    ctx.cycles_completed = ctx.cycles_completed.saturating_add(1);
    info!(
        "COOLDOWN: lockout released, {} cycles completed",
        ctx.cycles_completed
    );
}

fn cooldown_update(ctx: &mut IrrigationContext) -> Option<StateId> {
    match ctx.input {
        ControlInput::Sample(humidity) => {
            ctx.last_humidity = humidity;
            None
        }
        // Stage one already consumed on the way in; a duplicate is stale.
        ControlInput::StageOneExpired => None,
        ControlInput::StageTwoExpired => Some(StateId::Idle),
    }
}
