//! Dual-match valve countdown.
//!
//! One countdown source with two ordered match points, both measured from
//! the same arm instant: stage one closes the valve (watering duration),
//! stage two releases the cooldown lockout. Using a single origin rather
//! than two chained timers guarantees the closure event and the release
//! event are strictly ordered and cannot interleave — the cooldown is
//! therefore measured from valve-open time, not valve-close time, and the
//! configured stage-two duration is an absolute offset from activation.
//!
//! Both stages are armed together in one call; there is no mid-cycle
//! re-arm that a stalled handler could miss.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `arm()` starts two esp_timer one-shots from the same
//! instant, each pushing its stage event into the lock-free queue.
//! On host/sim: `arm()` drives a process-wide [`DualMatchCountdown`]
//! advanced by the sleep loop via [`sim_advance_ms`].

use crate::events::{push_event, Event};

/// The two match points, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    One,
    Two,
}

// ═══════════════════════════════════════════════════════════════
//  Pure countdown logic (host, sim, tests)
// ═══════════════════════════════════════════════════════════════

/// Tick-driven dual-match countdown.
///
/// Each match point fires exactly once per arming (edge, not level), stage
/// one never after stage two. After stage two the countdown is dormant
/// until re-armed. Re-arming restarts both match points from zero elapsed.
#[derive(Debug, Clone, Copy)]
pub struct DualMatchCountdown {
    armed: bool,
    elapsed_ms: u64,
    stage_one_ms: u64,
    stage_two_ms: u64,
    stage_one_fired: bool,
    stage_two_fired: bool,
}

impl DualMatchCountdown {
    pub const fn new() -> Self {
        Self {
            armed: false,
            elapsed_ms: 0,
            stage_one_ms: 0,
            stage_two_ms: 0,
            stage_one_fired: false,
            stage_two_fired: false,
        }
    }

    /// Arm both match points, measured from now.
    pub fn arm(&mut self, stage_one_secs: u32, stage_two_secs: u32) {
        self.armed = true;
        self.elapsed_ms = 0;
        self.stage_one_ms = u64::from(stage_one_secs) * 1000;
        self.stage_two_ms = u64::from(stage_two_secs) * 1000;
        self.stage_one_fired = false;
        self.stage_two_fired = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Advance the countdown and fire newly crossed match points, stage one
    /// first. `fire` is invoked at most once per stage per arming.
    pub fn advance_ms(&mut self, ms: u64, mut fire: impl FnMut(Stage)) {
        if !self.armed {
            return;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);

        if !self.stage_one_fired && self.elapsed_ms >= self.stage_one_ms {
            self.stage_one_fired = true;
            fire(Stage::One);
        }
        if !self.stage_two_fired && self.elapsed_ms >= self.stage_two_ms {
            self.stage_two_fired = true;
            self.armed = false; // dormant until re-armed
            fire(Stage::Two);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  ESP-IDF arm path — two esp_timer one-shots
// ═══════════════════════════════════════════════════════════════

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
static mut STAGE_ONE_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut STAGE_TWO_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn stage_one_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::StageOneExpired);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn stage_two_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::StageTwoExpired);
}

/// Create the two one-shot timers. Call once at boot, before `arm()`.
#[cfg(target_os = "espidf")]
pub fn init_countdown() {
    // SAFETY: STAGE_ONE_TIMER/STAGE_TWO_TIMER are written here once from
    // the single main-task context before any arm() call. The callbacks
    // only call push_event(), which is ISR-safe.
    unsafe {
        let one_args = esp_timer_create_args_t {
            callback: Some(stage_one_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"stage1".as_ptr(),
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&one_args, &raw mut STAGE_ONE_TIMER);
        if ret != ESP_OK {
            log::error!("countdown: stage-one timer create failed (rc={})", ret);
            return;
        }

        let two_args = esp_timer_create_args_t {
            callback: Some(stage_two_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"stage2".as_ptr(),
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&two_args, &raw mut STAGE_TWO_TIMER);
        if ret != ESP_OK {
            log::error!("countdown: stage-two timer create failed (rc={})", ret);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn init_countdown() {
    log::info!("countdown(sim): pure-logic countdown, advanced by the sleep loop");
}

/// Arm both stages from the current instant.
///
/// The controller only arms from Idle, so the timers are never live here;
/// stop() is still issued first so a mis-use cannot stack one-shots.
#[cfg(target_os = "espidf")]
pub fn arm(stage_one_secs: u32, stage_two_secs: u32) {
    // SAFETY: handles were created once in init_countdown(); arm() is only
    // called from the single main-loop task.
    unsafe {
        let one = STAGE_ONE_TIMER;
        let two = STAGE_TWO_TIMER;
        if one.is_null() || two.is_null() {
            log::error!("countdown: arm before init — watering cycle refused");
            return;
        }
        esp_timer_stop(one);
        esp_timer_stop(two);
        // A silently failed arm would leave the valve open forever; the
        // watchdog is the backstop, but the failure must at least be loud.
        let ret = esp_timer_start_once(one, u64::from(stage_one_secs) * 1_000_000);
        if ret != ESP_OK {
            log::error!("countdown: stage-one arm failed (rc={})", ret);
        }
        let ret = esp_timer_start_once(two, u64::from(stage_two_secs) * 1_000_000);
        if ret != ESP_OK {
            log::error!("countdown: stage-two arm failed (rc={})", ret);
        }
    }
    log::info!(
        "countdown: armed, stage one @{}s, stage two @{}s",
        stage_one_secs,
        stage_two_secs
    );
}

#[cfg(not(target_os = "espidf"))]
static SIM_COUNTDOWN: std::sync::Mutex<DualMatchCountdown> =
    std::sync::Mutex::new(DualMatchCountdown::new());

#[cfg(not(target_os = "espidf"))]
pub fn arm(stage_one_secs: u32, stage_two_secs: u32) {
    SIM_COUNTDOWN
        .lock()
        .expect("countdown mutex poisoned")
        .arm(stage_one_secs, stage_two_secs);
    log::info!(
        "countdown(sim): armed, stage one @{}s, stage two @{}s",
        stage_one_secs,
        stage_two_secs
    );
}

/// Advance the simulated countdown; fired stages land in the event queue
/// exactly like the hardware callbacks do.
#[cfg(not(target_os = "espidf"))]
pub fn sim_advance_ms(ms: u64) {
    let mut countdown = SIM_COUNTDOWN.lock().expect("countdown mutex poisoned");
    countdown.advance_ms(ms, |stage| {
        let event = match stage {
            Stage::One => Event::StageOneExpired,
            Stage::Two => Event::StageTwoExpired,
        };
        push_event(event);
    });
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_fires(countdown: &mut DualMatchCountdown, step_ms: u64, total_ms: u64) -> Vec<(u64, Stage)> {
        let mut fires = Vec::new();
        let mut elapsed = 0;
        while elapsed < total_ms {
            elapsed += step_ms;
            countdown.advance_ms(step_ms, |stage| fires.push((elapsed, stage)));
        }
        fires
    }

    #[test]
    fn stages_fire_at_exact_offsets_from_arm() {
        let mut countdown = DualMatchCountdown::new();
        countdown.arm(20, 3600);

        let fires = collect_fires(&mut countdown, 1000, 3_700_000);
        assert_eq!(
            fires,
            vec![(20_000, Stage::One), (3_600_000, Stage::Two)],
            "stage offsets are absolute from the arm instant"
        );
    }

    #[test]
    fn each_stage_is_a_one_shot_edge() {
        let mut countdown = DualMatchCountdown::new();
        countdown.arm(1, 2);

        let fires = collect_fires(&mut countdown, 500, 10_000);
        let ones = fires.iter().filter(|(_, s)| *s == Stage::One).count();
        let twos = fires.iter().filter(|(_, s)| *s == Stage::Two).count();
        assert_eq!((ones, twos), (1, 1));
    }

    #[test]
    fn dormant_until_armed() {
        let mut countdown = DualMatchCountdown::new();
        let fires = collect_fires(&mut countdown, 1000, 100_000);
        assert!(fires.is_empty());
        assert!(!countdown.is_armed());
    }

    #[test]
    fn dormant_again_after_stage_two() {
        let mut countdown = DualMatchCountdown::new();
        countdown.arm(1, 2);
        countdown.advance_ms(5_000, |_| {});
        assert!(!countdown.is_armed());

        let fires = collect_fires(&mut countdown, 1000, 10_000);
        assert!(fires.is_empty(), "no fires until re-armed");
    }

    #[test]
    fn rearm_restarts_from_zero() {
        let mut countdown = DualMatchCountdown::new();
        countdown.arm(10, 20);
        countdown.advance_ms(9_000, |_| unreachable!("nothing due yet"));

        countdown.arm(10, 20);
        let mut fired = Vec::new();
        countdown.advance_ms(9_000, |s| fired.push(s));
        assert!(fired.is_empty(), "elapsed must reset on re-arm");
        countdown.advance_ms(1_000, |s| fired.push(s));
        assert_eq!(fired, vec![Stage::One]);
    }

    #[test]
    fn coarse_advance_fires_both_in_order() {
        // A host stall that jumps past both match points must still deliver
        // stage one before stage two.
        let mut countdown = DualMatchCountdown::new();
        countdown.arm(20, 3600);

        let mut fired = Vec::new();
        countdown.advance_ms(4_000_000, |s| fired.push(s));
        assert_eq!(fired, vec![Stage::One, Stage::Two]);
    }
}
