//! Fast system tick timer using ESP-IDF's esp_timer API.
//!
//! One periodic timer (10 ms) pushes `Event::Tick` into the lock-free SPSC
//! queue; the sampling scheduler divides those ticks down to the 1 Hz
//! humidity sampling cadence. On simulation targets the sleep loop pushes
//! ticks itself and no hardware timer is started.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely call push_event() which uses AtomicU8.

#[cfg(target_os = "espidf")]
use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::Tick);
}

/// Start the fast periodic tick timer.
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(interval_ms: u32) {
    // SAFETY: TICK_TIMER is written here once at boot from the single
    // main-task context before any timer callback fires. The callback
    // itself only calls push_event(), which is ISR-safe.
    unsafe {
        let tick_args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"tick".as_ptr(),
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&tick_args, &raw mut TICK_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: tick timer create failed (rc={}) — continuing without ticks",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(TICK_TIMER, u64::from(interval_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: tick timer start failed (rc={})", ret);
            return;
        }

        info!("hw_timer: tick@{}ms started", interval_ms);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(_interval_ms: u32) {
    log::info!("hw_timer(sim): timer not started (ticks driven by sleep loop)");
}

/// Stop the fast tick timer.
#[cfg(target_os = "espidf")]
pub fn stop_tick_timer() {
    // SAFETY: TICK_TIMER is a valid handle if start_tick_timer() succeeded;
    // null-check prevents acting on a failed init. Main task only.
    unsafe {
        let t = TICK_TIMER;
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_tick_timer() {}
