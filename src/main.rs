//! IrriStation Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter           LogEventSink        UartTxSink      │
//! │  (Sensor+Actuator+Timer)   (EventSink)         (ByteSink)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Reporter                                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SamplingScheduler (delegate-driven) · Dual-match countdown    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two timing sources feed one lock-free queue: the fast tick timer and
//! the countdown's two stage callbacks. The single consumer below is the
//! only place state changes, so samples and expiries can never race.
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod events;
mod pins;
mod report;
mod scheduler;

pub mod app;
mod adapters;
mod drivers;
pub mod fsm;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::info;

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use app::ports::{ActuatorPort, SampleDelegate, SensorPort};
use config::SystemConfig;
use drivers::heartbeat::HeartbeatLed;
use drivers::uart::UartTxSink;
use drivers::valve::ValveDriver;
use events::{push_event, Event};
use scheduler::SamplingScheduler;
use sensors::moisture::MoistureSensor;

// ── Sample delegate ───────────────────────────────────────────
//
// Bridges the sampling scheduler (which knows nothing about the event
// system) to the queue. This is the hexagonal adapter pattern: the
// scheduler calls `on_sample_due`, and this impl translates that into an
// `Event::SampleDue` pushed to the lock-free queue.

struct EventQueueDelegate;

impl SampleDelegate for EventQueueDelegate {
    fn on_sample_due(&mut self) {
        push_event(Event::SampleDue);
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  IrriStation v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let config = SystemConfig::default();

    drivers::countdown::init_countdown();
    drivers::hw_timer::start_tick_timer(config.tick_interval_ms);
    let watchdog = drivers::watchdog::Watchdog::new();

    // ── 3. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(
        MoistureSensor::new(pins::MOISTURE_ADC_GPIO),
        ValveDriver::new(),
        HeartbeatLed::new(),
    );

    let mut log_sink = LogEventSink::new();
    let mut status_tx = UartTxSink::new();
    let mut sched = SamplingScheduler::new(&config);
    let mut sched_delegate = EventQueueDelegate;

    // ── 4. Construct app service ──────────────────────────────
    let mut app = app::service::AppService::new(config.clone());
    app.start(&mut log_sink);

    info!(
        "System ready: sampling every {}ms, threshold {}%, watering {}s, cooldown {}s",
        config.sampling_period_ms(),
        config.moisture_threshold_percent,
        config.watering_duration_secs,
        config.cooldown_duration_secs
    );

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        // Simulate the tick timer via sleep on non-espidf targets. On real
        // hardware the CPU idles in WFI and wakes when the esp_timer task
        // or a peripheral interrupt pushes an event.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(
                config.tick_interval_ms,
            )));
            push_event(Event::Tick);
            drivers::countdown::sim_advance_ms(u64::from(config.tick_interval_ms));
        }

        // Process all pending events. FIFO order is what guarantees a
        // cycle's stage-one expiry is consumed before its stage-two.
        events::drain_events(|event| match event {
            Event::Tick => {
                if let Some(lit) = sched.tick(&mut sched_delegate) {
                    hw.set_heartbeat(lit);
                }
            }

            Event::SampleDue => {
                let reading = hw.read_moisture();
                app.on_sample(reading, &mut hw, &mut log_sink, &mut status_tx);
            }

            Event::StageOneExpired => {
                app.on_stage_one_expired(&mut hw, &mut log_sink);
            }

            Event::StageTwoExpired => {
                app.on_stage_two_expired(&mut hw, &mut log_sink);
            }
        });

        // Drain the status line with non-blocking writes; a stalled UART
        // drops bytes instead of stalling the loop.
        drivers::uart::service_tx();

        // Feed the watchdog on every iteration.
        watchdog.feed();
    }
}
