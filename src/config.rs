//! System configuration parameters
//!
//! All tunable parameters for the irrigation station. Loaded once at boot;
//! there is no runtime reconfiguration path.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Irrigation decision ---
    /// Soil humidity (percent) below which a watering cycle starts.
    pub moisture_threshold_percent: u8,

    // --- Valve countdown ---
    /// How long the valve stays open once triggered (seconds).
    pub watering_duration_secs: u16,
    /// Lockout before the station may water again, measured from the
    /// valve-open trigger — not from valve closure (seconds).
    pub cooldown_duration_secs: u32,

    // --- Timing ---
    /// Fast system tick period (milliseconds).
    pub tick_interval_ms: u32,
    /// Fast ticks per humidity sample (100 ticks at 10 ms = 1 s).
    pub ticks_per_sample: u32,
    /// Leading ticks of each period during which the heartbeat LED is blanked.
    pub heartbeat_blank_ticks: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Decision
            moisture_threshold_percent: 40,

            // Countdown
            watering_duration_secs: 20,
            cooldown_duration_secs: 3600, // 1 h, from activation

            // Timing
            tick_interval_ms: 10,    // 100 Hz
            ticks_per_sample: 100,   // 1 Hz sampling
            heartbeat_blank_ticks: 25,
        }
    }
}

impl SystemConfig {
    /// Derived sampling period in milliseconds.
    pub fn sampling_period_ms(&self) -> u32 {
        self.tick_interval_ms * self.ticks_per_sample
    }
}
