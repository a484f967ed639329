//! Sampling scheduler.
//!
//! Divides the fast system tick (10 ms) down to the humidity sampling
//! cadence (1 s). The scheduler notifies a [`SampleDelegate`] when a full
//! period has elapsed; the main loop implements the delegate to push a
//! `SampleDue` event into the queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                          │
//! │                                                              │
//! │  ┌────────────┐              ┌──────────────────┐            │
//! │  │ Tick timer │─── Tick ────▶│ SamplingScheduler │            │
//! │  └────────────┘              └────────┬─────────┘            │
//! │                                       │ on_sample_due()      │
//! │                                       ▼                      │
//! │                     ┌────────────────────────────────┐       │
//! │                     │        SampleDelegate          │       │
//! │                     │ (main loop pushes SampleDue)   │       │
//! │                     └────────────────────────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler also computes the heartbeat LED level for each tick: the
//! LED is blanked for the leading sub-interval of every period and lit at
//! the sample instant, giving coarse visual feedback that ticking is alive.
//! It is not a functional dependency of the state machine.

use crate::app::ports::SampleDelegate;
use crate::config::SystemConfig;

/// Divides fast ticks into sampling periods.
///
/// This struct is intentionally decoupled from the event system. When a
/// period elapses it invokes the [`SampleDelegate`] callback rather than
/// directly pushing events, which makes it independently testable and
/// reusable across execution contexts.
pub struct SamplingScheduler {
    /// Ticks into the current period. Wraps to zero exactly at
    /// `ticks_per_sample`, never beyond it.
    tick_counter: u32,
    ticks_per_sample: u32,
    heartbeat_blank_ticks: u32,
}

impl SamplingScheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            tick_counter: 0,
            ticks_per_sample: config.ticks_per_sample,
            heartbeat_blank_ticks: config.heartbeat_blank_ticks,
        }
    }

    /// Consume one fast tick.
    ///
    /// Fires `delegate.on_sample_due()` exactly once per period. The return
    /// value is the heartbeat level change for this tick: `Some(false)`
    /// during the leading blank window, `Some(true)` at the sample instant,
    /// `None` when the LED should be left as-is.
    pub fn tick(&mut self, delegate: &mut dyn SampleDelegate) -> Option<bool> {
        self.tick_counter += 1;

        if self.tick_counter == self.ticks_per_sample {
            self.tick_counter = 0;
            delegate.on_sample_due();
            return Some(true);
        }

        if self.tick_counter < self.heartbeat_blank_ticks {
            return Some(false);
        }

        None
    }

    /// Ticks into the current period (test/diagnostic hook).
    pub fn tick_count(&self) -> u32 {
        self.tick_counter
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Test delegate that counts sample fires.
    struct CountingDelegate {
        fires: u32,
    }

    impl CountingDelegate {
        fn new() -> Self {
            Self { fires: 0 }
        }
    }

    impl SampleDelegate for CountingDelegate {
        fn on_sample_due(&mut self) {
            self.fires += 1;
        }
    }

    #[test]
    fn fires_exactly_once_per_period() {
        let config = SystemConfig::default();
        let mut sched = SamplingScheduler::new(&config);
        let mut delegate = CountingDelegate::new();

        for _ in 0..config.ticks_per_sample - 1 {
            sched.tick(&mut delegate);
        }
        assert_eq!(delegate.fires, 0, "must not fire before the period elapses");

        sched.tick(&mut delegate);
        assert_eq!(delegate.fires, 1);
    }

    #[test]
    fn never_fires_more_than_once_per_period() {
        let config = SystemConfig::default();
        let mut sched = SamplingScheduler::new(&config);
        let mut delegate = CountingDelegate::new();

        let periods = 7;
        for _ in 0..config.ticks_per_sample * periods {
            sched.tick(&mut delegate);
        }
        assert_eq!(delegate.fires, periods);
    }

    #[test]
    fn counter_wraps_at_threshold_never_beyond() {
        let config = SystemConfig::default();
        let mut sched = SamplingScheduler::new(&config);
        let mut delegate = CountingDelegate::new();

        for _ in 0..config.ticks_per_sample * 3 + 17 {
            sched.tick(&mut delegate);
            assert!(sched.tick_count() < config.ticks_per_sample);
        }
        assert_eq!(sched.tick_count(), 17);
    }

    #[test]
    fn heartbeat_blanked_then_lit_at_sample() {
        let config = SystemConfig::default();
        let mut sched = SamplingScheduler::new(&config);
        let mut delegate = CountingDelegate::new();

        // Leading window: explicit blank.
        for _ in 0..config.heartbeat_blank_ticks - 1 {
            assert_eq!(sched.tick(&mut delegate), Some(false));
        }
        // Middle of the period: level untouched.
        for _ in config.heartbeat_blank_ticks..config.ticks_per_sample {
            assert_eq!(sched.tick(&mut delegate), None);
        }
        // Sample instant: lit.
        assert_eq!(sched.tick(&mut delegate), Some(true));
        assert_eq!(delegate.fires, 1);
    }
}
