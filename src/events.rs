//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - The fast periodic tick timer (drives the sampling scheduler)
//! - The dual-match countdown callbacks (valve closure, cooldown release)
//! - Software (the scheduler firing a sample)
//!
//! Events are consumed by the main control loop, which processes them one
//! at a time in FIFO order. FIFO is load-bearing: the countdown pushes
//! `StageOneExpired` strictly before `StageTwoExpired` for a cycle, so the
//! single consumer can never observe a cooldown release ahead of the valve
//! closure it belongs to.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Tick timer  │────▶│              │     │              │
//! │ Countdown   │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Software    │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// System event types, ordered by rough priority.
/// Lower discriminant = more safety-relevant when reading a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Valve countdown (closure must never be missed) ────
    /// First match point reached — close the valve.
    StageOneExpired = 0,
    /// Second match point reached — cooldown over, eligible again.
    StageTwoExpired = 1,

    // ── Timekeeping ───────────────────────────────────────
    /// Fast system tick (10 ms).
    Tick            = 10,
    /// The sampling scheduler counted a full period — read the probe.
    SampleDue       = 11,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// ISRs / timer callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices. The buffer is intentionally kept in a
// static so timer callbacks can access it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed exclusively through the SPSC pair below.
// Producer (push_event): timer-callback context — one writer.
// Consumer (pop_event): main-loop task — one reader.
// The acquire/release pairs on head/tail enforce the SPSC discipline.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: Only one producer (timer callbacks are serialised on the
    // esp_timer task; the sim loop is single-threaded).
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0  => Some(Event::StageOneExpired),
        1  => Some(Event::StageTwoExpired),
        10 => Some(Event::Tick),
        11 => Some(Event::SampleDue),
        _  => None,
    }
}
