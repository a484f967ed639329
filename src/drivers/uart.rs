//! Non-blocking UART TX path for the status line.
//!
//! The legacy approach of busy-waiting on the transmit-ready flag inside a
//! time-critical handler is replaced by a bounded SPSC byte ring: the
//! reporter pushes bytes (dropping on overflow, counted), and the main loop
//! drains the ring opportunistically with writes that take only what the
//! hardware FIFO accepts. A stalled serial line can therefore never delay
//! tick processing or countdown servicing.
//!
//! ```text
//! Reporter ──▶ tx ring (lock-free, bounded) ──▶ service_tx() ──▶ UART FIFO
//! ```
//!
//! Same atomic head/tail discipline as the event queue: one producer (the
//! main-loop dispatch path), one consumer (the main-loop drain at the end
//! of each iteration).

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::app::ports::ByteSink;

/// Ring capacity. Power of 2; comfortably holds several status frames.
const TX_RING_CAP: usize = 128;

static TX_HEAD: AtomicU8 = AtomicU8::new(0);
static TX_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: TX_BUFFER is accessed exclusively through the SPSC pair below;
// acquire/release on head/tail enforce the single-writer/single-reader
// discipline per slot.
static mut TX_BUFFER: [u8; TX_RING_CAP] = [0; TX_RING_CAP];

/// Bytes dropped because the ring was full (stalled or slow line).
static TX_DROPPED: AtomicU32 = AtomicU32::new(0);

/// Queue one byte for transmission. Never blocks.
/// Returns `false` (and counts the drop) if the ring is full.
pub fn tx_push(byte: u8) -> bool {
    let head = TX_HEAD.load(Ordering::Relaxed);
    let tail = TX_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % TX_RING_CAP as u8;

    if next_head == tail {
        TX_DROPPED.fetch_add(1, Ordering::Relaxed);
        return false;
    }

    // SAFETY: single producer; the slot at `head` is not visible to the
    // consumer until the store below.
    unsafe {
        TX_BUFFER[head as usize] = byte;
    }

    TX_HEAD.store(next_head, Ordering::Release);
    true
}

/// Peek the next queued byte without consuming it.
fn tx_peek() -> Option<u8> {
    let tail = TX_TAIL.load(Ordering::Relaxed);
    let head = TX_HEAD.load(Ordering::Acquire);
    if tail == head {
        return None;
    }
    Some(unsafe { TX_BUFFER[tail as usize] })
}

/// Consume the byte returned by the last `tx_peek`.
fn tx_advance() {
    let tail = TX_TAIL.load(Ordering::Relaxed);
    TX_TAIL.store((tail + 1) % TX_RING_CAP as u8, Ordering::Release);
}

/// Queued bytes awaiting transmission.
pub fn tx_pending() -> usize {
    let head = TX_HEAD.load(Ordering::Relaxed) as usize;
    let tail = TX_TAIL.load(Ordering::Relaxed) as usize;
    (head + TX_RING_CAP - tail) % TX_RING_CAP
}

/// Total bytes dropped since boot.
pub fn tx_dropped() -> u32 {
    TX_DROPPED.load(Ordering::Relaxed)
}

/// Drain the ring into the UART, taking only what the FIFO accepts.
/// Call once per main-loop iteration; returns the bytes moved.
pub fn service_tx() -> usize {
    let mut moved = 0;
    // Peek-then-advance so a byte the FIFO refuses stays queued.
    while let Some(byte) = tx_peek() {
        if !hw_try_write(byte) {
            break;
        }
        tx_advance();
        moved += 1;
    }
    moved
}

// ── Hardware write (espidf) / capture (sim) ──────────────────

#[cfg(target_os = "espidf")]
fn hw_try_write(byte: u8) -> bool {
    // uart_tx_chars writes only what fits in the TX FIFO and returns the
    // count — 0 means the FIFO is full right now. Never blocks.
    let buf = [byte];
    let written = unsafe {
        esp_idf_svc::sys::uart_tx_chars(
            crate::pins::UART_PORT,
            buf.as_ptr().cast(),
            1,
        )
    };
    written == 1
}

#[cfg(not(target_os = "espidf"))]
static SIM_TX_CAPTURE: std::sync::Mutex<Vec<u8>> = std::sync::Mutex::new(Vec::new());

#[cfg(not(target_os = "espidf"))]
fn hw_try_write(byte: u8) -> bool {
    SIM_TX_CAPTURE
        .lock()
        .expect("tx capture mutex poisoned")
        .push(byte);
    true
}

/// Take everything the simulated line has "transmitted" so far.
#[cfg(not(target_os = "espidf"))]
pub fn sim_take_output() -> Vec<u8> {
    core::mem::take(&mut *SIM_TX_CAPTURE.lock().expect("tx capture mutex poisoned"))
}

// ── ByteSink adapter ──────────────────────────────────────────

/// [`ByteSink`] over the TX ring — what the reporter writes through.
pub struct UartTxSink;

impl UartTxSink {
    pub fn new() -> Self {
        Self
    }
}

impl ByteSink for UartTxSink {
    fn write_byte(&mut self, byte: u8) -> bool {
        tx_push(byte)
    }
}
