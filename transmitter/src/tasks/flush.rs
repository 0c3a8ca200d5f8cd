//! Display flush task.
//!
//! Waits for the control loop to hand over a completed framebuffer and pushes it to the panel
//! via DMA while the loop keeps sampling and rendering into the other buffer.

use core::sync::atomic::{AtomicU32, Ordering};

use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;

use crate::st7789::{St7789Flusher, frame};

// =============================================================================
// Double Buffering Synchronization
// =============================================================================

/// Index of the buffer to flush.
pub static FLUSH_SIGNAL: Signal<CriticalSectionRawMutex, usize> = Signal::new();

/// Raised when the last flush finished.
pub static FLUSH_DONE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Duration of the last flush in microseconds.
pub static LAST_FLUSH_TIME_US: AtomicU32 = AtomicU32::new(0);

#[embassy_executor::task]
pub async fn display_flush_task(flusher: &'static mut St7789Flusher<'static>) {
    info!("Display flush task started");

    loop {
        let buffer_idx = FLUSH_SIGNAL.wait().await;
        let flush_start = Instant::now();

        // SAFETY: the control loop draws into the other frame until FLUSH_DONE
        flusher.flush_buffer(unsafe { frame(buffer_idx) }).await;

        LAST_FLUSH_TIME_US.store(flush_start.elapsed().as_micros() as u32, Ordering::Relaxed);
        FLUSH_DONE.signal(());
    }
}
