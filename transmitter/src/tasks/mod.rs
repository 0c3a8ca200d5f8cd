//! Async tasks for the transmitter firmware.
//!
//! - `flush`: framebuffer DMA transfers to the panel
//! - `radio`: UART link to the radio co-processor (outbound frames, inbound events)

pub mod flush;
pub mod radio;

pub use flush::{FLUSH_DONE, FLUSH_SIGNAL, display_flush_task};
pub use radio::{CoprocessorRadio, TransportError, pending_completions, radio_rx_task, radio_tx_task};
