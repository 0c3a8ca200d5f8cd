//! UART link to the ESP-NOW radio co-processor.
//!
//! [`CoprocessorRadio`] is the control loop's [`RadioTransport`]. It never touches the UART
//! directly:
//!
//! - outbound frames go through [`TX_FRAMES`] to [`radio_tx_task`]
//! - [`radio_rx_task`] parses inbound frames, routes command ACKs to [`ACKS`] and turns
//!   `SEND_DONE` reports into [`CompletionEvent`]s on [`COMPLETIONS`]
//!
//! `send()` only enqueues, so a full queue is reported synchronously as
//! [`TransportError::QueueFull`] and the loop never blocks on the radio.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_rp::uart::{Async, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, with_timeout};
use rc_link_common::link::CompletionEvent;
use rc_link_common::radio::{MacAddress, PeerConfig, RadioTransport};
use rc_transmitter::bridge::{Command, Event, Frame, FrameError, FrameParser, STATUS_OK};

/// Outbound frames waiting for the UART.
pub const TX_QUEUE_DEPTH: usize = 4;

/// Completions waiting for the next control-loop tick.
pub const COMPLETION_QUEUE_DEPTH: usize = 8;

/// How long `INIT` and `ADD_PEER` wait for their ACK.
pub const ACK_TIMEOUT_MS: u64 = 500;

pub static TX_FRAMES: Channel<CriticalSectionRawMutex, Frame, TX_QUEUE_DEPTH> = Channel::new();

/// `(command, status)` pairs from ACK events.
pub static ACKS: Channel<CriticalSectionRawMutex, (u8, u8), 2> = Channel::new();

pub static COMPLETIONS: Channel<CriticalSectionRawMutex, CompletionEvent, COMPLETION_QUEUE_DEPTH> = Channel::new();

/// Set by the TX task after a failed UART write; reported by the next `send()`.
static UART_FAULT: AtomicBool = AtomicBool::new(false);

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum TransportError {
    /// Outbound queue full; the datagram was dropped.
    QueueFull,
    /// No ACK within [`ACK_TIMEOUT_MS`].
    Timeout,
    /// Co-processor answered with a non-zero status.
    Rejected(u8),
    /// A previous UART write failed.
    Uart,
    Frame(FrameError),
}

/// Handle to the co-processor link. The state lives in the statics above.
pub struct CoprocessorRadio {
    _private: (),
}

impl CoprocessorRadio {
    pub const fn new() -> Self { Self { _private: () } }

    async fn command(
        &mut self,
        command: Command<'_>,
    ) -> Result<(), TransportError> {
        let code = command.code();
        let frame = command.encode().map_err(TransportError::Frame)?;

        // Drop ACKs left over from an earlier timed-out command
        while ACKS.try_receive().is_ok() {}
        TX_FRAMES.send(frame).await;

        let ack = async {
            loop {
                let (acked, status) = ACKS.receive().await;
                if acked == code {
                    return status;
                }
            }
        };
        let status = with_timeout(Duration::from_millis(ACK_TIMEOUT_MS), ack)
            .await
            .map_err(|_| TransportError::Timeout)?;

        if status == STATUS_OK { Ok(()) } else { Err(TransportError::Rejected(status)) }
    }
}

impl RadioTransport for CoprocessorRadio {
    type Error = TransportError;

    async fn init(&mut self) -> Result<(), Self::Error> { self.command(Command::Init).await }

    async fn add_peer(
        &mut self,
        peer: &PeerConfig,
    ) -> Result<(), Self::Error> {
        self.command(Command::AddPeer(peer)).await
    }

    fn send(
        &mut self,
        peer: &MacAddress,
        payload: &[u8],
    ) -> Result<(), Self::Error> {
        if UART_FAULT.swap(false, Ordering::Relaxed) {
            return Err(TransportError::Uart);
        }
        let frame = Command::Send { peer, payload }
            .encode()
            .map_err(TransportError::Frame)?;
        TX_FRAMES.try_send(frame).map_err(|_| TransportError::QueueFull)
    }
}

/// Completions received since the last call, oldest first.
pub fn pending_completions() -> impl Iterator<Item = CompletionEvent> {
    core::iter::from_fn(|| COMPLETIONS.try_receive().ok())
}

/// Writes queued frames to the UART.
#[embassy_executor::task]
pub async fn radio_tx_task(mut tx: UartTx<'static, Async>) {
    info!("Radio TX task started");

    loop {
        let frame = TX_FRAMES.receive().await;
        if let Err(e) = tx.write(&frame).await {
            warn!("Radio UART write failed: {:?}", e);
            UART_FAULT.store(true, Ordering::Relaxed);
        }
    }
}

/// Parses co-processor events and routes them to the ACK and completion queues.
#[embassy_executor::task]
pub async fn radio_rx_task(mut rx: UartRx<'static, Async>) {
    info!("Radio RX task started");

    let mut parser = FrameParser::new();
    let mut byte = [0u8; 1];

    loop {
        if let Err(e) = rx.read(&mut byte).await {
            warn!("Radio UART read failed: {:?}", e);
            continue;
        }

        match parser.push_byte(byte[0]) {
            None => {}
            Some(Ok(Event::Ack { command, status })) => {
                if ACKS.try_send((command, status)).is_err() {
                    warn!("Unclaimed ACK for command {=u8:#x}", command);
                }
            }
            Some(Ok(event)) => {
                if let Some(done) = event.completion(Instant::now().as_millis())
                    && COMPLETIONS.try_send(done).is_err()
                {
                    warn!("Completion queue full, report dropped");
                }
            }
            Some(Err(e)) => warn!("Radio frame error: {:?}", e),
        }
    }
}
