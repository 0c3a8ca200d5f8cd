//! Simulated ESP-NOW link.
//!
//! Datagrams are queued in flight and reported back after [`AIR_TIME_MS`]. In loss mode every
//! datagram is reported as failed and never reaches the receiver. The in-flight queue is
//! bounded like the radio's, so a stalled link surfaces as synchronous send rejections.

use std::collections::VecDeque;
use std::fmt;

use rc_link_common::link::{CompletionEvent, SendOutcome};
use rc_link_common::radio::{MacAddress, PeerConfig, RadioTransport};
use rc_link_common::wire::WIRE_LEN;

/// Delay between a send and its completion report.
pub const AIR_TIME_MS: u64 = 6;

/// Datagrams the radio holds before refusing more.
pub const QUEUE_DEPTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimRadioError {
    /// Radio start-up refused (`--radio-fault`).
    InitRefused,
    /// Only one peer fits in the simulated peer table.
    PeerTableFull,
    QueueFull,
}

impl fmt::Display for SimRadioError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::InitRefused => write!(f, "radio init refused"),
            Self::PeerTableFull => write!(f, "peer table full"),
            Self::QueueFull => write!(f, "send queue full"),
        }
    }
}

struct InFlight {
    peer: MacAddress,
    datagram: [u8; WIRE_LEN],
    due_ms: u64,
}

/// What the link produced since the last poll.
#[derive(Debug, Default)]
pub struct Delivery {
    pub completions: Vec<CompletionEvent>,
    /// Datagrams that reached the receiver.
    pub received: Vec<[u8; WIRE_LEN]>,
}

pub struct SimRadio {
    refuse_init: bool,
    peer: Option<PeerConfig>,
    lossy: bool,
    now_ms: u64,
    in_flight: VecDeque<InFlight>,
}

impl SimRadio {
    pub fn new(refuse_init: bool) -> Self {
        Self {
            refuse_init,
            peer: None,
            lossy: false,
            now_ms: 0,
            in_flight: VecDeque::with_capacity(QUEUE_DEPTH),
        }
    }

    /// Toggle loss mode. Returns the new state.
    pub fn toggle_loss(&mut self) -> bool {
        self.lossy = !self.lossy;
        self.lossy
    }

    /// Advance the link to `now_ms` and collect every report that became due.
    pub fn poll(
        &mut self,
        now_ms: u64,
    ) -> Delivery {
        self.now_ms = now_ms;
        let mut delivery = Delivery::default();

        while let Some(next) = self.in_flight.front() {
            if next.due_ms > now_ms {
                break;
            }
            let Some(done) = self.in_flight.pop_front() else {
                break;
            };
            let outcome = if self.lossy { SendOutcome::Failure } else { SendOutcome::Success };
            if outcome.is_success() {
                delivery.received.push(done.datagram);
            }
            delivery.completions.push(CompletionEvent {
                peer: done.peer,
                outcome,
                at_ms: done.due_ms,
            });
        }
        delivery
    }
}

impl RadioTransport for SimRadio {
    type Error = SimRadioError;

    async fn init(&mut self) -> Result<(), Self::Error> {
        if self.refuse_init {
            return Err(SimRadioError::InitRefused);
        }
        Ok(())
    }

    async fn add_peer(
        &mut self,
        peer: &PeerConfig,
    ) -> Result<(), Self::Error> {
        if self.peer.is_some_and(|p| p.address != peer.address) {
            return Err(SimRadioError::PeerTableFull);
        }
        self.peer = Some(*peer);
        Ok(())
    }

    fn send(
        &mut self,
        peer: &MacAddress,
        payload: &[u8],
    ) -> Result<(), Self::Error> {
        if self.in_flight.len() >= QUEUE_DEPTH {
            return Err(SimRadioError::QueueFull);
        }
        let mut datagram = [0u8; WIRE_LEN];
        let len = payload.len().min(WIRE_LEN);
        datagram[..len].copy_from_slice(&payload[..len]);
        self.in_flight.push_back(InFlight {
            peer: *peer,
            datagram,
            due_ms: self.now_ms + AIR_TIME_MS,
        });
        Ok(())
    }
}
