//! Framing for the UART link to the ESP-NOW radio co-processor.
//!
//! ```text
//! host  -> radio:  0xA5 | cmd | len | payload[len] | crc8
//! radio -> host:   0x5A | evt | len | payload[len] | crc8
//! ```
//!
//! The CRC is CRC-8/SMBUS over the command/event byte, the length and the payload.
//!
//! | Code   | Name        | Payload                              |
//! |--------|-------------|--------------------------------------|
//! | `0x01` | `INIT`      | -                                    |
//! | `0x02` | `ADD_PEER`  | mac[6], channel, encrypt             |
//! | `0x03` | `SEND`      | mac[6], datagram                     |
//! | `0x81` | `ACK`       | command, status                      |
//! | `0x82` | `SEND_DONE` | mac[6], status                       |
//!
//! Status `0` means success.

use crc::{CRC_8_SMBUS, Crc};
use heapless::Vec;
use rc_link_common::link::{CompletionEvent, SendOutcome};
use rc_link_common::radio::{MacAddress, PeerConfig};

/// First byte of every host-to-radio frame.
pub const HOST_SYNC: u8 = 0xA5;

/// First byte of every radio-to-host frame.
pub const RADIO_SYNC: u8 = 0x5A;

pub const CMD_INIT: u8 = 0x01;
pub const CMD_ADD_PEER: u8 = 0x02;
pub const CMD_SEND: u8 = 0x03;

pub const EVT_ACK: u8 = 0x81;
pub const EVT_SEND_DONE: u8 = 0x82;

pub const STATUS_OK: u8 = 0x00;

/// Largest payload either side accepts.
pub const MAX_PAYLOAD: usize = 32;

/// Sync, code, length and CRC.
const FRAME_OVERHEAD: usize = 4;

pub const MAX_FRAME: usize = MAX_PAYLOAD + FRAME_OVERHEAD;

const MAC_LEN: usize = 6;

pub type Frame = Vec<u8, MAX_FRAME>;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than [`MAX_PAYLOAD`].
    PayloadTooLong(usize),
    Crc { expected: u8, actual: u8 },
    UnknownEvent(u8),
    /// Known event with the wrong payload length.
    BadLength { event: u8, len: u8 },
}

// =============================================================================
// Host -> Radio
// =============================================================================

/// Request sent to the co-processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Init,
    AddPeer(&'a PeerConfig),
    Send {
        peer: &'a MacAddress,
        payload: &'a [u8],
    },
}

impl Command<'_> {
    pub const fn code(&self) -> u8 {
        match self {
            Self::Init => CMD_INIT,
            Self::AddPeer(_) => CMD_ADD_PEER,
            Self::Send { .. } => CMD_SEND,
        }
    }

    const fn payload_len(&self) -> usize {
        match self {
            Self::Init => 0,
            Self::AddPeer(_) => MAC_LEN + 2,
            Self::Send { payload, .. } => MAC_LEN + payload.len(),
        }
    }

    /// Build the complete frame, CRC included.
    pub fn encode(&self) -> Result<Frame, FrameError> {
        let len = self.payload_len();
        if len > MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLong(len));
        }

        let mut frame = Frame::new();
        push_slice(&mut frame, &[HOST_SYNC, self.code(), len as u8])?;
        match self {
            Self::Init => {}
            Self::AddPeer(peer) => {
                push_slice(&mut frame, &peer.address.octets())?;
                push_slice(&mut frame, &[peer.channel, u8::from(peer.encrypt)])?;
            }
            Self::Send { peer, payload } => {
                push_slice(&mut frame, &peer.octets())?;
                push_slice(&mut frame, payload)?;
            }
        }
        let crc = CRC8.checksum(&frame[1..]);
        push_slice(&mut frame, &[crc])?;
        Ok(frame)
    }
}

fn push_slice(
    frame: &mut Frame,
    bytes: &[u8],
) -> Result<(), FrameError> {
    let len = frame.len() + bytes.len();
    frame
        .extend_from_slice(bytes)
        .map_err(|_| FrameError::PayloadTooLong(len.saturating_sub(FRAME_OVERHEAD)))
}

// =============================================================================
// Radio -> Host
// =============================================================================

/// Report received from the co-processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Event {
    /// Result of an `INIT` or `ADD_PEER` command.
    Ack { command: u8, status: u8 },
    /// Delivery result of one `SEND`.
    SendDone { peer: MacAddress, status: u8 },
}

impl Event {
    /// Completion report for the link estimator, stamped with the local receive time.
    pub const fn completion(
        &self,
        at_ms: u64,
    ) -> Option<CompletionEvent> {
        match *self {
            Self::Ack { .. } => None,
            Self::SendDone { peer, status } => Some(CompletionEvent {
                peer,
                outcome: if status == STATUS_OK { SendOutcome::Success } else { SendOutcome::Failure },
                at_ms,
            }),
        }
    }

    /// Frame as the co-processor would send it.
    pub fn encode(&self) -> Frame {
        let mut frame = Frame::new();
        let (code, payload): (u8, Vec<u8, { MAC_LEN + 1 }>) = match *self {
            Self::Ack { command, status } => (EVT_ACK, Vec::from_iter([command, status])),
            Self::SendDone { peer, status } => {
                let mut payload: Vec<u8, { MAC_LEN + 1 }> = Vec::from_iter(peer.octets());
                payload.push(status).ok();
                (EVT_SEND_DONE, payload)
            }
        };
        frame.extend_from_slice(&[RADIO_SYNC, code, payload.len() as u8]).ok();
        frame.extend_from_slice(&payload).ok();
        let crc = CRC8.checksum(&frame[1..]);
        frame.push(crc).ok();
        frame
    }

    fn decode(
        code: u8,
        payload: &[u8],
    ) -> Result<Self, FrameError> {
        let bad_length = FrameError::BadLength {
            event: code,
            len: payload.len() as u8,
        };
        match code {
            EVT_ACK => match *payload {
                [command, status] => Ok(Self::Ack { command, status }),
                _ => Err(bad_length),
            },
            EVT_SEND_DONE => match *payload {
                [a, b, c, d, e, f, status] => Ok(Self::SendDone {
                    peer: MacAddress([a, b, c, d, e, f]),
                    status,
                }),
                _ => Err(bad_length),
            },
            other => Err(FrameError::UnknownEvent(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    Sync,
    Code,
    Len,
    Payload,
    Crc,
}

/// Byte-at-a-time parser for radio-to-host frames.
///
/// Bytes before a sync byte are skipped, so the parser recovers on its own after line noise or
/// a dropped byte.
pub struct FrameParser {
    state: ParseState,
    code: u8,
    len: u8,
    payload: Vec<u8, MAX_PAYLOAD>,
}

impl FrameParser {
    pub const fn new() -> Self {
        Self {
            state: ParseState::Sync,
            code: 0,
            len: 0,
            payload: Vec::new(),
        }
    }

    /// Feed one byte. Returns a result once a frame is complete.
    pub fn push_byte(
        &mut self,
        byte: u8,
    ) -> Option<Result<Event, FrameError>> {
        match self.state {
            ParseState::Sync => {
                if byte == RADIO_SYNC {
                    self.state = ParseState::Code;
                }
                None
            }
            ParseState::Code => {
                self.code = byte;
                self.state = ParseState::Len;
                None
            }
            ParseState::Len => {
                if usize::from(byte) > MAX_PAYLOAD {
                    self.state = ParseState::Sync;
                    return Some(Err(FrameError::PayloadTooLong(usize::from(byte))));
                }
                self.len = byte;
                self.payload.clear();
                self.state = if byte == 0 { ParseState::Crc } else { ParseState::Payload };
                None
            }
            ParseState::Payload => {
                self.payload.push(byte).ok();
                if self.payload.len() == usize::from(self.len) {
                    self.state = ParseState::Crc;
                }
                None
            }
            ParseState::Crc => {
                self.state = ParseState::Sync;
                let mut digest = CRC8.digest();
                digest.update(&[self.code, self.len]);
                digest.update(&self.payload);
                let expected = digest.finalize();
                if expected != byte {
                    return Some(Err(FrameError::Crc { expected, actual: byte }));
                }
                Some(Event::decode(self.code, &self.payload))
            }
        }
    }
}

impl Default for FrameParser {
    fn default() -> Self { Self::new() }
}
