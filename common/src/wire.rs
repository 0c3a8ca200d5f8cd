//! Over-the-air control datagram.
//!
//! # Layout
//!
//! The receiver reads the payload as a C struct `{ int x; int y; bool button; }` compiled for a
//! 32-bit little-endian MCU:
//!
//! ```text
//! offset  0..4   x       i32 LE
//! offset  4..8   y       i32 LE
//! offset  8      button  u8 (0 = released)
//! offset  9..12  padding (zero)
//! ```
//!
//! There is no version field. Both ends must agree on this layout.

use crate::input::InputSample;

/// Encoded datagram length in bytes.
pub const WIRE_LEN: usize = 12;

/// Control datagram as carried over the radio.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlPacket {
    pub x: i32,
    pub y: i32,
    pub button: bool,
}

const _: () = assert!(core::mem::size_of::<ControlPacket>() == WIRE_LEN);

/// Datagram decode failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Payload size differs from [`WIRE_LEN`].
    Length { expected: usize, actual: usize },
}

impl ControlPacket {
    pub fn encode(&self) -> [u8; WIRE_LEN] {
        let mut buf = [0u8; WIRE_LEN];
        buf[0..4].copy_from_slice(&self.x.to_le_bytes());
        buf[4..8].copy_from_slice(&self.y.to_le_bytes());
        buf[8] = u8::from(self.button);
        buf
    }

    /// Decode a received payload. Any non-zero button byte reads as pressed.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let bytes: &[u8; WIRE_LEN] = bytes.try_into().map_err(|_| WireError::Length {
            expected: WIRE_LEN,
            actual: bytes.len(),
        })?;

        Ok(Self {
            x: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            y: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            button: bytes[8] != 0,
        })
    }
}

impl From<&InputSample> for ControlPacket {
    fn from(sample: &InputSample) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            button: sample.button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_survives_wire() {
        let sample = InputSample {
            x: -255,
            y: 173,
            button: true,
            speed_percent: 67,
        };
        let packet = ControlPacket::decode(&ControlPacket::from(&sample).encode()).unwrap();
        assert_eq!((packet.x, packet.y, packet.button), (-255, 173, true));
    }

    #[test]
    fn test_encoded_layout() {
        let packet = ControlPacket {
            x: 1,
            y: -1,
            button: true,
        };
        assert_eq!(packet.encode(), [1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 0, 0]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            ControlPacket::decode(&[0; 9]),
            Err(WireError::Length {
                expected: 12,
                actual: 9
            })
        );
        assert!(ControlPacket::decode(&[0; 13]).is_err());
    }

    #[test]
    fn test_decode_nonzero_button_byte_is_pressed() {
        let mut bytes = [0u8; WIRE_LEN];
        bytes[8] = 0x80;
        assert!(ControlPacket::decode(&bytes).unwrap().button);
    }
}
