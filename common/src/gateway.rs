//! Rate-gated hand-off of input samples to the radio.

use crate::input::InputSample;
use crate::radio::{MacAddress, RadioTransport};
use crate::schedule::{Gate, Scheduler};
use crate::wire::ControlPacket;

/// Result of one gateway poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatewayOutcome<E> {
    /// Send gate still closed; nothing was attempted.
    Gated,
    /// The transport accepted the datagram.
    Sent,
    /// The transport refused the datagram. Not retried; the next open gate sends fresh data.
    Rejected(E),
    /// The radio never came up; the gateway stays silent.
    Disabled,
}

impl<E> GatewayOutcome<E> {
    /// A send was attempted (whatever the transport said).
    #[inline]
    pub const fn attempted(&self) -> bool { matches!(self, Self::Sent | Self::Rejected(_)) }
}

/// Packages the current sample into a [`ControlPacket`] whenever the send gate opens.
#[derive(Clone, Copy, Debug)]
pub struct TransmissionGateway {
    peer: MacAddress,
    enabled: bool,
    sent: u32,
    rejected: u32,
    last_send_ms: Option<u64>,
}

impl TransmissionGateway {
    pub const fn new(peer: MacAddress) -> Self {
        Self {
            peer,
            enabled: true,
            sent: 0,
            rejected: 0,
            last_send_ms: None,
        }
    }

    /// Permanently stop sending (startup failure).
    pub const fn disable(&mut self) { self.enabled = false; }

    #[inline]
    pub const fn is_enabled(&self) -> bool { self.enabled }

    /// Send `sample` if the send gate is open at `now_ms`.
    ///
    /// The send timestamp is recorded for both accepted and rejected attempts.
    pub fn poll<T: RadioTransport>(
        &mut self,
        scheduler: &mut Scheduler,
        now_ms: u64,
        sample: &InputSample,
        transport: &mut T,
    ) -> GatewayOutcome<T::Error> {
        if !self.enabled {
            return GatewayOutcome::Disabled;
        }
        if !scheduler.try_fire(Gate::Send, now_ms) {
            return GatewayOutcome::Gated;
        }

        let payload = ControlPacket::from(sample).encode();
        self.last_send_ms = Some(now_ms);

        match transport.send(&self.peer, &payload) {
            Ok(()) => {
                self.sent = self.sent.wrapping_add(1);
                GatewayOutcome::Sent
            }
            Err(e) => {
                self.rejected = self.rejected.wrapping_add(1);
                GatewayOutcome::Rejected(e)
            }
        }
    }

    #[inline]
    pub const fn peer(&self) -> &MacAddress { &self.peer }

    #[inline]
    pub const fn last_send_ms(&self) -> Option<u64> { self.last_send_ms }

    /// Accepted and rejected sends since boot.
    #[inline]
    pub const fn counters(&self) -> (u32, u32) { (self.sent, self.rejected) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::tests::MockTransport;
    use crate::wire::WIRE_LEN;

    const PEER: MacAddress = MacAddress([0x3C, 0x61, 0x05, 0x12, 0x34, 0x56]);

    fn sample() -> InputSample {
        InputSample {
            x: 120,
            y: -80,
            button: true,
            speed_percent: 31,
        }
    }

    #[test]
    fn test_sends_only_when_gate_opens() {
        let mut gateway = TransmissionGateway::new(PEER);
        let mut scheduler = Scheduler::default();
        let mut radio = MockTransport::default();

        assert_eq!(gateway.poll(&mut scheduler, 5, &sample(), &mut radio), GatewayOutcome::Gated);
        assert_eq!(gateway.poll(&mut scheduler, 20, &sample(), &mut radio), GatewayOutcome::Sent);
        assert_eq!(gateway.poll(&mut scheduler, 39, &sample(), &mut radio), GatewayOutcome::Gated);
        assert_eq!(radio.sent.len(), 1);

        let (peer, payload) = &radio.sent[0];
        assert_eq!(*peer, PEER);
        assert_eq!(payload.len(), WIRE_LEN);
        assert_eq!(ControlPacket::decode(payload).unwrap(), ControlPacket::from(&sample()));
    }

    #[test]
    fn test_rejection_is_recorded_not_retried() {
        let mut gateway = TransmissionGateway::new(PEER);
        let mut scheduler = Scheduler::default();
        let mut radio = MockTransport {
            reject_sends: true,
            ..MockTransport::default()
        };

        assert_eq!(
            gateway.poll(&mut scheduler, 20, &sample(), &mut radio),
            GatewayOutcome::Rejected("queue full")
        );
        assert_eq!(gateway.last_send_ms(), Some(20));
        assert_eq!(gateway.poll(&mut scheduler, 21, &sample(), &mut radio), GatewayOutcome::Gated);
        assert_eq!(gateway.counters(), (0, 1));
    }

    #[test]
    fn test_disabled_gateway_never_sends() {
        let mut gateway = TransmissionGateway::new(PEER);
        let mut scheduler = Scheduler::default();
        let mut radio = MockTransport::default();
        assert!(gateway.is_enabled());
        gateway.disable();
        assert!(!gateway.is_enabled());

        for t in (0..200).step_by(10) {
            assert_eq!(gateway.poll(&mut scheduler, t, &sample(), &mut radio), GatewayOutcome::Disabled);
        }
        assert!(radio.sent.is_empty());
        assert_eq!(scheduler.gate(Gate::Send).last_fire_ms(), 0);
    }

    #[test]
    fn test_attempted() {
        assert!(GatewayOutcome::<()>::Sent.attempted());
        assert!(GatewayOutcome::Rejected(()).attempted());
        assert!(!GatewayOutcome::<()>::Gated.attempted());
        assert!(!GatewayOutcome::<()>::Disabled.attempted());
    }
}
