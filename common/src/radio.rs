//! Radio transport boundary.
//!
//! The transmitter consumes a connectionless datagram service: bring it up once, register the
//! single static peer, then hand it fixed-size payloads. `send` only reports whether the payload
//! was accepted for transmission; delivery outcomes arrive later as completion events
//! (see [`crate::link::CompletionEvent`]).

use core::fmt;
use core::future::Future;
use core::str::FromStr;

// =============================================================================
// Addressing
// =============================================================================

/// Six-octet hardware address of a radio peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const BROADCAST: Self = Self([0xFF; 6]);

    #[inline]
    pub const fn octets(&self) -> [u8; 6] { self.0 }

    /// Parse `XX:XX:XX:XX:XX:XX` (hex digits, either case).
    pub fn parse(text: &str) -> Result<Self, MacParseError> {
        let mut octets = [0u8; 6];
        let mut parts = text.split(':');

        for octet in &mut octets {
            let part = parts.next().ok_or(MacParseError::TooFewOctets)?;
            if part.len() != 2 {
                return Err(MacParseError::BadOctet);
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| MacParseError::BadOctet)?;
        }

        if parts.next().is_some() {
            return Err(MacParseError::TooManyOctets);
        }
        Ok(Self(octets))
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl fmt::Display for MacAddress {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Reasons a textual address was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacParseError {
    TooFewOctets,
    TooManyOctets,
    /// An octet was not exactly two hex digits.
    BadOctet,
}

/// Static registration data for the one receiver this transmitter talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerConfig {
    pub address: MacAddress,
    /// Radio channel; 0 follows whatever channel the radio is already on.
    pub channel: u8,
    pub encrypt: bool,
}

impl PeerConfig {
    pub const fn new(address: MacAddress) -> Self {
        Self {
            address,
            channel: 0,
            encrypt: false,
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Connectionless datagram transport.
///
/// `init` and `add_peer` run once at startup and may wait on the radio. `send` must not block:
/// it either enqueues the payload or reports why it could not.
pub trait RadioTransport {
    type Error;

    /// Bring the radio up.
    fn init(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Register the receiver.
    fn add_peer(
        &mut self,
        peer: &PeerConfig,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Enqueue one datagram for `peer`.
    fn send(
        &mut self,
        peer: &MacAddress,
        payload: &[u8],
    ) -> Result<(), Self::Error>;
}

/// Startup failures. Either one takes the communication path down for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The transport itself failed to start.
    Init(E),
    /// The transport started but refused the peer.
    Peer(E),
}

/// Initialise `transport` and register `peer`.
pub async fn bring_up<T: RadioTransport>(
    transport: &mut T,
    peer: &PeerConfig,
) -> Result<(), LinkError<T::Error>> {
    transport.init().await.map_err(LinkError::Init)?;
    transport.add_peer(peer).await.map_err(LinkError::Peer)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::vec::Vec;

    use embassy_futures::block_on;

    use super::*;

    /// Scripted transport shared by the tests of this crate.
    #[derive(Default)]
    pub struct MockTransport {
        pub fail_init: bool,
        pub fail_peer: bool,
        pub reject_sends: bool,
        pub peers: Vec<PeerConfig>,
        pub sent: Vec<(MacAddress, Vec<u8>)>,
    }

    impl RadioTransport for MockTransport {
        type Error = &'static str;

        async fn init(&mut self) -> Result<(), Self::Error> {
            if self.fail_init { Err("init") } else { Ok(()) }
        }

        async fn add_peer(
            &mut self,
            peer: &PeerConfig,
        ) -> Result<(), Self::Error> {
            if self.fail_peer {
                return Err("peer");
            }
            self.peers.push(*peer);
            Ok(())
        }

        fn send(
            &mut self,
            peer: &MacAddress,
            payload: &[u8],
        ) -> Result<(), Self::Error> {
            if self.reject_sends {
                return Err("queue full");
            }
            self.sent.push((*peer, payload.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_parse_mac_address() {
        let mac = MacAddress::parse("3C:61:05:12:34:56").unwrap();
        assert_eq!(mac, MacAddress([0x3C, 0x61, 0x05, 0x12, 0x34, 0x56]));
        assert_eq!("ff:ff:ff:ff:ff:ff".parse::<MacAddress>(), Ok(MacAddress::BROADCAST));
    }

    #[test]
    fn test_parse_mac_address_errors() {
        assert_eq!(MacAddress::parse("3C:61:05"), Err(MacParseError::TooFewOctets));
        assert_eq!(MacAddress::parse("3C:61:05:12:34:56:78"), Err(MacParseError::TooManyOctets));
        assert_eq!(MacAddress::parse("3C:61:05:12:34:5"), Err(MacParseError::BadOctet));
        assert_eq!(MacAddress::parse("3C:61:05:12:34:ZZ"), Err(MacParseError::BadOctet));
        assert_eq!(MacAddress::parse(""), Err(MacParseError::BadOctet));
    }

    #[test]
    fn test_display_mac_address() {
        let mac = MacAddress([0x3C, 0x61, 0x05, 0x12, 0x34, 0x0A]);
        assert_eq!(std::format!("{mac}"), "3C:61:05:12:34:0A");
    }

    #[test]
    fn test_peer_config_defaults() {
        let peer = PeerConfig::new(MacAddress::BROADCAST);
        assert_eq!(peer.channel, 0);
        assert!(!peer.encrypt);
    }

    #[test]
    fn test_bring_up_registers_peer() {
        let mut transport = MockTransport::default();
        let peer = PeerConfig::new(MacAddress([1, 2, 3, 4, 5, 6]));
        assert_eq!(block_on(bring_up(&mut transport, &peer)), Ok(()));
        assert_eq!(transport.peers, [peer]);
    }

    #[test]
    fn test_bring_up_init_failure_skips_peer() {
        let mut transport = MockTransport {
            fail_init: true,
            ..MockTransport::default()
        };
        let peer = PeerConfig::new(MacAddress::BROADCAST);
        assert_eq!(block_on(bring_up(&mut transport, &peer)), Err(LinkError::Init("init")));
        assert!(transport.peers.is_empty());
    }

    #[test]
    fn test_bring_up_peer_failure() {
        let mut transport = MockTransport {
            fail_peer: true,
            ..MockTransport::default()
        };
        let peer = PeerConfig::new(MacAddress::BROADCAST);
        assert_eq!(block_on(bring_up(&mut transport, &peer)), Err(LinkError::Peer("peer")));
    }
}
