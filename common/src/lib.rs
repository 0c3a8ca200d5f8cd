//! Core of the RC link: everything between the joystick ADC and the radio, plus the display.
//!
//! This crate is platform-agnostic and shared by the Pico 2 firmware and the desktop simulator:
//!
//! - [`input`]: calibration, piecewise range mapping, deadzone, speed
//! - [`link`]: send-completion events, smoothed signal level, status LED pattern
//! - [`schedule`]: interval gates for sending and rendering
//! - [`gateway`]: rate-gated hand-off of samples to the radio
//! - [`controller`]: the control loop as one owned context
//! - [`wire`]: the over-the-air datagram
//! - [`radio`]: transport boundary, addresses, peer registration
//! - [`display`]: three-region compositor; [`widgets`] draw the regions
//! - [`screens`]: boot, ready and fault screens
//! - [`battery`], [`video`], [`debug_log`]: gauge, receiver video fitting, log ring
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` and never reads a clock: every timestamp is a `u64` of milliseconds
//! supplied by the caller.
//!
//! # Testing
//!
//! ```bash
//! cargo test -p rc-link-common
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod battery;
pub mod colors;
pub mod config;
pub mod controller;
pub mod debug_log;
pub mod display;
pub mod gateway;
pub mod input;
pub mod link;
pub mod radio;
pub mod schedule;
pub mod screens;
pub mod styles;
pub mod video;
pub mod widgets;
pub mod wire;

// Re-export commonly used items
pub use config::ControllerConfig;
pub use controller::{TickReport, Transmitter};
pub use display::{DisplayCompositor, DrawTargetSurface, Surface};
pub use input::{InputSample, JoystickPort, RawAxes};
pub use link::{CompletionEvent, LinkIndicator, SendOutcome};
pub use radio::{LinkError, MacAddress, PeerConfig, RadioTransport};
pub use wire::{ControlPacket, WIRE_LEN};
