//! Transmitter library - host-testable pieces of the RC transmitter firmware.
//!
//! The control loop itself lives in `rc-link-common`. This crate adds what is specific to the
//! Pico 2 build: the framing used on the UART link to the ESP-NOW radio co-processor, button
//! debouncing and the main-stack watermark.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p rc-transmitter --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p rc-transmitter --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod bridge;
pub mod debounce;
pub mod stack;
