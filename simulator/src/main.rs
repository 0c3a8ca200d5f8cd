//! RC Transmitter Simulator for Windows/Desktop.
//!
//! Runs the same control loop as the firmware against a keyboard joystick and an in-process
//! radio link. The window shows the transmitter's Display Pack on the left and the receiver's
//! view of the link on the right.
//!
//! # Key Controls
//!
//! - **W/A/S/D**: push the stick (hold **H** for half deflection)
//! - **E**: joystick push button
//! - **C**: re-calibrate the joystick center (release the stick first)
//! - **L**: toggle link loss (every send fails, nothing is delivered)
//! - **V**: toggle the receiver's video relay view
//!
//! Start with `--radio-fault` to have radio init refused and see the fault path.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

mod joystick;
mod radio;
mod receiver;
mod timing;

use std::thread;
use std::time::Duration;

use embassy_futures::block_on;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use rc_link_common::battery::{BATTERY_EMPTY_MV, BATTERY_FULL_MV, percent_from_millivolts};
use rc_link_common::colors::BLACK;
use rc_link_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use rc_link_common::debug_log::DebugLog;
use rc_link_common::gateway::GatewayOutcome;
use rc_link_common::link::LinkIndicator;
use rc_link_common::schedule::IntervalGate;
use rc_link_common::screens::{
    BOOT_STEP_MS,
    BOOT_STEPS,
    FAULT_HOLD_MS,
    READY_HOLD_MS,
    draw_boot_frame,
    draw_fault_screen,
    draw_ready_screen,
};
use rc_link_common::{ControllerConfig, DisplayCompositor, DrawTargetSurface, LinkError, Transmitter};

use crate::joystick::SimJoystick;
use crate::radio::{SimRadio, SimRadioError};
use crate::receiver::Receiver;
use crate::timing::{Clock, LOOP_TICK, RECEIVER_FRAME_MS, ThreadDelay};

/// Transmitter panel, left half of the window.
const TRANSMITTER_AREA: Rectangle = Rectangle::new(Point::zero(), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));

/// Receiver view, right half of the window.
const RECEIVER_AREA: Rectangle =
    Rectangle::new(Point::new(SCREEN_WIDTH as i32, 0), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));

/// Simulated battery drain, full to empty.
const BATTERY_DRAIN_MS: u64 = 10 * 60 * 1000;

/// Spacing between battery readings.
const BATTERY_INTERVAL_MS: u64 = 1000;

fn main() {
    let refuse_init = std::env::args().any(|arg| arg == "--radio-fault");

    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH * 2, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("RC Transmitter Sim", &output_settings);

    display.clear(BLACK).ok();
    window.update(&display);

    for step in 1..=BOOT_STEPS {
        draw_boot_frame(&mut display.cropped(&TRANSMITTER_AREA), step);
        window.update(&display);
        if quit_requested(&mut window) {
            return;
        }
        thread::sleep(Duration::from_millis(BOOT_STEP_MS));
    }

    let clock = Clock::start();
    let mut log = DebugLog::new();
    let mut stick = SimJoystick::new();
    let mut radio = SimRadio::new(refuse_init);
    let mut receiver = Receiver::new();

    let config = ControllerConfig::default();
    let mut compositor = DisplayCompositor::new(&config);
    let mut tx = Transmitter::new(config);

    let Ok((x, y)) = tx.calibrate(&mut stick, &mut ThreadDelay);
    println!("Joystick calibrated: center x={} y={}", x.center_raw, y.center_raw);

    match block_on(tx.start(&mut radio)) {
        Ok(()) => {
            log_line(&mut log, clock.now_ms(), "Radio up, peer registered");
            draw_ready_screen(&mut display.cropped(&TRANSMITTER_AREA));
            window.update(&display);
            thread::sleep(Duration::from_millis(READY_HOLD_MS));
        }
        Err(e) => {
            log_line(&mut log, clock.now_ms(), "Radio bring-up failed");
            draw_fault_screen(&mut display.cropped(&TRANSMITTER_AREA), fault_text(e));
            window.update(&display);
            thread::sleep(Duration::from_millis(FAULT_HOLD_MS));
        }
    }
    println!("Peer {}", tx.config().peer.address);

    let mut receiver_gate = IntervalGate::new(RECEIVER_FRAME_MS);
    let mut battery_gate = IntervalGate::new(BATTERY_INTERVAL_MS);
    let mut battery_percent = None;
    let mut last_indicator = tx.indicator();
    let mut rejecting = false;

    loop {
        let now_ms = clock.now_ms();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if stick.key(keycode, true) || repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::C => {
                            let Ok((x, y)) = tx.calibrate(&mut stick, &mut ThreadDelay);
                            println!("Joystick re-calibrated: center x={} y={}", x.center_raw, y.center_raw);
                            log_line(&mut log, now_ms, "Joystick re-calibrated");
                        }
                        Keycode::L => {
                            let msg = if radio.toggle_loss() { "Link loss ON" } else { "Link loss OFF" };
                            log_line(&mut log, now_ms, msg);
                        }
                        Keycode::V => {
                            let msg = if receiver.toggle_video() { "Video relay ON" } else { "Video relay OFF" };
                            log_line(&mut log, now_ms, msg);
                        }
                        _ => {}
                    }
                }
                SimulatorEvent::KeyUp { keycode, .. } => {
                    stick.key(keycode, false);
                }
                _ => {}
            }
        }

        let delivery = radio.poll(now_ms);
        for datagram in &delivery.received {
            if receiver.receive(datagram).is_err() {
                log_line(&mut log, now_ms, "Receiver dropped malformed datagram");
            }
        }

        // The keyboard joystick cannot fail a read
        let Ok(report) = tx.tick(now_ms, &mut stick, &mut radio, delivery.completions);
        match report.send {
            GatewayOutcome::Rejected(e) if !rejecting => {
                rejecting = true;
                log_line(&mut log, now_ms, if e == SimRadioError::QueueFull { "Send queue full" } else { "Send rejected" });
            }
            GatewayOutcome::Sent => rejecting = false,
            _ => {}
        }

        let indicator = tx.indicator();
        if indicator != last_indicator {
            last_indicator = indicator;
            let msg = match indicator {
                LinkIndicator::Connected => "Link connected",
                LinkIndicator::Searching => "Link lost, searching",
                LinkIndicator::Fault => "Link fault",
            };
            log_line(&mut log, now_ms, msg);
        }

        if battery_gate.try_fire(now_ms) {
            battery_percent = Some(percent_from_millivolts(simulated_battery_mv(now_ms)));
        }

        let mut drawn = tx
            .render(&mut compositor, now_ms, battery_percent, &mut DrawTargetSurface(&mut display))
            .unwrap_or(false);

        if receiver_gate.try_fire(now_ms) {
            receiver.draw(&mut display.cropped(&RECEIVER_AREA), now_ms, log.latest());
            drawn = true;
        }

        if drawn {
            window.update(&display);
        }

        thread::sleep(LOOP_TICK);
    }
}

/// Drain the simulated pack linearly, then hold at empty.
fn simulated_battery_mv(now_ms: u64) -> u32 {
    let drained = (BATTERY_FULL_MV - BATTERY_EMPTY_MV) as u64 * now_ms.min(BATTERY_DRAIN_MS) / BATTERY_DRAIN_MS;
    BATTERY_FULL_MV - drained as u32
}

/// Record a log line and echo it to stdout.
fn log_line(
    log: &mut DebugLog,
    now_ms: u64,
    msg: &str,
) {
    log.push_at(now_ms, msg);
    if let Some(line) = log.latest() {
        println!("{line}");
    }
}

/// Fault screen detail line for a failed bring-up.
const fn fault_text(error: LinkError<SimRadioError>) -> &'static str {
    match error {
        LinkError::Init(_) => "RADIO INIT FAILED",
        LinkError::Peer(_) => "PEER REJECTED",
    }
}

fn quit_requested(window: &mut Window) -> bool { window.events().any(|event| matches!(event, SimulatorEvent::Quit)) }
