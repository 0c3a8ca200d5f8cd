//! RC Transmitter Firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Reads a two-axis analog joystick, sends the conditioned position to the receiver over an
//! ESP-NOW radio co-processor on UART0 and shows link/input status on the Pimoroni Pico
//! Display Pack.
//!
//! # Architecture
//!
//! - Main task: the control loop. Each iteration drains send completions, samples the stick,
//!   sends when the send gate opens and renders when the display gate opens.
//! - Flush task: pushes completed framebuffers to the panel via DMA (double buffered).
//! - Radio TX/RX tasks: own the UART halves and talk the co-processor frame protocol.
//!
//! # Button Controls
//!
//! - **A**: Re-calibrate the joystick center (stick must be at rest)

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod analog;
mod display;
mod led;
mod st7789;
mod tasks;

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::Spi;
use embassy_rp::uart::{Config as UartConfig, InterruptHandler as UartInterruptHandler, Uart};
use embassy_time::{Delay, Instant, Timer};
use embedded_graphics::prelude::*;
use rc_link_common::colors::BLACK;
use rc_link_common::config::ControllerConfig;
use rc_link_common::display::DisplayCompositor;
use rc_link_common::gateway::GatewayOutcome;
use rc_link_common::radio::LinkError;
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
use rc_link_common::Transmitter;
use rc_transmitter::debounce::Debouncer;
use rc_transmitter::stack::StackWatermark;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use crate::analog::AnalogInputs;
use crate::display::display_spi_config;
use crate::led::StatusLed;
use crate::st7789::{FrameBuffers, St7789Flusher, St7789Renderer, frame};
use crate::tasks::flush::LAST_FLUSH_TIME_US;
use crate::tasks::{
    CoprocessorRadio,
    FLUSH_DONE,
    FLUSH_SIGNAL,
    TransportError,
    display_flush_task,
    pending_completions,
    radio_rx_task,
    radio_tx_task,
};

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
    UART0_IRQ => UartInterruptHandler<UART0>;
});

/// Baud rate of the co-processor link.
const RADIO_BAUDRATE: u32 = 921_600;

/// Spacing between battery readings.
const BATTERY_INTERVAL_MS: u64 = 1000;

/// Spacing between link summaries on the defmt log.
const LINK_LOG_INTERVAL_MS: u64 = 2000;

/// Region buffers for the status screen (~64 KB, kept out of the stack).
static COMPOSITOR: ConstStaticCell<DisplayCompositor> =
    ConstStaticCell::new(DisplayCompositor::new(&ControllerConfig::new()));

static FLUSHER: StaticCell<St7789Flusher<'static>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RC transmitter starting...");

    let p = embassy_rp::init(Default::default());

    // RGB LED (active-low), off until the control loop starts
    let mut status_led = StatusLed::new(
        Output::new(p.PIN_6, Level::High),
        Output::new(p.PIN_7, Level::High),
        Output::new(p.PIN_8, Level::High),
    );

    // Display: CS=17, DC=16, CLK=18, MOSI=19, Backlight=20
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let _backlight = Output::new(p.PIN_20, Level::High);

    // TX-only SPI with DMA (the panel has no MISO)
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, display_spi_config());

    let mut flusher = St7789Flusher::new(spi, dc, cs);
    flusher.init().await;
    info!("Display initialized");

    // SAFETY: the only FrameBuffers instance; the flush task is not running yet
    let mut frames = unsafe { FrameBuffers::new() };

    // Clear both frames before the boot screens
    for _ in 0..2 {
        St7789Renderer::new(unsafe { frames.back() }).clear(BLACK).ok();
        let idx = frames.present();
        flusher.flush_buffer(unsafe { frame(idx) }).await;
    }

    // Until the flush task starts, boot screens draw into the back frame and flush in place
    let boot_idx = frames.back_index();
    for step in 1..=BOOT_STEPS {
        draw_boot_frame(&mut St7789Renderer::new(unsafe { frames.back() }), step);
        flusher.flush_buffer(unsafe { frame(boot_idx) }).await;
        Timer::after_millis(BOOT_STEP_MS).await;
    }

    // Joystick X=26, Y=27, button=22; VSYS/3 on 29
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let mut analog = AnalogInputs::new(
        adc,
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
        AdcChannel::new_pin(p.PIN_29, Pull::None),
        Input::new(p.PIN_22, Pull::Up),
    );

    let mut tx = Transmitter::new(ControllerConfig::new());

    match tx.calibrate(&mut analog, &mut Delay) {
        Ok((x, y)) => info!("Joystick calibrated: center x={} y={}", x.center_raw, y.center_raw),
        Err(e) => warn!("Calibration failed, using nominal center: {:?}", e),
    }

    // Radio co-processor on UART0: TX=0, RX=1
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = RADIO_BAUDRATE;
    let uart = Uart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, p.DMA_CH1, p.DMA_CH2, uart_config);
    let (uart_tx, uart_rx) = uart.split();
    spawner.spawn(radio_tx_task(uart_tx).unwrap());
    spawner.spawn(radio_rx_task(uart_rx).unwrap());

    let mut radio = CoprocessorRadio::new();
    let fault_detail = match tx.start(&mut radio).await {
        Ok(()) => {
            info!("Radio up, peer {} registered", tx.config().peer.address);
            None
        }
        Err(e) => {
            error!("Radio bring-up failed, transmit disabled: {:?}", e);
            Some(fault_text(e))
        }
    };

    let mut renderer = St7789Renderer::new(unsafe { frames.back() });
    let hold_ms = match fault_detail {
        None => {
            draw_ready_screen(&mut renderer);
            READY_HOLD_MS
        }
        Some(detail) => {
            draw_fault_screen(&mut renderer, detail);
            FAULT_HOLD_MS
        }
    };
    flusher.flush_buffer(unsafe { frame(boot_idx) }).await;
    Timer::after_millis(hold_ms).await;

    // Flusher moves to the flush task for the rest of the session
    let flusher: &'static mut St7789Flusher<'static> = FLUSHER.init(flusher);
    spawner.spawn(display_flush_task(flusher).unwrap());

    // Re-calibration button (A=12, active-low)
    let btn_a = Input::new(p.PIN_12, Pull::Up);
    let mut btn_a_state = Debouncer::new();

    let compositor = COMPOSITOR.take();
    let mut battery_gate = IntervalGate::new(BATTERY_INTERVAL_MS);
    let mut log_gate = IntervalGate::new(LINK_LOG_INTERVAL_MS);
    let mut battery_percent = analog.battery_percent();
    let mut flush_in_progress = false;
    let mut stack = StackWatermark::new();

    info!("Control loop starting");

    loop {
        let now_ms = Instant::now().as_millis();

        if btn_a_state.pressed(btn_a.is_low(), now_ms) {
            info!("Re-calibrating joystick");
            match tx.calibrate(&mut analog, &mut Delay) {
                Ok((x, y)) => info!("Joystick calibrated: center x={} y={}", x.center_raw, y.center_raw),
                Err(e) => warn!("Calibration failed: {:?}", e),
            }
        }

        match tx.tick(now_ms, &mut analog, &mut radio, pending_completions()) {
            Ok(report) => {
                if let GatewayOutcome::Rejected(e) = report.send {
                    warn!("Send rejected: {:?}", e);
                }
            }
            Err((e, _)) => warn!("Joystick read failed: {:?}", e),
        }

        if battery_gate.try_fire(now_ms) {
            battery_percent = analog.battery_percent();
        }

        status_led.show(tx.indicator(), now_ms);

        // SAFETY: the flush task only reads the other frame
        let mut renderer = St7789Renderer::new(unsafe { frames.back() });
        let drawn = tx
            .render(compositor, now_ms, battery_percent, &mut renderer)
            .unwrap_or(false);

        if drawn {
            if flush_in_progress {
                FLUSH_DONE.wait().await;
            }
            FLUSH_SIGNAL.signal(frames.present());
            flush_in_progress = true;
        }

        stack.record(cortex_m::register::msp::read());

        if log_gate.try_fire(now_ms) {
            let link = tx.estimator().state();
            let (sent, rejected) = tx.gateway().counters();
            let (delivered, lost) = tx.estimator().counters();
            info!(
                "LINK: level={} connected={} sent={} rejected={} delivered={} lost={} latency={}ms flush={}us stack={}B",
                link.signal_level,
                link.connected,
                sent,
                rejected,
                delivered,
                lost,
                link.latency_ms,
                LAST_FLUSH_TIME_US.load(core::sync::atomic::Ordering::Relaxed),
                stack.peak_bytes()
            );
        }

        // Let the flush and radio tasks run between iterations
        yield_now().await;
    }
}

/// Fault screen detail line for a failed bring-up.
const fn fault_text(error: LinkError<TransportError>) -> &'static str {
    match error {
        LinkError::Init(TransportError::Timeout) | LinkError::Peer(TransportError::Timeout) => "NO ANSWER FROM RADIO",
        LinkError::Init(_) => "RADIO INIT FAILED",
        LinkError::Peer(_) => "PEER REJECTED",
    }
}
