//! The transmitter's control loop as one owned context.
//!
//! [`Transmitter`] owns the conditioner, link estimator, scheduler and gateway. Hardware is
//! borrowed per call, so the same context drives the firmware and the desktop build.
//!
//! One [`Transmitter::tick`] is one loop iteration:
//!
//! 1. apply queued send completions to the link estimator
//! 2. sample and condition the joystick
//! 3. send the sample if the send gate is open
//!
//! Rendering is a separate, optional step ([`Transmitter::render`]) that shares the scheduler.

use embedded_hal::delay::DelayNs;

use crate::config::ControllerConfig;
use crate::display::{DisplayCompositor, StatusView, Surface};
use crate::gateway::{GatewayOutcome, TransmissionGateway};
use crate::input::{AxisCalibration, InputConditioner, InputSample, JoystickPort};
use crate::link::{CompletionEvent, LinkIndicator, LinkQualityEstimator};
use crate::radio::{LinkError, RadioTransport, bring_up};
use crate::schedule::Scheduler;

/// What one loop iteration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport<E> {
    pub sample: InputSample,
    pub send: GatewayOutcome<E>,
    pub completions: usize,
}

/// Control-loop context.
pub struct Transmitter {
    config: ControllerConfig,
    conditioner: InputConditioner,
    estimator: LinkQualityEstimator,
    scheduler: Scheduler,
    gateway: TransmissionGateway,
    sample: InputSample,
    link_fault: bool,
}

impl Transmitter {
    pub const fn new(config: ControllerConfig) -> Self {
        Self {
            conditioner: InputConditioner::new(&config),
            estimator: LinkQualityEstimator::new(config.signal_interval_ms),
            scheduler: Scheduler::new(config.send_interval_ms, config.display_interval_ms),
            gateway: TransmissionGateway::new(config.peer.address),
            sample: InputSample::neutral(),
            link_fault: false,
            config,
        }
    }

    /// Re-center both axes. Blocking; the stick must be at rest.
    pub fn calibrate<P, D>(
        &mut self,
        port: &mut P,
        delay: &mut D,
    ) -> Result<(AxisCalibration, AxisCalibration), P::Error>
    where
        P: JoystickPort,
        D: DelayNs,
    {
        self.conditioner.calibrate(port, delay)
    }

    /// Bring the radio up and register the peer.
    ///
    /// On failure the gateway is disabled for the rest of the session and the link is flagged
    /// as faulted; input and display keep running.
    pub async fn start<T: RadioTransport>(
        &mut self,
        transport: &mut T,
    ) -> Result<(), LinkError<T::Error>> {
        let result = bring_up(transport, &self.config.peer).await;
        if result.is_err() {
            self.gateway.disable();
            self.link_fault = true;
        }
        result
    }

    /// One control-loop iteration.
    ///
    /// On a joystick read error the previous sample is reused so transmission keeps its cadence.
    pub fn tick<P, T, I>(
        &mut self,
        now_ms: u64,
        port: &mut P,
        transport: &mut T,
        completions: I,
    ) -> Result<TickReport<T::Error>, (P::Error, TickReport<T::Error>)>
    where
        P: JoystickPort,
        T: RadioTransport,
        I: IntoIterator<Item = CompletionEvent>,
    {
        let applied = self.estimator.drain(completions);
        let read = self.conditioner.read(port);
        let read_error = match read {
            Ok(sample) => {
                self.sample = sample;
                None
            }
            Err(e) => Some(e),
        };

        let send = self.gateway.poll(&mut self.scheduler, now_ms, &self.sample, transport);
        // Rejected sends never produce a completion
        if matches!(send, GatewayOutcome::Sent) {
            self.estimator.record_send(now_ms);
        }

        let report = TickReport {
            sample: self.sample,
            send,
            completions: applied,
        };
        match read_error {
            None => Ok(report),
            Some(e) => Err((e, report)),
        }
    }

    /// Refresh the display if its gate is open.
    pub fn render<S: Surface>(
        &mut self,
        compositor: &mut DisplayCompositor,
        now_ms: u64,
        battery_percent: Option<u8>,
        surface: &mut S,
    ) -> Result<bool, S::Error> {
        let view = StatusView {
            sample: self.sample,
            link: *self.estimator.state(),
            mode: self.config.mode,
            link_fault: self.link_fault,
            battery_percent,
        };
        compositor.update(&mut self.scheduler, now_ms, &view, surface)
    }

    /// Status LED pattern for the current link state.
    pub const fn indicator(&self) -> LinkIndicator { LinkIndicator::from_link(self.estimator.state(), self.link_fault) }

    #[inline]
    pub const fn sample(&self) -> &InputSample { &self.sample }

    #[inline]
    pub const fn estimator(&self) -> &LinkQualityEstimator { &self.estimator }

    #[inline]
    pub const fn gateway(&self) -> &TransmissionGateway { &self.gateway }

    #[inline]
    pub const fn conditioner(&self) -> &InputConditioner { &self.conditioner }

    #[inline]
    pub const fn config(&self) -> &ControllerConfig { &self.config }

    #[inline]
    pub const fn link_fault(&self) -> bool { self.link_fault }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::input::RawAxes;
    use crate::link::SendOutcome;
    use crate::radio::tests::MockTransport;
    use crate::wire::ControlPacket;

    struct Stick {
        raw: RawAxes,
        fail: bool,
    }

    impl JoystickPort for Stick {
        type Error = ();

        fn read_axes(&mut self) -> Result<RawAxes, ()> { if self.fail { Err(()) } else { Ok(self.raw) } }

        fn button_is_low(&mut self) -> bool { false }
    }

    fn centered() -> Stick {
        Stick {
            raw: RawAxes { x: 2047, y: 2047 },
            fail: false,
        }
    }

    #[test]
    fn test_tick_sends_at_send_interval() {
        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut stick = centered();
        let mut radio = MockTransport::default();

        for t in 0..100u64 {
            tx.tick(t, &mut stick, &mut radio, []).unwrap();
        }
        assert_eq!(radio.sent.len(), 4);
        assert_eq!(tx.estimator().state().last_send_ms, 80);
    }

    #[test]
    fn test_rejected_sends_are_not_awaited() {
        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut stick = centered();
        let mut radio = MockTransport {
            reject_sends: true,
            ..MockTransport::default()
        };

        let report = tx.tick(20, &mut stick, &mut radio, []).unwrap();
        assert!(matches!(report.send, GatewayOutcome::Rejected(_)));
        assert_eq!(tx.estimator().in_flight(), 0);

        radio.reject_sends = false;
        tx.tick(40, &mut stick, &mut radio, []).unwrap();
        let done = CompletionEvent {
            peer: tx.config().peer.address,
            outcome: SendOutcome::Success,
            at_ms: 47,
        };
        tx.tick(50, &mut stick, &mut radio, [done]).unwrap();
        assert_eq!(tx.estimator().state().latency_ms, Some(7));
    }

    #[test]
    fn test_tick_sends_conditioned_sample() {
        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut stick = Stick {
            raw: RawAxes { x: 4095, y: 0 },
            fail: false,
        };
        let mut radio = MockTransport::default();

        let report = tx.tick(20, &mut stick, &mut radio, []).unwrap();
        assert_eq!(report.send, GatewayOutcome::Sent);
        assert_eq!(report.sample.speed_percent, 100);

        let packet = ControlPacket::decode(&radio.sent[0].1).unwrap();
        assert_eq!((packet.x, packet.y), (255, 255));
    }

    #[test]
    fn test_completions_drive_signal_level() {
        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut stick = centered();
        let mut radio = MockTransport::default();
        let peer = tx.config().peer.address;

        for k in 1..=3u64 {
            let done = CompletionEvent {
                peer,
                outcome: SendOutcome::Success,
                at_ms: k * 1000,
            };
            let report = tx.tick(k * 1000, &mut stick, &mut radio, [done]).unwrap();
            assert_eq!(report.completions, 1);
        }
        assert_eq!(tx.estimator().signal_level(), 3);
        assert_eq!(tx.indicator(), LinkIndicator::Connected);
    }

    #[test]
    fn test_failed_start_disables_sending() {
        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut stick = centered();
        let mut radio = MockTransport {
            fail_peer: true,
            ..MockTransport::default()
        };

        assert_eq!(block_on(tx.start(&mut radio)), Err(LinkError::Peer("peer")));
        assert!(tx.link_fault());
        assert_eq!(tx.indicator(), LinkIndicator::Fault);

        let report = tx.tick(1000, &mut stick, &mut radio, []).unwrap();
        assert_eq!(report.send, GatewayOutcome::Disabled);
        assert!(radio.sent.is_empty());
    }

    #[test]
    fn test_read_error_keeps_last_sample_and_cadence() {
        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut stick = Stick {
            raw: RawAxes { x: 4095, y: 2047 },
            fail: false,
        };
        let mut radio = MockTransport::default();
        tx.tick(5, &mut stick, &mut radio, []).unwrap();

        stick.fail = true;
        let ((), report) = tx.tick(20, &mut stick, &mut radio, []).unwrap_err();
        assert_eq!(report.send, GatewayOutcome::Sent);
        assert_eq!(report.sample.x, 255);
    }

    #[test]
    fn test_render_shares_scheduler() {
        use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
        use embedded_graphics::prelude::{Point, Size};

        struct CountingSurface(u32);
        impl Surface for CountingSurface {
            type Error = ();

            fn blit(
                &mut self,
                _top_left: Point,
                size: Size,
                _pixels: &[u8],
            ) -> Result<(), ()> {
                assert_eq!(size.width, SCREEN_WIDTH);
                assert!(size.height < SCREEN_HEIGHT);
                self.0 += 1;
                Ok(())
            }
        }

        let mut tx = Transmitter::new(ControllerConfig::default());
        let mut compositor = std::boxed::Box::new(DisplayCompositor::new(tx.config()));
        let mut surface = CountingSurface(0);

        assert_eq!(tx.render(&mut compositor, 10, Some(90), &mut surface), Ok(false));
        assert_eq!(tx.render(&mut compositor, 50, Some(90), &mut surface), Ok(true));
        assert_eq!(tx.render(&mut compositor, 60, Some(90), &mut surface), Ok(false));
        assert_eq!(surface.0, 3);
    }
}
