//! Cooperative per-tick scheduler
//!
//! Drives one session at a fixed cadence on the caller's thread. Each
//! tick pulls at most one frame through the session pipeline and hands
//! the updated surface to a presenter callback. Cancellation is
//! cooperative: a shared liveness flag is consulted once per tick, so
//! no tick ever runs after [`LoopHandle::cancel`] and nothing is
//! preempted mid-tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ComposeError;
use crate::overlay::Surface;
use crate::session::{TickOutcome, TryOnSession};

/// Default tick cadence.
pub const DEFAULT_FPS: u32 = 60;

/// Clonable cancellation handle for a running loop.
#[derive(Clone)]
pub struct LoopHandle {
    active: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Request cancellation. The loop finishes its current tick, if
    /// any, and exits before the next one.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Whether the loop is still allowed to tick.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Fixed-cadence tick scheduler.
pub struct RenderLoop {
    interval: Duration,
    active: Arc<AtomicBool>,
    next_tick_at: Instant,
}

impl RenderLoop {
    /// Loop at the given target frame rate (clamped to at least 1 fps).
    pub fn new(target_fps: u32) -> Self {
        let fps = target_fps.max(1);
        Self {
            interval: Duration::from_nanos(1_000_000_000u64 / fps as u64),
            active: Arc::new(AtomicBool::new(true)),
            next_tick_at: Instant::now(),
        }
    }

    /// Handle for cancelling the loop from a presenter callback or
    /// another thread.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            active: self.active.clone(),
        }
    }

    /// Run one tick immediately, without pacing. Presents only when the
    /// tick rendered. Exposed for manual stepping and tests.
    pub fn tick_once<F>(
        &mut self,
        session: &mut TryOnSession,
        present: &mut F,
    ) -> Result<TickOutcome, ComposeError>
    where
        F: FnMut(&Surface),
    {
        let outcome = session.tick()?;
        if outcome == TickOutcome::Rendered {
            present(session.surface());
        }
        Ok(outcome)
    }

    /// Drive the session until it leaves its active states or the loop
    /// is cancelled. Only the Fatal compose class propagates; per-frame
    /// faults have already been logged and skipped inside the session.
    pub fn run<F>(&mut self, session: &mut TryOnSession, mut present: F) -> Result<(), ComposeError>
    where
        F: FnMut(&Surface),
    {
        self.next_tick_at = Instant::now();

        loop {
            if !self.active.load(Ordering::Acquire) {
                log::info!("render loop cancelled");
                return Ok(());
            }

            let now = Instant::now();
            if now < self.next_tick_at {
                std::thread::sleep(self.next_tick_at - now);
            }

            // The flag may have flipped while we slept.
            if !self.active.load(Ordering::Acquire) {
                log::info!("render loop cancelled");
                return Ok(());
            }

            if self.tick_once(session, &mut present)? == TickOutcome::Inactive {
                log::info!("session inactive, render loop exiting");
                return Ok(());
            }

            self.next_tick_at += self.interval;

            // Reset the deadline if we fell too far behind instead of
            // burst-ticking to catch up.
            let now = Instant::now();
            if now > self.next_tick_at + self.interval * 2 {
                self.next_tick_at = now + self.interval;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConstraints, CaptureSource};
    use crate::error::CaptureError;
    use crate::frame::Frame;
    use crate::overlay::{GarmentAsset, GarmentCatalog};
    use crate::pose::ProportionalEstimator;

    struct StaticCapture {
        counter: u64,
    }

    impl CaptureSource for StaticCapture {
        fn request(&mut self, _c: &CaptureConstraints) -> Result<(), CaptureError> {
            Ok(())
        }
        fn poll(&mut self) -> Option<Frame> {
            self.counter += 1;
            Some(Frame::new(
                vec![0u8; Frame::expected_size(64, 64)],
                64,
                64,
                self.counter,
            ))
        }
        fn stop(&mut self) {}
    }

    fn live_session() -> TryOnSession {
        let mut session = TryOnSession::new(
            CaptureConstraints::default(),
            Box::new(StaticCapture { counter: 0 }),
            Box::new(ProportionalEstimator::with_timing(
                Duration::ZERO,
                Duration::from_secs(1),
            )),
            GarmentCatalog::new(vec![GarmentAsset::swatch("g", 8, 8, [1, 2, 3, 255])]),
        );
        session.start();
        session
    }

    #[test]
    fn test_cancelled_loop_never_ticks() {
        let mut render_loop = RenderLoop::new(1000);
        let handle = render_loop.handle();
        handle.cancel();

        let mut session = live_session();
        let mut presented = 0;
        render_loop
            .run(&mut session, |_| {
                presented += 1;
            })
            .unwrap();
        assert_eq!(presented, 0);
    }

    #[test]
    fn test_presenter_can_cancel_after_bounded_ticks() {
        let mut render_loop = RenderLoop::new(1000);
        let handle = render_loop.handle();

        let mut session = live_session();
        let mut presented = 0;
        render_loop
            .run(&mut session, |surface| {
                assert!(surface.is_ready());
                presented += 1;
                if presented >= 3 {
                    handle.cancel();
                }
            })
            .unwrap();
        assert_eq!(presented, 3);
        assert!(!handle.is_active());
    }

    #[test]
    fn test_loop_exits_when_session_stops() {
        let mut render_loop = RenderLoop::new(1000);
        let mut session = live_session();
        session.stop();

        let mut presented = 0;
        render_loop
            .run(&mut session, |_| {
                presented += 1;
            })
            .unwrap();
        assert_eq!(presented, 0);
    }

    #[test]
    fn test_tick_once_presents_only_rendered_frames() {
        let mut render_loop = RenderLoop::new(60);
        let mut session = live_session();

        let mut presented = 0;
        let outcome = render_loop
            .tick_once(&mut session, &mut |_| {
                presented += 1;
            })
            .unwrap();
        assert_eq!(outcome, TickOutcome::Rendered);
        assert_eq!(presented, 1);

        session.stop();
        let outcome = render_loop
            .tick_once(&mut session, &mut |_| {
                presented += 1;
            })
            .unwrap();
        assert_eq!(outcome, TickOutcome::Inactive);
        assert_eq!(presented, 1);
    }
}
