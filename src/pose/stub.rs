//! Reference landmark estimator
//!
//! Emits the canonical proportional keypoints regardless of image
//! content. Init simulates a model load on a background thread so the
//! loading indication and timeout-retry paths are exercised the same
//! way they would be with a real model.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use super::{LandmarkEstimator, Landmarks};
use crate::error::EstimatorInitError;
use crate::frame::Frame;

/// Default simulated model-load duration.
const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(1500);
/// Default deadline for a single init attempt.
const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Content-independent estimator producing fixed body proportions.
pub struct ProportionalEstimator {
    /// Simulated model-load duration
    load_delay: Duration,
    /// Deadline for one init attempt
    init_timeout: Duration,
    /// Set once the (simulated) model has loaded
    ready: Arc<AtomicBool>,
    /// Set while a load is pending
    loading: Arc<AtomicBool>,
    /// Completion signal from the loader thread; kept across a timed-out
    /// init so the retry can pick up the same pending load
    pending: Option<Receiver<()>>,
}

impl ProportionalEstimator {
    /// Estimator with production timing (1.5s simulated load).
    pub fn new() -> Self {
        Self::with_timing(DEFAULT_LOAD_DELAY, DEFAULT_INIT_TIMEOUT)
    }

    /// Estimator with explicit load delay and per-attempt timeout.
    pub fn with_timing(load_delay: Duration, init_timeout: Duration) -> Self {
        Self {
            load_delay,
            init_timeout,
            ready: Arc::new(AtomicBool::new(false)),
            loading: Arc::new(AtomicBool::new(false)),
            pending: None,
        }
    }

    fn spawn_loader(&mut self) {
        let (tx, rx) = bounded(1);
        let delay = self.load_delay;
        let loading = self.loading.clone();
        loading.store(true, Ordering::Release);

        // Loader thread detaches; completion is observed via the channel.
        let spawned = std::thread::Builder::new()
            .name("mirrorfit-pose-init".to_string())
            .spawn(move || {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                let _ = tx.send(());
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn estimator loader: {e}");
            loading.store(false, Ordering::Release);
            return;
        }
        self.pending = Some(rx);
    }
}

impl Default for ProportionalEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkEstimator for ProportionalEstimator {
    fn init(&mut self) -> Result<(), EstimatorInitError> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }

        if self.pending.is_none() {
            self.spawn_loader();
        }
        let Some(rx) = self.pending.as_ref() else {
            return Err(EstimatorInitError::ModelLoad(
                "loader thread could not be started".into(),
            ));
        };

        match rx.recv_timeout(self.init_timeout) {
            Ok(()) => {
                self.ready.store(true, Ordering::Release);
                self.loading.store(false, Ordering::Release);
                self.pending = None;
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => Err(EstimatorInitError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                self.loading.store(false, Ordering::Release);
                self.pending = None;
                Err(EstimatorInitError::ModelLoad("loader thread terminated".into()))
            }
        }
    }

    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn estimate(&self, frame: &Frame) -> Landmarks {
        Landmarks::proportional(frame.width, frame.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; Frame::expected_size(width, height)], width, height, 1)
    }

    #[test]
    fn test_instant_init_is_ready() {
        let mut est = ProportionalEstimator::with_timing(Duration::ZERO, Duration::from_secs(1));
        assert!(!est.is_ready());
        est.init().unwrap();
        assert!(est.is_ready());
        assert!(!est.is_loading());
    }

    #[test]
    fn test_init_is_idempotent_once_ready() {
        let mut est = ProportionalEstimator::with_timing(Duration::ZERO, Duration::from_secs(1));
        est.init().unwrap();
        est.init().unwrap();
        assert!(est.is_ready());
    }

    #[test]
    fn test_slow_load_times_out_then_succeeds_on_retry() {
        let mut est = ProportionalEstimator::with_timing(
            Duration::from_millis(30),
            Duration::from_millis(20),
        );
        assert!(matches!(est.init(), Err(EstimatorInitError::Timeout)));
        assert!(est.is_loading());
        // The pending load finishes within the retry's deadline.
        est.init().unwrap();
        assert!(est.is_ready());
    }

    #[test]
    fn test_estimate_matches_reference_formula() {
        let mut est = ProportionalEstimator::with_timing(Duration::ZERO, Duration::from_secs(1));
        est.init().unwrap();

        let lm = est.estimate(&frame(1280, 720));
        assert_eq!(lm.left_shoulder.x, 448.0);
        assert_eq!(lm.left_shoulder.y, 216.0);
        assert_eq!(lm.right_shoulder.x, 832.0);
        assert_eq!(lm.nose.y, 144.0);
    }

    #[test]
    fn test_estimate_bounds_invariant() {
        let mut est = ProportionalEstimator::with_timing(Duration::ZERO, Duration::from_secs(1));
        est.init().unwrap();

        for (w, h) in [(1, 1), (16, 9), (640, 480), (3840, 2160)] {
            let lm = est.estimate(&frame(w, h));
            assert!(lm.in_bounds(w, h));
        }
    }
}
