//! Try-on session lifecycle
//!
//! [`TryOnSession`] is the explicit handle that owns the capture
//! source, the landmark estimator, and the compositor, and runs the
//! `Idle -> Acquiring -> Live | Fallback` state machine. Collaborators
//! hold the session by reference; there is no global webcam flag,
//! garment index, or error string anywhere else.

mod fallback;

pub use fallback::{synthetic_frame, FALLBACK_HEIGHT, FALLBACK_WIDTH};

use crate::capture::{CaptureConstraints, CaptureSource};
use crate::error::{CaptureError, ComposeError, EstimatorInitError};
use crate::overlay::{GarmentCatalog, OverlayCompositor, Surface};
use crate::pose::{LandmarkEstimator, Landmarks};

/// Lifecycle state of a try-on session. Exactly one is active at a
/// time; at most one of `Live`/`Fallback` can ever hold.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No session running
    Idle,
    /// Waiting on estimator init and camera acquisition
    Acquiring,
    /// Processing live camera frames
    Live,
    /// Demo mode on synthetic frames, camera unavailable
    Fallback,
    /// Unrecoverable failure; the session must be reconstructed
    Error(String),
}

impl SessionState {
    /// Whether frames are being processed (live or demo).
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Live | SessionState::Fallback)
    }

    /// Short name for logs and UI banners.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Acquiring => "acquiring",
            SessionState::Live => "live",
            SessionState::Fallback => "fallback",
            SessionState::Error(_) => "error",
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was processed and the surface updated
    Rendered,
    /// No new frame, or the frame was unusable; surface unchanged
    Skipped,
    /// The session is not in an active state
    Inactive,
}

/// Observer invoked on every state transition, for UI messaging.
pub type StateObserver = Box<dyn FnMut(&SessionState) + Send>;

/// The top-level session controller.
pub struct TryOnSession {
    state: SessionState,
    constraints: CaptureConstraints,
    capture: Box<dyn CaptureSource>,
    estimator: Box<dyn LandmarkEstimator>,
    compositor: OverlayCompositor,
    catalog: GarmentCatalog,
    /// Selected garment; survives stop(), the only state that does
    garment_index: usize,
    /// Landmarks from the most recent processed frame
    last_landmarks: Option<Landmarks>,
    /// Non-fatal reason the session fell back, surfaced to callers
    capture_diagnostic: Option<CaptureError>,
    /// Frame counter for synthetic demo frames
    fallback_frames: u64,
    observer: Option<StateObserver>,
}

impl TryOnSession {
    /// Build a session over the given collaborators. Nothing is
    /// acquired until `start`.
    pub fn new(
        constraints: CaptureConstraints,
        capture: Box<dyn CaptureSource>,
        estimator: Box<dyn LandmarkEstimator>,
        catalog: GarmentCatalog,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            constraints,
            capture,
            estimator,
            compositor: OverlayCompositor::new(),
            catalog,
            garment_index: 0,
            last_landmarks: None,
            capture_diagnostic: None,
            fallback_frames: 0,
            observer: None,
        }
    }

    /// Register a transition observer (UI banners, logging bridges).
    pub fn set_state_observer(&mut self, observer: StateObserver) {
        self.observer = Some(observer);
    }

    fn set_state(&mut self, next: SessionState) {
        log::info!("session state: {} -> {}", self.state.name(), next.name());
        self.state = next;
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.state);
        }
    }

    /// Start the session: init the estimator (one retry on timeout),
    /// then acquire the camera. Capture failures degrade to demo mode;
    /// only a non-timeout estimator failure is fatal.
    ///
    /// Calling start while Acquiring, Live, or Fallback is a no-op and
    /// never requests a second stream. Calling it in Error is refused.
    pub fn start(&mut self) {
        match self.state {
            SessionState::Idle => {}
            SessionState::Error(_) => {
                log::warn!("start() called on a failed session; reconstruct it instead");
                return;
            }
            _ => {
                log::debug!("start() while {}, ignoring", self.state.name());
                return;
            }
        }

        self.capture_diagnostic = None;
        self.set_state(SessionState::Acquiring);

        match self.init_estimator() {
            InitOutcome::Ready => {}
            InitOutcome::TimedOut => {
                log::warn!("estimator init timed out twice, entering demo mode");
                self.enter_fallback();
                return;
            }
            InitOutcome::Fatal(reason) => {
                self.set_state(SessionState::Error(reason));
                return;
            }
        }

        match self.capture.request(&self.constraints) {
            Ok(()) => {
                self.set_state(SessionState::Live);
            }
            Err(e) => {
                log::warn!("camera acquisition failed, entering demo mode: {e}");
                self.capture_diagnostic = Some(e);
                self.enter_fallback();
            }
        }
    }

    fn init_estimator(&mut self) -> InitOutcome {
        for attempt in 0..2 {
            match self.estimator.init() {
                Ok(()) => return InitOutcome::Ready,
                Err(EstimatorInitError::Timeout) => {
                    log::warn!("estimator init attempt {} timed out", attempt + 1);
                }
                Err(e) => return InitOutcome::Fatal(e.to_string()),
            }
        }
        InitOutcome::TimedOut
    }

    fn enter_fallback(&mut self) {
        // Nothing may stay acquired in demo mode.
        self.capture.stop();
        self.fallback_frames = 0;
        self.set_state(SessionState::Fallback);
    }

    /// Stop the session and release the camera synchronously. Idempotent
    /// from Idle; refused from Error (terminal). The selected garment
    /// index survives.
    pub fn stop(&mut self) {
        match self.state {
            SessionState::Idle => return,
            SessionState::Error(_) => {
                log::warn!("stop() called on a failed session");
                return;
            }
            _ => {}
        }
        self.capture.stop();
        self.last_landmarks = None;
        self.set_state(SessionState::Idle);
    }

    /// Process one frame: poll (or synthesize), estimate, compose.
    ///
    /// Per-frame faults are logged and skipped without touching the
    /// session state; only the Fatal compose contract violation
    /// propagates.
    pub fn tick(&mut self) -> Result<TickOutcome, ComposeError> {
        let (frame, landmarks) = match self.state {
            SessionState::Live => {
                let Some(frame) = self.capture.poll() else {
                    return Ok(TickOutcome::Skipped);
                };
                if !frame.is_valid() {
                    log::warn!(
                        "skipping unusable frame #{} ({}x{})",
                        frame.frame_number,
                        frame.width,
                        frame.height
                    );
                    return Ok(TickOutcome::Skipped);
                }
                let landmarks = self.estimator.estimate(&frame);
                (frame, landmarks)
            }
            SessionState::Fallback => {
                self.fallback_frames += 1;
                let frame = synthetic_frame(self.fallback_frames);
                let landmarks = Landmarks::proportional(frame.width, frame.height);
                (frame, landmarks)
            }
            _ => return Ok(TickOutcome::Inactive),
        };

        self.last_landmarks = Some(landmarks);

        let Some(garment) = self.catalog.get(self.garment_index) else {
            log::debug!("empty garment catalog, nothing to compose");
            return Ok(TickOutcome::Skipped);
        };
        self.compositor.compose(&frame, &landmarks, garment)?;
        Ok(TickOutcome::Rendered)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether the estimator is still loading (for a UI spinner).
    pub fn is_estimator_loading(&self) -> bool {
        self.estimator.is_loading()
    }

    /// Landmarks from the most recent processed frame, for debug
    /// overlays.
    pub fn landmarks(&self) -> Option<Landmarks> {
        self.last_landmarks
    }

    /// The presentable composited surface.
    pub fn surface(&self) -> &Surface {
        self.compositor.surface()
    }

    /// Why the session fell back, if it did. Non-fatal diagnostic.
    pub fn capture_diagnostic(&self) -> Option<&CaptureError> {
        self.capture_diagnostic.as_ref()
    }

    /// Enable shoulder debug markers on the composited surface.
    pub fn set_draw_markers(&mut self, enabled: bool) {
        self.compositor.set_draw_markers(enabled);
    }

    /// Currently selected garment index.
    pub fn garment_index(&self) -> usize {
        self.garment_index
    }

    /// Select a garment; out-of-range indexes wrap. Takes effect on the
    /// next tick.
    pub fn select_garment(&mut self, index: usize) {
        if self.catalog.count() > 0 {
            self.garment_index = index % self.catalog.count();
        }
    }

    /// Advance to the next garment, wrapping at the end.
    pub fn next_garment(&mut self) -> usize {
        if self.catalog.count() > 0 {
            self.garment_index = (self.garment_index + 1) % self.catalog.count();
        }
        self.garment_index
    }

    /// Go back one garment, wrapping at the start.
    pub fn prev_garment(&mut self) -> usize {
        let count = self.catalog.count();
        if count > 0 {
            self.garment_index = (self.garment_index + count - 1) % count;
        }
        self.garment_index
    }

    /// The garment catalog, for thumbnail galleries.
    pub fn catalog(&self) -> &GarmentCatalog {
        &self.catalog
    }
}

enum InitOutcome {
    Ready,
    TimedOut,
    Fatal(String),
}
