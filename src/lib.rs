//! MirrorFit - real-time virtual clothing try-on engine
//!
//! Captures camera frames, estimates body landmarks, and composites a
//! selected garment image onto the feed so a user can preview clothing
//! on themselves. When camera acquisition fails the session degrades to
//! a synthetic demo mode that exercises the same compositing path.
//!
//! Presentation layers (windowing, UI chrome, thumbnail galleries) are
//! external collaborators: they drive a [`session::TryOnSession`] handle
//! and read its composited [`overlay::Surface`].

pub mod capture;
pub mod config;
pub mod error;
pub mod frame;
pub mod overlay;
pub mod pose;
pub mod render_loop;
pub mod session;

pub use capture::{CaptureConstraints, CaptureSource, Facing};
pub use config::SessionConfig;
pub use error::{CaptureError, ComposeError, EstimatorInitError};
pub use frame::Frame;
pub use overlay::{GarmentAsset, GarmentCatalog, OverlayCompositor, OverlayTransform, Surface};
pub use pose::{LandmarkEstimator, Landmarks, Point};
pub use render_loop::{LoopHandle, RenderLoop};
pub use session::{SessionState, TryOnSession};
