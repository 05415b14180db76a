//! Camera acquisition interface
//!
//! [`CaptureSource`] is the seam between the session and whatever
//! provides frames: the nokhwa-backed [`WebcamSource`] in production,
//! mocks in tests. The session owns the source exclusively for the
//! duration of a live session and releases it synchronously on stop.

mod camera;

pub use camera::WebcamSource;

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::frame::Frame;

/// Which physical camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Front-facing (selfie) camera
    #[default]
    User,
    /// Rear-facing camera
    Environment,
}

/// Requested capture parameters. Devices treat these as ideals, not
/// guarantees; the actual stream resolution is reported per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    /// Ideal frame width in pixels
    pub ideal_width: u32,
    /// Ideal frame height in pixels
    pub ideal_height: u32,
    /// Preferred camera facing
    pub facing: Facing,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing: Facing::User,
        }
    }
}

/// A source of camera frames.
///
/// `request` acquires the underlying hardware stream, `poll` hands out
/// at most one new frame per call without blocking, and `stop` releases
/// the hardware synchronously and idempotently.
pub trait CaptureSource {
    /// Open the capture stream. Exclusive hardware acquisition for the
    /// duration of the call; on error nothing is left open.
    fn request(&mut self, constraints: &CaptureConstraints) -> Result<(), CaptureError>;

    /// Non-blocking fetch of the next frame. Returns `None` when no new
    /// frame has arrived since the previous poll.
    fn poll(&mut self) -> Option<Frame>;

    /// Release the stream. Idempotent; after return no stream is open.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints() {
        let c = CaptureConstraints::default();
        assert_eq!(c.ideal_width, 1280);
        assert_eq!(c.ideal_height, 720);
        assert_eq!(c.facing, Facing::User);
    }

    #[test]
    fn test_constraints_serde_round_trip() {
        let c = CaptureConstraints {
            ideal_width: 640,
            ideal_height: 480,
            facing: Facing::Environment,
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: CaptureConstraints = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
