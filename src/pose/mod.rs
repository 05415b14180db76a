//! Body landmark estimation interface
//!
//! [`LandmarkEstimator`] is the crate's primary replacement seam: a real
//! pose model can be dropped in without touching the compositor or the
//! session, as long as estimated coordinates stay inside the frame. The
//! shipped [`ProportionalEstimator`] is a conformance baseline that
//! emits fixed body proportions regardless of image content.

mod stub;

pub use stub::ProportionalEstimator;

use crate::error::EstimatorInitError;
use crate::frame::Frame;

/// A 2D point in frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate in pixels
    pub x: f32,
    /// Vertical coordinate in pixels
    pub y: f32,
}

impl Point {
    /// Construct a point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint of two points.
    pub fn midpoint(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// Named body keypoints anchoring the garment overlay.
///
/// Invariant: all coordinates lie within `[0, width] x [0, height]` of
/// the frame they were computed from. Landmarks are recomputed every
/// tick and never interpolated across frames; temporal smoothing is an
/// extension point, not default behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmarks {
    /// Left shoulder position
    pub left_shoulder: Point,
    /// Right shoulder position
    pub right_shoulder: Point,
    /// Nose position
    pub nose: Point,
}

impl Landmarks {
    /// Canonical proportional landmark set for a frame of the given
    /// size: shoulders at 35% / 65% width and 30% height, nose centered
    /// at 20% height. Used both by the reference estimator and by demo
    /// mode's synthetic frames.
    pub fn proportional(width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self {
            left_shoulder: Point::new(w * 0.35, h * 0.3),
            right_shoulder: Point::new(w * 0.65, h * 0.3),
            nose: Point::new(w * 0.5, h * 0.2),
        }
    }

    /// Distance between the shoulders along the x axis.
    pub fn shoulder_width(&self) -> f32 {
        (self.right_shoulder.x - self.left_shoulder.x).abs()
    }

    /// Midpoint between the shoulders.
    pub fn shoulder_anchor(&self) -> Point {
        Point::midpoint(self.left_shoulder, self.right_shoulder)
    }

    /// Check the coordinate-bounds invariant against a frame size.
    pub fn in_bounds(&self, width: u32, height: u32) -> bool {
        let w = width as f32;
        let h = height as f32;
        [self.left_shoulder, self.right_shoulder, self.nose]
            .iter()
            .all(|p| p.x >= 0.0 && p.x <= w && p.y >= 0.0 && p.y <= h)
    }
}

/// Maps a frame to body keypoints.
pub trait LandmarkEstimator {
    /// Load whatever the estimator needs before `estimate` may run.
    /// May be slow; the pending state is observable through
    /// `is_loading` so callers can show a loading indication. A
    /// [`EstimatorInitError::Timeout`] is retried exactly once by the
    /// session before it falls back to demo mode.
    fn init(&mut self) -> Result<(), EstimatorInitError>;

    /// Whether an init is still pending.
    fn is_loading(&self) -> bool;

    /// Whether `estimate` may be called.
    fn is_ready(&self) -> bool;

    /// Estimate landmarks for the frame. Pure function of the frame and
    /// the estimator's initialized state; no dependency on prior frames.
    fn estimate(&self, frame: &Frame) -> Landmarks;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_landmarks_for_720p() {
        let lm = Landmarks::proportional(1280, 720);
        assert_eq!(lm.left_shoulder, Point::new(448.0, 216.0));
        assert_eq!(lm.right_shoulder, Point::new(832.0, 216.0));
        assert_eq!(lm.nose, Point::new(640.0, 144.0));
    }

    #[test]
    fn test_proportional_landmarks_stay_in_bounds() {
        for (w, h) in [(1, 1), (2, 3), (640, 480), (1280, 720), (1919, 1079)] {
            let lm = Landmarks::proportional(w, h);
            assert!(lm.in_bounds(w, h), "out of bounds for {}x{}", w, h);
        }
    }

    #[test]
    fn test_shoulder_width_and_anchor() {
        let lm = Landmarks::proportional(1000, 500);
        assert_eq!(lm.shoulder_width(), 300.0);
        let anchor = lm.shoulder_anchor();
        assert_eq!(anchor, Point::new(500.0, 150.0));
    }

    #[test]
    fn test_in_bounds_rejects_outliers() {
        let mut lm = Landmarks::proportional(100, 100);
        lm.nose = Point::new(101.0, 50.0);
        assert!(!lm.in_bounds(100, 100));
    }
}
