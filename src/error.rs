//! Error taxonomy for the try-on pipeline
//!
//! Capture failures are recoverable and route the session into demo
//! (fallback) mode. Estimator init failures are retried once on timeout
//! and are otherwise fatal. Compose errors mark programmer contract
//! violations and are the only class allowed to propagate unrecoverably.

use thiserror::Error;

/// Failure to acquire the camera capture capability.
///
/// Every variant routes the session to fallback mode, never to a crash.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The user or OS denied access to the camera device
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// No camera device is present on the host
    #[error("no camera device found: {0}")]
    NoDevice(String),

    /// A camera exists but is held exclusively by another process
    #[error("camera device busy: {0}")]
    DeviceBusy(String),

    /// The host has no usable capture capability at all
    #[error("camera capture unsupported on this host: {0}")]
    Unsupported(String),
}

/// Failure to initialize a landmark estimator.
#[derive(Debug, Clone, Error)]
pub enum EstimatorInitError {
    /// Model loading did not complete within the configured deadline.
    /// The session retries init exactly once before falling back.
    #[error("landmark estimator init timed out")]
    Timeout,

    /// The model could not be loaded at all. Fatal to the session.
    #[error("landmark estimator model load failed: {0}")]
    ModelLoad(String),
}

/// Contract violations in the compositing path.
///
/// These indicate a programming error, not a runtime condition, and are
/// allowed to propagate out of the render loop.
#[derive(Debug, Clone, Error)]
pub enum ComposeError {
    /// Compose was invoked against a surface with zero dimensions
    #[error("compose called against an unready surface ({width}x{height})")]
    SurfaceNotReady {
        /// Surface width at the time of the call
        width: u32,
        /// Surface height at the time of the call
        height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_messages() {
        let err = CaptureError::PermissionDenied("user dismissed prompt".into());
        assert!(err.to_string().contains("permission denied"));

        let err = CaptureError::NoDevice("enumeration empty".into());
        assert!(err.to_string().contains("no camera device"));
    }

    #[test]
    fn test_compose_error_reports_dimensions() {
        let err = ComposeError::SurfaceNotReady {
            width: 0,
            height: 480,
        };
        assert!(err.to_string().contains("0x480"));
    }
}
