//! Webcam capture via nokhwa
//!
//! Captures frames on a background thread and publishes the latest one
//! into a shared slot, so `poll` never blocks the render loop. The
//! thread owns the nokhwa camera; `stop` flips the liveness flag and
//! joins, which drops the camera and closes the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Sender};
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;
use parking_lot::Mutex;

use super::{CaptureConstraints, CaptureSource};
use crate::error::CaptureError;
use crate::frame::Frame;

/// How long `request` waits for the capture thread to report whether
/// the device opened.
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Camera-backed capture source.
pub struct WebcamSource {
    /// Device index to open (0 for the default camera)
    camera_index: u32,
    /// Latest complete frame from the capture thread
    latest: Arc<Mutex<Option<Frame>>>,
    /// Liveness flag consulted by the capture thread
    running: Arc<AtomicBool>,
    /// Capture thread handle, present while a stream is open
    thread_handle: Option<std::thread::JoinHandle<()>>,
    /// Frame number of the last frame handed out by `poll`
    last_polled: u64,
}

impl WebcamSource {
    /// Create a source for the given device index. No hardware is
    /// touched until `request`.
    pub fn new(camera_index: u32) -> Self {
        Self {
            camera_index,
            latest: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            last_polled: 0,
        }
    }

    /// Cheap availability check: enumerate devices without opening a
    /// stream. Lets callers disable the start affordance up front.
    pub fn probe() -> Result<(), CaptureError> {
        match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
            Ok(list) if list.is_empty() => Err(CaptureError::NoDevice(
                "camera enumeration returned no devices".into(),
            )),
            Ok(_) => Ok(()),
            Err(e) => Err(classify_nokhwa_error(e)),
        }
    }

    /// Capture thread body. Opens the device, reports the outcome over
    /// `open_result`, then pumps frames into the shared slot until the
    /// liveness flag clears.
    fn capture_thread(
        camera_index: u32,
        constraints: CaptureConstraints,
        latest: Arc<Mutex<Option<Frame>>>,
        running: Arc<AtomicBool>,
        open_result: Sender<Result<(), CaptureError>>,
    ) {
        log::info!("starting capture thread (camera {})", camera_index);

        let index = CameraIndex::Index(camera_index);
        let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::HighestResolution(
            Resolution::new(constraints.ideal_width, constraints.ideal_height),
        ));

        let mut camera = match Camera::new(index, requested) {
            Ok(c) => c,
            Err(e) => {
                let _ = open_result.send(Err(classify_nokhwa_error(e)));
                return;
            }
        };

        if let Err(e) = camera.open_stream() {
            let _ = open_result.send(Err(classify_nokhwa_error(e)));
            return;
        }

        log::info!(
            "camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );
        let _ = open_result.send(Ok(()));

        let mut frame_number: u64 = 0;

        while running.load(Ordering::Acquire) {
            match camera.frame() {
                Ok(raw) => match raw.decode_image::<RgbAFormat>() {
                    Ok(image) => {
                        frame_number += 1;
                        let frame = Frame::new(
                            image.into_raw(),
                            raw.resolution().width(),
                            raw.resolution().height(),
                            frame_number,
                        );
                        *latest.lock() = Some(frame);
                    }
                    Err(e) => {
                        log::warn!("failed to decode frame: {:?}", e);
                    }
                },
                Err(e) => {
                    log::warn!("failed to capture frame: {:?}", e);
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }

        log::info!("capture thread stopped");
    }
}

impl CaptureSource for WebcamSource {
    fn request(&mut self, constraints: &CaptureConstraints) -> Result<(), CaptureError> {
        if self.thread_handle.is_some() {
            // Already streaming; never open a second stream.
            return Ok(());
        }

        let (tx, rx) = bounded(1);
        let latest = self.latest.clone();
        let running = self.running.clone();
        running.store(true, Ordering::Release);

        let camera_index = self.camera_index;
        let constraints = *constraints;
        let handle = std::thread::Builder::new()
            .name("mirrorfit-capture".to_string())
            .spawn(move || {
                Self::capture_thread(camera_index, constraints, latest, running, tx);
            })
            .map_err(|e| CaptureError::Unsupported(format!("failed to spawn capture thread: {e}")))?;

        match rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(())) => {
                self.thread_handle = Some(handle);
                self.last_polled = 0;
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::Release);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::Release);
                let _ = handle.join();
                Err(CaptureError::DeviceBusy(
                    "camera did not open within the deadline".into(),
                ))
            }
        }
    }

    fn poll(&mut self) -> Option<Frame> {
        let guard = self.latest.lock();
        let frame = guard.as_ref()?;
        if frame.frame_number <= self.last_polled {
            return None;
        }
        self.last_polled = frame.frame_number;
        Some(frame.clone())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        *self.latest.lock() = None;
        self.last_polled = 0;
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Map nokhwa failures onto the capture error taxonomy. Backends report
/// permission and busy conditions as strings, so those are sniffed from
/// the message.
fn classify_nokhwa_error(err: nokhwa::NokhwaError) -> CaptureError {
    use nokhwa::NokhwaError;

    let msg = err.to_string();
    let lower = msg.to_lowercase();
    match err {
        NokhwaError::UnsupportedOperationError(_) | NokhwaError::NotImplementedError(_) => {
            CaptureError::Unsupported(msg)
        }
        _ if lower.contains("permission") || lower.contains("denied") || lower.contains("access") => {
            CaptureError::PermissionDenied(msg)
        }
        _ if lower.contains("busy") || lower.contains("in use") => CaptureError::DeviceBusy(msg),
        _ => CaptureError::NoDevice(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_without_request_is_idempotent() {
        let mut source = WebcamSource::new(0);
        source.stop();
        source.stop();
        assert!(source.thread_handle.is_none());
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_poll_before_request_returns_none() {
        let mut source = WebcamSource::new(0);
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_poll_skips_already_seen_frames() {
        let mut source = WebcamSource::new(0);
        let frame = Frame::new(vec![0u8; Frame::expected_size(4, 4)], 4, 4, 3);
        *source.latest.lock() = Some(frame);

        assert!(source.poll().is_some());
        // Same frame number again: nothing new.
        assert!(source.poll().is_none());

        let frame = Frame::new(vec![0u8; Frame::expected_size(4, 4)], 4, 4, 4);
        *source.latest.lock() = Some(frame);
        assert!(source.poll().is_some());
    }
}
