//! The capture session controller.
//!
//! Mediates the three user-facing operations (start, stop,
//! switch-camera) over the session, the sample queues, the movie file
//! output, and the preview surface. Setup is best-effort: a missing or
//! busy device skips that stream rather than aborting the start, and
//! the skip is reported through a typed outcome instead of being
//! swallowed.

use std::path::PathBuf;
use std::sync::Arc;

use viewfinder_common::clock::RecordingClock;
use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{CameraFacing, DeviceDirectory, MediaKind};

use crate::backend::{CaptureBackend, CaptureStream};
use crate::observer::CaptureObserver;
use crate::output::{MovieFileOutput, RecordingState, SampleOrigin, SampleQueue, StabilizationMode};
use crate::preview::PreviewSurface;
use crate::session::{CaptureSession, DeviceInput, OutputKind};

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Fixed destination for the recorded file, overwritten each run.
    pub destination: PathBuf,

    /// Which camera to bind at start.
    pub initial_facing: CameraFacing,

    /// Stabilization preference for the movie file output.
    pub stabilization: StabilizationMode,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("capture.mp4"),
            initial_facing: CameraFacing::Front,
            stabilization: StabilizationMode::Auto,
        }
    }
}

/// Outcome of one best-effort setup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Device bound and its stream started.
    Ready { device_id: String },
    /// No device matched the requested kind/facing; step skipped.
    DeviceNotFound,
    /// The host rejected binding the device; step skipped.
    Rejected { reason: String },
}

impl SetupOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, SetupOutcome::Ready { .. })
    }
}

/// What `start()` accomplished.
#[derive(Debug, Clone)]
pub struct StartReport {
    pub video: SetupOutcome,
    pub audio: SetupOutcome,
    /// Whether file recording began.
    pub recording: bool,
    pub destination: PathBuf,
}

/// Outcome of a camera switch attempt. The non-`Switched` variants
/// leave all state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched {
        from: CameraFacing,
        to: CameraFacing,
    },
    /// No video input is currently tracked (e.g., before start).
    NoActiveInput,
    /// No device faces the other way.
    DeviceNotFound { wanted: CameraFacing },
    /// The host rejected binding the opposite device.
    Rejected { reason: String },
}

/// Owns the capture session and mediates start/stop/switch operations.
///
/// Intended to be driven from a single control thread; the sample
/// queues deliver concurrently on their own worker threads.
pub struct CaptureController {
    config: ControllerConfig,
    directory: Arc<dyn DeviceDirectory>,
    backend: Box<dyn CaptureBackend>,
    observer: Arc<dyn CaptureObserver>,
    session: CaptureSession,
    movie_output: MovieFileOutput,
    preview: Box<dyn PreviewSurface>,
    video_queue: Option<SampleQueue>,
    audio_queue: Option<SampleQueue>,
    video_stream: Option<Box<dyn CaptureStream>>,
    audio_stream: Option<Box<dyn CaptureStream>>,
    clock: Option<RecordingClock>,
}

impl CaptureController {
    pub fn new(
        config: ControllerConfig,
        directory: Arc<dyn DeviceDirectory>,
        backend: Box<dyn CaptureBackend>,
        preview: Box<dyn PreviewSurface>,
        observer: Arc<dyn CaptureObserver>,
    ) -> Self {
        Self {
            config,
            directory,
            backend,
            observer,
            session: CaptureSession::new(),
            movie_output: MovieFileOutput::new(),
            preview,
            video_queue: None,
            audio_queue: None,
            video_stream: None,
            audio_stream: None,
            clock: None,
        }
    }

    /// The underlying session, for inspection.
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Facing of the tracked video input, if any.
    pub fn active_facing(&self) -> Option<CameraFacing> {
        self.session.video_input().and_then(|i| i.facing())
    }

    pub fn recording_state(&self) -> RecordingState {
        self.movie_output.state()
    }

    /// Stabilization preference applied to the movie file output.
    pub fn stabilization(&self) -> StabilizationMode {
        self.movie_output.stabilization()
    }

    pub fn preview_attached(&self) -> bool {
        self.preview.is_attached()
    }

    /// Start capture: bind devices, attach outputs and the preview,
    /// run the session, and begin recording to the fixed destination.
    ///
    /// Fails only if the session is already running; per-device
    /// failures are reported in the [`StartReport`].
    pub fn start(&mut self) -> ViewfinderResult<StartReport> {
        if self.session.is_running() {
            return Err(ViewfinderError::session("session already running"));
        }

        let clock = RecordingClock::start();
        tracing::info!(epoch_wall = %clock.epoch_wall(), "Starting capture session");

        let video = self.setup_video()?;
        if !video.is_ready() {
            tracing::warn!(outcome = ?video, "Video setup skipped");
        }
        let audio = self.setup_audio()?;
        if !audio.is_ready() {
            tracing::warn!(outcome = ?audio, "Audio setup skipped");
        }

        self.session.add_output(OutputKind::MovieFile);
        self.movie_output.set_stabilization(self.config.stabilization);
        self.preview.attach()?;
        self.session.start_running()?;

        let destination = self.config.destination.clone();
        let recording = match self.backend.movie_writer(&destination) {
            Ok(writer) => {
                let observer = Arc::clone(&self.observer);
                self.movie_output
                    .start_recording(destination.clone(), writer, observer.as_ref())?;
                true
            }
            Err(e) => {
                tracing::warn!(path = %destination.display(), error = %e, "Could not open movie writer");
                false
            }
        };

        self.clock = Some(clock);
        tracing::info!("Capture session started");

        Ok(StartReport {
            video,
            audio,
            recording,
            destination,
        })
    }

    /// Stop recording and the session, detach the preview, and drain
    /// the sample queues. Idempotent: calling without a prior start
    /// (or twice) is a harmless no-op.
    pub fn stop(&mut self) -> ViewfinderResult<()> {
        let observer = Arc::clone(&self.observer);
        self.movie_output.stop_recording(observer.as_ref())?;

        if let Some(mut stream) = self.video_stream.take() {
            stream.stop()?;
        }
        if let Some(mut stream) = self.audio_stream.take() {
            stream.stop()?;
        }

        self.session.stop_running();
        self.preview.detach();

        if let Some(queue) = self.video_queue.take() {
            let delivered = queue.shutdown();
            tracing::debug!(origin = "video", delivered, "Sample queue drained");
        }
        if let Some(queue) = self.audio_queue.take() {
            let delivered = queue.shutdown();
            tracing::debug!(origin = "audio", delivered, "Sample queue drained");
        }

        self.session.clear()?;

        if let Some(clock) = self.clock.take() {
            tracing::info!(duration_secs = clock.elapsed_secs(), "Capture session stopped");
        }
        Ok(())
    }

    /// Swap the video input for the camera facing the other way.
    ///
    /// The swap happens atomically inside a configuration transaction;
    /// every non-`Switched` outcome leaves the tracked input, the
    /// session, and the streams exactly as they were.
    pub fn switch_camera(&mut self) -> ViewfinderResult<SwitchOutcome> {
        let Some(current) = self.session.video_input().cloned() else {
            return Ok(SwitchOutcome::NoActiveInput);
        };
        let Some(from) = current.facing() else {
            return Ok(SwitchOutcome::NoActiveInput);
        };
        let wanted = from.opposite();

        let Some(device) = self.directory.camera(wanted) else {
            tracing::warn!(%wanted, "No camera faces the other way");
            return Ok(SwitchOutcome::DeviceNotFound { wanted });
        };

        let input = match self.backend.bind_input(&device) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(device = %device.id, error = %e, "Opposite camera rejected binding");
                return Ok(SwitchOutcome::Rejected {
                    reason: e.to_string(),
                });
            }
        };

        self.session.begin_configuration()?;
        self.session.remove_input(current.id())?;
        self.session.add_input(input.clone())?;
        self.session.commit_configuration()?;

        // Re-point the stream at the new device; the queue survives the
        // swap so delivery order is preserved for the observer.
        if let Some(mut stream) = self.video_stream.take() {
            stream.stop()?;
        }
        if let Some(queue) = &self.video_queue {
            let mut stream = self.backend.open_stream(&input, queue.sender())?;
            stream.start()?;
            self.video_stream = Some(stream);
        }

        tracing::info!(%from, to = %wanted, device = input.id(), "Camera switched");
        Ok(SwitchOutcome::Switched { from, to: wanted })
    }

    fn setup_video(&mut self) -> ViewfinderResult<SetupOutcome> {
        let Some(device) = self.directory.camera(self.config.initial_facing) else {
            return Ok(SetupOutcome::DeviceNotFound);
        };
        let input = match self.backend.bind_input(&device) {
            Ok(input) => input,
            Err(e) => {
                return Ok(SetupOutcome::Rejected {
                    reason: e.to_string(),
                })
            }
        };
        self.session.add_input(input.clone())?;

        let queue = SampleQueue::spawn(SampleOrigin::Video, Arc::clone(&self.observer))?;
        let stream = self.open_and_start(&input, &queue)?;
        self.video_queue = Some(queue);
        self.video_stream = Some(stream);
        self.session.add_output(OutputKind::VideoData);
        Ok(SetupOutcome::Ready {
            device_id: device.id,
        })
    }

    fn setup_audio(&mut self) -> ViewfinderResult<SetupOutcome> {
        let Some(device) = self.directory.default_device(MediaKind::Audio) else {
            return Ok(SetupOutcome::DeviceNotFound);
        };
        let input = match self.backend.bind_input(&device) {
            Ok(input) => input,
            Err(e) => {
                return Ok(SetupOutcome::Rejected {
                    reason: e.to_string(),
                })
            }
        };
        self.session.add_input(input.clone())?;

        let queue = SampleQueue::spawn(SampleOrigin::Audio, Arc::clone(&self.observer))?;
        let stream = self.open_and_start(&input, &queue)?;
        self.audio_queue = Some(queue);
        self.audio_stream = Some(stream);
        self.session.add_output(OutputKind::AudioData);
        Ok(SetupOutcome::Ready {
            device_id: device.id,
        })
    }

    fn open_and_start(
        &mut self,
        input: &DeviceInput,
        queue: &SampleQueue,
    ) -> ViewfinderResult<Box<dyn CaptureStream>> {
        let mut stream = self.backend.open_stream(input, queue.sender())?;
        stream.start()?;
        Ok(stream)
    }
}
