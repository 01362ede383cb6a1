//! Capture session state and the configuration transaction.

use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{CameraFacing, CaptureDeviceInfo, MediaKind};

/// A capture device bound as a session input.
///
/// Construction goes through [`crate::backend::CaptureBackend::bind_input`],
/// which may reject a device (for example when it is busy).
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInput {
    device: CaptureDeviceInfo,
}

impl DeviceInput {
    pub fn new(device: CaptureDeviceInfo) -> Self {
        Self { device }
    }

    pub fn id(&self) -> &str {
        &self.device.id
    }

    pub fn kind(&self) -> MediaKind {
        self.device.kind
    }

    /// Camera facing, `None` for audio inputs.
    pub fn facing(&self) -> Option<CameraFacing> {
        self.device.facing
    }

    pub fn device(&self) -> &CaptureDeviceInfo {
        &self.device
    }
}

/// Kinds of output sinks a session can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Raw video sample delivery.
    VideoData,
    /// Raw audio sample delivery.
    AudioData,
    /// Movie file recording.
    MovieFile,
}

/// The capture session: owns inputs and registered outputs.
///
/// While the session is running, input mutation is only legal inside an
/// open `begin_configuration`/`commit_configuration` transaction, so an
/// input swap is never visible as two separate uncommitted states.
/// Outside a transaction at most one video input may be present.
#[derive(Debug, Default)]
pub struct CaptureSession {
    inputs: Vec<DeviceInput>,
    outputs: Vec<OutputKind>,
    running: bool,
    configuring: bool,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_configuring(&self) -> bool {
        self.configuring
    }

    pub fn inputs(&self) -> &[DeviceInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputKind] {
        &self.outputs
    }

    /// The active video input, if one is bound.
    pub fn video_input(&self) -> Option<&DeviceInput> {
        self.inputs.iter().find(|i| i.kind() == MediaKind::Video)
    }

    /// The active audio input, if one is bound.
    pub fn audio_input(&self) -> Option<&DeviceInput> {
        self.inputs.iter().find(|i| i.kind() == MediaKind::Audio)
    }

    /// Attach an input to the session.
    pub fn add_input(&mut self, input: DeviceInput) -> ViewfinderResult<()> {
        self.check_mutation_allowed()?;
        if input.kind() == MediaKind::Video && !self.configuring && self.video_input().is_some() {
            return Err(ViewfinderError::session(
                "session already has a video input",
            ));
        }
        tracing::debug!(device = input.id(), kind = %input.kind(), "Input added");
        self.inputs.push(input);
        Ok(())
    }

    /// Detach an input by device id, returning it if it was present.
    pub fn remove_input(&mut self, id: &str) -> ViewfinderResult<Option<DeviceInput>> {
        self.check_mutation_allowed()?;
        let pos = self.inputs.iter().position(|i| i.id() == id);
        Ok(pos.map(|p| {
            tracing::debug!(device = id, "Input removed");
            self.inputs.remove(p)
        }))
    }

    /// Register an output sink kind. Re-registration is a no-op.
    pub fn add_output(&mut self, kind: OutputKind) {
        if !self.outputs.contains(&kind) {
            self.outputs.push(kind);
        }
    }

    /// Open a configuration transaction.
    pub fn begin_configuration(&mut self) -> ViewfinderResult<()> {
        if self.configuring {
            return Err(ViewfinderError::session(
                "configuration transaction already open",
            ));
        }
        self.configuring = true;
        Ok(())
    }

    /// Commit the open configuration transaction.
    ///
    /// Fails (and leaves the transaction open) if committing would
    /// leave more than one video input visible.
    pub fn commit_configuration(&mut self) -> ViewfinderResult<()> {
        if !self.configuring {
            return Err(ViewfinderError::session(
                "no configuration transaction open",
            ));
        }
        let video_inputs = self
            .inputs
            .iter()
            .filter(|i| i.kind() == MediaKind::Video)
            .count();
        if video_inputs > 1 {
            return Err(ViewfinderError::session(format!(
                "commit would leave {video_inputs} video inputs"
            )));
        }
        self.configuring = false;
        Ok(())
    }

    /// Begin running the session.
    pub fn start_running(&mut self) -> ViewfinderResult<()> {
        if self.running {
            return Err(ViewfinderError::session("session already running"));
        }
        if self.configuring {
            return Err(ViewfinderError::session(
                "cannot start while a configuration transaction is open",
            ));
        }
        self.running = true;
        Ok(())
    }

    /// Stop running. Idempotent.
    pub fn stop_running(&mut self) {
        self.running = false;
    }

    /// Detach all inputs and outputs. Only legal while stopped.
    pub fn clear(&mut self) -> ViewfinderResult<()> {
        if self.running {
            return Err(ViewfinderError::session(
                "cannot clear a running session",
            ));
        }
        self.inputs.clear();
        self.outputs.clear();
        self.configuring = false;
        Ok(())
    }

    fn check_mutation_allowed(&self) -> ViewfinderResult<()> {
        if self.running && !self.configuring {
            return Err(ViewfinderError::session(
                "input changes on a running session require a configuration transaction",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front() -> DeviceInput {
        DeviceInput::new(CaptureDeviceInfo::camera(
            "cam-front",
            "Front Camera",
            CameraFacing::Front,
        ))
    }

    fn back() -> DeviceInput {
        DeviceInput::new(CaptureDeviceInfo::camera(
            "cam-back",
            "Back Camera",
            CameraFacing::Back,
        ))
    }

    fn mic() -> DeviceInput {
        DeviceInput::new(CaptureDeviceInfo::microphone("mic-0", "Mic"))
    }

    #[test]
    fn second_video_input_rejected_outside_transaction() {
        let mut session = CaptureSession::new();
        session.add_input(front()).unwrap();
        let err = session.add_input(back()).unwrap_err();
        assert!(err.to_string().contains("already has a video input"));
        // Audio is unaffected by the video cap.
        session.add_input(mic()).unwrap();
        assert_eq!(session.inputs().len(), 2);
    }

    #[test]
    fn running_session_requires_transaction_for_input_changes() {
        let mut session = CaptureSession::new();
        session.add_input(front()).unwrap();
        session.start_running().unwrap();

        assert!(session.remove_input("cam-front").is_err());
        assert!(session.add_input(back()).is_err());

        session.begin_configuration().unwrap();
        let removed = session.remove_input("cam-front").unwrap();
        assert_eq!(removed.unwrap().id(), "cam-front");
        session.add_input(back()).unwrap();
        session.commit_configuration().unwrap();

        assert_eq!(session.video_input().unwrap().id(), "cam-back");
    }

    #[test]
    fn commit_with_two_video_inputs_fails_and_stays_open() {
        let mut session = CaptureSession::new();
        session.add_input(front()).unwrap();
        session.begin_configuration().unwrap();
        session.add_input(back()).unwrap();
        assert!(session.commit_configuration().is_err());
        assert!(session.is_configuring());

        session.remove_input("cam-front").unwrap();
        session.commit_configuration().unwrap();
        assert!(!session.is_configuring());
    }

    #[test]
    fn commit_without_begin_errors() {
        let mut session = CaptureSession::new();
        assert!(session.commit_configuration().is_err());
    }

    #[test]
    fn clear_only_while_stopped() {
        let mut session = CaptureSession::new();
        session.add_input(front()).unwrap();
        session.start_running().unwrap();
        assert!(session.clear().is_err());
        session.stop_running();
        session.clear().unwrap();
        assert!(session.inputs().is_empty());
    }
}
