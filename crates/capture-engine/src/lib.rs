//! Viewfinder Capture Engine
//!
//! Owns the capture session and mediates start/stop/switch-camera
//! operations. The host media framework (device streaming, encoding,
//! muxing, file finalization) stays behind the `backend` traits; this
//! crate only wires inputs, outputs, the preview surface, and the
//! observer callbacks together.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               CaptureController                   │
//! │  ┌───────────┐ ┌───────────┐ ┌────────────────┐  │
//! │  │ Video     │ │ Audio     │ │ MovieFileOutput│  │
//! │  │ stream ──▶│ │ stream ──▶│ │ idle⇄recording │  │
//! │  │ queue     │ │ queue     │ │                │  │
//! │  └─────┬─────┘ └─────┬─────┘ └───────┬────────┘  │
//! │        ▼             ▼               ▼            │
//! │   observer.sample_arrived     recording_started/  │
//! │   (per-origin worker thread)  recording_finished  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod controller;
pub mod observer;
pub mod output;
pub mod preview;
pub mod session;

pub use backend::{CaptureBackend, CaptureStream, MediaWriter, SampleCadence, SyntheticBackend};
pub use controller::{
    CaptureController, ControllerConfig, SetupOutcome, StartReport, SwitchOutcome,
};
pub use observer::{CaptureObserver, NullObserver};
pub use output::{
    MovieFileOutput, RecordingState, Sample, SampleOrigin, SampleQueue, StabilizationMode,
};
pub use preview::{HeadlessPreview, PreviewSurface};
pub use session::{CaptureSession, DeviceInput, OutputKind};
