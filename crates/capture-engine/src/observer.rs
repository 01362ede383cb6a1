//! Observer contract for sample delivery and recording lifecycle.
//!
//! One method per event kind, all defaulting to no-ops so a consumer
//! only implements the hooks it cares about. `sample_arrived` runs on
//! the owning sample queue's worker thread and must not assume any
//! particular interleaving between video and audio deliveries.

use std::path::Path;

use viewfinder_common::error::ViewfinderError;

use crate::output::Sample;

/// Receives capture events from the controller.
pub trait CaptureObserver: Send + Sync {
    /// A raw sample arrived on its origin's queue.
    fn sample_arrived(&self, _sample: &Sample) {}

    /// File writing has started for the given destination.
    fn recording_started(&self, _path: &Path) {}

    /// File writing has finished. `error` is present when the host
    /// writer failed to finalize the file.
    fn recording_finished(&self, _path: &Path, _error: Option<&ViewfinderError>) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl CaptureObserver for NullObserver {}
