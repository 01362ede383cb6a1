//! Output sinks: per-origin sample queues and the movie file output.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use viewfinder_common::error::{ViewfinderError, ViewfinderResult};

use crate::backend::MediaWriter;
use crate::observer::CaptureObserver;

/// Where a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleOrigin {
    Video,
    Audio,
}

impl std::fmt::Display for SampleOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleOrigin::Video => write!(f, "video"),
            SampleOrigin::Audio => write!(f, "audio"),
        }
    }
}

/// A single captured sample (video frame or audio chunk).
///
/// Payload bytes stay inside the host framework; the engine only sees
/// origin, ordering, and timing metadata.
#[derive(Debug, Clone)]
pub struct Sample {
    pub origin: SampleOrigin,
    /// Per-stream sequence number, starting at 0.
    pub sequence: u64,
    /// Nanoseconds since the stream's clock epoch.
    pub timestamp_ns: u64,
    /// Nominal payload size in bytes.
    pub byte_len: usize,
}

/// Sending half handed to a backend stream.
pub type SampleSender = mpsc::Sender<Sample>;

/// A dedicated delivery queue for one sample origin.
///
/// Each queue owns its worker thread; video and audio never share one,
/// so slow video handling cannot delay audio delivery. Deliveries are
/// fire-and-forget: the worker drains the channel and invokes the
/// observer once per sample.
pub struct SampleQueue {
    origin: SampleOrigin,
    tx: SampleSender,
    worker: thread::JoinHandle<u64>,
}

impl SampleQueue {
    /// Spawn the worker thread for `origin`, delivering to `observer`.
    pub fn spawn(
        origin: SampleOrigin,
        observer: Arc<dyn CaptureObserver>,
    ) -> ViewfinderResult<Self> {
        let (tx, rx) = mpsc::channel::<Sample>();
        let worker = thread::Builder::new()
            .name(format!("{origin}-samples"))
            .spawn(move || {
                let mut delivered = 0u64;
                for sample in rx {
                    observer.sample_arrived(&sample);
                    delivered += 1;
                }
                delivered
            })?;
        Ok(Self { origin, tx, worker })
    }

    pub fn origin(&self) -> SampleOrigin {
        self.origin
    }

    /// A sender for backend streams to push samples into.
    pub fn sender(&self) -> SampleSender {
        self.tx.clone()
    }

    /// Drain remaining samples and join the worker.
    ///
    /// Returns the number of samples delivered over the queue's life.
    pub fn shutdown(self) -> u64 {
        let Self { origin, tx, worker } = self;
        drop(tx);
        match worker.join() {
            Ok(delivered) => delivered,
            Err(_) => {
                tracing::warn!(%origin, "Sample queue worker panicked");
                0
            }
        }
    }
}

/// Video stabilization preference applied to the movie file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StabilizationMode {
    Off,
    #[default]
    Auto,
}

impl std::fmt::Display for StabilizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StabilizationMode::Off => write!(f, "off"),
            StabilizationMode::Auto => write!(f, "auto"),
        }
    }
}

/// Movie file output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

/// The file-writing sink: idle → recording → idle.
///
/// The destination path is held only while recording. Lifecycle
/// notifications fire exactly once per transition, in order, so a
/// consumer can await `recording_finished` before touching the file.
pub struct MovieFileOutput {
    state: RecordingState,
    destination: Option<PathBuf>,
    writer: Option<Box<dyn MediaWriter>>,
    stabilization: StabilizationMode,
}

impl Default for MovieFileOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieFileOutput {
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            destination: None,
            writer: None,
            stabilization: StabilizationMode::default(),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn stabilization(&self) -> StabilizationMode {
        self.stabilization
    }

    pub fn set_stabilization(&mut self, mode: StabilizationMode) {
        self.stabilization = mode;
    }

    /// Destination path, present only while recording.
    pub fn destination(&self) -> Option<&PathBuf> {
        self.destination.as_ref()
    }

    /// Begin writing to `path` through the given host writer.
    pub fn start_recording(
        &mut self,
        path: PathBuf,
        writer: Box<dyn MediaWriter>,
        observer: &dyn CaptureObserver,
    ) -> ViewfinderResult<()> {
        if self.state == RecordingState::Recording {
            return Err(ViewfinderError::recording("already recording"));
        }
        tracing::info!(
            path = %writer.path().display(),
            stabilization = %self.stabilization,
            "Recording started"
        );
        self.writer = Some(writer);
        self.destination = Some(path.clone());
        self.state = RecordingState::Recording;
        observer.recording_started(&path);
        Ok(())
    }

    /// Finalize the file and return to idle. No-op when already idle.
    pub fn stop_recording(&mut self, observer: &dyn CaptureObserver) -> ViewfinderResult<()> {
        if self.state == RecordingState::Idle {
            return Ok(());
        }
        let path = self.destination.take().ok_or_else(|| {
            ViewfinderError::recording("recording state without a destination path")
        })?;
        let mut writer = self.writer.take().ok_or_else(|| {
            ViewfinderError::recording("recording state without a host writer")
        })?;
        self.state = RecordingState::Idle;

        match writer.finish() {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), bytes, "Recording finished");
                observer.recording_finished(&path, None);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Recording failed to finalize");
                observer.recording_finished(&path, Some(&e));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    struct FakeWriter {
        path: PathBuf,
        fail: bool,
    }

    impl MediaWriter for FakeWriter {
        fn path(&self) -> &Path {
            &self.path
        }

        fn finish(&mut self) -> ViewfinderResult<u64> {
            if self.fail {
                Err(ViewfinderError::recording("disk full"))
            } else {
                Ok(42)
            }
        }
    }

    #[derive(Default)]
    struct LifecycleLog {
        events: Mutex<Vec<String>>,
    }

    impl CaptureObserver for LifecycleLog {
        fn recording_started(&self, path: &Path) {
            self.events
                .lock()
                .unwrap()
                .push(format!("started:{}", path.display()));
        }

        fn recording_finished(&self, path: &Path, error: Option<&ViewfinderError>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finished:{}:{}", path.display(), error.is_some()));
        }
    }

    fn writer(fail: bool) -> Box<dyn MediaWriter> {
        Box::new(FakeWriter {
            path: PathBuf::from("/tmp/out.mp4"),
            fail,
        })
    }

    #[test]
    fn movie_output_walks_idle_recording_idle() {
        let observer = LifecycleLog::default();
        let mut output = MovieFileOutput::new();
        assert_eq!(output.state(), RecordingState::Idle);
        assert!(output.destination().is_none());

        output
            .start_recording(PathBuf::from("/tmp/out.mp4"), writer(false), &observer)
            .unwrap();
        assert_eq!(output.state(), RecordingState::Recording);
        assert_eq!(output.destination().unwrap(), &PathBuf::from("/tmp/out.mp4"));

        output.stop_recording(&observer).unwrap();
        assert_eq!(output.state(), RecordingState::Idle);
        assert!(output.destination().is_none());

        let events = observer.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "started:/tmp/out.mp4".to_string(),
                "finished:/tmp/out.mp4:false".to_string(),
            ]
        );
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let observer = LifecycleLog::default();
        let mut output = MovieFileOutput::new();
        output.stop_recording(&observer).unwrap();
        assert!(observer.events.lock().unwrap().is_empty());
    }

    #[test]
    fn double_start_errors() {
        let observer = LifecycleLog::default();
        let mut output = MovieFileOutput::new();
        output
            .start_recording(PathBuf::from("/tmp/out.mp4"), writer(false), &observer)
            .unwrap();
        assert!(output
            .start_recording(PathBuf::from("/tmp/out.mp4"), writer(false), &observer)
            .is_err());
    }

    #[test]
    fn finalize_failure_surfaces_through_finished_callback() {
        let observer = LifecycleLog::default();
        let mut output = MovieFileOutput::new();
        output.set_stabilization(StabilizationMode::Off);
        assert_eq!(output.stabilization(), StabilizationMode::Off);
        output
            .start_recording(PathBuf::from("/tmp/out.mp4"), writer(true), &observer)
            .unwrap();
        output.stop_recording(&observer).unwrap();
        assert_eq!(output.state(), RecordingState::Idle);

        let events = observer.events.lock().unwrap();
        assert_eq!(events[1], "finished:/tmp/out.mp4:true");
    }

    struct Counter {
        seen: AtomicU64,
    }

    impl CaptureObserver for Counter {
        fn sample_arrived(&self, sample: &Sample) {
            assert_eq!(sample.origin, SampleOrigin::Audio);
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn queue_delivers_every_sample_then_joins() {
        let observer = Arc::new(Counter {
            seen: AtomicU64::new(0),
        });
        let queue = SampleQueue::spawn(SampleOrigin::Audio, observer.clone()).unwrap();
        let tx = queue.sender();
        for sequence in 0..20 {
            tx.send(Sample {
                origin: SampleOrigin::Audio,
                sequence,
                timestamp_ns: sequence * 1_000,
                byte_len: 4096,
            })
            .unwrap();
        }
        drop(tx);
        let delivered = queue.shutdown();
        assert_eq!(delivered, 20);
        assert_eq!(observer.seen.load(Ordering::SeqCst), 20);
    }
}
