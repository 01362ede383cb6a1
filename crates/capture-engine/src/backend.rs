//! Host media framework abstraction.
//!
//! Device streaming, encoding, muxing, and file finalization all live
//! in the host framework; this module defines the trait seam the
//! controller talks to, plus a synthetic in-process implementation used
//! by tests and the demo CLI. A hardware backend would implement the
//! same traits over the platform's capture stack.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use viewfinder_common::clock::RecordingClock;
use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{CaptureDeviceInfo, MediaKind};

use crate::output::{Sample, SampleOrigin, SampleSender};
use crate::session::DeviceInput;

/// Nominal bytes per video sample (1280x720 NV12).
const VIDEO_SAMPLE_BYTES: usize = 1280 * 720 * 3 / 2;
/// Nominal bytes per audio sample (1024 stereo s16 frames).
const AUDIO_SAMPLE_BYTES: usize = 1024 * 2 * 2;

/// The opaque host media framework.
pub trait CaptureBackend: Send {
    /// Bind a device as a session input. The host may reject the
    /// device, for example when it is busy.
    fn bind_input(&mut self, device: &CaptureDeviceInfo) -> ViewfinderResult<DeviceInput>;

    /// Open a sample stream for a bound input, delivering into `sink`.
    fn open_stream(
        &mut self,
        input: &DeviceInput,
        sink: SampleSender,
    ) -> ViewfinderResult<Box<dyn CaptureStream>>;

    /// Create a movie writer for the destination path. The file is
    /// created or truncated immediately (overwrite-on-each-run).
    fn movie_writer(&mut self, path: &Path) -> ViewfinderResult<Box<dyn MediaWriter>>;
}

/// A running sample stream for one input.
pub trait CaptureStream: Send {
    /// Start delivering samples.
    fn start(&mut self) -> ViewfinderResult<()>;

    /// Stop delivery and release the device.
    fn stop(&mut self) -> ViewfinderResult<()>;

    /// Whether the stream is currently delivering.
    fn is_running(&self) -> bool;
}

/// A host-owned movie file writer.
pub trait MediaWriter: Send {
    /// Destination path.
    fn path(&self) -> &Path;

    /// Finalize the file, returning the bytes written.
    fn finish(&mut self) -> ViewfinderResult<u64>;
}

/// How a synthetic stream paces its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCadence {
    /// Real-time pacing at the stream's configured rate.
    Interval,
    /// Emit exactly N samples immediately, then idle. Deterministic,
    /// for tests.
    Burst(u32),
}

/// In-process stand-in for the host media framework.
pub struct SyntheticBackend {
    cadence: SampleCadence,
    video_fps: u32,
    audio_chunk_hz: u32,
    busy: HashSet<String>,
}

impl SyntheticBackend {
    /// Real-time backend with the given video frame rate. Audio chunks
    /// arrive at roughly 48kHz / 1024-frame granularity.
    pub fn new(video_fps: u32) -> Self {
        Self {
            cadence: SampleCadence::Interval,
            video_fps: video_fps.max(1),
            audio_chunk_hz: 47,
            busy: HashSet::new(),
        }
    }

    /// Backend whose streams emit `samples` samples immediately on
    /// start, then go quiet.
    pub fn bursting(samples: u32) -> Self {
        Self {
            cadence: SampleCadence::Burst(samples),
            video_fps: 30,
            audio_chunk_hz: 47,
            busy: HashSet::new(),
        }
    }

    /// Mark a device as busy so `bind_input` rejects it.
    pub fn with_busy(mut self, device_id: impl Into<String>) -> Self {
        self.busy.insert(device_id.into());
        self
    }
}

impl CaptureBackend for SyntheticBackend {
    fn bind_input(&mut self, device: &CaptureDeviceInfo) -> ViewfinderResult<DeviceInput> {
        if self.busy.contains(&device.id) {
            return Err(ViewfinderError::input_rejected(&device.id, "device is busy"));
        }
        Ok(DeviceInput::new(device.clone()))
    }

    fn open_stream(
        &mut self,
        input: &DeviceInput,
        sink: SampleSender,
    ) -> ViewfinderResult<Box<dyn CaptureStream>> {
        let (origin, rate_hz) = match input.kind() {
            MediaKind::Video => (SampleOrigin::Video, self.video_fps),
            MediaKind::Audio => (SampleOrigin::Audio, self.audio_chunk_hz),
        };
        Ok(Box::new(SyntheticStream::new(
            origin,
            rate_hz,
            self.cadence,
            sink,
        )))
    }

    fn movie_writer(&mut self, path: &Path) -> ViewfinderResult<Box<dyn MediaWriter>> {
        Ok(Box::new(SyntheticMovieWriter::create(path)?))
    }
}

/// Generates timestamped samples on its own thread.
struct SyntheticStream {
    origin: SampleOrigin,
    rate_hz: u32,
    cadence: SampleCadence,
    sink: Option<SampleSender>,
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<u64>>,
}

impl SyntheticStream {
    fn new(origin: SampleOrigin, rate_hz: u32, cadence: SampleCadence, sink: SampleSender) -> Self {
        Self {
            origin,
            rate_hz: rate_hz.max(1),
            cadence,
            sink: Some(sink),
            stop: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

fn sample_for(origin: SampleOrigin, sequence: u64, clock: &RecordingClock) -> Sample {
    let byte_len = match origin {
        SampleOrigin::Video => VIDEO_SAMPLE_BYTES,
        SampleOrigin::Audio => AUDIO_SAMPLE_BYTES,
    };
    Sample {
        origin,
        sequence,
        timestamp_ns: clock.elapsed_ns(),
        byte_len,
    }
}

impl CaptureStream for SyntheticStream {
    fn start(&mut self) -> ViewfinderResult<()> {
        let sink = self.sink.take().ok_or_else(|| {
            ViewfinderError::device("synthetic stream already started once")
        })?;
        let origin = self.origin;
        let cadence = self.cadence;
        let tick = Duration::from_micros(1_000_000 / u64::from(self.rate_hz));
        let stop = self.stop.clone();

        let worker = thread::Builder::new()
            .name(format!("{origin}-stream"))
            .spawn(move || {
                let clock = RecordingClock::start();
                let mut sequence = 0u64;
                match cadence {
                    SampleCadence::Burst(n) => {
                        for _ in 0..n {
                            if sink.send(sample_for(origin, sequence, &clock)).is_err() {
                                break;
                            }
                            sequence += 1;
                        }
                    }
                    SampleCadence::Interval => {
                        while !stop.load(Ordering::SeqCst) {
                            if sink.send(sample_for(origin, sequence, &clock)).is_err() {
                                break;
                            }
                            sequence += 1;
                            thread::sleep(tick);
                        }
                    }
                }
                sequence
            })?;

        self.worker = Some(worker);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> ViewfinderResult<()> {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(emitted) => {
                    tracing::debug!(origin = %self.origin, emitted, "Synthetic stream stopped")
                }
                Err(_) => tracing::warn!(origin = %self.origin, "Synthetic stream panicked"),
            }
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Writes a minimal placeholder container so the destination file is
/// real, created, truncated, and finalizable.
struct SyntheticMovieWriter {
    path: PathBuf,
    file: Option<File>,
    bytes_written: u64,
}

const MOVIE_MAGIC: &[u8] = b"VFCAP1\n";

impl SyntheticMovieWriter {
    fn create(path: &Path) -> ViewfinderResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(MOVIE_MAGIC)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            bytes_written: MOVIE_MAGIC.len() as u64,
        })
    }
}

impl MediaWriter for SyntheticMovieWriter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn finish(&mut self) -> ViewfinderResult<u64> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| ViewfinderError::recording("movie writer already finished"))?;
        file.flush()?;
        file.sync_all()?;
        Ok(self.bytes_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use viewfinder_platform_core::CameraFacing;

    #[test]
    fn busy_device_is_rejected() {
        let mut backend = SyntheticBackend::bursting(1).with_busy("cam-back");
        let device = CaptureDeviceInfo::camera("cam-back", "Back Camera", CameraFacing::Back);
        let err = backend.bind_input(&device).unwrap_err();
        assert!(matches!(err, ViewfinderError::InputRejected { .. }));

        let front = CaptureDeviceInfo::camera("cam-front", "Front Camera", CameraFacing::Front);
        assert!(backend.bind_input(&front).is_ok());
    }

    #[test]
    fn burst_stream_emits_exactly_n_tagged_samples() {
        let mut backend = SyntheticBackend::bursting(5);
        let mic = CaptureDeviceInfo::microphone("mic-0", "Mic");
        let input = backend.bind_input(&mic).unwrap();

        let (tx, rx) = mpsc::channel();
        let mut stream = backend.open_stream(&input, tx).unwrap();
        stream.start().unwrap();
        stream.stop().unwrap();
        assert!(!stream.is_running());

        let samples: Vec<Sample> = rx.try_iter().collect();
        assert_eq!(samples.len(), 5);
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(sample.origin, SampleOrigin::Audio);
            assert_eq!(sample.sequence, i as u64);
        }
    }

    #[test]
    fn movie_writer_truncates_on_each_run() {
        let path = std::env::temp_dir().join(format!(
            "viewfinder-writer-test-{}.mp4",
            std::process::id()
        ));

        let mut backend = SyntheticBackend::bursting(0);
        let mut writer = backend.movie_writer(&path).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, MOVIE_MAGIC.len() as u64);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), bytes);

        // Second run overwrites rather than appends.
        let mut writer = backend.movie_writer(&path).unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), bytes);

        assert!(writer.finish().is_err());
        std::fs::remove_file(&path).ok();
    }
}
