//! Start a capture-and-record session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use viewfinder_capture_engine::{
    CaptureController, CaptureObserver, ControllerConfig, HeadlessPreview, Sample, SetupOutcome,
    StabilizationMode, SyntheticBackend,
};
use viewfinder_common::config::AppConfig;
use viewfinder_common::error::ViewfinderError;
use viewfinder_platform_core::{CameraFacing, StaticDeviceDirectory};

/// Observer that surfaces lifecycle events on the terminal.
struct CliObserver;

impl CaptureObserver for CliObserver {
    fn sample_arrived(&self, sample: &Sample) {
        // One line per second of video keeps the terminal readable.
        if sample.origin == viewfinder_capture_engine::SampleOrigin::Video
            && sample.sequence % 30 == 0
        {
            tracing::debug!(sequence = sample.sequence, "Video frames flowing");
        }
    }

    fn recording_started(&self, path: &Path) {
        println!("Recording to {}", path.display());
    }

    fn recording_finished(&self, path: &Path, error: Option<&ViewfinderError>) {
        match error {
            None => println!("Recording finished: {}", path.display()),
            Some(e) => println!("Recording failed: {e}"),
        }
    }
}

pub async fn run(
    output: Option<PathBuf>,
    duration: Option<u64>,
    switch_after: Option<u64>,
    back: bool,
    stabilize: bool,
) -> anyhow::Result<()> {
    let app_config = AppConfig::load();
    let destination = output.unwrap_or_else(|| app_config.output_path());

    let config = ControllerConfig {
        destination: destination.clone(),
        initial_facing: if back {
            CameraFacing::Back
        } else {
            CameraFacing::Front
        },
        stabilization: if stabilize {
            StabilizationMode::Auto
        } else {
            StabilizationMode::Off
        },
    };

    let mut controller = CaptureController::new(
        config,
        Arc::new(StaticDeviceDirectory::demo_rig()),
        Box::new(SyntheticBackend::new(app_config.capture.video_fps)),
        Box::new(HeadlessPreview::new()),
        Arc::new(CliObserver),
    );

    let report = controller.start()?;
    print_outcome("video", &report.video);
    print_outcome("audio", &report.audio);

    if let Some(secs) = switch_after {
        let remaining = duration.map(|d| d.saturating_sub(secs));
        wait(Some(secs)).await?;
        match controller.switch_camera()? {
            viewfinder_capture_engine::SwitchOutcome::Switched { from, to } => {
                println!("Switched camera: {from} -> {to}");
            }
            other => println!("Camera switch skipped: {other:?}"),
        }
        wait(remaining).await?;
    } else {
        wait(duration).await?;
    }

    controller.stop()?;
    Ok(())
}

fn print_outcome(label: &str, outcome: &SetupOutcome) {
    match outcome {
        SetupOutcome::Ready { device_id } => println!("  {label}: {device_id}"),
        SetupOutcome::DeviceNotFound => println!("  {label}: no device found, skipped"),
        SetupOutcome::Rejected { reason } => println!("  {label}: rejected ({reason}), skipped"),
    }
}

/// Wait for the given number of seconds, or for Ctrl+C if `None`.
async fn wait(secs: Option<u64>) -> anyhow::Result<()> {
    match secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => {
                    println!();
                }
            }
        }
        None => {
            println!("Press Ctrl+C to stop recording...");
            tokio::signal::ctrl_c().await?;
            println!();
        }
    }
    Ok(())
}
