//! Viewfinder platform core contracts.
//!
//! This crate contains cross-backend capture device data structures used
//! by the capture engine and tooling without coupling to a concrete host
//! media framework.

use serde::{Deserialize, Serialize};

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    /// The logical opposite facing. The toggle is its own inverse.
    pub fn opposite(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

/// What kind of media a capture device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Information about a physical capture device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureDeviceInfo {
    /// Stable device identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Media kind this device produces.
    pub kind: MediaKind,
    /// Camera facing. `None` for audio devices.
    pub facing: Option<CameraFacing>,
}

impl CaptureDeviceInfo {
    /// A camera pointing the given way.
    pub fn camera(id: impl Into<String>, name: impl Into<String>, facing: CameraFacing) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MediaKind::Video,
            facing: Some(facing),
        }
    }

    /// A microphone.
    pub fn microphone(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MediaKind::Audio,
            facing: None,
        }
    }
}

/// Host-provided directory of capture devices.
///
/// Backends enumerate whatever hardware (or synthetic rig) they know
/// about; the capture engine only ever filters by kind and, for video,
/// by facing.
pub trait DeviceDirectory: Send + Sync {
    /// All devices producing the given media kind.
    fn devices(&self, kind: MediaKind) -> Vec<CaptureDeviceInfo>;

    /// First camera pointing the given way, if any.
    fn camera(&self, facing: CameraFacing) -> Option<CaptureDeviceInfo> {
        self.devices(MediaKind::Video)
            .into_iter()
            .find(|d| d.facing == Some(facing))
    }

    /// Default device for a media kind (first enumerated).
    fn default_device(&self, kind: MediaKind) -> Option<CaptureDeviceInfo> {
        self.devices(kind).into_iter().next()
    }
}

/// Fixed in-memory device directory.
///
/// Used by tests and the demo CLI; a hardware backend would ship its
/// own `DeviceDirectory` implementation instead.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceDirectory {
    devices: Vec<CaptureDeviceInfo>,
}

impl StaticDeviceDirectory {
    pub fn new(devices: Vec<CaptureDeviceInfo>) -> Self {
        Self { devices }
    }

    /// A typical phone-style rig: front camera, back camera, built-in mic.
    pub fn demo_rig() -> Self {
        Self::new(vec![
            CaptureDeviceInfo::camera("cam-front", "Front Camera", CameraFacing::Front),
            CaptureDeviceInfo::camera("cam-back", "Back Camera", CameraFacing::Back),
            CaptureDeviceInfo::microphone("mic-builtin", "Built-in Microphone"),
        ])
    }
}

impl DeviceDirectory for StaticDeviceDirectory {
    fn devices(&self, kind: MediaKind) -> Vec<CaptureDeviceInfo> {
        self.devices
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_facing_is_an_involution() {
        assert_eq!(CameraFacing::Front.opposite(), CameraFacing::Back);
        assert_eq!(CameraFacing::Back.opposite(), CameraFacing::Front);
        assert_eq!(CameraFacing::Front.opposite().opposite(), CameraFacing::Front);
    }

    #[test]
    fn directory_filters_by_kind_and_facing() {
        let dir = StaticDeviceDirectory::demo_rig();

        assert_eq!(dir.devices(MediaKind::Video).len(), 2);
        assert_eq!(dir.devices(MediaKind::Audio).len(), 1);

        let back = dir.camera(CameraFacing::Back).unwrap();
        assert_eq!(back.id, "cam-back");

        let mic = dir.default_device(MediaKind::Audio).unwrap();
        assert_eq!(mic.kind, MediaKind::Audio);
        assert_eq!(mic.facing, None);
    }

    #[test]
    fn missing_facing_yields_none() {
        let dir = StaticDeviceDirectory::new(vec![CaptureDeviceInfo::camera(
            "cam-front",
            "Front Camera",
            CameraFacing::Front,
        )]);
        assert!(dir.camera(CameraFacing::Back).is_none());
    }
}
