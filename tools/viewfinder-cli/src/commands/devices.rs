//! List capture devices.

use viewfinder_platform_core::{DeviceDirectory, MediaKind, StaticDeviceDirectory};

pub fn run() -> anyhow::Result<()> {
    let directory = StaticDeviceDirectory::demo_rig();

    println!("Video devices:");
    for device in directory.devices(MediaKind::Video) {
        let facing = device
            .facing
            .map(|f| format!(" ({f})"))
            .unwrap_or_default();
        println!("  {}  {}{}", device.id, device.name, facing);
    }

    println!("Audio devices:");
    for device in directory.devices(MediaKind::Audio) {
        println!("  {}  {}", device.id, device.name);
    }

    Ok(())
}
