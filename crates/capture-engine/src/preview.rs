//! Live preview surface binding.
//!
//! The preview is host-owned display real estate; the engine only
//! attaches and detaches it. Attachment sits at the bottom of the
//! display stack so application chrome renders above the live feed,
//! and is independent of recording state.

use viewfinder_common::error::ViewfinderResult;

/// A visual surface bound to the session for live display.
pub trait PreviewSurface: Send {
    /// Attach the surface at the bottom of the display stack.
    /// Attaching an already-attached surface is a no-op.
    fn attach(&mut self) -> ViewfinderResult<()>;

    /// Detach the surface. Idempotent.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

/// Preview implementation with no display: tracks attachment and logs.
#[derive(Debug, Default)]
pub struct HeadlessPreview {
    attached: bool,
}

impl HeadlessPreview {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewSurface for HeadlessPreview {
    fn attach(&mut self) -> ViewfinderResult<()> {
        if !self.attached {
            tracing::debug!("Preview attached");
            self.attached = true;
        }
        Ok(())
    }

    fn detach(&mut self) {
        if self.attached {
            tracing::debug!("Preview detached");
            self.attached = false;
        }
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_detach_are_idempotent() {
        let mut preview = HeadlessPreview::new();
        assert!(!preview.is_attached());

        preview.attach().unwrap();
        preview.attach().unwrap();
        assert!(preview.is_attached());

        preview.detach();
        preview.detach();
        assert!(!preview.is_attached());
    }
}
