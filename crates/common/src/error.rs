//! Error types shared across Viewfinder crates.

/// Top-level error type for Viewfinder operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewfinderError {
    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Recording error: {message}")]
    Recording { message: String },

    #[error("Device error: {message}")]
    Device { message: String },

    #[error("Device {device} rejected input binding: {reason}")]
    InputRejected { device: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ViewfinderError.
pub type ViewfinderResult<T> = Result<T, ViewfinderError>;

impl ViewfinderError {
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording {
            message: msg.into(),
        }
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device {
            message: msg.into(),
        }
    }

    pub fn input_rejected(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputRejected {
            device: device.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
