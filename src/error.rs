use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The generation endpoint answered with a non-success status, or its
    /// answer could not be turned into an image.
    #[error("Remote generation error{}: {message}", http_status(.status))]
    RemoteGeneration {
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to load image from {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode PNG: {0}")]
    ImageEncode(#[source] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::RemoteGeneration {
            status,
            message: message.into(),
        }
    }
}

fn http_status(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {})", code))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
