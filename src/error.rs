// Crate-wide error type. Every variant states *where* things went wrong.

use thiserror::Error;

use crate::types::OutputSize;

#[derive(Debug, Error)]
pub enum Error {
    /// Corners unset, coincident, collinear, or a flat footprint; bad render height.
    #[error("invalid capture frame: {0}")]
    InvalidFrame(String),

    /// An element has no renderable object, or the backend doesn't know it.
    #[error("element #{index} has no valid renderable object")]
    MissingRenderable { index: usize },

    #[error("no elements configured for capture")]
    EmptyElementSet,

    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: OutputSize, actual: OutputSize },

    /// A run is already active on this pipeline; the new request was dropped.
    #[error("a capture run is already in progress")]
    AlreadyCapturing,

    #[error("pixel ({x}, {y}) is outside the {size} buffer")]
    OutOfBounds { x: usize, y: usize, size: OutputSize },

    #[error("{actual} pixels cannot fill a {size} buffer")]
    BufferLength { size: OutputSize, actual: usize },

    /// The render backend failed while capturing one element.
    #[error("rendering element #{index} failed: {message}")]
    Render { index: usize, message: String },

    #[error("invalid export settings: {0}")]
    InvalidExport(String),

    #[error("encoding the map image failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid capture configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Coarse failure category, kept by the pipeline after a failed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFrame,
    MissingRenderable,
    EmptyElementSet,
    SizeMismatch,
    AlreadyCapturing,
    Buffer,
    Render,
    Export,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidFrame(_) => ErrorKind::InvalidFrame,
            Error::MissingRenderable { .. } => ErrorKind::MissingRenderable,
            Error::EmptyElementSet => ErrorKind::EmptyElementSet,
            Error::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            Error::AlreadyCapturing => ErrorKind::AlreadyCapturing,
            Error::OutOfBounds { .. } | Error::BufferLength { .. } => ErrorKind::Buffer,
            Error::Render { .. } => ErrorKind::Render,
            Error::InvalidExport(_) | Error::Encode(_) | Error::Io(_) => ErrorKind::Export,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}
