//! Audio failure taxonomy.
//!
//! None of these are fatal to a session: the synthesizer logs them and keeps
//! the phase scheduler running silently.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("audio backend failed: {reason}")]
    Backend {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("audio command queue is full")]
    QueueFull,

    #[error("audio thread is no longer consuming commands")]
    Disconnected,
}

impl AudioError {
    /// Wrap a backend error with a short description of what was attempted.
    pub fn backend<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}
