//! Error types for bridge operations.
//!
//! Asynchronous failures never escape as `Err`: they are rendered with
//! `Display` and delivered in-band as [`Payload::Error`](crate::Payload).
//! `Err` is reserved for failures detected synchronously, before any host
//! work has started.

use crate::token::Token;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// An operation that needs handlers was called before `install`.
    #[error("content bridge is not installed")]
    NotInstalled,

    /// A file dialog is already prompting for another request.
    #[error("file dialog already open for request {pending}")]
    PickerBusy { pending: Token },

    /// The host environment lacks something the operation needs
    /// (no window, no document body, no clipboard API...).
    #[error("host unavailable: {0}")]
    HostUnavailable(String),

    /// Reading a selected or dropped file failed.
    #[error("failed to read {name}: {reason}")]
    FileRead { name: String, reason: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} {status_text} while fetching {url}")]
    Http {
        url: String,
        status: u16,
        status_text: String,
    },

    /// The request never produced a response.
    #[error("network error while fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// Clipboard access was denied or the read failed.
    #[error("clipboard read failed: {0}")]
    Clipboard(String),

    /// Encoding or downloading a surface failed.
    #[error("screenshot {filename} failed: {reason}")]
    Screenshot { filename: String, reason: String },

    /// Invalid configuration document.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Persistent storage rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// Any other exception raised by the host.
    #[error("host error: {0}")]
    Host(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
