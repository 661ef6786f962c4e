//! The host environment seen from the bridge.
//!
//! A host performs the actual browser (or test) work. Synchronous failures are
//! returned as `Err`; asynchronous outcomes are posted on the
//! [`CompletionSender`](crate::CompletionSender) the host was built with.

use crate::error::{BridgeError, Result};
use crate::picker::PickerHandle;
use crate::token::Token;

/// A text document to offer as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download<'a> {
    pub filename: &'a str,
    pub mime_type: &'a str,
    pub content: &'a str,
}

/// Encoding parameters for a surface capture, defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotRequest {
    pub filename: String,
    pub mime_type: String,
    /// Encoder quality hint in `0.0..=1.0`; `None` lets the encoder decide.
    pub quality: Option<f64>,
}

impl ScreenshotRequest {
    /// Apply the default MIME type and drop out-of-range quality hints.
    pub fn new(
        filename: &str,
        mime_type: Option<&str>,
        quality: Option<f64>,
        default_mime_type: &str,
    ) -> Self {
        let mime_type = mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(default_mime_type)
            .to_string();
        let quality = match quality {
            Some(q) if (0.0..=1.0).contains(&q) => Some(q),
            Some(q) => {
                log::warn!("screenshot quality {q} outside 0..=1, using encoder default");
                None
            }
            None => None,
        };
        if quality.is_some() && !is_lossy(&mime_type) {
            log::debug!("quality hint has no effect on {mime_type}");
        }
        Self {
            filename: filename.to_string(),
            mime_type,
            quality,
        }
    }
}

/// Whether the browser encoder honours a quality hint for this type.
pub fn is_lossy(mime_type: &str) -> bool {
    matches!(mime_type, "image/jpeg" | "image/webp")
}

pub trait Host {
    /// Something that can be captured as an image (a canvas in browsers).
    type Surface: ?Sized;
    /// A file handle obtained outside the picker (drag and drop).
    type File;

    /// Create a fresh picker element.
    fn create_picker(&mut self, accept: Option<&str>) -> Result<PickerHandle>;

    /// Show the picker. The outcome is posted as `FileRead` or
    /// `PickerCancelled` carrying `token` and `picker`.
    fn prompt_picker(&mut self, picker: PickerHandle, token: Token) -> Result<()>;

    /// Release a picker element. Events it fires afterwards are dropped.
    fn destroy_picker(&mut self, picker: PickerHandle);

    /// Read `file` as text and post a `FileRead` with `picker: None`.
    fn read_file(&mut self, token: Token, file: Self::File) -> Result<()>;

    /// Read clipboard text and post a `ClipboardRead`.
    fn read_clipboard(&mut self, request: Token) -> Result<()>;

    /// Fetch `url` as text and post a `Fetched`.
    fn fetch_text(&mut self, token: Token, url: &str) -> Result<()>;

    /// Offer `download` to the user as a saved file.
    fn download_text(&mut self, download: &Download<'_>) -> Result<()>;

    /// Encode `surface` and offer it as a download. Fire and forget.
    fn capture_surface(&mut self, surface: &Self::Surface, request: &ScreenshotRequest) -> Result<()>;

    /// Raise `error` on the host's generic error channel.
    fn report_platform_error(&mut self, error: &BridgeError);

    /// A stack trace of the current call site, prefixed by `message`.
    fn stack_trace(&self, message: Option<&str>) -> String;

    /// Hand control to the host abort hook. Returns `false` when none is registered.
    fn abort(&mut self, message: Option<&str>) -> bool;

    /// Start calling back into the bridge on page unload.
    fn watch_unload(&mut self) -> Result<()>;

    fn unwatch_unload(&mut self);
}
