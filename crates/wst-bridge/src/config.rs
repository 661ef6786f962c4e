//! Bridge configuration, usually handed over from JavaScript as JSON.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// When queued completions reach the handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    /// The application calls `dispatch()` once per frame. Default.
    #[default]
    FrameTick,
    /// The host schedules a dispatch shortly after each completion.
    Immediate,
}

/// Configuration for a `ContentBridge`.
///
/// Every field has a default, so `{}` is a valid document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// MIME type of exported text. Default: `text/plain;charset=utf-8`.
    pub export_mime_type: String,

    /// Encoder used when `save_screenshot` gets no MIME type. Default: `image/png`.
    pub screenshot_mime_type: String,

    /// `accept` attribute of the picker element (e.g. `.frag,.wgsl`).
    /// Default: none, any file.
    pub picker_accept: Option<String>,

    pub dispatch: DispatchMode,

    /// Maximum level for the host logger (`error` .. `trace`). Default: `info`.
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            export_mime_type: "text/plain;charset=utf-8".to_string(),
            screenshot_mime_type: "image/png".to_string(),
            picker_accept: None,
            dispatch: DispatchMode::FrameTick,
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `log_level` as a filter, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
