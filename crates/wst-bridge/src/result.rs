//! Outcome of a content request (file pick, dropped file, URL import).

use crate::error::BridgeError;
use crate::queue::HttpResponse;
use crate::url::display_name;
use serde::Serialize;

/// Exactly one of content or error. A cancelled request has no result at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    Content(String),
    Error(String),
}

/// A named content outcome handed to handlers by reference for the duration
/// of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentResult {
    pub name: String,
    pub payload: Payload,
}

impl ContentResult {
    pub fn content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Content(content.into()),
        }
    }

    pub fn error(name: impl Into<String>, error: &BridgeError) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Error(error.to_string()),
        }
    }

    /// Build the result of a file read as reported by the host.
    pub fn from_file_read(name: String, read: Result<String, String>) -> Self {
        match read {
            Ok(text) => Self::content(name, text),
            Err(reason) => {
                let err = BridgeError::FileRead {
                    name: name.clone(),
                    reason,
                };
                Self::error(name, &err)
            }
        }
    }

    /// Build the result of a URL import. Any 2xx status counts as success;
    /// other statuses and transport failures become errors.
    pub fn from_fetch(url: &str, response: Result<HttpResponse, String>) -> Self {
        let name = display_name(url);
        match response {
            Ok(response) if response.is_success() => Self::content(name, response.body),
            Ok(response) => {
                let err = BridgeError::Http {
                    url: url.to_string(),
                    status: response.status,
                    status_text: response.status_text,
                };
                Self::error(name, &err)
            }
            Err(reason) => {
                let err = BridgeError::Network {
                    url: url.to_string(),
                    reason,
                };
                Self::error(name, &err)
            }
        }
    }

    pub fn content_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Content(text) => Some(text),
            Payload::Error(_) => None,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Content(_) => None,
            Payload::Error(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::Error(_))
    }
}
