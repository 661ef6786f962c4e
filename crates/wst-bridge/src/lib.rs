//! Content bridge core: turns asynchronous host actions (file picks, clipboard
//! reads, URL fetches) into token-correlated callbacks that the native frame
//! loop drains on its own schedule.
//!
//! Platform independent. The browser implementation of [`Host`] lives in the
//! `wst-web` crate; tests drive the bridge with a recording host.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod picker;
pub mod queue;
pub mod result;
pub mod storage;
pub mod token;
pub mod url;

pub use bridge::ContentBridge;
pub use config::{BridgeConfig, DispatchMode};
pub use error::{BridgeError, Result};
pub use handlers::Handlers;
pub use host::{Download, Host, ScreenshotRequest};
pub use picker::{PickerHandle, PickerPhase};
pub use queue::{Completion, CompletionQueue, CompletionSender, HttpResponse};
pub use result::{ContentResult, Payload};
pub use storage::{MemoryStorage, Storage};
pub use token::Token;
