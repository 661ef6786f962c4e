//! Recording host shared by the integration tests.
//!
//! Records every host call and lets the test play the browser: completions
//! are posted explicitly, so ordering and timing are under test control.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use wst_bridge::{
    BridgeConfig, BridgeError, Completion, CompletionQueue, CompletionSender, ContentBridge,
    ContentResult, Download, Handlers, Host, HttpResponse, PickerHandle, ScreenshotRequest, Token,
};

/// A file as the test host sees it.
pub struct TestFile {
    pub name: String,
    pub read: Result<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreatePicker(PickerHandle),
    Prompt(PickerHandle, Token),
    DestroyPicker(PickerHandle),
    ReadFile(Token, String),
    Clipboard(Token),
    Fetch(Token, String),
    Download {
        filename: String,
        mime_type: String,
        content: String,
    },
    Capture(String, ScreenshotRequest),
    PlatformError(BridgeError),
    Abort(Option<String>),
    WatchUnload,
    UnwatchUnload,
}

pub struct RecordingHost {
    completions: CompletionSender,
    pub calls: Vec<HostCall>,
    pub live_pickers: Vec<PickerHandle>,
    pub unload_watched: bool,
    pub has_abort_hook: bool,
    pub clipboard_available: bool,
    /// When set, `prompt_picker` fails with this error.
    pub prompt_error: Option<BridgeError>,
    next_picker: u32,
}

impl RecordingHost {
    pub fn new(completions: CompletionSender) -> Self {
        Self {
            completions,
            calls: Vec::new(),
            live_pickers: Vec::new(),
            unload_watched: false,
            has_abort_hook: true,
            clipboard_available: true,
            prompt_error: None,
            next_picker: 0,
        }
    }

    /// The most recent prompt, as `(picker, token)`.
    pub fn last_prompt(&self) -> Option<(PickerHandle, Token)> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::Prompt(picker, token) => Some((*picker, *token)),
            _ => None,
        })
    }

    pub fn platform_errors(&self) -> Vec<&BridgeError> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::PlatformError(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

impl Host for RecordingHost {
    type Surface = str;
    type File = TestFile;

    fn create_picker(&mut self, _accept: Option<&str>) -> wst_bridge::Result<PickerHandle> {
        self.next_picker += 1;
        let handle = PickerHandle(self.next_picker);
        self.live_pickers.push(handle);
        self.calls.push(HostCall::CreatePicker(handle));
        Ok(handle)
    }

    fn prompt_picker(&mut self, picker: PickerHandle, token: Token) -> wst_bridge::Result<()> {
        if let Some(err) = self.prompt_error.clone() {
            return Err(err);
        }
        self.calls.push(HostCall::Prompt(picker, token));
        Ok(())
    }

    fn destroy_picker(&mut self, picker: PickerHandle) {
        self.live_pickers.retain(|p| *p != picker);
        self.calls.push(HostCall::DestroyPicker(picker));
    }

    fn read_file(&mut self, token: Token, file: TestFile) -> wst_bridge::Result<()> {
        self.calls.push(HostCall::ReadFile(token, file.name.clone()));
        self.completions.post(Completion::FileRead {
            token,
            picker: None,
            name: file.name,
            read: file.read,
        });
        Ok(())
    }

    fn read_clipboard(&mut self, request: Token) -> wst_bridge::Result<()> {
        self.calls.push(HostCall::Clipboard(request));
        if self.clipboard_available {
            Ok(())
        } else {
            Err(BridgeError::HostUnavailable("navigator.clipboard".into()))
        }
    }

    fn fetch_text(&mut self, token: Token, url: &str) -> wst_bridge::Result<()> {
        self.calls.push(HostCall::Fetch(token, url.to_string()));
        Ok(())
    }

    fn download_text(&mut self, download: &Download<'_>) -> wst_bridge::Result<()> {
        self.calls.push(HostCall::Download {
            filename: download.filename.to_string(),
            mime_type: download.mime_type.to_string(),
            content: download.content.to_string(),
        });
        Ok(())
    }

    fn capture_surface(&mut self, surface: &str, request: &ScreenshotRequest) -> wst_bridge::Result<()> {
        self.calls
            .push(HostCall::Capture(surface.to_string(), request.clone()));
        Ok(())
    }

    fn report_platform_error(&mut self, error: &BridgeError) {
        self.calls.push(HostCall::PlatformError(error.clone()));
    }

    fn stack_trace(&self, message: Option<&str>) -> String {
        format!("Error: {}\n    at test", message.unwrap_or(""))
    }

    fn abort(&mut self, message: Option<&str>) -> bool {
        self.calls.push(HostCall::Abort(message.map(str::to_string)));
        self.has_abort_hook
    }

    fn watch_unload(&mut self) -> wst_bridge::Result<()> {
        self.unload_watched = true;
        self.calls.push(HostCall::WatchUnload);
        Ok(())
    }

    fn unwatch_unload(&mut self) {
        self.unload_watched = false;
        self.calls.push(HostCall::UnwatchUnload);
    }
}

/// What a handler saw.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Content {
        slot: &'static str,
        token: Token,
        name: String,
        content: Option<String>,
        error: Option<String>,
    },
    Unload,
    Clipboard {
        request: Token,
        text: Option<String>,
    },
}

/// Handler context: a shared event log the test keeps a clone of.
pub type Recorder = Rc<RefCell<Vec<Event>>>;

pub type TestBridge = ContentBridge<RecordingHost, Recorder>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn make_bridge() -> TestBridge {
    init_logging();
    let queue = CompletionQueue::new();
    let host = RecordingHost::new(queue.sender());
    ContentBridge::new(host, queue, BridgeConfig::default())
}

fn content_event(slot: &'static str, token: Token, result: &ContentResult) -> Event {
    Event::Content {
        slot,
        token,
        name: result.name.clone(),
        content: result.content_text().map(str::to_string),
        error: result.error_text().map(str::to_string),
    }
}

/// All four slots recording into the context.
pub fn recording_handlers() -> Handlers<Recorder> {
    Handlers::new()
        .on_new_content(|log: &mut Recorder, token, result| {
            log.borrow_mut().push(content_event("new_content", token, result));
        })
        .on_file_picked(|log: &mut Recorder, token, result| {
            log.borrow_mut().push(content_event("file_picked", token, result));
        })
        .on_before_unload(|log: &mut Recorder| log.borrow_mut().push(Event::Unload))
        .on_clipboard(|log: &mut Recorder, request, text| {
            log.borrow_mut().push(Event::Clipboard {
                request,
                text: text.map(str::to_string),
            });
        })
}

/// A bridge with recording handlers installed, plus the shared event log.
pub fn installed_bridge() -> (TestBridge, Recorder) {
    let mut bridge = make_bridge();
    let log = Recorder::default();
    bridge.install(recording_handlers(), Rc::clone(&log));
    (bridge, log)
}

/// Play the user choosing a file in the currently prompted picker.
pub fn user_picks(bridge: &TestBridge, name: &str, read: Result<&str, &str>) {
    let (picker, token) = bridge.host().last_prompt().expect("no prompt shown");
    bridge.completions().post(Completion::FileRead {
        token,
        picker: Some(picker),
        name: name.to_string(),
        read: read.map(str::to_string).map_err(str::to_string),
    });
}

/// Play the user dismissing the currently prompted picker.
pub fn user_cancels(bridge: &TestBridge) {
    let (picker, token) = bridge.host().last_prompt().expect("no prompt shown");
    bridge
        .completions()
        .post(Completion::PickerCancelled { token, picker });
}

/// Play a server answering the fetch for `token`.
pub fn server_responds(bridge: &TestBridge, token: u64, url: &str, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    bridge.completions().post(Completion::Fetched {
        token: Token::new(token),
        url: url.to_string(),
        response: Ok(HttpResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }),
    });
}
