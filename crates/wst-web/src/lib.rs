//! WASM bridge for WGPU Shader Toy. Exposes browser file loading, clipboard,
//! URL import, downloads and screenshots to the application.
//!
//! Compiled via `wasm-pack build --target web`. JavaScript creates one
//! [`WstBridge`] per application instance, installs its handlers, and calls
//! `dispatch()` once per frame (or configures `"dispatch": "immediate"`).

mod host;
mod logger;
mod reentrant;
mod storage;

pub use storage::LocalStorage;

use std::rc::{Rc, Weak};

use host::{WebHost, js_error_text};
use reentrant::{Outbox, Reentrant};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, HtmlCanvasElement};
use wst_bridge::{
    BridgeConfig, CompletionQueue, ContentBridge, ContentResult, DispatchMode, Handlers,
    PickerPhase, Storage, Token,
};

type Bridge = ContentBridge<WebHost, JsValue>;

/// State shared between the JS-facing object and the host's event closures.
type Shared = Reentrant<Bridge>;

/// Largest integer a JS number holds exactly.
const MAX_JS_TOKEN: f64 = 9_007_199_254_740_992.0;

fn dispatch(shared: &Shared) -> usize {
    shared.with(Bridge::dispatch).unwrap_or_else(|| {
        log::debug!("dispatch re-entered, completions stay queued");
        0
    })
}

fn notify_unload(shared: &Shared) {
    if shared.with(Bridge::notify_before_unload).is_none() {
        log::warn!("page unload while the content bridge is busy");
    }
}

/// The JS-facing content bridge.
///
/// Handler signatures:
/// - `newContent(context, token, name, content | null, error | null)`
/// - `beforeUnload(context)`
/// - `filePicked(context, token, name, content | null, error | null)`
/// - `clipboard(context, request, text | null)`
#[wasm_bindgen]
pub struct WstBridge {
    shared: Rc<Shared>,
    outbox: Outbox,
}

#[wasm_bindgen]
impl WstBridge {
    /// Create a bridge. `config_json` is an optional `BridgeConfig` document,
    /// e.g. `{"pickerAccept":".frag,.wgsl","dispatch":"immediate"}`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WstBridge, JsValue> {
        logger::console_error_panic_hook_setup();

        let config = match config_json.as_deref() {
            Some(json) => {
                BridgeConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => BridgeConfig::default(),
        };
        logger::init(config.level_filter());

        let outbox = Outbox::default();
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let queue = CompletionQueue::new();
            if config.dispatch == DispatchMode::Immediate {
                let weak = weak.clone();
                queue.set_wake(move || {
                    // Deferred: posts can happen while the bridge is borrowed.
                    let weak = weak.clone();
                    spawn_local(async move {
                        if let Some(shared) = weak.upgrade() {
                            dispatch(&shared);
                        }
                    });
                });
            }

            let on_unload: Rc<dyn Fn()> = {
                let weak = weak.clone();
                Rc::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        notify_unload(&shared);
                    }
                })
            };
            let host = WebHost::new(queue.sender(), on_unload, outbox.clone());
            Reentrant::new(ContentBridge::new(host, queue, config), outbox.clone())
        });

        Ok(Self { shared, outbox })
    }

    /// Register all handlers and the context passed back to them, replacing
    /// any previous registration.
    pub fn install(
        &self,
        new_content: Option<js_sys::Function>,
        before_unload: Option<js_sys::Function>,
        file_picked: Option<js_sys::Function>,
        clipboard: Option<js_sys::Function>,
        context: JsValue,
    ) {
        let outbox = &self.outbox;
        let mut handlers = Handlers::new();
        if let Some(function) = new_content {
            handlers = handlers.on_new_content(content_handler(outbox, function));
        }
        if let Some(function) = file_picked {
            handlers = handlers.on_file_picked(content_handler(outbox, function));
        }
        if let Some(function) = before_unload {
            let outbox = outbox.clone();
            handlers = handlers.on_before_unload(move |context: &mut JsValue| {
                let args = js_sys::Array::of1(context);
                let function = function.clone();
                outbox.defer(move || call_handler(&function, &args));
            });
        }
        if let Some(function) = clipboard {
            let outbox = outbox.clone();
            handlers = handlers.on_clipboard(move |context: &mut JsValue, request, text| {
                let text = text.map(JsValue::from_str).unwrap_or(JsValue::NULL);
                let args = js_sys::Array::of3(context, &token_to_js(request), &text);
                let function = function.clone();
                outbox.defer(move || call_handler(&function, &args));
            });
        }

        self.with_bridge(|bridge| bridge.install(handlers, context));
    }

    pub fn uninstall(&self) {
        self.with_bridge(Bridge::uninstall);
    }

    /// Prompt for a file. Returns `false` when the prompt could not be shown
    /// (bad token, not installed, or another prompt still open).
    #[wasm_bindgen(js_name = openFileDialog)]
    pub fn open_file_dialog(&self, token: f64) -> bool {
        let Some(token) = token_from_js("openFileDialog", token) else {
            return false;
        };
        match self.with_bridge(|bridge| bridge.open_file_dialog(token)) {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::warn!("openFileDialog({token}): {err}");
                false
            }
            None => false,
        }
    }

    /// Abandon the open prompt, if any, returning its token.
    #[wasm_bindgen(js_name = cancelFileDialog)]
    pub fn cancel_file_dialog(&self) -> Option<f64> {
        self.with_bridge(Bridge::cancel_file_dialog)
            .flatten()
            .map(token_to_f64)
    }

    /// Deliver a file obtained outside the picker (drag and drop). Returns
    /// `false` if the read was not started.
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&self, token: f64, file: File) -> bool {
        let Some(token) = token_from_js("loadFile", token) else {
            return false;
        };
        self.with_bridge(|bridge| bridge.load_file(token, file))
            .is_some()
    }

    #[wasm_bindgen(js_name = getClipboardText)]
    pub fn get_clipboard_text(&self, request: f64) -> bool {
        let Some(request) = token_from_js("getClipboardText", request) else {
            return false;
        };
        self.with_bridge(|bridge| bridge.get_clipboard_text(request))
            .is_some()
    }

    #[wasm_bindgen(js_name = importFromUrl)]
    pub fn import_from_url(&self, token: f64, url: &str) -> bool {
        let Some(token) = token_from_js("importFromUrl", token) else {
            return false;
        };
        self.with_bridge(|bridge| bridge.import_from_url(token, url))
            .is_some()
    }

    /// Save `content` as `filename`. Returns `false` if the download could
    /// not be started.
    #[wasm_bindgen(js_name = exportContent)]
    pub fn export_content(&self, filename: &str, content: &str) -> bool {
        match self.with_bridge(|bridge| bridge.export_content(filename, content)) {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::warn!("exportContent({filename}): {err}");
                false
            }
            None => false,
        }
    }

    /// Encode `canvas` (default `image/png`) and save it as `filename`.
    #[wasm_bindgen(js_name = saveScreenshot)]
    pub fn save_screenshot(
        &self,
        canvas: &HtmlCanvasElement,
        filename: &str,
        mime_type: Option<String>,
        quality: Option<f64>,
    ) -> bool {
        let saved = self.with_bridge(|bridge| {
            bridge.save_screenshot(canvas, filename, mime_type.as_deref(), quality)
        });
        match saved {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::warn!("saveScreenshot: {err}");
                false
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = printStackTrace)]
    pub fn print_stack_trace(&self, message: Option<String>) {
        self.with_bridge(|bridge| bridge.print_stack_trace(message.as_deref()));
    }

    /// Log a stack trace and call the abort hook. The application treats
    /// this as fatal.
    pub fn abort(&self, message: Option<String>) {
        self.with_bridge(|bridge| bridge.abort(message.as_deref()));
    }

    /// `hook(message | null)`, called by `abort`.
    #[wasm_bindgen(js_name = setAbortHook)]
    pub fn set_abort_hook(&self, hook: Option<js_sys::Function>) {
        self.with_bridge(|bridge| bridge.host_mut().set_abort_hook(hook));
    }

    /// The next page unload is an intentional reset: skip `beforeUnload`.
    #[wasm_bindgen(js_name = requestReset)]
    pub fn request_reset(&self) {
        self.with_bridge(Bridge::request_reset);
    }

    /// Deliver queued completions. Returns the number of handler calls.
    pub fn dispatch(&self) -> u32 {
        dispatch(&self.shared) as u32
    }

    /// Bridge state as JSON:
    /// `{"installed":bool,"picker":"none"|"idle"|"prompted","pendingToken":n|null,"queued":n}`
    pub fn status(&self) -> String {
        let Some(bridge) = self.shared.peek() else {
            return r#"{"busy":true}"#.to_string();
        };
        let (picker, pending) = match bridge.picker_phase() {
            None => ("none", None),
            Some(PickerPhase::Idle) => ("idle", None),
            Some(PickerPhase::Prompted(token)) => ("prompted", Some(token.get())),
        };
        serde_json::json!({
            "installed": bridge.is_installed(),
            "picker": picker,
            "pendingToken": pending,
            "queued": bridge.pending(),
        })
        .to_string()
    }
}

impl WstBridge {
    fn with_bridge<R>(&self, f: impl FnOnce(&mut Bridge) -> R) -> Option<R> {
        let result = self.shared.with(f);
        if result.is_none() {
            log::warn!("content bridge is busy; call ignored");
        }
        result
    }
}

/// Accept a JS number as a token only if it converts back unchanged.
fn token_from_f64(value: f64) -> Option<Token> {
    (value.fract() == 0.0 && (0.0..=MAX_JS_TOKEN).contains(&value))
        .then(|| Token::new(value as u64))
}

fn token_to_f64(token: Token) -> f64 {
    token.get() as f64
}

fn token_from_js(call: &str, value: f64) -> Option<Token> {
    let token = token_from_f64(value);
    if token.is_none() {
        log::warn!("{call}: token {value} is not an integer in 0..=2^53");
    }
    token
}

fn token_to_js(token: Token) -> JsValue {
    JsValue::from_f64(token_to_f64(token))
}

fn call_handler(function: &js_sys::Function, args: &js_sys::Array) {
    if let Err(err) = function.apply(&JsValue::NULL, args) {
        log::warn!("handler threw: {}", js_error_text(&err));
    }
}

fn content_handler(
    outbox: &Outbox,
    function: js_sys::Function,
) -> impl FnMut(&mut JsValue, Token, &ContentResult) + 'static {
    let outbox = outbox.clone();
    move |context: &mut JsValue, token: Token, result: &ContentResult| {
        let content = result
            .content_text()
            .map(JsValue::from_str)
            .unwrap_or(JsValue::NULL);
        let error = result
            .error_text()
            .map(JsValue::from_str)
            .unwrap_or(JsValue::NULL);
        let args = js_sys::Array::of5(
            context,
            &token_to_js(token),
            &JsValue::from_str(&result.name),
            &content,
            &error,
        );
        let function = function.clone();
        outbox.defer(move || call_handler(&function, &args));
    }
}

// ─── Persistent storage ──────────────────────────────────────────────────

/// Read `key` from `localStorage`.
#[wasm_bindgen(js_name = storageGetItem)]
pub fn storage_get_item(key: &str) -> Option<String> {
    LocalStorage::open().ok()?.get_item(key)
}

/// Write `key` to `localStorage`. Returns `false` on failure (quota, disabled storage).
#[wasm_bindgen(js_name = storageSetItem)]
pub fn storage_set_item(key: &str, value: &str) -> bool {
    match LocalStorage::open().and_then(|mut storage| storage.set_item(key, value)) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("storageSetItem({key}): {err}");
            false
        }
    }
}

#[wasm_bindgen(js_name = storageRemoveItem)]
pub fn storage_remove_item(key: &str) -> bool {
    match LocalStorage::open().and_then(|mut storage| storage.remove_item(key)) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("storageRemoveItem({key}): {err}");
            false
        }
    }
}
