//! Browser implementation of [`Host`] on top of `web-sys`.
//!
//! Asynchronous browser work runs in `spawn_local` tasks that post their
//! outcome on the completion queue; nothing here calls a handler directly.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Blob, BlobPropertyBag, Document, Event, File, HtmlAnchorElement, HtmlCanvasElement,
    HtmlInputElement, Response, Url, Window,
};
use wst_bridge::{
    BridgeError, Completion, CompletionSender, Download, Host, HttpResponse, PickerHandle, Result,
    ScreenshotRequest, Token,
};

use crate::reentrant::Outbox;

/// Object URLs handed to download anchors are revoked after this delay.
const REVOKE_DELAY_MS: i32 = 1_000;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["navigator", "clipboard"], js_name = readText, catch)]
    fn clipboard_read_text() -> std::result::Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_name = reportError, catch)]
    fn report_error(error: &JsValue) -> std::result::Result<(), JsValue>;
}

/// One `<input type="file">` and its listeners. Dropping it detaches them.
struct PickerElement {
    input: HtmlInputElement,
    /// Token of the prompt in progress; taken by whichever event ends it.
    token: Rc<Cell<Option<Token>>>,
    _on_change: Closure<dyn FnMut(Event)>,
    on_cancel: Closure<dyn FnMut(Event)>,
}

impl Drop for PickerElement {
    fn drop(&mut self) {
        self.input.set_onchange(None);
        let _ = self
            .input
            .remove_event_listener_with_callback("cancel", self.on_cancel.as_ref().unchecked_ref());
    }
}

pub struct WebHost {
    completions: CompletionSender,
    pickers: HashMap<PickerHandle, PickerElement>,
    next_picker: u32,
    on_unload: Rc<dyn Fn()>,
    unload_listener: Option<Closure<dyn FnMut(Event)>>,
    abort_hook: Option<js_sys::Function>,
    /// The abort hook is called through here, once the bridge is released.
    outbox: Outbox,
}

impl WebHost {
    /// `on_unload` runs synchronously from the page's `beforeunload` event
    /// while the host watches it.
    pub(crate) fn new(
        completions: CompletionSender,
        on_unload: Rc<dyn Fn()>,
        outbox: Outbox,
    ) -> Self {
        Self {
            completions,
            pickers: HashMap::new(),
            next_picker: 0,
            on_unload,
            unload_listener: None,
            abort_hook: None,
            outbox,
        }
    }

    /// JS function called as `hook(message | null)` on abort.
    pub fn set_abort_hook(&mut self, hook: Option<js_sys::Function>) {
        self.abort_hook = hook;
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        self.unwatch_unload();
    }
}

impl Host for WebHost {
    type Surface = HtmlCanvasElement;
    type File = File;

    fn create_picker(&mut self, accept: Option<&str>) -> Result<PickerHandle> {
        let input: HtmlInputElement = create_element(&document()?, "input")?;
        input.set_type("file");
        if let Some(accept) = accept {
            input.set_accept(accept);
        }

        self.next_picker += 1;
        let handle = PickerHandle(self.next_picker);
        let token = Rc::new(Cell::new(None));

        let on_change = {
            let completions = self.completions.clone();
            let token = Rc::clone(&token);
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(token) = token.take() else {
                    return;
                };
                let file = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                    .and_then(|input| input.files())
                    .and_then(|files| files.get(0));
                match file {
                    Some(file) => read_text(completions.clone(), token, Some(handle), file),
                    None => completions.post(Completion::PickerCancelled {
                        token,
                        picker: handle,
                    }),
                }
            })
        };
        let on_cancel = {
            let completions = self.completions.clone();
            let token = Rc::clone(&token);
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(token) = token.take() {
                    completions.post(Completion::PickerCancelled {
                        token,
                        picker: handle,
                    });
                }
            })
        };

        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
        input
            .add_event_listener_with_callback("cancel", on_cancel.as_ref().unchecked_ref())
            .map_err(host_error)?;

        self.pickers.insert(
            handle,
            PickerElement {
                input,
                token,
                _on_change: on_change,
                on_cancel,
            },
        );
        log::trace!("created {handle:?}");
        Ok(handle)
    }

    fn prompt_picker(&mut self, picker: PickerHandle, token: Token) -> Result<()> {
        let element = self
            .pickers
            .get(&picker)
            .ok_or_else(|| BridgeError::HostUnavailable(format!("{picker:?} no longer exists")))?;
        element.token.set(Some(token));
        element.input.click();
        Ok(())
    }

    fn destroy_picker(&mut self, picker: PickerHandle) {
        if self.pickers.remove(&picker).is_some() {
            log::trace!("destroyed {picker:?}");
        }
    }

    fn read_file(&mut self, token: Token, file: File) -> Result<()> {
        read_text(self.completions.clone(), token, None, file);
        Ok(())
    }

    fn read_clipboard(&mut self, request: Token) -> Result<()> {
        let promise = clipboard_read_text().map_err(|err| {
            BridgeError::HostUnavailable(format!("navigator.clipboard: {}", js_error_text(&err)))
        })?;
        let completions = self.completions.clone();
        spawn_local(async move {
            let read = match JsFuture::from(promise).await {
                Ok(value) => value
                    .as_string()
                    .ok_or_else(|| "clipboard did not return text".to_string()),
                Err(err) => Err(js_error_text(&err)),
            };
            completions.post(Completion::ClipboardRead { request, read });
        });
        Ok(())
    }

    fn fetch_text(&mut self, token: Token, url: &str) -> Result<()> {
        let promise = window()?.fetch_with_str(url);
        let completions = self.completions.clone();
        let url = url.to_string();
        spawn_local(async move {
            let response = fetch_response(promise).await;
            completions.post(Completion::Fetched {
                token,
                url,
                response,
            });
        });
        Ok(())
    }

    fn download_text(&mut self, download: &Download<'_>) -> Result<()> {
        let parts = js_sys::Array::of1(&JsValue::from_str(download.content));
        let options = BlobPropertyBag::new();
        options.set_type(download.mime_type);
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(host_error)?;
        trigger_download(&blob, download.filename)
    }

    fn capture_surface(&mut self, canvas: &HtmlCanvasElement, request: &ScreenshotRequest) -> Result<()> {
        let filename = request.filename.clone();
        let on_blob = Closure::once_into_js(move |blob: JsValue| match blob.dyn_into::<Blob>() {
            Ok(blob) => {
                if let Err(err) = trigger_download(&blob, &filename) {
                    log::warn!("screenshot {filename}: {err}");
                }
            }
            Err(_) => log::warn!("screenshot {filename}: canvas produced no image"),
        });

        let started = match request.quality {
            Some(quality) => canvas.to_blob_with_type_and_encoder_options(
                on_blob.unchecked_ref(),
                &request.mime_type,
                &JsValue::from_f64(quality),
            ),
            None => canvas.to_blob_with_type(on_blob.unchecked_ref(), &request.mime_type),
        };
        started.map_err(|err| BridgeError::Screenshot {
            filename: request.filename.clone(),
            reason: js_error_text(&err),
        })
    }

    fn report_platform_error(&mut self, error: &BridgeError) {
        let js_error = js_sys::Error::new(&error.to_string());
        if report_error(&js_error).is_err() {
            web_sys::console::error_1(&js_error);
        }
    }

    fn stack_trace(&self, message: Option<&str>) -> String {
        let message = message.unwrap_or_default();
        let error = js_sys::Error::new(message);
        js_sys::Reflect::get(&error, &JsValue::from_str("stack"))
            .ok()
            .and_then(|stack| stack.as_string())
            .unwrap_or_else(|| format!("Error: {message}"))
    }

    fn abort(&mut self, message: Option<&str>) -> bool {
        let Some(hook) = self.abort_hook.clone() else {
            return false;
        };
        let arg = message.map(JsValue::from_str).unwrap_or(JsValue::NULL);
        self.outbox.defer(move || {
            if let Err(err) = hook.call1(&JsValue::NULL, &arg) {
                log::error!("abort hook threw: {}", js_error_text(&err));
            }
        });
        true
    }

    fn watch_unload(&mut self) -> Result<()> {
        if self.unload_listener.is_some() {
            return Ok(());
        }
        let on_unload = Rc::clone(&self.on_unload);
        let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| on_unload());
        window()?
            .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref())
            .map_err(host_error)?;
        self.unload_listener = Some(listener);
        Ok(())
    }

    fn unwatch_unload(&mut self) {
        let Some(listener) = self.unload_listener.take() else {
            return;
        };
        if let Ok(window) = window() {
            let _ = window
                .remove_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref());
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| BridgeError::HostUnavailable("window".into()))
}

fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| BridgeError::HostUnavailable("document".into()))
}

fn create_element<T: JsCast>(document: &Document, tag: &str) -> Result<T> {
    document
        .create_element(tag)
        .map_err(host_error)?
        .dyn_into::<T>()
        .map_err(|_| BridgeError::HostUnavailable(format!("<{tag}> element")))
}

fn host_error(err: JsValue) -> BridgeError {
    BridgeError::Host(js_error_text(&err))
}

/// `Name: message` for JS errors, the string itself for thrown strings.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name = String::from(error.name());
        let message = String::from(error.message());
        return if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        };
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn read_text(completions: CompletionSender, token: Token, picker: Option<PickerHandle>, file: File) {
    let name = file.name();
    let promise = file.text();
    spawn_local(async move {
        let read = match JsFuture::from(promise).await {
            Ok(text) => text
                .as_string()
                .ok_or_else(|| "file content is not text".to_string()),
            Err(err) => Err(js_error_text(&err)),
        };
        completions.post(Completion::FileRead {
            token,
            picker,
            name,
            read,
        });
    });
}

async fn fetch_response(promise: js_sys::Promise) -> std::result::Result<HttpResponse, String> {
    let response: Response = JsFuture::from(promise)
        .await
        .map_err(|err| js_error_text(&err))?
        .dyn_into()
        .map_err(|_| "fetch did not resolve to a Response".to_string())?;

    // Error bodies are not surfaced, only the status.
    let body = if response.ok() {
        let text = response.text().map_err(|err| js_error_text(&err))?;
        JsFuture::from(text)
            .await
            .map_err(|err| js_error_text(&err))?
            .as_string()
            .unwrap_or_default()
    } else {
        String::new()
    };

    Ok(HttpResponse {
        status: response.status(),
        status_text: response.status_text(),
        body,
    })
}

fn trigger_download(blob: &Blob, filename: &str) -> Result<()> {
    let document = document()?;
    let body = document
        .body()
        .ok_or_else(|| BridgeError::HostUnavailable("document.body".into()))?;
    let url = Url::create_object_url_with_blob(blob).map_err(host_error)?;

    let anchor: HtmlAnchorElement = create_element(&document, "a")?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    body.append_child(&anchor).map_err(host_error)?;
    anchor.click();
    anchor.remove();

    revoke_later(url);
    Ok(())
}

fn revoke_later(url: String) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let revoke = Closure::once_into_js(move || {
        let _ = Url::revoke_object_url(&url);
    });
    if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        revoke.unchecked_ref(),
        REVOKE_DELAY_MS,
    ) {
        log::debug!("cannot schedule object URL revoke: {}", js_error_text(&err));
    }
}
