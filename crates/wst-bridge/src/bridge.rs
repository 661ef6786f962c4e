//! The content bridge: owns the handler registration, the picker and the
//! completion queue, and turns host completions into handler calls.
//!
//! Every entry point returns immediately. Asynchronous work is delegated to
//! the [`Host`], whose outcomes are queued and delivered by [`dispatch`].
//! Failures of that work reach the handlers in-band, through the same slot a
//! success would have used.
//!
//! [`dispatch`]: ContentBridge::dispatch

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::handlers::{Handlers, Registration};
use crate::host::{Download, Host, ScreenshotRequest};
use crate::picker::{Picker, PickerHandle, PickerPhase};
use crate::queue::{Completion, CompletionQueue, CompletionSender};
use crate::result::ContentResult;
use crate::token::Token;

pub struct ContentBridge<H: Host, C> {
    host: H,
    config: BridgeConfig,
    queue: CompletionQueue,
    registration: Option<Registration<C>>,
    picker: Option<Picker>,
    watching_unload: bool,
    /// Set when the application reloads on purpose; silences before-unload.
    reset_requested: bool,
}

impl<H: Host, C> ContentBridge<H, C> {
    /// `queue` must be the queue whose sender `host` posts to.
    pub fn new(host: H, queue: CompletionQueue, config: BridgeConfig) -> Self {
        Self {
            host,
            config,
            queue,
            registration: None,
            picker: None,
            watching_unload: false,
            reset_requested: false,
        }
    }

    // ─── Registration ────────────────────────────────────────────────────

    /// Register `handlers` and `context` as one unit, replacing any previous
    /// registration, and provision a fresh picker.
    pub fn install(&mut self, handlers: Handlers<C>, context: C) {
        let replaced = self
            .registration
            .replace(Registration { handlers, context })
            .is_some();
        if replaced {
            log::debug!("content bridge: replacing installed handlers");
        }

        self.replace_picker();

        if !self.watching_unload {
            match self.host.watch_unload() {
                Ok(()) => self.watching_unload = true,
                Err(err) => log::warn!("content bridge: cannot watch page unload: {err}"),
            }
        }
        log::info!("content bridge installed");
    }

    /// Clear handlers and context and release the picker. Safe to call any
    /// number of times. Completions still in flight are dropped on arrival.
    pub fn uninstall(&mut self) {
        let was_installed = self.registration.take().is_some();

        if let Some(picker) = self.picker.take() {
            self.host.destroy_picker(picker.handle());
        }
        if self.watching_unload {
            self.host.unwatch_unload();
            self.watching_unload = false;
        }

        let dropped = self.queue.discard();
        if dropped > 0 {
            log::debug!("content bridge: dropped {dropped} queued completion(s) on uninstall");
        }
        if was_installed {
            log::info!("content bridge uninstalled");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.registration.is_some()
    }

    /// The installed context, if any.
    pub fn context(&self) -> Option<&C> {
        self.registration.as_ref().map(|r| &r.context)
    }

    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.registration.as_mut().map(|r| &mut r.context)
    }

    // ─── File picker ─────────────────────────────────────────────────────

    /// Prompt the user for a file. Exactly one completion follows a
    /// selection; a cancelled prompt produces none.
    ///
    /// # Errors
    /// `NotInstalled` before `install`, `PickerBusy` while another prompt is
    /// open, or whatever the host reports when the prompt cannot be shown.
    pub fn open_file_dialog(&mut self, token: Token) -> Result<()> {
        if self.registration.is_none() {
            return Err(BridgeError::NotInstalled);
        }

        let picker = self.ensure_picker()?;
        picker.begin(token)?;
        let handle = picker.handle();

        log::debug!("{token}: prompting {handle:?}");
        if let Err(err) = self.host.prompt_picker(handle, token) {
            if let Some(picker) = self.picker.as_mut() {
                picker.abandon();
            }
            return Err(err);
        }
        Ok(())
    }

    /// Force the picker back to `Idle` with a fresh element, for hosts that
    /// never report a dismissed prompt. Returns the abandoned token.
    pub fn cancel_file_dialog(&mut self) -> Option<Token> {
        let pending = self.picker.as_ref().and_then(Picker::pending)?;
        log::debug!("{pending}: file dialog abandoned");
        self.replace_picker();
        Some(pending)
    }

    /// `None` when no picker element exists (not installed, or the host
    /// could not create one yet).
    pub fn picker_phase(&self) -> Option<PickerPhase> {
        self.picker.as_ref().map(Picker::phase)
    }

    /// Read a file handed over outside the picker (drag and drop) and deliver
    /// it like a pick. The picker state is untouched.
    pub fn load_file(&mut self, token: Token, file: H::File) {
        if let Err(err) = self.host.read_file(token, file) {
            self.completions().post(Completion::FileRead {
                token,
                picker: None,
                name: String::new(),
                read: Err(err.to_string()),
            });
        }
    }

    // ─── Clipboard, import, export ───────────────────────────────────────

    /// Read clipboard text. The clipboard handler always fires, with `None`
    /// on failure (the failure also goes to the platform error channel).
    pub fn get_clipboard_text(&mut self, request: Token) {
        if let Err(err) = self.host.read_clipboard(request) {
            self.completions().post(Completion::ClipboardRead {
                request,
                read: Err(err.to_string()),
            });
        }
    }

    /// Fetch `url` and deliver it to the new-content handler. Never silent:
    /// success, HTTP error and transport error all produce one callback.
    pub fn import_from_url(&mut self, token: Token, url: &str) {
        log::debug!("{token}: importing {url}");
        if let Err(err) = self.host.fetch_text(token, url) {
            self.completions().post(Completion::Fetched {
                token,
                url: url.to_string(),
                response: Err(err.to_string()),
            });
        }
    }

    /// Offer `content` as a download named `filename`. No callback.
    pub fn export_content(&mut self, filename: &str, content: &str) -> Result<()> {
        let download = Download {
            filename,
            mime_type: &self.config.export_mime_type,
            content,
        };
        self.host.download_text(&download)
    }

    /// Encode `surface` and offer it as a download. No callback.
    pub fn save_screenshot(
        &mut self,
        surface: &H::Surface,
        filename: &str,
        mime_type: Option<&str>,
        quality: Option<f64>,
    ) -> Result<()> {
        let request = ScreenshotRequest::new(
            filename,
            mime_type,
            quality,
            &self.config.screenshot_mime_type,
        );
        self.host.capture_surface(surface, &request)
    }

    // ─── Diagnostics ─────────────────────────────────────────────────────

    pub fn print_stack_trace(&self, message: Option<&str>) {
        log::info!("{}", self.host.stack_trace(message));
    }

    /// Log a stack trace and hand control to the host abort hook.
    pub fn abort(&mut self, message: Option<&str>) {
        log::error!("{}", self.host.stack_trace(message));
        if !self.host.abort(message) {
            log::error!("abort requested but the host has no abort hook");
        }
    }

    // ─── Page lifecycle ──────────────────────────────────────────────────

    /// Mark the coming unload as intentional (e.g. a reset reload).
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    pub fn is_reset_requested(&self) -> bool {
        self.reset_requested
    }

    /// Called by the host when the page is about to unload. Returns whether
    /// the before-unload handler ran.
    pub fn notify_before_unload(&mut self) -> bool {
        if self.reset_requested {
            log::debug!("page unload after reset request, not notifying");
            return false;
        }
        let Some(registration) = self.registration.as_mut() else {
            return false;
        };
        match registration.handlers.before_unload.as_mut() {
            Some(handler) => {
                handler(&mut registration.context);
                true
            }
            None => false,
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Deliver every queued completion, oldest first. Returns the number of
    /// handler invocations.
    pub fn dispatch(&mut self) -> usize {
        let mut delivered = 0;
        for completion in self.queue.drain() {
            if self.deliver(completion) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Pending completions not yet dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// A sender onto this bridge's queue.
    pub fn completions(&self) -> CompletionSender {
        self.queue.sender()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn deliver(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::FileRead {
                token,
                picker,
                name,
                read,
            } => {
                if let Some(handle) = picker {
                    self.finish_pick(handle, token);
                }
                let result = ContentResult::from_file_read(name, read);
                if let Some(error) = result.error_text() {
                    log::warn!("{token}: {error}");
                }
                let Some(registration) = self.registration.as_mut() else {
                    log::debug!("{token}: file result arrived after uninstall");
                    return false;
                };
                match registration.handlers.file_slot() {
                    Some(handler) => {
                        handler(&mut registration.context, token, &result);
                        true
                    }
                    None => false,
                }
            }
            Completion::PickerCancelled { token, picker } => {
                log::debug!("{token}: file dialog cancelled");
                self.finish_pick(picker, token);
                false
            }
            Completion::Fetched {
                token,
                url,
                response,
            } => {
                let result = ContentResult::from_fetch(&url, response);
                if let Some(error) = result.error_text() {
                    log::warn!("{token}: {error}");
                }
                let Some(registration) = self.registration.as_mut() else {
                    log::debug!("{token}: import of {url} arrived after uninstall");
                    return false;
                };
                match registration.handlers.new_content.as_mut() {
                    Some(handler) => {
                        handler(&mut registration.context, token, &result);
                        true
                    }
                    None => false,
                }
            }
            Completion::ClipboardRead { request, read } => {
                let text = match read {
                    Ok(text) => Some(text),
                    Err(reason) => {
                        let err = BridgeError::Clipboard(reason);
                        log::warn!("{request}: {err}");
                        self.host.report_platform_error(&err);
                        None
                    }
                };
                let Some(registration) = self.registration.as_mut() else {
                    log::debug!("{request}: clipboard result arrived after uninstall");
                    return false;
                };
                match registration.handlers.clipboard.as_mut() {
                    Some(handler) => {
                        handler(&mut registration.context, request, text.as_deref());
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// A prompt on `handle` ended: reset to Idle with a fresh element.
    /// Events from an element that was already replaced change nothing.
    fn finish_pick(&mut self, handle: PickerHandle, token: Token) {
        let current = self.picker.as_ref().map(Picker::handle);
        if current == Some(handle) {
            self.replace_picker();
        } else {
            log::debug!("{token}: {handle:?} is no longer current");
        }
    }

    fn ensure_picker(&mut self) -> Result<&mut Picker> {
        if self.picker.is_none() {
            let handle = self
                .host
                .create_picker(self.config.picker_accept.as_deref())?;
            self.picker = Some(Picker::new(handle));
        }
        self.picker
            .as_mut()
            .ok_or_else(|| BridgeError::HostUnavailable("file picker".into()))
    }

    fn replace_picker(&mut self) {
        if let Some(old) = self.picker.take() {
            self.host.destroy_picker(old.handle());
        }
        match self
            .host
            .create_picker(self.config.picker_accept.as_deref())
        {
            Ok(handle) => self.picker = Some(Picker::new(handle)),
            Err(err) => log::warn!("content bridge: cannot create file picker: {err}"),
        }
    }
}
