//! Callback slots installed by the native side.

use crate::result::ContentResult;
use crate::token::Token;

/// `(context, token, result)` for file picks, dropped files and URL imports.
pub type ContentHandler<C> = Box<dyn FnMut(&mut C, Token, &ContentResult)>;
/// `(context)` when the page is about to unload.
pub type UnloadHandler<C> = Box<dyn FnMut(&mut C)>;
/// `(context, request, text)`; `None` means the read failed and the failure
/// has already been reported on the platform error channel.
pub type ClipboardHandler<C> = Box<dyn FnMut(&mut C, Token, Option<&str>)>;

/// The four named slots. Every slot is optional; an empty slot turns the
/// corresponding completion into a no-op.
pub struct Handlers<C> {
    pub new_content: Option<ContentHandler<C>>,
    pub before_unload: Option<UnloadHandler<C>>,
    /// File picks go here when set, otherwise to `new_content`.
    pub file_picked: Option<ContentHandler<C>>,
    pub clipboard: Option<ClipboardHandler<C>>,
}

impl<C> Default for Handlers<C> {
    fn default() -> Self {
        Self {
            new_content: None,
            before_unload: None,
            file_picked: None,
            clipboard: None,
        }
    }
}

impl<C> Handlers<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_new_content(mut self, f: impl FnMut(&mut C, Token, &ContentResult) + 'static) -> Self {
        self.new_content = Some(Box::new(f));
        self
    }

    pub fn on_before_unload(mut self, f: impl FnMut(&mut C) + 'static) -> Self {
        self.before_unload = Some(Box::new(f));
        self
    }

    pub fn on_file_picked(mut self, f: impl FnMut(&mut C, Token, &ContentResult) + 'static) -> Self {
        self.file_picked = Some(Box::new(f));
        self
    }

    pub fn on_clipboard(mut self, f: impl FnMut(&mut C, Token, Option<&str>) + 'static) -> Self {
        self.clipboard = Some(Box::new(f));
        self
    }

    /// Slot for picked or dropped files.
    pub(crate) fn file_slot(&mut self) -> Option<&mut ContentHandler<C>> {
        self.file_picked.as_mut().or(self.new_content.as_mut())
    }
}

/// Handlers plus the opaque context they receive, installed as one unit.
pub(crate) struct Registration<C> {
    pub(crate) handlers: Handlers<C>,
    pub(crate) context: C,
}
