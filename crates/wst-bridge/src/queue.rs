//! Single-consumer completion queue.
//!
//! Hosts post tagged outcomes from their asynchronous callbacks; the bridge
//! drains them in [`ContentBridge::dispatch`](crate::ContentBridge::dispatch),
//! typically once per frame. Everything lives on one thread, so the queue is
//! shared through `Rc` rather than a channel.

use crate::picker::PickerHandle;
use crate::token::Token;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Response of a completed HTTP request, as observed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    /// Response text. Hosts may leave it empty for non-success statuses.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A host outcome waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A file was read, from the picker (`picker: Some`) or handed in
    /// directly (`picker: None`, e.g. drag and drop).
    FileRead {
        token: Token,
        picker: Option<PickerHandle>,
        name: String,
        read: Result<String, String>,
    },
    /// The user dismissed the picker without choosing a file.
    PickerCancelled { token: Token, picker: PickerHandle },
    /// A URL import finished. `Err` carries the transport exception text.
    Fetched {
        token: Token,
        url: String,
        response: Result<HttpResponse, String>,
    },
    /// A clipboard read finished.
    ClipboardRead {
        request: Token,
        read: Result<String, String>,
    },
}

type Wake = Rc<dyn Fn()>;

#[derive(Default)]
struct Shared {
    pending: RefCell<VecDeque<Completion>>,
    wake: RefCell<Option<Wake>>,
}

/// Consumer side of the queue, owned by the bridge.
#[derive(Default)]
pub struct CompletionQueue {
    shared: Rc<Shared>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new producer handle for a host.
    pub fn sender(&self) -> CompletionSender {
        CompletionSender {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Install a hook invoked after every post. The hook must not drain the
    /// queue synchronously: posts can happen while the bridge is mid-call.
    pub fn set_wake(&self, wake: impl Fn() + 'static) {
        *self.shared.wake.borrow_mut() = Some(Rc::new(wake));
    }

    pub fn clear_wake(&self) {
        self.shared.wake.borrow_mut().take();
    }

    /// Take every pending completion, oldest first.
    pub fn drain(&self) -> Vec<Completion> {
        self.shared.pending.borrow_mut().drain(..).collect()
    }

    /// Drop every pending completion, returning how many were discarded.
    pub fn discard(&self) -> usize {
        let mut pending = self.shared.pending.borrow_mut();
        let count = pending.len();
        pending.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.shared.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.pending.borrow().is_empty()
    }
}

/// Producer side of the queue, held by hosts and their pending callbacks.
#[derive(Clone)]
pub struct CompletionSender {
    shared: Rc<Shared>,
}

impl CompletionSender {
    pub fn post(&self, completion: Completion) {
        log::trace!("completion posted: {completion:?}");
        self.shared.pending.borrow_mut().push_back(completion);
        // Clone out so the hook may post or replace itself.
        let wake = self.shared.wake.borrow().clone();
        if let Some(wake) = wake {
            wake();
        }
    }
}
