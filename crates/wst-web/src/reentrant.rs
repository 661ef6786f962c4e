//! Exclusive access to a value from JS entry points that may re-enter.
//!
//! JS callbacks (content handlers, the abort hook) are never called while the
//! value is borrowed. They are deferred to an [`Outbox`] and run once the
//! borrow is released, so a callback may call straight back in.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

type Deferred = Box<dyn FnOnce()>;

/// Calls waiting for the current borrow to end.
#[derive(Clone, Default)]
pub(crate) struct Outbox(Rc<RefCell<Vec<Deferred>>>);

impl Outbox {
    pub(crate) fn defer(&self, call: impl FnOnce() + 'static) {
        self.0.borrow_mut().push(Box::new(call));
    }

    fn take(&self) -> Vec<Deferred> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

pub(crate) struct Reentrant<T> {
    value: RefCell<T>,
    outbox: Outbox,
}

impl<T> Reentrant<T> {
    pub(crate) fn new(value: T, outbox: Outbox) -> Self {
        Self {
            value: RefCell::new(value),
            outbox,
        }
    }

    /// Run `f` on the value, then the calls it deferred. `None` when the
    /// value is already borrowed further up the stack.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let result = {
            let mut value = self.value.try_borrow_mut().ok()?;
            f(&mut *value)
        };
        self.flush();
        Some(result)
    }

    pub(crate) fn peek(&self) -> Option<Ref<'_, T>> {
        self.value.try_borrow().ok()
    }

    /// Calls deferred by a deferred call run in the same flush.
    fn flush(&self) {
        loop {
            let calls = self.outbox.take();
            if calls.is_empty() {
                break;
            }
            for call in calls {
                call();
            }
        }
    }
}
