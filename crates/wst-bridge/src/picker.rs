//! File picker state machine.
//!
//! ```text
//! Idle ──open(token)──▶ Prompted(token) ──▶ Completed(content | error) ─┐
//!  ▲                         │                                          │
//!  │                         └──────────▶ Cancelled ────────────────────┤
//!  └──────────── element destroyed and recreated ◀──────────────────────┘
//! ```
//!
//! Browsers do not fire `change` again when the same file is selected twice
//! on a reused `<input type="file">`, so every exit from `Prompted` replaces
//! the host element. The bridge does this unconditionally rather than per
//! platform.

use crate::error::{BridgeError, Result};
use crate::token::Token;
use std::fmt;

/// Host-allocated identifier of one picker element.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickerHandle(pub u32);

impl fmt::Debug for PickerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "picker:{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    Idle,
    Prompted(Token),
}

/// The live picker element and where it is in its cycle.
#[derive(Debug)]
pub(crate) struct Picker {
    handle: PickerHandle,
    phase: PickerPhase,
}

impl Picker {
    pub(crate) fn new(handle: PickerHandle) -> Self {
        Self {
            handle,
            phase: PickerPhase::Idle,
        }
    }

    pub(crate) fn handle(&self) -> PickerHandle {
        self.handle
    }

    pub(crate) fn phase(&self) -> PickerPhase {
        self.phase
    }

    /// Idle → Prompted. A second open while prompting is rejected.
    pub(crate) fn begin(&mut self, token: Token) -> Result<()> {
        match self.phase {
            PickerPhase::Idle => {
                self.phase = PickerPhase::Prompted(token);
                Ok(())
            }
            PickerPhase::Prompted(pending) => Err(BridgeError::PickerBusy { pending }),
        }
    }

    /// Undo a `begin` whose prompt never reached the user.
    pub(crate) fn abandon(&mut self) {
        self.phase = PickerPhase::Idle;
    }

    pub(crate) fn pending(&self) -> Option<Token> {
        match self.phase {
            PickerPhase::Idle => None,
            PickerPhase::Prompted(token) => Some(token),
        }
    }
}
