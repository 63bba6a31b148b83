//! One-shot resolution handle for a signal session

use std::cell::RefCell;
use std::rc::Rc;

use super::data::{ExtraData, SignalData};

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Confirmed(SignalData, Option<ExtraData>),
    Cancelled,
}

#[derive(Debug)]
enum Slot {
    /// Waiting for the operator
    Pending,
    /// Resolved, not yet applied by the engine
    Resolved(Resolution),
    /// Applied or closed; further resolutions are ignored
    Settled,
}

/// Handle given to an operator when its session starts.
///
/// Clones share one slot. Only the first `confirm`/`cancel` on any clone is
/// recorded; later calls return `false`. The engine applies the recorded
/// resolution the next time it settles.
#[derive(Debug, Clone)]
pub struct SignalHandle {
    session: u64,
    slot: Rc<RefCell<Slot>>,
}

impl SignalHandle {
    pub(crate) fn new(session: u64) -> Self {
        Self {
            session,
            slot: Rc::new(RefCell::new(Slot::Pending)),
        }
    }

    /// Id of the session this handle belongs to
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Confirm the session with `data`
    pub fn confirm(&self, data: SignalData) -> bool {
        self.resolve(Resolution::Confirmed(data, None))
    }

    /// Confirm the session with `data` and extra data for the confirm hook
    pub fn confirm_with(&self, data: SignalData, extra: ExtraData) -> bool {
        self.resolve(Resolution::Confirmed(data, Some(extra)))
    }

    /// Cancel the session
    pub fn cancel(&self) -> bool {
        self.resolve(Resolution::Cancelled)
    }

    /// Whether a resolution has been recorded (or the session is gone)
    pub fn is_resolved(&self) -> bool {
        !matches!(*self.slot.borrow(), Slot::Pending)
    }

    fn resolve(&self, resolution: Resolution) -> bool {
        let mut slot = self.slot.borrow_mut();
        if matches!(*slot, Slot::Pending) {
            *slot = Slot::Resolved(resolution);
            true
        } else {
            tracing::warn!(session = self.session, "signal handle already resolved, ignoring");
            false
        }
    }

    /// Take the recorded resolution, settling the handle
    pub(crate) fn take(&self) -> Option<Resolution> {
        let mut slot = self.slot.borrow_mut();
        match std::mem::replace(&mut *slot, Slot::Settled) {
            Slot::Resolved(resolution) => Some(resolution),
            Slot::Pending => {
                *slot = Slot::Pending;
                None
            }
            Slot::Settled => None,
        }
    }

    /// Settle the handle without a resolution (session torn down by the engine)
    pub(crate) fn close(&self) {
        *self.slot.borrow_mut() = Slot::Settled;
    }
}
