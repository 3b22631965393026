use std::sync::atomic::{AtomicBool, Ordering};

use elecmate_core::bulk::{BulkActionKind, BulkActionState};

use crate::error::BulkError;

/// Tracks which bulk action kinds are currently running.
///
/// At most one invocation per kind may be in flight. Different kinds may
/// overlap.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    flags: [AtomicBool; 3],
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as in flight. The returned guard resets it to idle when
    /// dropped, on every exit path.
    pub fn begin(&self, kind: BulkActionKind) -> Result<InFlightGuard<'_>, BulkError> {
        self.flags[kind.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard {
                registry: self,
                kind,
            })
            .map_err(|_| BulkError::AlreadyInFlight(kind))
    }

    pub fn state(&self, kind: BulkActionKind) -> BulkActionState {
        if self.flags[kind.index()].load(Ordering::Acquire) {
            BulkActionState::InFlight
        } else {
            BulkActionState::Idle
        }
    }
}

/// RAII marker for one in-flight bulk action.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    kind: BulkActionKind,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.flags[self.kind.index()].store(false, Ordering::Release);
    }
}
