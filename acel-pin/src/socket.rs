//! requester-facing socket
//!
//! forward phases are accepted or rejected on the spot and queued; the
//! adapter works through the queue on the next rising edge, once the
//! drivers retired the previous transfer. backward phases travel through a
//! latched event whose listener belongs to the requester.

use std::collections::VecDeque;

use crate::phase::{Phase, SyncStatus};
use crate::protocol::{Command, SharedTransaction};
use crate::Core;

/// a queued forward phase
#[derive(Debug)]
pub(crate) struct Forward {
    pub trans: SharedTransaction,
    pub phase: Phase,
    pub command: Command,
}

#[derive(Debug, Default)]
pub(crate) struct Ingress {
    pending: VecDeque<Forward>,
}

impl Ingress {
    /// accept `phase` for later processing
    ///
    /// a request phase is rejected while a request of the same direction
    /// is queued or while the direction's channel belongs to another
    /// transaction; the requester retries it later
    pub fn accept(&mut self, core: &Core, trans: &SharedTransaction, phase: Phase) -> SyncStatus {
        if !phase.is_forward() {
            log::warn!(target: core.name(), "rejecting backward phase {:?} on the forward path", phase);
            return SyncStatus::Rejected;
        }

        let command = trans.lock().command();
        if phase.is_request() {
            let handle = core.handles().lookup(trans);
            if self.has_pending_request(command) || !core.is_free_for(command, handle) {
                log::debug!(target: core.name(), "{} channel busy, rejecting {:?}", command, phase);
                return SyncStatus::Rejected;
            }
        }

        log::trace!(target: core.name(), "accepted {:?}", phase);
        self.pending.push_back(Forward { trans: trans.clone(), phase, command });
        SyncStatus::Accepted
    }

    fn has_pending_request(&self, command: Command) -> bool {
        self.pending.iter().any(|fwd| fwd.command == command && fwd.phase.is_request())
    }

    /// everything accepted so far, oldest first
    pub fn take(&mut self) -> VecDeque<Forward> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
