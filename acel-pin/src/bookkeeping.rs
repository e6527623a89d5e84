//! outstanding-request bookkeeping
//!
//! handles bind a transaction to adapter state for its lifetime. each
//! identifier gets its own FIFO per direction, pushed at end of request and
//! popped at acknowledge; one active slot per direction hands the request
//! currently on an address/data channel from a reaction to its driver.

use std::collections::VecDeque;
use std::sync::Arc;

use ahash::AHashMap as Map;
use nohash_hasher::{IntMap, IsEnabled};

use crate::error::Violation;
use crate::protocol::{Command, SharedTransaction};

/// identifies a live handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl IsEnabled for HandleId {}

/// adapter-side state of one accepted transaction
#[derive(Debug)]
pub struct Handle {
    pub trans: SharedTransaction,
    pub command: Command,
    pub id: u32,
    /// beats moved so far
    pub beat_count: usize,
    pub is_snoop: bool,
}

/// all live handles, keyed by id and by transaction identity
#[derive(Debug, Default)]
pub struct Handles {
    next: u64,
    live: IntMap<HandleId, Handle>,
    by_trans: Map<usize, HandleId>,
}

fn trans_key(trans: &SharedTransaction) -> usize {
    Arc::as_ptr(trans) as usize
}

impl Handles {
    pub fn lookup(&self, trans: &SharedTransaction) -> Option<HandleId> {
        self.by_trans.get(&trans_key(trans)).copied()
    }

    /// create a handle for a newly accepted transaction
    pub fn create(&mut self, trans: &SharedTransaction) -> HandleId {
        self.insert(trans, false)
    }

    /// create a handle for a snoop; snoops keep no request bookkeeping
    pub fn create_snoop(&mut self, trans: &SharedTransaction) -> HandleId {
        self.insert(trans, true)
    }

    fn insert(&mut self, trans: &SharedTransaction, is_snoop: bool) -> HandleId {
        let handle = HandleId(self.next);
        self.next += 1;

        let (command, id) = {
            let trans = trans.lock();
            (trans.command(), trans.id())
        };
        self.live.insert(
            handle,
            Handle { trans: trans.clone(), command, id, beat_count: 0, is_snoop },
        );
        self.by_trans.insert(trans_key(trans), handle);
        handle
    }

    pub fn get(&self, handle: HandleId) -> Option<&Handle> {
        self.live.get(&handle)
    }

    pub fn get_mut(&mut self, handle: HandleId) -> Option<&mut Handle> {
        self.live.get_mut(&handle)
    }

    /// destroy a retired handle
    pub fn remove(&mut self, handle: HandleId) -> Option<Handle> {
        let removed = self.live.remove(&handle)?;
        self.by_trans.remove(&trans_key(&removed.trans));
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// per-identifier response queues for both directions
#[derive(Debug, Default)]
pub struct Outstanding {
    queues: [Map<u32, VecDeque<HandleId>>; 2],
}

impl Outstanding {
    pub fn push(&mut self, command: Command, id: u32, handle: HandleId) {
        self.queues[command.index()].entry(id).or_default().push_back(handle);
    }

    /// oldest request awaiting a response with this id
    pub fn head(&self, command: Command, id: u32) -> Result<HandleId, Violation> {
        self.queues[command.index()]
            .get(&id)
            .and_then(|queue| queue.front().copied())
            .ok_or(Violation::EmptyResponseQueue(command, id))
    }

    /// retire `handle`, which has to be the head of its queue
    pub fn retire(&mut self, command: Command, id: u32, handle: HandleId) -> Result<(), Violation> {
        let queue = self.queues[command.index()]
            .get_mut(&id)
            .filter(|queue| !queue.is_empty())
            .ok_or(Violation::EmptyAckQueue(command, id))?;
        if queue.front() != Some(&handle) {
            return Err(Violation::AckOrder(command, id));
        }
        queue.pop_front();
        if queue.is_empty() {
            self.queues[command.index()].remove(&id);
        }
        Ok(())
    }

    pub fn len(&self, command: Command, id: u32) -> usize {
        self.queues[command.index()].get(&id).map_or(0, VecDeque::len)
    }

    pub fn total(&self, command: Command) -> usize {
        self.queues[command.index()].values().map(VecDeque::len).sum()
    }
}

/// the request currently driving each direction's address/data channel
#[derive(Debug, Default)]
pub struct ActiveSlots {
    slots: [Option<HandleId>; 2],
}

impl ActiveSlots {
    pub fn get(&self, command: Command) -> Option<HandleId> {
        self.slots[command.index()]
    }

    /// claim the slot; re-claiming by the holder is fine
    pub fn claim(&mut self, command: Command, handle: HandleId) -> Result<(), Violation> {
        match self.slots[command.index()] {
            Some(holder) if holder != handle => Err(Violation::SlotBusy(command)),
            _ => {
                self.slots[command.index()] = Some(handle);
                Ok(())
            }
        }
    }

    pub fn release(&mut self, command: Command) -> Option<HandleId> {
        self.slots[command.index()].take()
    }

    pub fn is_free_for(&self, command: Command, handle: Option<HandleId>) -> bool {
        match self.slots[command.index()] {
            None => true,
            Some(holder) => Some(holder) == handle,
        }
    }
}
