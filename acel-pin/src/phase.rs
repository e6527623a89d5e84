//! transaction phases
//!
//! `Phase` is what travels over the requester socket. `TimePoint` is the
//! position of a transaction in the phase machine; the adapter attaches
//! one reaction to each time point through a `ReactionTable`.

use acel_sim::Time;

use crate::bookkeeping::HandleId;
use crate::pins::Pins;
use crate::protocol::SharedTransaction;
use crate::{Core, Error};

/// socket-level phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeginPartialReq,
    EndPartialReq,
    BeginReq,
    EndReq,
    BeginPartialResp,
    EndPartialResp,
    BeginResp,
    EndResp,
    Ack,
}

impl Phase {
    /// phases the requester may send forward
    pub fn is_forward(self) -> bool {
        matches!(
            self,
            Self::BeginPartialReq | Self::BeginReq | Self::EndPartialResp | Self::EndResp | Self::Ack
        )
    }

    /// phases that open (a beat of) a request
    pub fn is_request(self) -> bool {
        matches!(self, Self::BeginPartialReq | Self::BeginReq)
    }
}

/// answer to a forward call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Accepted,
    Rejected,
}

/// a phase transition delivered back to the requester
#[derive(Debug, Clone)]
pub struct Notification {
    pub trans: SharedTransaction,
    pub phase: Phase,
    /// earliest useful time for the requester to follow up, relative to now
    pub delay: Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePoint {
    RequestPhaseBegin = 0,
    BeginPartialRequest,
    EndPartialRequest,
    BeginRequest,
    EndRequest,
    BeginPartialResponse,
    EndPartialResponse,
    BeginResponse,
    EndResponse,
    Acknowledge,
}

impl TimePoint {
    pub const COUNT: usize = 10;

    pub const ALL: [TimePoint; Self::COUNT] = [
        Self::RequestPhaseBegin,
        Self::BeginPartialRequest,
        Self::EndPartialRequest,
        Self::BeginRequest,
        Self::EndRequest,
        Self::BeginPartialResponse,
        Self::EndPartialResponse,
        Self::BeginResponse,
        Self::EndResponse,
        Self::Acknowledge,
    ];
}

/// reaction run when a transaction reaches a time point
///
/// reactions run to completion; anything that has to wait is handed to a
/// channel driver through an event
pub type Reaction = fn(&mut Core, &mut Pins, HandleId) -> Result<(), Error>;

/// time point to reaction mapping
#[derive(Clone)]
pub struct ReactionTable {
    reactions: [Option<Reaction>; TimePoint::COUNT],
}

impl Default for ReactionTable {
    fn default() -> Self {
        Self { reactions: [None; TimePoint::COUNT] }
    }
}

impl ReactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, point: TimePoint, reaction: Reaction) -> &mut Self {
        self.reactions[point as usize] = Some(reaction);
        self
    }

    pub fn get(&self, point: TimePoint) -> Option<Reaction> {
        self.reactions[point as usize]
    }

    /// run the reaction for `point`; time points without one are no-ops
    pub fn react(
        &self,
        point: TimePoint,
        core: &mut Core,
        pins: &mut Pins,
        handle: HandleId,
    ) -> Result<(), Error> {
        log::trace!(target: core.name(), "{:?} for {:?}", point, handle);
        match self.get(point) {
            Some(reaction) => reaction(core, pins, handle),
            None => Ok(()),
        }
    }
}
