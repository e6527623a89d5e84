//! adapter errors

use thiserror::Error;

use acel_sim as sim;

use crate::config::ConfigError;
use crate::phase::TimePoint;
use crate::protocol::Command;

/// protocol-compliance violations
///
/// each of these means the requester or the peer broke the protocol; none
/// is recoverable and the run has to stop
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("transaction `{0}` crosses the {1}-byte bus boundary in narrow mode")]
    NarrowOverrun(String, usize),
    #[error("{0} response with id {1} but no request is outstanding")]
    EmptyResponseQueue(Command, u32),
    #[error("{0} acknowledge with id {1} but no request is outstanding")]
    EmptyAckQueue(Command, u32),
    #[error("{0} acknowledge with id {1} out of order")]
    AckOrder(Command, u32),
    #[error("{0} request issued while another {0} request is active")]
    SlotBusy(Command),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("protocol violation: {0}")]
    Protocol(#[from] Violation),
    #[error("phase notification for a transaction the adapter does not track")]
    UnknownTransaction,
    #[error("time point {0:?} is not valid for a {1} transaction")]
    UnexpectedPhase(TimePoint, Command),
    #[error("burst of {beats} beats cannot carry the data, {needed} beats are needed")]
    BurstShape { beats: usize, needed: usize },
    #[error("{0} channel handshake without an active request")]
    NoActiveRequest(Command),
    #[error(transparent)]
    Bytes(#[from] acel_bytes::Error),
    #[error(transparent)]
    Sim(#[from] sim::Error),
}

impl Error {
    /// recover an adapter error that terminated a simulation run
    pub fn from_sim(err: &sim::Error) -> Option<&Error> {
        match err {
            sim::Error::Clocked(inner) => inner.downcast_ref::<Error>(),
            _ => None,
        }
    }

    /// the protocol violation behind this error, if any
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Protocol(violation) => Some(violation),
            _ => None,
        }
    }
}
