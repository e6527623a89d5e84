//! simulation errors

use thiserror::Error;
use anyhow;

use super::Time;

#[derive(Error, Debug)]
pub enum Error {
    #[error("clocked element error: {0}")]
    Clocked(anyhow::Error),
    #[error("clock error: {0}")]
    Clock(String),
    #[error("event `{0}` has no listener")]
    Detached(String),
    #[error("simulation time: {0} | signals failed to settle")]
    DeltaOverflow(Time),
}

impl Error {
    /// wrap the failure of a clocked element
    pub fn clocked<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Clocked(anyhow::Error::new(err))
    }
}
