//! pin-level ACE-Lite initiator adapter
//!
//! turns transaction-level phase notifications into cycle-accurate activity
//! on the five ACE-Lite channels (AR, R, AW, W, B) and reports the pin-level
//! progress back to the requester as backward phases.

pub mod bookkeeping;
pub mod callbacks;
pub mod config;
pub(crate) mod driver;
pub mod error;
pub mod initiator;
pub mod phase;
pub mod pins;
pub mod protocol;
pub(crate) mod socket;

pub use bookkeeping::{Handle, HandleId, Handles, Outstanding};
pub use callbacks::reaction_table;
pub use config::{Config, ConfigError};
pub use error::{Error, Violation};
pub use initiator::{Core, Initiator};
pub use phase::{Notification, Phase, Reaction, ReactionTable, SyncStatus, TimePoint};
pub use pins::Pins;
pub use protocol::{
    AceAttrs, Barrier, Burst, Cache, Command, Domain, Prot, Resp, SharedTransaction, Status,
    Transaction,
};
