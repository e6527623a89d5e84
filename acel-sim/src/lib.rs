//! simulation module
//!
//! the simulation module contains the cycle substrate pin-level
//! components run on: a clock, two-phase signals, latched events and
//! the per-cycle scheduler that orders signal updates before samples

pub mod error;
pub mod event;
pub mod kernel;
pub mod signal;
pub mod trace;
pub mod traits;
pub mod types;

pub use error::*;
pub use event::{event, Listener, Notifier};
pub use kernel::Simulation;
pub use signal::{Probe, Signal, Traced};
pub use trace::{Change, NoTrace, TraceLog, Tracer};
pub use traits::*;
pub use types::*;

/// default sub-cycle offset between the clock edge and the sample point
pub const DEFAULT_DESKEW: Time = 1;
