//! Cellular Modem Lifecycle Supervisor
//!
//! This crate supervises the full operating lifecycle of a cellular modem
//! attached over a serial transport that is multiplexed into logical
//! channels: power sequencing, transport bring-up, script execution, channel
//! multiplexing, registration tracking, and graceful shutdown.
//!
//! # Architecture
//!
//! The heart is a 14-state lifecycle machine consumed by a single supervisor
//! task. Collaborators (transport, multiplexer, script engine, packet
//! bridge) are trait objects whose asynchronous completions flow back as
//! events through one bounded queue:
//!
//! - Producers (collaborator callbacks, the state timer, suspend/resume
//!   entry points) enqueue without blocking; overflow drops the event and
//!   counts it
//! - The supervisor task dispatches events one at a time into the state
//!   machine, so per-modem state needs no locking
//! - All waiting is expressed as a transition driven by a later timeout or
//!   completion; no handler blocks
//!
//! # Example
//!
//! ```rust,no_run
//! use cellar_modem::{spawn_modem, ModemConfig, ModemParts};
//! use cellar_script::vendors::quectel_bg95;
//!
//! # fn parts() -> ModemParts { unimplemented!() }
//! # async fn demo() {
//! let handle = spawn_modem(ModemConfig::default(), quectel_bg95("internet"), parts());
//!
//! handle.resume();
//! // ... carrier comes up, queries become meaningful ...
//! handle.suspend().await.unwrap();
//! # }
//! ```

pub mod actor;
pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod machine;
pub mod power;
pub mod runner;
pub mod state;
pub mod status;
pub mod timer;
pub mod transport;

#[cfg(test)]
mod testutil;

// Re-export actor and handle types
pub use actor::run_modem;
pub use handle::{spawn_modem, spawn_modem_with, ModemHandle};

// Re-export machine types
pub use machine::{Modem, ModemParts};
pub use state::LifecycleState;

// Re-export event types
pub use events::{event_queue, EventSender, ModemEvent, EVENT_QUEUE_DEPTH};

// Re-export collaborator interfaces
pub use bridge::PacketBridge;
pub use power::{ControlLine, PowerSequencer};
pub use runner::{ScriptRunner, ScriptTarget};
pub use transport::{LogicalChannel, Mux, Transport};

// Re-export status and configuration types
pub use config::ModemConfig;
pub use error::{CollabError, QueryError, SuspendError};
pub use status::{
    apply_field, AccessTechnology, IdentityKind, ModemStatus, SharedStatus, SignalKind,
};
pub use timer::StateTimer;
