//! Chat Script Library
//!
//! This crate provides the declarative data model for modem chat scripts and
//! the pure decoders that turn tokenized response fields into typed values:
//!
//! - **Scripts**: ordered command/expected-response sequences with abort
//!   patterns and a timeout budget, run by a script engine over a serial
//!   transport or a multiplexed channel
//! - **Decoders**: conversions from raw 3GPP response codes to typed
//!   registration and signal values
//! - **Vendor tables**: ready-made init/dial/periodic script sets for the
//!   supported modems
//!
//! # Architecture
//!
//! A script is configuration data, not logic. Each command names the request
//! to send and the reply pattern that must match before the next command is
//! sent. A pattern may carry a [`FieldHandler`] telling the script engine
//! which typed field the tokenized reply updates; the engine applies it
//! through the decoders in this crate.
//!
//! # Example
//!
//! ```rust
//! use cellar_script::{ChatCommand, ChatScript, MatchPattern};
//! use std::time::Duration;
//!
//! let script = ChatScript::new(
//!     "attention",
//!     vec![ChatCommand::expect("AT", MatchPattern::exact("OK"))],
//!     vec![MatchPattern::exact("ERROR")],
//!     Duration::from_secs(2),
//! );
//! assert_eq!(script.commands.len(), 1);
//! ```

pub mod decode;
pub mod error;
pub mod script;
pub mod vendors;

pub use decode::{
    bounded_field, rsrp_to_dbm, rsrq_to_db, rssi_to_dbm, RegistrationStatus, RSRP_UNKNOWN,
    RSRQ_UNKNOWN, RSSI_UNKNOWN,
};
pub use error::DecodeError;
pub use script::{ChatCommand, ChatScript, ExpectedReply, FieldHandler, MatchPattern, ScriptSet};
pub use vendors::unsolicited_matches;
