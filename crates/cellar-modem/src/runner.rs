//! Script runner collaborator interface
//!
//! The command/response pattern-matching engine is an external collaborator.
//! It runs one script at a time over its current attachment, posts
//! `ScriptSuccess` or `ScriptFailed` through the event queue when the script
//! finishes, and applies field matches (solicited and unsolicited) to the
//! shared status block while attached.

use crate::error::CollabError;
use crate::transport::LogicalChannel;

/// Where the script engine sends and receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTarget {
    /// The raw transport, before the multiplexer is up
    Transport,
    /// A logical channel of the multiplexer
    Channel(LogicalChannel),
}

/// The chat script engine
pub trait ScriptRunner: Send + Sync {
    /// Bind the engine to a transport or channel
    fn attach(&self, target: ScriptTarget) -> Result<(), CollabError>;

    /// Begin running a script over the current attachment; completion posts
    /// `ScriptSuccess` or `ScriptFailed`
    fn run(&self, script: &cellar_script::ChatScript) -> Result<(), CollabError>;

    /// Drop the current attachment, cancelling any running script
    fn release(&self);
}
