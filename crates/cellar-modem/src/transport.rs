//! Transport and multiplexer collaborator interfaces
//!
//! The physical serial transport and the framing multiplexer are external
//! collaborators. The supervisor only starts operations; completions come
//! back asynchronously through the event queue (`TransportOpened`,
//! `TransportClosed`, `MuxConnected`, `Channel1Opened`, `Channel2Opened`).

use std::fmt;

use crate::error::CollabError;

/// One logical channel multiplexed over the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalChannel {
    /// Data channel: dial script, then packet traffic
    Channel1,
    /// Supervision channel: periodic status scripts
    Channel2,
}

impl fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalChannel::Channel1 => f.write_str("channel 1"),
            LogicalChannel::Channel2 => f.write_str("channel 2"),
        }
    }
}

/// The serial transport the modem is attached over
pub trait Transport: Send + Sync {
    /// Begin opening the transport; completion posts `TransportOpened`
    fn open(&self) -> Result<(), CollabError>;

    /// Begin closing the transport; completion posts `TransportClosed`.
    /// Closing an already-closed transport is a no-op.
    fn close(&self) -> Result<(), CollabError>;
}

/// The channel multiplexer running over the transport
pub trait Mux: Send + Sync {
    /// Bind the multiplexer to the opened transport
    fn attach(&self) -> Result<(), CollabError>;

    /// Begin the multiplexer handshake; completion posts `MuxConnected`
    fn connect(&self) -> Result<(), CollabError>;

    /// Begin opening a logical channel; completion posts the channel's
    /// opened event
    fn open_channel(&self, channel: LogicalChannel) -> Result<(), CollabError>;

    /// Stop observing a channel's events; the channel itself stays open for
    /// whoever attaches to it next
    fn release_channel(&self, channel: LogicalChannel);

    /// Drop the transport binding and all channel observers
    fn release(&self);
}
