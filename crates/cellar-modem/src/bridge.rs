//! Packet bridge collaborator interface
//!
//! The network-layer bridge carries packet traffic over the data channel
//! once the modem is in data mode. The supervisor tells it when the channel
//! is available and when the carrier is up; the protocol it speaks is not
//! our concern.

use crate::error::CollabError;
use crate::transport::LogicalChannel;

/// The network-layer bridge over the data channel
pub trait PacketBridge: Send + Sync {
    /// Bind the bridge to a logical channel
    fn attach(&self, channel: LogicalChannel) -> Result<(), CollabError>;

    /// Drop the channel binding
    fn release(&self);

    /// Hand the bridge the link-layer address derived from the modem identity
    fn set_link_identity(&self, identity: &[u8]);

    /// Signal that the network is ready to pass traffic
    fn carrier_on(&self);

    /// Signal that traffic must stop
    fn carrier_off(&self);
}
