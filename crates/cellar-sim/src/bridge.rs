//! Virtual packet bridge

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use cellar_modem::{CollabError, LogicalChannel, PacketBridge};

/// Records what the supervisor tells the network layer
pub struct VirtualBridge {
    ready: AtomicBool,
    attached: Mutex<Option<LogicalChannel>>,
    carrier: AtomicBool,
    carrier_transitions: AtomicUsize,
    link_identity: Mutex<Vec<u8>>,
}

impl VirtualBridge {
    /// Create a ready, detached bridge
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            attached: Mutex::new(None),
            carrier: AtomicBool::new(false),
            carrier_transitions: AtomicUsize::new(0),
            link_identity: Mutex::new(Vec::new()),
        }
    }

    /// Make attach fail, simulating a bridge that lags behind the channel
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Channel the bridge is attached to, if any
    pub fn attached(&self) -> Option<LogicalChannel> {
        *self.attached.lock()
    }

    /// Whether the carrier is currently up
    pub fn carrier(&self) -> bool {
        self.carrier.load(Ordering::SeqCst)
    }

    /// Count of carrier up/down edges seen
    pub fn carrier_transitions(&self) -> usize {
        self.carrier_transitions.load(Ordering::SeqCst)
    }

    /// Link-layer address the supervisor handed over
    pub fn link_identity(&self) -> Vec<u8> {
        self.link_identity.lock().clone()
    }
}

impl Default for VirtualBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBridge for VirtualBridge {
    fn attach(&self, channel: LogicalChannel) -> Result<(), CollabError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(CollabError::NotReady);
        }

        *self.attached.lock() = Some(channel);
        debug!("virtual bridge attached to {channel}");
        Ok(())
    }

    fn release(&self) {
        *self.attached.lock() = None;
    }

    fn set_link_identity(&self, identity: &[u8]) {
        *self.link_identity.lock() = identity.to_vec();
    }

    fn carrier_on(&self) {
        if !self.carrier.swap(true, Ordering::SeqCst) {
            self.carrier_transitions.fetch_add(1, Ordering::SeqCst);
            debug!("carrier up");
        }
    }

    fn carrier_off(&self) {
        if self.carrier.swap(false, Ordering::SeqCst) {
            self.carrier_transitions.fetch_add(1, Ordering::SeqCst);
            debug!("carrier down");
        }
    }
}
