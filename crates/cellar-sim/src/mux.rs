//! Virtual channel multiplexer

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use cellar_modem::{CollabError, EventSender, LogicalChannel, ModemEvent, Mux};

/// In-memory multiplexer that connects and opens channels immediately
pub struct VirtualMux {
    events: EventSender,
    attached: AtomicBool,
    connected: AtomicBool,
    open_channels: Mutex<Vec<LogicalChannel>>,
}

impl VirtualMux {
    /// Create a detached multiplexer
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            attached: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            open_channels: Mutex::new(Vec::new()),
        }
    }

    /// Whether the multiplexer handshake has completed
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Channels currently open
    pub fn open_channels(&self) -> Vec<LogicalChannel> {
        self.open_channels.lock().clone()
    }
}

impl Mux for VirtualMux {
    fn attach(&self) -> Result<(), CollabError> {
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn connect(&self) -> Result<(), CollabError> {
        if !self.attached.load(Ordering::SeqCst) {
            return Err(CollabError::NotAttached);
        }

        self.connected.store(true, Ordering::SeqCst);
        debug!("virtual mux connected");
        self.events.send(ModemEvent::MuxConnected);
        Ok(())
    }

    fn open_channel(&self, channel: LogicalChannel) -> Result<(), CollabError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(CollabError::NotReady);
        }

        let mut open = self.open_channels.lock();
        if !open.contains(&channel) {
            open.push(channel);
        }
        drop(open);

        debug!("virtual mux opened {channel}");
        self.events.send(match channel {
            LogicalChannel::Channel1 => ModemEvent::Channel1Opened,
            LogicalChannel::Channel2 => ModemEvent::Channel2Opened,
        });
        Ok(())
    }

    fn release_channel(&self, channel: LogicalChannel) {
        debug!("virtual mux released observer for {channel}");
    }

    fn release(&self) {
        self.attached.store(false, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        self.open_channels.lock().clear();
        debug!("virtual mux released");
    }
}
