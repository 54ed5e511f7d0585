//! Virtual serial transport

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::debug;

use cellar_modem::{CollabError, EventSender, ModemEvent, Transport};

/// In-memory transport that completes open/close immediately
///
/// Completions post through the event queue exactly like a real transport
/// driver's callbacks would, just without the latency.
pub struct VirtualTransport {
    events: EventSender,
    open: AtomicBool,
    opens: AtomicUsize,
    fail_open: AtomicBool,
}

impl VirtualTransport {
    /// Create a closed transport
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            open: AtomicBool::new(false),
            opens: AtomicUsize::new(0),
            fail_open: AtomicBool::new(false),
        }
    }

    /// Whether the transport is currently open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// How many times the transport has been opened
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Make subsequent opens fail, simulating a wedged serial device
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }
}

impl Transport for VirtualTransport {
    fn open(&self) -> Result<(), CollabError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(CollabError::NotReady);
        }

        self.open.store(true, Ordering::SeqCst);
        self.opens.fetch_add(1, Ordering::SeqCst);
        debug!("virtual transport opened");
        self.events.send(ModemEvent::TransportOpened);
        Ok(())
    }

    fn close(&self) -> Result<(), CollabError> {
        if self.open.swap(false, Ordering::SeqCst) {
            debug!("virtual transport closed");
            self.events.send(ModemEvent::TransportClosed);
        }
        Ok(())
    }
}
