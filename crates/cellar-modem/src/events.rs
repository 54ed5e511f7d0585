//! Event queue between collaborators and the supervisor
//!
//! Collaborator callbacks, timer expiries, and the suspend/resume entry
//! points all run on their own tasks; the state machine runs on exactly one.
//! The bounded queue decouples the two sides: producers enqueue without
//! blocking, and the single consumer task dispatches events one at a time.
//!
//! On overflow the event is dropped rather than blocking a producer. The
//! dominant events (timeouts, script results) are re-derived by the next
//! retry or poll cycle, so dropping is a safe degradation; the drop counter
//! keeps it observable.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Queue depth; matches the event ring the supervisor was sized for
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Events consumed by the lifecycle state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemEvent {
    /// Bring the modem up
    Resume,
    /// Take the modem down; completion is signalled when idle is reached
    Suspend,
    /// The running script completed successfully
    ScriptSuccess,
    /// The running script failed or hit an abort pattern
    ScriptFailed,
    /// The multiplexer finished connecting
    MuxConnected,
    /// The data channel finished opening
    Channel1Opened,
    /// The supervision channel finished opening
    Channel2Opened,
    /// The state timer expired
    Timeout,
    /// Registration aggregate became registered
    Registered,
    /// Registration aggregate became deregistered
    Deregistered,
    /// The serial transport finished opening
    TransportOpened,
    /// The serial transport finished closing
    TransportClosed,
}

impl fmt::Display for ModemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModemEvent::Resume => "resume",
            ModemEvent::Suspend => "suspend",
            ModemEvent::ScriptSuccess => "script success",
            ModemEvent::ScriptFailed => "script failed",
            ModemEvent::MuxConnected => "mux connected",
            ModemEvent::Channel1Opened => "channel 1 opened",
            ModemEvent::Channel2Opened => "channel 2 opened",
            ModemEvent::Timeout => "timeout",
            ModemEvent::Registered => "registered",
            ModemEvent::Deregistered => "deregistered",
            ModemEvent::TransportOpened => "transport opened",
            ModemEvent::TransportClosed => "transport closed",
        };
        f.write_str(name)
    }
}

/// Producer side of the event queue
///
/// Cloned into every collaborator and the timer. `send` never blocks; a full
/// queue drops the event and increments the shared drop counter.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ModemEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Enqueue an event for the supervisor
    pub fn send(&self, event: ModemEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("event queue full, dropped {event}");
            }
            Err(TrySendError::Closed(event)) => {
                debug!("supervisor stopped, ignoring {event}");
            }
        }
    }

    /// Number of events dropped on overflow so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Create the bounded event queue
///
/// The receiver goes to the supervisor task; the sender is cloned into the
/// producers.
pub fn event_queue() -> (EventSender, mpsc::Receiver<ModemEvent>) {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    (
        EventSender {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}
