//! Public surface of a supervised modem
//!
//! The handle is the only way callers interact with a running supervisor:
//! suspend/resume entry points, the typed query surface, and the
//! observability counters. Queries never block and never panic; in the wrong
//! lifecycle state they return a typed error instead.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

use cellar_script::{rsrp_to_dbm, rsrq_to_db, rssi_to_dbm, RegistrationStatus, ScriptSet};

use crate::config::ModemConfig;
use crate::error::{QueryError, SuspendError};
use crate::events::{event_queue, EventSender, ModemEvent};
use crate::machine::{Modem, ModemParts};
use crate::state::LifecycleState;
use crate::status::{AccessTechnology, IdentityKind, SharedStatus, SignalKind};

/// Bound on how long a suspend caller may be blocked if the modem never
/// reaches idle
const SUSPEND_DEADLINE: Duration = Duration::from_secs(30);

/// Handle to a running modem supervisor
#[derive(Debug, Clone)]
pub struct ModemHandle {
    events: EventSender,
    status: SharedStatus,
    state_rx: watch::Receiver<LifecycleState>,
    suspended_rx: watch::Receiver<bool>,
}

/// Build a modem from its parts and spawn its supervisor task
pub fn spawn_modem(config: ModemConfig, scripts: ScriptSet, parts: ModemParts) -> ModemHandle {
    let (events, events_rx) = event_queue();
    let status = SharedStatus::default();
    spawn_modem_with(config, scripts, parts, events, events_rx, status)
}

/// Spawn a supervisor over an externally created event queue and status
/// block; collaborators that were built around clones of the same sender and
/// status keep working unchanged
pub fn spawn_modem_with(
    config: ModemConfig,
    scripts: ScriptSet,
    parts: ModemParts,
    events: EventSender,
    events_rx: tokio::sync::mpsc::Receiver<ModemEvent>,
    status: SharedStatus,
) -> ModemHandle {
    let modem = Modem::new(config, scripts, parts, events.clone(), status.clone());
    let state_rx = modem.state_watch();
    let suspended_rx = modem.suspended_watch();

    tokio::spawn(crate::actor::run_modem(modem, events_rx));

    ModemHandle {
        events,
        status,
        state_rx,
        suspended_rx,
    }
}

impl ModemHandle {
    /// Request bring-up
    pub fn resume(&self) {
        self.events.send(ModemEvent::Resume);
    }

    /// Request power-down and wait for the modem to reach idle.
    ///
    /// Completion is signalled by idle's enter-action exactly once per
    /// power-down cycle; the wait is bounded so a caller is never blocked
    /// indefinitely by a wedged modem.
    pub async fn suspend(&self) -> Result<(), SuspendError> {
        self.events.send(ModemEvent::Suspend);

        let mut suspended = self.suspended_rx.clone();
        timeout(SUSPEND_DEADLINE, suspended.wait_for(|done| *done))
            .await
            .map_err(|_| SuspendError::Timeout)?
            .map_err(|_| SuspendError::Stopped)?;

        Ok(())
    }

    /// The currently active lifecycle state
    pub fn state(&self) -> LifecycleState {
        *self.state_rx.borrow()
    }

    /// Observe lifecycle state transitions
    pub fn state_watch(&self) -> watch::Receiver<LifecycleState> {
        self.state_rx.clone()
    }

    /// Decode the last sampled signal metric.
    ///
    /// Only meaningful while the modem polls the network, so any state other
    /// than await-registered or carrier-on reports `NoData`; a stored
    /// "unknown" sentinel reports `OutOfRange`.
    pub fn get_signal(&self, kind: SignalKind) -> Result<i16, QueryError> {
        if !matches!(
            self.state(),
            LifecycleState::AwaitRegistered | LifecycleState::CarrierOn
        ) {
            return Err(QueryError::NoData);
        }

        let raw = self.status.lock().signal_raw(kind);
        let value = match kind {
            SignalKind::Rssi => rssi_to_dbm(raw)?,
            SignalKind::Rsrp => rsrp_to_dbm(raw)?,
            SignalKind::Rsrq => rsrq_to_db(raw)?,
        };

        Ok(value)
    }

    /// One identity field; empty until the init script has populated it
    pub fn get_identity(&self, kind: IdentityKind) -> String {
        self.status.lock().identity(kind).to_string()
    }

    /// Registration state for one access technology
    pub fn get_registration(&self, tech: AccessTechnology) -> RegistrationStatus {
        self.status.lock().registration(tech)
    }

    /// Whether any tracked technology is registered home or roaming
    pub fn is_registered(&self) -> bool {
        self.status.lock().is_registered()
    }

    /// Events dropped on queue overflow so far
    pub fn dropped_events(&self) -> u64 {
        self.events.dropped()
    }

    /// Malformed field updates skipped by the decoders so far
    pub fn skipped_fields(&self) -> u64 {
        self.status.lock().skipped_fields
    }

    /// Producer-side sender, for wiring further collaborators
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }
}
