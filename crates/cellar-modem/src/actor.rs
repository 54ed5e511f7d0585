//! Supervisor task
//!
//! All state machine processing happens on this single task, keeping every
//! `Modem` field free of locking: producers only ever touch the event
//! queue. Events are dispatched strictly in arrival order, one at a time;
//! anything a handler enqueues is processed on a later iteration, never
//! reentrantly.

use tokio::sync::mpsc;
use tracing::debug;

use crate::events::ModemEvent;
use crate::machine::Modem;

/// Drive a modem until its event queue closes
pub async fn run_modem(mut modem: Modem, mut events: mpsc::Receiver<ModemEvent>) {
    while let Some(event) = events.recv().await {
        modem.handle_event(event);
    }

    debug!("event queue closed, supervisor stopping");
}
