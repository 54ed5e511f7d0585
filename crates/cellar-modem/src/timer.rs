//! State timer
//!
//! One reusable countdown per modem, rearmed by the state machine for pulse
//! durations, settle delays, and the periodic poll interval. Expiry posts
//! `ModemEvent::Timeout` through the event queue. Because the timer context
//! is shared, every state that arms it and transitions away must stop it in
//! its leave-action; a stale expiry would otherwise be delivered to the new
//! state.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::events::{EventSender, ModemEvent};

/// Reusable countdown posting `Timeout` on expiry
#[derive(Debug)]
pub struct StateTimer {
    events: EventSender,
    pending: Option<JoinHandle<()>>,
}

impl StateTimer {
    /// Create a disarmed timer
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            pending: None,
        }
    }

    /// Arm the timer, replacing any pending expiry
    pub fn start(&mut self, duration: Duration) {
        self.stop();

        let events = self.events.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            events.send(ModemEvent::Timeout);
        }));
    }

    /// Disarm the timer; a not-yet-fired expiry is cancelled
    pub fn stop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// Whether an expiry is still pending
    pub fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl Drop for StateTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_queue;

    #[tokio::test(start_paused = true)]
    async fn expiry_posts_timeout() {
        let (tx, mut rx) = event_queue();
        let mut timer = StateTimer::new(tx);

        timer.start(Duration::from_millis(100));
        assert!(timer.is_armed());

        assert_eq!(rx.recv().await, Some(ModemEvent::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_expiry() {
        let (tx, mut rx) = event_queue();
        let mut timer = StateTimer::new(tx);

        timer.start(Duration::from_millis(100));
        timer.stop();
        assert!(!timer.is_armed());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_pending_expiry() {
        let (tx, mut rx) = event_queue();
        let mut timer = StateTimer::new(tx);

        timer.start(Duration::from_secs(60));
        timer.start(Duration::from_millis(10));

        assert_eq!(rx.recv().await, Some(ModemEvent::Timeout));
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err(), "replaced expiry must not fire");
    }
}
