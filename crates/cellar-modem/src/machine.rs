//! Lifecycle state machine
//!
//! The root orchestrator for one supervised modem. Events arrive one at a
//! time from the dispatcher task; each is routed to the handler for the
//! current state, which may start collaborator operations and transition.
//! A transition runs the old state's leave-action (stop timers, release
//! collaborators, deactivate lines) before the new state's enter-action
//! (start timers, request opens, run scripts, drive lines).
//!
//! Protocol-level failures never surface to a caller: script and connect
//! failures are absorbed by the fallback transitions, and a failed
//! enter-action is logged while the state variable stays committed — the
//! next timeout or suspend moves the machine on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use cellar_script::ScriptSet;

use crate::bridge::PacketBridge;
use crate::config::ModemConfig;
use crate::error::CollabError;
use crate::events::{EventSender, ModemEvent};
use crate::power::PowerSequencer;
use crate::runner::{ScriptRunner, ScriptTarget};
use crate::state::LifecycleState;
use crate::status::SharedStatus;
use crate::timer::StateTimer;
use crate::transport::{LogicalChannel, Mux, Transport};

/// Grace period for the modem's internal switch into multiplexed mode.
/// Some modems disable their receiver while switching, so the transport is
/// reopened only after the switch has settled.
const MUX_SWITCH_GRACE: Duration = Duration::from_millis(100);

/// Settle delay before the dial script, letting the channel reach command mode
const COMMAND_MODE_SETTLE: Duration = Duration::from_millis(100);

/// Drain period for the transport ahead of the power-off pulse
const TRANSPORT_DRAIN_SETTLE: Duration = Duration::from_millis(2000);

/// Collaborators wired into one supervised modem
pub struct ModemParts {
    /// Serial transport the modem is attached over
    pub transport: Arc<dyn Transport>,
    /// Channel multiplexer running over the transport
    pub mux: Arc<dyn Mux>,
    /// Chat script engine
    pub runner: Arc<dyn ScriptRunner>,
    /// Network-layer bridge over the data channel
    pub bridge: Arc<dyn PacketBridge>,
    /// Optional power and reset control lines
    pub power: PowerSequencer,
}

/// One supervised modem instance
///
/// Created at attach time and alive for the process lifetime. Everything in
/// here is mutated only from the dispatcher task's call stack; the event
/// queue is the only concurrently touched structure.
pub struct Modem {
    config: ModemConfig,
    scripts: ScriptSet,
    state: LifecycleState,
    timer: StateTimer,
    power: PowerSequencer,
    transport: Arc<dyn Transport>,
    mux: Arc<dyn Mux>,
    runner: Arc<dyn ScriptRunner>,
    bridge: Arc<dyn PacketBridge>,
    status: SharedStatus,
    state_tx: watch::Sender<LifecycleState>,
    suspended_tx: watch::Sender<bool>,
}

impl Modem {
    /// Build a modem instance starting in idle
    pub fn new(
        config: ModemConfig,
        scripts: ScriptSet,
        parts: ModemParts,
        events: EventSender,
        status: SharedStatus,
    ) -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Idle);
        let (suspended_tx, _) = watch::channel(false);

        Self {
            config,
            scripts,
            state: LifecycleState::Idle,
            timer: StateTimer::new(events),
            power: parts.power,
            transport: parts.transport,
            mux: parts.mux,
            runner: parts.runner,
            bridge: parts.bridge,
            status,
            state_tx,
            suspended_tx,
        }
    }

    /// The currently active lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Observe lifecycle state transitions
    pub fn state_watch(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    /// Observe the suspend-completion signal raised when idle is reached
    pub fn suspended_watch(&self) -> watch::Receiver<bool> {
        self.suspended_tx.subscribe()
    }

    fn periodic_interval(&self) -> Duration {
        Duration::from_millis(self.config.periodic_script_ms)
    }

    /// Feed one event into the state machine
    pub fn handle_event(&mut self, event: ModemEvent) {
        let previous = self.state;
        debug!("event {event}");

        match self.state {
            LifecycleState::Idle => self.idle_event(event),
            LifecycleState::ResetPulse => self.reset_pulse_event(event),
            LifecycleState::PowerOnPulse => self.power_on_pulse_event(event),
            LifecycleState::AwaitPowerOn => self.await_power_on_event(event),
            LifecycleState::RunInitScript => self.run_init_script_event(event),
            LifecycleState::ConnectMux => self.connect_mux_event(event),
            LifecycleState::OpenChannel1 => self.open_channel1_event(event),
            LifecycleState::OpenChannel2 => self.open_channel2_event(event),
            LifecycleState::RunDialScript => self.run_dial_script_event(event),
            LifecycleState::AwaitRegistered => self.await_registered_event(event),
            LifecycleState::CarrierOn => self.carrier_on_event(event),
            LifecycleState::InitPowerOff => self.init_power_off_event(event),
            LifecycleState::PowerOffPulse => self.power_off_pulse_event(event),
            LifecycleState::AwaitPowerOff => self.await_power_off_event(event),
        }

        if previous != self.state {
            debug!("switch from {previous} to {}", self.state);
        }
    }

    fn enter_state(&mut self, state: LifecycleState) {
        if let Err(err) = self.on_state_leave() {
            warn!("failed to leave {}: {err}", self.state);
            return;
        }

        self.state = state;
        self.state_tx.send_replace(state);

        if let Err(err) = self.on_state_enter() {
            // The state stays committed even though the enter-action's side
            // effects did not occur; the next timeout or suspend moves on.
            warn!("failed to enter {state}: {err}");
        }
    }

    fn on_state_enter(&mut self) -> Result<(), CollabError> {
        match self.state {
            LifecycleState::Idle => self.enter_idle(),
            LifecycleState::ResetPulse => {
                self.power.set_reset(true);
                self.timer
                    .start(Duration::from_millis(self.config.reset_pulse_ms));
                Ok(())
            }
            LifecycleState::PowerOnPulse => {
                self.power.set_power(true);
                self.timer
                    .start(Duration::from_millis(self.config.power_pulse_ms));
                Ok(())
            }
            LifecycleState::AwaitPowerOn => {
                self.timer
                    .start(Duration::from_millis(self.config.startup_time_ms));
                Ok(())
            }
            LifecycleState::RunInitScript => self.transport.open(),
            LifecycleState::ConnectMux => {
                self.timer.start(MUX_SWITCH_GRACE);
                Ok(())
            }
            LifecycleState::OpenChannel1 => self.mux.open_channel(LogicalChannel::Channel1),
            LifecycleState::OpenChannel2 => self.mux.open_channel(LogicalChannel::Channel2),
            LifecycleState::RunDialScript => {
                self.timer.start(COMMAND_MODE_SETTLE);
                Ok(())
            }
            LifecycleState::AwaitRegistered => self.enter_await_registered(),
            LifecycleState::CarrierOn => {
                self.bridge.carrier_on();
                self.timer.start(self.periodic_interval());
                Ok(())
            }
            LifecycleState::InitPowerOff => {
                let _ = self.transport.close();
                self.timer.start(TRANSPORT_DRAIN_SETTLE);
                Ok(())
            }
            LifecycleState::PowerOffPulse => {
                self.power.set_power(true);
                self.timer
                    .start(Duration::from_millis(self.config.power_pulse_ms));
                Ok(())
            }
            LifecycleState::AwaitPowerOff => {
                self.timer
                    .start(Duration::from_millis(self.config.shutdown_time_ms));
                Ok(())
            }
        }
    }

    fn on_state_leave(&mut self) -> Result<(), CollabError> {
        match self.state {
            LifecycleState::Idle => {
                self.suspended_tx.send_replace(false);
                self.power.set_reset(false);
                Ok(())
            }
            LifecycleState::ResetPulse => {
                self.power.set_reset(false);
                self.timer.stop();
                Ok(())
            }
            LifecycleState::PowerOnPulse => {
                self.power.set_power(false);
                self.timer.stop();
                Ok(())
            }
            LifecycleState::OpenChannel1 => {
                self.mux.release_channel(LogicalChannel::Channel1);
                Ok(())
            }
            LifecycleState::OpenChannel2 => {
                self.mux.release_channel(LogicalChannel::Channel2);
                Ok(())
            }
            LifecycleState::RunDialScript => {
                self.runner.release();
                Ok(())
            }
            LifecycleState::AwaitRegistered => {
                self.timer.stop();
                Ok(())
            }
            LifecycleState::CarrierOn => {
                self.timer.stop();
                self.bridge.carrier_off();
                self.runner.release();
                self.bridge.release();
                Ok(())
            }
            LifecycleState::InitPowerOff => {
                self.runner.release();
                self.bridge.release();
                Ok(())
            }
            LifecycleState::PowerOffPulse => {
                self.power.set_power(false);
                self.timer.stop();
                Ok(())
            }
            LifecycleState::AwaitPowerOn
            | LifecycleState::RunInitScript
            | LifecycleState::ConnectMux
            | LifecycleState::AwaitPowerOff => Ok(()),
        }
    }

    fn enter_idle(&mut self) -> Result<(), CollabError> {
        self.power.set_reset(true);
        self.runner.release();
        self.bridge.release();
        self.mux.release();
        let _ = self.transport.close();
        self.suspended_tx.send_replace(true);
        Ok(())
    }

    fn enter_await_registered(&mut self) -> Result<(), CollabError> {
        // The bridge may lag behind the channel; bring-up continues either way
        if let Err(err) = self.bridge.attach(LogicalChannel::Channel1) {
            warn!("packet bridge not ready: {err}");
        }

        self.timer.start(self.periodic_interval());
        self.runner
            .attach(ScriptTarget::Channel(LogicalChannel::Channel2))
    }

    fn idle_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Resume => {
                if self.config.autostart {
                    self.enter_state(LifecycleState::AwaitPowerOn);
                } else if self.power.has_power() {
                    self.enter_state(LifecycleState::PowerOnPulse);
                } else if self.power.has_reset() {
                    self.enter_state(LifecycleState::AwaitPowerOn);
                } else {
                    self.enter_state(LifecycleState::RunInitScript);
                }
            }
            ModemEvent::Suspend => {
                self.suspended_tx.send_replace(true);
            }
            _ => {}
        }
    }

    fn reset_pulse_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Timeout => self.enter_state(LifecycleState::AwaitPowerOn),
            ModemEvent::Suspend => self.enter_state(LifecycleState::Idle),
            _ => {}
        }
    }

    fn power_on_pulse_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Timeout => self.enter_state(LifecycleState::AwaitPowerOn),
            ModemEvent::Suspend => self.enter_state(LifecycleState::Idle),
            _ => {}
        }
    }

    fn await_power_on_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Timeout => self.enter_state(LifecycleState::RunInitScript),
            ModemEvent::Suspend => self.enter_state(LifecycleState::Idle),
            _ => {}
        }
    }

    fn run_init_script_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::TransportOpened => {
                if let Err(err) = self.runner.attach(ScriptTarget::Transport) {
                    warn!("script engine attach failed: {err}");
                }
                if let Err(err) = self.runner.run(&self.scripts.init) {
                    warn!("init script start failed: {err}");
                }
            }
            ModemEvent::ScriptSuccess => {
                let identity = self.status.lock().imei.clone();
                self.bridge.set_link_identity(identity.as_bytes());
                self.runner.release();
                let _ = self.transport.close();
            }
            ModemEvent::TransportClosed => self.enter_state(LifecycleState::ConnectMux),
            ModemEvent::ScriptFailed => {
                if self.power.has_power() {
                    self.enter_state(LifecycleState::PowerOnPulse);
                } else if self.power.has_reset() {
                    self.enter_state(LifecycleState::ResetPulse);
                } else {
                    self.enter_state(LifecycleState::Idle);
                }
            }
            ModemEvent::Suspend => self.enter_state(LifecycleState::Idle),
            _ => {}
        }
    }

    fn connect_mux_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Timeout => {
                if let Err(err) = self.transport.open() {
                    warn!("transport reopen failed: {err}");
                }
            }
            ModemEvent::TransportOpened => {
                if let Err(err) = self.mux.attach() {
                    warn!("mux attach failed: {err}");
                }
                if let Err(err) = self.mux.connect() {
                    warn!("mux connect failed: {err}");
                }
            }
            ModemEvent::MuxConnected => self.enter_state(LifecycleState::OpenChannel1),
            ModemEvent::Suspend => self.enter_state(LifecycleState::InitPowerOff),
            _ => {}
        }
    }

    fn open_channel1_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Channel1Opened => self.enter_state(LifecycleState::OpenChannel2),
            ModemEvent::Suspend => self.enter_state(LifecycleState::InitPowerOff),
            _ => {}
        }
    }

    fn open_channel2_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Channel2Opened => self.enter_state(LifecycleState::RunDialScript),
            ModemEvent::Suspend => self.enter_state(LifecycleState::InitPowerOff),
            _ => {}
        }
    }

    fn run_dial_script_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::Timeout => {
                if let Err(err) = self
                    .runner
                    .attach(ScriptTarget::Channel(LogicalChannel::Channel1))
                {
                    warn!("script engine attach failed: {err}");
                }
                if let Err(err) = self.runner.run(&self.scripts.dial) {
                    warn!("dial script start failed: {err}");
                }
            }
            ModemEvent::ScriptSuccess => self.enter_state(LifecycleState::AwaitRegistered),
            ModemEvent::Suspend => self.enter_state(LifecycleState::InitPowerOff),
            _ => {}
        }
    }

    fn await_registered_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::ScriptSuccess | ModemEvent::ScriptFailed => {
                self.timer.start(self.periodic_interval());
            }
            ModemEvent::Timeout => {
                if let Err(err) = self.runner.run(&self.scripts.periodic) {
                    warn!("periodic script start failed: {err}");
                }
            }
            ModemEvent::Registered => self.enter_state(LifecycleState::CarrierOn),
            ModemEvent::Suspend => self.enter_state(LifecycleState::InitPowerOff),
            _ => {}
        }
    }

    fn carrier_on_event(&mut self, event: ModemEvent) {
        match event {
            ModemEvent::ScriptSuccess | ModemEvent::ScriptFailed => {
                self.timer.start(self.periodic_interval());
            }
            ModemEvent::Timeout => {
                if let Err(err) = self.runner.run(&self.scripts.periodic) {
                    warn!("periodic script start failed: {err}");
                }
            }
            ModemEvent::Deregistered => self.enter_state(LifecycleState::RunDialScript),
            ModemEvent::Suspend => self.enter_state(LifecycleState::InitPowerOff),
            _ => {}
        }
    }

    fn init_power_off_event(&mut self, event: ModemEvent) {
        if event == ModemEvent::Timeout {
            if self.power.has_power() {
                self.enter_state(LifecycleState::PowerOffPulse);
            } else {
                self.enter_state(LifecycleState::Idle);
            }
        }
    }

    fn power_off_pulse_event(&mut self, event: ModemEvent) {
        if event == ModemEvent::Timeout {
            self.enter_state(LifecycleState::AwaitPowerOff);
        }
    }

    fn await_power_off_event(&mut self, event: ModemEvent) {
        if event == ModemEvent::Timeout {
            self.enter_state(LifecycleState::Idle);
        }
    }

    #[cfg(test)]
    pub(crate) fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Rig;
    use std::sync::atomic::Ordering;

    use LifecycleState as S;
    use ModemEvent as E;

    #[tokio::test(start_paused = true)]
    async fn resume_pulses_power_line_when_wired() {
        let mut rig = Rig::new(true, true, false);

        rig.deliver(E::Resume);

        assert_eq!(rig.modem.state(), S::PowerOnPulse);
        assert!(rig.power_level.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_with_autostart_skips_the_pulse() {
        let mut rig = Rig::new(true, true, true);

        rig.deliver(E::Resume);

        assert_eq!(rig.modem.state(), S::AwaitPowerOn);
        assert!(!rig.power_level.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_with_reset_line_only_waits_for_power_on() {
        let mut rig = Rig::new(false, true, false);

        rig.deliver(E::Resume);

        assert_eq!(rig.modem.state(), S::AwaitPowerOn);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_without_lines_runs_init_script_directly() {
        let mut rig = Rig::new(false, false, false);

        rig.deliver(E::Resume);

        assert_eq!(rig.modem.state(), S::RunInitScript);
        assert_eq!(rig.transport.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn external_resume_entry_point_feeds_the_queue() {
        let mut rig = Rig::new(false, false, false);

        rig.events.send(E::Resume);
        rig.drain();

        assert_eq!(rig.modem.state(), S::RunInitScript);
    }

    #[tokio::test(start_paused = true)]
    async fn init_failure_falls_back_to_power_pulse() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::RunInitScript).await;

        rig.deliver(E::TransportOpened);
        rig.deliver(E::ScriptFailed);

        assert_eq!(rig.modem.state(), S::PowerOnPulse);
    }

    #[tokio::test(start_paused = true)]
    async fn init_failure_falls_back_to_reset_pulse_without_power_line() {
        let mut rig = Rig::new(false, true, false);
        rig.drive_to(S::RunInitScript).await;

        rig.deliver(E::TransportOpened);
        rig.deliver(E::ScriptFailed);

        assert_eq!(rig.modem.state(), S::ResetPulse);
        assert!(rig.reset_level.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn init_failure_without_lines_gives_up_to_idle() {
        let mut rig = Rig::new(false, false, false);
        rig.drive_to(S::RunInitScript).await;

        rig.deliver(E::TransportOpened);
        rig.deliver(E::ScriptFailed);

        assert_eq!(rig.modem.state(), S::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn full_bring_up_reaches_carrier_on() {
        let mut rig = Rig::new(true, true, false);

        rig.deliver(E::Resume);
        assert_eq!(rig.modem.state(), S::PowerOnPulse);

        rig.advance(Duration::from_secs(2)).await;
        assert_eq!(rig.modem.state(), S::AwaitPowerOn);

        rig.advance(Duration::from_secs(11)).await;
        assert_eq!(rig.modem.state(), S::RunInitScript);
        assert_eq!(rig.transport.opens.load(Ordering::SeqCst), 1);

        rig.deliver(E::TransportOpened);
        assert_eq!(rig.runner.runs.lock().clone(), vec!["init"]);
        assert_eq!(
            rig.runner.attachments.lock().last(),
            Some(&crate::runner::ScriptTarget::Transport)
        );

        rig.status.lock().imei = "490154203237518".into();
        rig.deliver(E::ScriptSuccess);
        assert_eq!(
            rig.bridge.link_identity.lock().clone(),
            b"490154203237518".to_vec()
        );

        rig.deliver(E::TransportClosed);
        assert_eq!(rig.modem.state(), S::ConnectMux);

        rig.advance(Duration::from_millis(200)).await;
        assert_eq!(rig.transport.opens.load(Ordering::SeqCst), 2);

        rig.deliver(E::TransportOpened);
        assert_eq!(rig.mux.attaches.load(Ordering::SeqCst), 1);
        assert_eq!(rig.mux.connects.load(Ordering::SeqCst), 1);

        rig.deliver(E::MuxConnected);
        assert_eq!(rig.modem.state(), S::OpenChannel1);
        assert_eq!(
            rig.mux.opened_channels.lock().clone(),
            vec![LogicalChannel::Channel1]
        );

        rig.deliver(E::Channel1Opened);
        assert_eq!(rig.modem.state(), S::OpenChannel2);
        assert_eq!(
            rig.mux.released_channels.lock().clone(),
            vec![LogicalChannel::Channel1]
        );

        rig.deliver(E::Channel2Opened);
        assert_eq!(rig.modem.state(), S::RunDialScript);

        rig.advance(Duration::from_millis(200)).await;
        assert_eq!(rig.runner.runs.lock().clone(), vec!["init", "dial"]);

        rig.deliver(E::ScriptSuccess);
        assert_eq!(rig.modem.state(), S::AwaitRegistered);
        assert_eq!(*rig.bridge.attached.lock(), Some(LogicalChannel::Channel1));

        rig.deliver(E::Registered);
        assert_eq!(rig.modem.state(), S::CarrierOn);
        assert!(rig.bridge.carrier.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn suspend_from_every_bring_up_state_reaches_idle() {
        let targets = [
            S::PowerOnPulse,
            S::AwaitPowerOn,
            S::RunInitScript,
            S::ConnectMux,
            S::OpenChannel1,
            S::OpenChannel2,
            S::RunDialScript,
            S::AwaitRegistered,
            S::CarrierOn,
        ];

        for target in targets {
            let mut rig = Rig::new(true, true, false);
            rig.drive_to(target).await;

            let suspended = rig.modem.suspended_watch();
            assert!(!*suspended.borrow(), "not suspended while in {target}");

            rig.deliver(E::Suspend);
            rig.run_until_idle().await;

            assert_eq!(rig.modem.state(), S::Idle, "from {target}");
            assert!(*suspended.borrow(), "completion missing from {target}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn suspend_while_idle_signals_completion_immediately() {
        let mut rig = Rig::new(true, true, false);
        let suspended = rig.modem.suspended_watch();

        rig.deliver(E::Suspend);

        assert_eq!(rig.modem.state(), S::Idle);
        assert!(*suspended.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn suspend_during_dial_runs_no_further_scripts() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::RunDialScript).await;

        rig.deliver(E::Suspend);
        assert_eq!(rig.modem.state(), S::InitPowerOff);

        rig.advance(Duration::from_secs(3)).await;
        assert_eq!(rig.modem.state(), S::PowerOffPulse);
        assert!(rig.power_level.load(Ordering::SeqCst));

        rig.advance(Duration::from_secs(2)).await;
        assert_eq!(rig.modem.state(), S::AwaitPowerOff);
        assert!(!rig.power_level.load(Ordering::SeqCst));

        rig.advance(Duration::from_secs(6)).await;
        assert_eq!(rig.modem.state(), S::Idle);

        // The dial settle timer never fired before suspend, so only the init
        // script ever ran
        assert_eq!(rig.runner.runs.lock().clone(), vec!["init"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_cannot_fire_into_the_next_state() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::PowerOnPulse).await;
        assert!(rig.modem.timer_armed());

        rig.deliver(E::Suspend);
        assert_eq!(rig.modem.state(), S::Idle);
        assert!(!rig.modem.timer_armed());

        // Let the original pulse duration elapse; the cancelled expiry must
        // not deliver a timeout that would fake a pulse completion
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rig.rx.try_recv().is_err());
        assert_eq!(rig.modem.state(), S::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_enter_action_still_commits_the_state() {
        let mut rig = Rig::new(false, false, false);
        rig.transport.fail_open.store(true, Ordering::SeqCst);

        rig.deliver(E::Resume);

        // The transport open failed, yet the machine reports the new state;
        // suspend still gets us out
        assert_eq!(rig.modem.state(), S::RunInitScript);
        assert_eq!(rig.transport.opens.load(Ordering::SeqCst), 0);

        rig.deliver(E::Suspend);
        assert_eq!(rig.modem.state(), S::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn deregistration_during_carrier_triggers_redial() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::CarrierOn).await;
        assert!(rig.bridge.carrier.load(Ordering::SeqCst));

        rig.deliver(E::Deregistered);

        assert_eq!(rig.modem.state(), S::RunDialScript);
        assert!(!rig.bridge.carrier.load(Ordering::SeqCst));
        assert!(rig.bridge.releases.load(Ordering::SeqCst) >= 1);

        rig.advance(Duration::from_millis(200)).await;
        assert_eq!(
            rig.runner.runs.lock().clone(),
            vec!["init", "dial", "dial"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_poll_cycle_rearms_after_script_results() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::CarrierOn).await;

        rig.advance(Duration::from_secs(3)).await;
        assert_eq!(
            rig.runner.runs.lock().clone(),
            vec!["init", "dial", "periodic"]
        );

        rig.deliver(E::ScriptFailed);
        assert!(rig.modem.timer_armed(), "script result must rearm the poll");

        rig.advance(Duration::from_secs(3)).await;
        assert_eq!(
            rig.runner.runs.lock().clone(),
            vec!["init", "dial", "periodic", "periodic"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resume_outside_idle_is_ignored() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::CarrierOn).await;

        rig.deliver(E::Resume);

        assert_eq!(rig.modem.state(), S::CarrierOn);
    }

    #[tokio::test(start_paused = true)]
    async fn bridge_attach_failure_does_not_stall_bring_up() {
        let mut rig = Rig::new(true, true, false);
        rig.bridge.fail_attach.store(true, Ordering::SeqCst);
        rig.drive_to(S::AwaitRegistered).await;

        assert_eq!(*rig.bridge.attached.lock(), None);
        assert!(rig.modem.timer_armed(), "poll timer must still be armed");

        rig.deliver(E::Registered);
        assert_eq!(rig.modem.state(), S::CarrierOn);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_releases_collaborators_and_closes_transport() {
        let mut rig = Rig::new(true, true, false);
        rig.drive_to(S::CarrierOn).await;

        let closes_before = rig.transport.closes.load(Ordering::SeqCst);
        rig.deliver(E::Suspend);
        rig.run_until_idle().await;

        assert!(rig.transport.closes.load(Ordering::SeqCst) > closes_before);
        assert!(rig.mux.releases.load(Ordering::SeqCst) >= 1);
        assert!(rig.runner.releases.load(Ordering::SeqCst) >= 1);
        assert!(rig.reset_level.load(Ordering::SeqCst), "reset held in idle");
    }
}
