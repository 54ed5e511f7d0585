//! Mock collaborators and a test rig for supervisor tests
//!
//! The mocks record every call so tests can assert on collaborator
//! interactions; completions are delivered manually as events, giving tests
//! full control over the order in which asynchronous outcomes arrive.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use cellar_script::vendors::quectel_bg95;

use crate::bridge::PacketBridge;
use crate::config::ModemConfig;
use crate::error::CollabError;
use crate::events::{event_queue, EventSender, ModemEvent};
use crate::machine::{Modem, ModemParts};
use crate::power::{ControlLine, PowerSequencer};
use crate::runner::{ScriptRunner, ScriptTarget};
use crate::state::LifecycleState;
use crate::status::SharedStatus;
use crate::transport::{LogicalChannel, Mux, Transport};

#[derive(Default)]
pub(crate) struct MockTransport {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_open: AtomicBool,
}

impl Transport for MockTransport {
    fn open(&self) -> Result<(), CollabError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(CollabError::NotReady);
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<(), CollabError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockMux {
    pub attaches: AtomicUsize,
    pub connects: AtomicUsize,
    pub opened_channels: Mutex<Vec<LogicalChannel>>,
    pub released_channels: Mutex<Vec<LogicalChannel>>,
    pub releases: AtomicUsize,
}

impl Mux for MockMux {
    fn attach(&self) -> Result<(), CollabError> {
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn connect(&self) -> Result<(), CollabError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_channel(&self, channel: LogicalChannel) -> Result<(), CollabError> {
        self.opened_channels.lock().push(channel);
        Ok(())
    }

    fn release_channel(&self, channel: LogicalChannel) {
        self.released_channels.lock().push(channel);
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct MockRunner {
    pub attachments: Mutex<Vec<ScriptTarget>>,
    pub runs: Mutex<Vec<String>>,
    pub releases: AtomicUsize,
}

impl ScriptRunner for MockRunner {
    fn attach(&self, target: ScriptTarget) -> Result<(), CollabError> {
        self.attachments.lock().push(target);
        Ok(())
    }

    fn run(&self, script: &cellar_script::ChatScript) -> Result<(), CollabError> {
        self.runs.lock().push(script.name.clone());
        Ok(())
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct MockBridge {
    pub attached: Mutex<Option<LogicalChannel>>,
    pub carrier: AtomicBool,
    pub link_identity: Mutex<Vec<u8>>,
    pub releases: AtomicUsize,
    pub fail_attach: AtomicBool,
}

impl PacketBridge for MockBridge {
    fn attach(&self, channel: LogicalChannel) -> Result<(), CollabError> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(CollabError::NotReady);
        }
        *self.attached.lock() = Some(channel);
        Ok(())
    }

    fn release(&self) {
        *self.attached.lock() = None;
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn set_link_identity(&self, identity: &[u8]) {
        *self.link_identity.lock() = identity.to_vec();
    }

    fn carrier_on(&self) {
        self.carrier.store(true, Ordering::SeqCst);
    }

    fn carrier_off(&self) {
        self.carrier.store(false, Ordering::SeqCst);
    }
}

pub(crate) struct MockLine(pub Arc<AtomicBool>);

impl ControlLine for MockLine {
    fn set_active(&self, active: bool) {
        self.0.store(active, Ordering::SeqCst);
    }
}

/// A modem instance wired to mocks, driven synchronously by tests
pub(crate) struct Rig {
    pub modem: Modem,
    pub rx: mpsc::Receiver<ModemEvent>,
    pub events: EventSender,
    pub status: SharedStatus,
    pub transport: Arc<MockTransport>,
    pub mux: Arc<MockMux>,
    pub runner: Arc<MockRunner>,
    pub bridge: Arc<MockBridge>,
    pub power_level: Arc<AtomicBool>,
    pub reset_level: Arc<AtomicBool>,
}

impl Rig {
    /// Build a rig with the given line wiring
    pub fn new(power: bool, reset: bool, autostart: bool) -> Self {
        let (events, rx) = event_queue();
        let status = SharedStatus::default();

        let transport = Arc::new(MockTransport::default());
        let mux = Arc::new(MockMux::default());
        let runner = Arc::new(MockRunner::default());
        let bridge = Arc::new(MockBridge::default());

        let power_level = Arc::new(AtomicBool::new(false));
        let reset_level = Arc::new(AtomicBool::new(false));

        let sequencer = PowerSequencer::new(
            power.then(|| Box::new(MockLine(power_level.clone())) as Box<dyn ControlLine>),
            reset.then(|| Box::new(MockLine(reset_level.clone())) as Box<dyn ControlLine>),
        );

        let config = ModemConfig {
            autostart,
            ..Default::default()
        };

        let modem = Modem::new(
            config,
            quectel_bg95("internet"),
            ModemParts {
                transport: transport.clone(),
                mux: mux.clone(),
                runner: runner.clone(),
                bridge: bridge.clone(),
                power: sequencer,
            },
            events.clone(),
            status.clone(),
        );

        Self {
            modem,
            rx,
            events,
            status,
            transport,
            mux,
            runner,
            bridge,
            power_level,
            reset_level,
        }
    }

    /// Feed one event, then dispatch everything it queued
    pub fn deliver(&mut self, event: ModemEvent) {
        self.modem.handle_event(event);
        self.drain();
    }

    /// Dispatch all currently queued events
    pub fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.modem.handle_event(event);
        }
    }

    /// Let paused time pass, then dispatch whatever fired
    pub async fn advance(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
        self.drain();
    }

    /// Advance through however many timed descents remain until idle
    pub async fn run_until_idle(&mut self) {
        for _ in 0..16 {
            if self.modem.state() == LifecycleState::Idle {
                return;
            }
            self.advance(Duration::from_secs(12)).await;
        }
        panic!("did not reach idle, stuck in {}", self.modem.state());
    }

    /// Perform the next step of the canonical bring-up sequence
    pub async fn step_toward_carrier(&mut self) {
        match self.modem.state() {
            LifecycleState::Idle => self.deliver(ModemEvent::Resume),
            LifecycleState::PowerOnPulse | LifecycleState::ResetPulse => {
                self.advance(Duration::from_secs(2)).await;
            }
            LifecycleState::AwaitPowerOn => self.advance(Duration::from_secs(11)).await,
            LifecycleState::RunInitScript => {
                self.deliver(ModemEvent::TransportOpened);
                self.deliver(ModemEvent::ScriptSuccess);
                self.deliver(ModemEvent::TransportClosed);
            }
            LifecycleState::ConnectMux => {
                self.advance(Duration::from_millis(200)).await;
                self.deliver(ModemEvent::TransportOpened);
                self.deliver(ModemEvent::MuxConnected);
            }
            LifecycleState::OpenChannel1 => self.deliver(ModemEvent::Channel1Opened),
            LifecycleState::OpenChannel2 => self.deliver(ModemEvent::Channel2Opened),
            LifecycleState::RunDialScript => {
                self.advance(Duration::from_millis(200)).await;
                self.deliver(ModemEvent::ScriptSuccess);
            }
            LifecycleState::AwaitRegistered => self.deliver(ModemEvent::Registered),
            state => panic!("no bring-up step from {state}"),
        }
    }

    /// Drive the canonical bring-up until `target` is the active state
    pub async fn drive_to(&mut self, target: LifecycleState) {
        for _ in 0..32 {
            if self.modem.state() == target {
                return;
            }
            self.step_toward_carrier().await;
        }
        panic!("could not reach {target}, stuck in {}", self.modem.state());
    }
}
