//! Lifecycle states

use std::fmt;

/// The lifecycle state of one supervised modem
///
/// Exactly one state is active at a time. Transitions run the old state's
/// leave-action before the new state's enter-action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Powered down, transport closed, all collaborators released
    #[default]
    Idle,
    /// Driving the reset line through a timed active pulse
    ResetPulse,
    /// Driving the power line through a timed active pulse
    PowerOnPulse,
    /// Waiting out the startup settle delay
    AwaitPowerOn,
    /// Running the init script over the raw transport
    RunInitScript,
    /// Bringing up the multiplexer on the reopened transport
    ConnectMux,
    /// Opening the data channel
    OpenChannel1,
    /// Opening the supervision channel
    OpenChannel2,
    /// Running the dial script on the data channel
    RunDialScript,
    /// Polling registration state until the network accepts us
    AwaitRegistered,
    /// Carrier is up; packet traffic flows over the data channel
    CarrierOn,
    /// Draining the transport before power-down
    InitPowerOff,
    /// Driving the power line through the power-off pulse
    PowerOffPulse,
    /// Waiting out the shutdown settle delay
    AwaitPowerOff,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::ResetPulse => "reset pulse",
            LifecycleState::PowerOnPulse => "power pulse",
            LifecycleState::AwaitPowerOn => "await power on",
            LifecycleState::RunInitScript => "run init script",
            LifecycleState::ConnectMux => "connect mux",
            LifecycleState::OpenChannel1 => "open channel 1",
            LifecycleState::OpenChannel2 => "open channel 2",
            LifecycleState::RunDialScript => "run dial script",
            LifecycleState::AwaitRegistered => "await registered",
            LifecycleState::CarrierOn => "carrier on",
            LifecycleState::InitPowerOff => "init power off",
            LifecycleState::PowerOffPulse => "power off pulse",
            LifecycleState::AwaitPowerOff => "await power off",
        };
        f.write_str(name)
    }
}
