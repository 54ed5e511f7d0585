//! Virtual modem simulation
//!
//! Provides in-memory implementations of every collaborator the supervisor
//! drives — transport, multiplexer, script engine, packet bridge, control
//! lines — so the full lifecycle can run without hardware. Completions post
//! through the same event queue a real integration would use; the script
//! engine answers from a canned response profile and applies field matches
//! through the shared status block.
//!
//! # Example
//!
//! ```rust,no_run
//! use cellar_modem::ModemConfig;
//! use cellar_script::vendors::quectel_eg25_g;
//! use cellar_sim::VirtualModem;
//!
//! # async fn demo() {
//! let sim = VirtualModem::spawn(ModemConfig::default(), quectel_eg25_g("internet"));
//! sim.handle.resume();
//! # }
//! ```

pub mod bridge;
pub mod line;
pub mod mux;
pub mod profile;
pub mod runner;
pub mod transport;

use std::sync::Arc;

use cellar_modem::{
    event_queue, spawn_modem_with, ModemConfig, ModemHandle, ModemParts, PowerSequencer,
    SharedStatus,
};
use cellar_script::ScriptSet;

pub use bridge::VirtualBridge;
pub use line::VirtualControlLine;
pub use mux::VirtualMux;
pub use profile::ResponseProfile;
pub use runner::VirtualScriptRunner;
pub use transport::VirtualTransport;

/// A fully wired virtual modem
///
/// Bundles the supervisor handle with the simulated collaborators so tests
/// can both drive the lifecycle and inspect what the "hardware" saw.
pub struct VirtualModem {
    /// Supervisor handle
    pub handle: ModemHandle,
    /// Simulated serial transport
    pub transport: Arc<VirtualTransport>,
    /// Simulated channel multiplexer
    pub mux: Arc<VirtualMux>,
    /// Simulated script engine
    pub runner: Arc<VirtualScriptRunner>,
    /// Simulated packet bridge
    pub bridge: Arc<VirtualBridge>,
    /// Simulated power key line
    pub power_line: Arc<VirtualControlLine>,
    /// Simulated reset line
    pub reset_line: Arc<VirtualControlLine>,
}

impl VirtualModem {
    /// Wire up a virtual modem with both control lines and the default
    /// response profile, and spawn its supervisor
    pub fn spawn(config: ModemConfig, scripts: ScriptSet) -> Self {
        Self::spawn_with_profile(config, scripts, ResponseProfile::generic())
    }

    /// Same, with a custom response profile
    pub fn spawn_with_profile(
        config: ModemConfig,
        scripts: ScriptSet,
        profile: ResponseProfile,
    ) -> Self {
        let (events, events_rx) = event_queue();
        let status = SharedStatus::default();

        let transport = Arc::new(VirtualTransport::new(events.clone()));
        let mux = Arc::new(VirtualMux::new(events.clone()));
        let runner = Arc::new(VirtualScriptRunner::new(
            events.clone(),
            status.clone(),
            profile,
        ));
        let bridge = Arc::new(VirtualBridge::new());
        let power_line = Arc::new(VirtualControlLine::new("power"));
        let reset_line = Arc::new(VirtualControlLine::new("reset"));

        let parts = ModemParts {
            transport: transport.clone(),
            mux: mux.clone(),
            runner: runner.clone(),
            bridge: bridge.clone(),
            power: PowerSequencer::new(
                Some(Box::new(power_line.clone())),
                Some(Box::new(reset_line.clone())),
            ),
        };

        let handle = spawn_modem_with(config, scripts, parts, events, events_rx, status);

        Self {
            handle,
            transport,
            mux,
            runner,
            bridge,
            power_line,
            reset_line,
        }
    }
}
