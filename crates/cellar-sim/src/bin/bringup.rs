//! Simulated modem bring-up
//!
//! Drives a virtual modem through its full lifecycle: resume, power
//! sequencing, init script, multiplexer bring-up, dial, registration,
//! carrier-on — then queries it and suspends it back to idle.

use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cellar_modem::{AccessTechnology, IdentityKind, LifecycleState, ModemConfig, SignalKind};
use cellar_script::vendors::quectel_eg25_g;
use cellar_sim::VirtualModem;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bringup=info,cellar_modem=debug,cellar_sim=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Hardware settle times shortened so the demo finishes in seconds
    let config = ModemConfig {
        power_pulse_ms: 100,
        reset_pulse_ms: 50,
        startup_time_ms: 250,
        shutdown_time_ms: 250,
        periodic_script_ms: 500,
        ..Default::default()
    };

    let sim = VirtualModem::spawn(config, quectel_eg25_g("internet"));

    info!("resuming modem");
    sim.handle.resume();

    let mut states = sim.handle.state_watch();
    tokio::time::timeout(
        Duration::from_secs(30),
        states.wait_for(|s| *s == LifecycleState::CarrierOn),
    )
    .await??;
    info!("carrier is up");

    info!(
        imei = %sim.handle.get_identity(IdentityKind::Imei),
        model = %sim.handle.get_identity(IdentityKind::ModelId),
        manufacturer = %sim.handle.get_identity(IdentityKind::Manufacturer),
        "modem identity"
    );
    info!(
        "gsm registration: {:?}",
        sim.handle.get_registration(AccessTechnology::Gsm)
    );

    match sim.handle.get_signal(SignalKind::Rssi) {
        Ok(dbm) => info!("rssi: {dbm} dBm"),
        Err(err) => info!("rssi unavailable: {err}"),
    }

    info!("suspending modem");
    sim.handle.suspend().await?;
    info!("modem is idle, demo complete");

    Ok(())
}
