//! Supervisor configuration

use serde::{Deserialize, Serialize};

/// Per-board timing and wiring configuration
///
/// Pulse and settle durations come from the modem's datasheet; the defaults
/// suit the supported Quectel and SimCom parts. `autostart` marks modems
/// that power up on their own once supply voltage is present, skipping the
/// power-on pulse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    /// Power key pulse duration in milliseconds
    pub power_pulse_ms: u64,
    /// Reset line pulse duration in milliseconds
    pub reset_pulse_ms: u64,
    /// Settle delay after power-on before the modem answers, in milliseconds
    pub startup_time_ms: u64,
    /// Settle delay after the power-off pulse, in milliseconds
    pub shutdown_time_ms: u64,
    /// Whether the modem boots without a power-on pulse
    pub autostart: bool,
    /// Interval between periodic status script runs, in milliseconds
    pub periodic_script_ms: u64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            power_pulse_ms: 1500,
            reset_pulse_ms: 100,
            startup_time_ms: 10_000,
            shutdown_time_ms: 5_000,
            autostart: false,
            periodic_script_ms: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: ModemConfig = serde_json::from_str(r#"{ "autostart": true }"#).unwrap();
        assert!(config.autostart);
        assert_eq!(config.power_pulse_ms, 1500);
        assert_eq!(config.periodic_script_ms, 2_000);
    }

    #[test]
    fn round_trips_through_json() {
        let config = ModemConfig {
            startup_time_ms: 2_500,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ModemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.startup_time_ms, 2_500);
    }
}
