//! Modem status block
//!
//! Registration, signal, and identity state shared between the script
//! engine's field callbacks (writers) and the upward query surface
//! (readers). Raw signal codes are stored as sampled and decoded on demand,
//! so the hardware "unknown" sentinels survive until a query needs the
//! value.

use std::sync::Arc;

use parking_lot::Mutex;

use cellar_script::decode::{
    FW_VERSION_MAX_LEN, ICCID_MAX_LEN, IMEI_MAX_LEN, IMSI_MAX_LEN, MANUFACTURER_MAX_LEN,
    MODEL_ID_MAX_LEN,
};
use cellar_script::{
    bounded_field, FieldHandler, RegistrationStatus, RSRP_UNKNOWN, RSRQ_UNKNOWN, RSSI_UNKNOWN,
};

use crate::events::{EventSender, ModemEvent};

/// Radio access technology selector for registration queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTechnology {
    /// GSM circuit-switched
    Gsm,
    /// GPRS packet-switched
    Gprs,
    /// UMTS
    Umts,
    /// EDGE
    Edge,
    /// LTE
    Lte,
    /// LTE Cat M1
    LteCatM1,
    /// LTE Cat M2
    LteCatM2,
    /// NB-IoT
    NbIot,
}

/// Signal metric selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Received signal strength (+CSQ)
    Rssi,
    /// Reference signal receive power (+CESQ)
    Rsrp,
    /// Reference signal receive quality (+CESQ)
    Rsrq,
}

/// Identity field selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// Equipment identity
    Imei,
    /// Model identifier
    ModelId,
    /// Manufacturer name
    Manufacturer,
    /// Firmware revision
    FwVersion,
    /// SIM subscriber identity
    Imsi,
    /// SIM card identifier
    Iccid,
}

/// The per-modem status block
#[derive(Debug, Clone)]
pub struct ModemStatus {
    /// GSM registration slot (+CREG)
    pub registration_gsm: RegistrationStatus,
    /// GPRS-class registration slot (+CGREG)
    pub registration_gprs: RegistrationStatus,
    /// LTE-class registration slot (+CEREG)
    pub registration_lte: RegistrationStatus,
    /// Last sampled raw RSSI code
    pub rssi: u8,
    /// Last sampled raw RSRP code
    pub rsrp: u8,
    /// Last sampled raw RSRQ code
    pub rsrq: u8,
    /// Equipment identity, populated by the init script
    pub imei: String,
    /// Model identifier
    pub model_id: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Firmware revision
    pub fw_version: String,
    /// SIM subscriber identity
    pub imsi: String,
    /// SIM card identifier
    pub iccid: String,
    /// Malformed field updates skipped by the decoders
    pub skipped_fields: u64,
}

impl Default for ModemStatus {
    fn default() -> Self {
        Self {
            registration_gsm: RegistrationStatus::default(),
            registration_gprs: RegistrationStatus::default(),
            registration_lte: RegistrationStatus::default(),
            rssi: RSSI_UNKNOWN,
            rsrp: RSRP_UNKNOWN,
            rsrq: RSRQ_UNKNOWN,
            imei: String::new(),
            model_id: String::new(),
            manufacturer: String::new(),
            fw_version: String::new(),
            imsi: String::new(),
            iccid: String::new(),
            skipped_fields: 0,
        }
    }
}

impl ModemStatus {
    /// Whether any tracked technology is registered home or roaming
    pub fn is_registered(&self) -> bool {
        self.registration_gsm.is_registered()
            || self.registration_gprs.is_registered()
            || self.registration_lte.is_registered()
    }

    /// Registration state for one access technology
    pub fn registration(&self, tech: AccessTechnology) -> RegistrationStatus {
        match tech {
            AccessTechnology::Gsm => self.registration_gsm,
            AccessTechnology::Gprs | AccessTechnology::Umts | AccessTechnology::Edge => {
                self.registration_gprs
            }
            AccessTechnology::Lte
            | AccessTechnology::LteCatM1
            | AccessTechnology::LteCatM2
            | AccessTechnology::NbIot => self.registration_lte,
        }
    }

    /// One identity field
    pub fn identity(&self, kind: IdentityKind) -> &str {
        match kind {
            IdentityKind::Imei => &self.imei,
            IdentityKind::ModelId => &self.model_id,
            IdentityKind::Manufacturer => &self.manufacturer,
            IdentityKind::FwVersion => &self.fw_version,
            IdentityKind::Imsi => &self.imsi,
            IdentityKind::Iccid => &self.iccid,
        }
    }

    /// Last sampled raw code for one signal metric
    pub fn signal_raw(&self, kind: SignalKind) -> u8 {
        match kind {
            SignalKind::Rssi => self.rssi,
            SignalKind::Rsrp => self.rsrp,
            SignalKind::Rsrq => self.rsrq,
        }
    }
}

/// Status block shared between the script engine and the query surface
pub type SharedStatus = Arc<Mutex<ModemStatus>>;

fn parse_code(field: &str) -> u8 {
    field.trim().parse().unwrap_or(0)
}

/// Apply one tokenized field match to the status block.
///
/// `argv[0]` is the matched prefix, the remaining entries are the split
/// fields. A field count the handler does not understand skips the update
/// and bumps the skip counter. Registration updates additionally derive the
/// aggregate and post `Registered`/`Deregistered`.
pub fn apply_field(
    status: &mut ModemStatus,
    handler: FieldHandler,
    argv: &[&str],
    events: &EventSender,
) {
    match handler {
        FieldHandler::Imei => match identity_value(argv, IMEI_MAX_LEN) {
            Some(value) => status.imei = value,
            None => status.skipped_fields += 1,
        },
        FieldHandler::ModelId => match identity_value(argv, MODEL_ID_MAX_LEN) {
            Some(value) => status.model_id = value,
            None => status.skipped_fields += 1,
        },
        FieldHandler::Manufacturer => match identity_value(argv, MANUFACTURER_MAX_LEN) {
            Some(value) => status.manufacturer = value,
            None => status.skipped_fields += 1,
        },
        FieldHandler::FwVersion => match identity_value(argv, FW_VERSION_MAX_LEN) {
            Some(value) => status.fw_version = value,
            None => status.skipped_fields += 1,
        },
        FieldHandler::Imsi => match identity_value(argv, IMSI_MAX_LEN) {
            Some(value) => status.imsi = value,
            None => status.skipped_fields += 1,
        },
        FieldHandler::Iccid => match identity_value(argv, ICCID_MAX_LEN) {
            Some(value) => status.iccid = value,
            None => status.skipped_fields += 1,
        },

        FieldHandler::SignalQuality => {
            if argv.len() != 3 {
                status.skipped_fields += 1;
                return;
            }
            status.rssi = parse_code(argv[1]);
        }

        FieldHandler::ExtendedSignalQuality => {
            if argv.len() != 7 {
                status.skipped_fields += 1;
                return;
            }
            status.rsrq = parse_code(argv[5]);
            status.rsrp = parse_code(argv[6]);
        }

        FieldHandler::Registration => {
            let code = match argv.len() {
                2 => parse_code(argv[1]),
                3 | 6 => parse_code(argv[2]),
                _ => {
                    status.skipped_fields += 1;
                    return;
                }
            };
            let registration = RegistrationStatus::from_code(code);

            match argv[0] {
                "+CREG: " => status.registration_gsm = registration,
                "+CGREG: " => status.registration_gprs = registration,
                _ => status.registration_lte = registration,
            }

            if status.is_registered() {
                events.send(ModemEvent::Registered);
            } else {
                events.send(ModemEvent::Deregistered);
            }
        }
    }
}

fn identity_value(argv: &[&str], max_len: usize) -> Option<String> {
    match argv {
        [_, value] => Some(bounded_field(value, max_len)),
        _ => None,
    }
}
