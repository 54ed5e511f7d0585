//! Field decoders
//!
//! Pure conversions from raw 3GPP response codes to typed values. The raw
//! codes are stored as last sampled and decoded on demand, so the sentinel
//! "unknown" values survive until a query actually needs the field.

use crate::error::DecodeError;

/// +CSQ reports 99 when the signal strength is unknown
pub const RSSI_UNKNOWN: u8 = 99;
/// +CESQ reports 255 when RSRP is unknown
pub const RSRP_UNKNOWN: u8 = 255;
/// +CESQ reports 255 when RSRQ is unknown
pub const RSRQ_UNKNOWN: u8 = 255;

/// Significant characters retained for each identity field
pub const IMEI_MAX_LEN: usize = 15;
/// Model identifier capacity
pub const MODEL_ID_MAX_LEN: usize = 64;
/// Manufacturer name capacity
pub const MANUFACTURER_MAX_LEN: usize = 64;
/// Firmware version capacity
pub const FW_VERSION_MAX_LEN: usize = 64;
/// IMSI capacity
pub const IMSI_MAX_LEN: usize = 22;
/// ICCID capacity
pub const ICCID_MAX_LEN: usize = 21;

/// Convert a raw +CSQ RSSI code to dBm.
///
/// The code is an integer from 0 to 31 describing a signal strength between
/// -113 dBm for 0 and -51 dBm for 31, or 99 for unknown.
pub fn rssi_to_dbm(raw: u8) -> Result<i16, DecodeError> {
    if raw == RSSI_UNKNOWN {
        return Err(DecodeError::OutOfRange);
    }

    Ok(-113 + 2 * i16::from(raw))
}

/// Convert a raw +CESQ RSRP code to dBm.
///
/// The code is an integer from 0 to 97 describing a reference signal receive
/// power between -140 dBm for 0 and -44 dBm for 97 (1 dBm steps), or 255 for
/// unknown.
pub fn rsrp_to_dbm(raw: u8) -> Result<i16, DecodeError> {
    if raw == RSRP_UNKNOWN {
        return Err(DecodeError::OutOfRange);
    }

    Ok(-140 + i16::from(raw))
}

/// Convert a raw +CESQ RSRQ code to dB.
///
/// The code is an integer from 0 to 34 describing a reference signal receive
/// quality between -20 dB for 0 and -3 dB for 34 (0.5 dB steps, reported
/// truncated to whole dB), or 255 for unknown.
pub fn rsrq_to_db(raw: u8) -> Result<i16, DecodeError> {
    if raw == RSRQ_UNKNOWN {
        return Err(DecodeError::OutOfRange);
    }

    Ok(-20 + i16::from(raw) / 2)
}

/// Network registration state for one radio access technology
///
/// Values mirror the 3GPP +CREG/+CGREG/+CEREG <stat> codes 0 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistrationStatus {
    /// Not registered and not searching
    #[default]
    NotRegistered,
    /// Registered on the home network
    RegisteredHome,
    /// Not registered, searching for an operator
    Searching,
    /// Registration denied by the network
    Denied,
    /// Registration state unknown
    Unknown,
    /// Registered on a roaming network
    RegisteredRoaming,
}

impl RegistrationStatus {
    /// Decode a 3GPP <stat> code; codes outside 0..=5 decode to `Unknown`
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::NotRegistered,
            1 => Self::RegisteredHome,
            2 => Self::Searching,
            3 => Self::Denied,
            5 => Self::RegisteredRoaming,
            _ => Self::Unknown,
        }
    }

    /// Whether this status counts as attached to a network
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }
}

/// Copy a response field into a bounded identity string.
///
/// Truncates to `max_len` characters on a char boundary; oversized or
/// malformed input never panics.
pub fn bounded_field(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rssi_boundaries() {
        assert_eq!(rssi_to_dbm(0), Ok(-113));
        assert_eq!(rssi_to_dbm(31), Ok(-51));
        assert_eq!(rssi_to_dbm(RSSI_UNKNOWN), Err(DecodeError::OutOfRange));
    }

    #[test]
    fn rsrp_boundaries() {
        assert_eq!(rsrp_to_dbm(0), Ok(-140));
        assert_eq!(rsrp_to_dbm(97), Ok(-43));
        assert_eq!(rsrp_to_dbm(RSRP_UNKNOWN), Err(DecodeError::OutOfRange));
    }

    #[test]
    fn rsrq_boundaries() {
        assert_eq!(rsrq_to_db(0), Ok(-20));
        assert_eq!(rsrq_to_db(34), Ok(-3));
        assert_eq!(rsrq_to_db(RSRQ_UNKNOWN), Err(DecodeError::OutOfRange));
    }

    #[test]
    fn registration_codes() {
        assert_eq!(
            RegistrationStatus::from_code(1),
            RegistrationStatus::RegisteredHome
        );
        assert_eq!(
            RegistrationStatus::from_code(5),
            RegistrationStatus::RegisteredRoaming
        );
        assert_eq!(
            RegistrationStatus::from_code(42),
            RegistrationStatus::Unknown
        );
        assert!(RegistrationStatus::RegisteredHome.is_registered());
        assert!(RegistrationStatus::RegisteredRoaming.is_registered());
        assert!(!RegistrationStatus::Searching.is_registered());
    }

    #[test]
    fn bounded_field_truncates() {
        assert_eq!(bounded_field("490154203237518", IMEI_MAX_LEN).len(), 15);
        assert_eq!(
            bounded_field("4901542032375187777", IMEI_MAX_LEN),
            "490154203237518"
        );
        assert_eq!(bounded_field("", IMEI_MAX_LEN), "");
    }

    proptest! {
        #[test]
        fn rssi_in_range_maps_into_band(raw in 0u8..=31) {
            let dbm = rssi_to_dbm(raw).unwrap();
            prop_assert!((-113..=-51).contains(&dbm));
        }

        #[test]
        fn rsrp_in_range_maps_into_band(raw in 0u8..=97) {
            let dbm = rsrp_to_dbm(raw).unwrap();
            prop_assert!((-140..=-43).contains(&dbm));
        }

        #[test]
        fn rsrq_in_range_maps_into_band(raw in 0u8..=34) {
            let db = rsrq_to_db(raw).unwrap();
            prop_assert!((-20..=-3).contains(&db));
        }

        #[test]
        fn bounded_field_never_exceeds_cap(s in ".{0,128}") {
            prop_assert!(bounded_field(&s, MODEL_ID_MAX_LEN).chars().count() <= MODEL_ID_MAX_LEN);
        }
    }
}
