//! Wire format of the relay's response payload.
//!
//! Nine bytes: a delay flag (0 or 1) followed by the delay in minutes as a
//! big-endian u64. Anything else is treated as an oracle error.

use crate::types::DelayReport;
use soroban_sdk::Bytes;

pub const REPORT_LEN: u32 = 9;

pub fn decode_report(response: &Bytes) -> Option<DelayReport> {
    if response.len() != REPORT_LEN {
        return None;
    }

    let delay_occurred = match response.get(0)? {
        0 => false,
        1 => true,
        _ => return None,
    };

    let mut minutes = [0u8; 8];
    for (i, byte) in minutes.iter_mut().enumerate() {
        *byte = response.get(i as u32 + 1)?;
    }

    Some(DelayReport {
        delay_occurred,
        delay_minutes: u64::from_be_bytes(minutes),
    })
}

/// Report for a fulfillment. A non-empty error or an undecodable response
/// counts as "no delay".
pub fn report_for(response: &Bytes, error: &Bytes) -> DelayReport {
    if !error.is_empty() {
        return DelayReport::NONE;
    }
    decode_report(response).unwrap_or(DelayReport::NONE)
}

#[cfg(test)]
pub fn encode_report(env: &soroban_sdk::Env, delay_occurred: bool, delay_minutes: u64) -> Bytes {
    let mut raw = [0u8; 9];
    raw[0] = delay_occurred as u8;
    raw[1..].copy_from_slice(&delay_minutes.to_be_bytes());
    Bytes::from_array(env, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::Env;

    #[test]
    fn decodes_flag_and_minutes() {
        let env = Env::default();
        let report = decode_report(&encode_report(&env, true, 130)).unwrap();
        assert!(report.delay_occurred);
        assert_eq!(report.delay_minutes, 130);

        let report = decode_report(&encode_report(&env, false, 0)).unwrap();
        assert_eq!(report, DelayReport::NONE);
    }

    #[test]
    fn rejects_malformed_payloads() {
        let env = Env::default();
        assert_eq!(decode_report(&Bytes::new(&env)), None);
        assert_eq!(decode_report(&Bytes::from_array(&env, &[1u8; 8])), None);
        assert_eq!(decode_report(&Bytes::from_array(&env, &[2u8; 9])), None);
    }

    #[test]
    fn error_payload_overrides_response() {
        let env = Env::default();
        let response = encode_report(&env, true, 500);
        let error = Bytes::from_array(&env, &[0xde, 0xad]);

        assert_eq!(report_for(&response, &error), DelayReport::NONE);
        assert_eq!(report_for(&response, &Bytes::new(&env)).delay_minutes, 500);
    }
}
