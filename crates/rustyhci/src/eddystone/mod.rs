//! Eddystone-URL beacon payloads
//!
//! URLs are compressed by replacing a known scheme prefix and known domain
//! extensions with single-byte table indices. The result is carried in a
//! Service Data AD structure for the Eddystone service UUID.

use crate::gap::constants::*;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// URL scheme prefixes, matched in this order
pub const SCHEMES: [&str; 4] = ["http://www.", "https://www.", "http://", "https://"];

/// Domain extensions; the slash-suffixed forms must come before the bare ones
pub const EXTENSIONS: [&str; 14] = [
    ".com/", ".org/", ".edu/", ".net/", ".info/", ".biz/", ".gov/",
    ".com", ".org", ".edu", ".net", ".info", ".biz", ".gov",
];

pub const EDDYSTONE_UUID: u16 = 0xFEAA;
pub const FRAME_TYPE_URL: u8 = 0x10;
/// Calibrated transmit power at 0 m, in dBm
pub const TX_POWER: i8 = -19;
pub const MAX_ENCODED_URL_LEN: usize = 18;
/// Bytes preceding the encoded URL in an advertisement
pub const ENVELOPE_LEN: usize = 13;

// Flags: LE general discoverable, simultaneous LE and BR/EDR (controller and host)
const BEACON_FLAGS: u8 = FLAG_LE_GENERAL_DISCOVERABLE | FLAG_LE_BR_EDR_CONTROLLER | FLAG_LE_BR_EDR_HOST;

/// Errors produced while encoding a beacon URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EddystoneError {
    #[error("Invalid URL scheme")]
    InvalidScheme,

    #[error("Encoded URL too long: {len} bytes (max {max})")]
    UrlTooLong { len: usize, max: usize },
}

/// Compress `url` into the Eddystone-URL encoding
pub fn encode_url(url: &str) -> Result<Vec<u8>, EddystoneError> {
    let (scheme_index, scheme) = SCHEMES
        .iter()
        .enumerate()
        .find(|(_, scheme)| url.starts_with(*scheme))
        .ok_or(EddystoneError::InvalidScheme)?;

    let bytes = url.as_bytes();
    let mut encoded = vec![scheme_index as u8];
    let mut i = scheme.len();

    while i < bytes.len() {
        if bytes[i] == b'.' {
            let extension = EXTENSIONS
                .iter()
                .enumerate()
                .find(|(_, ext)| bytes[i..].starts_with(ext.as_bytes()));
            if let Some((index, ext)) = extension {
                encoded.push(index as u8);
                i += ext.len();
                continue;
            }
        }
        encoded.push(bytes[i]);
        i += 1;
    }

    if encoded.len() > MAX_ENCODED_URL_LEN {
        return Err(EddystoneError::UrlTooLong {
            len: encoded.len(),
            max: MAX_ENCODED_URL_LEN,
        });
    }
    Ok(encoded)
}

/// Build a complete Eddystone-URL advertising payload for `url`.
///
/// The payload is `ENVELOPE_LEN` bytes of flags, service UUID and service
/// data header followed by the encoded URL, so it never exceeds 31 bytes.
pub fn build_advertisement(url: &str) -> Result<Vec<u8>, EddystoneError> {
    let encoded = encode_url(url)?;
    let uuid = EDDYSTONE_UUID.to_le_bytes();

    let mut payload = Vec::with_capacity(ENVELOPE_LEN + encoded.len());
    payload.extend_from_slice(&[2, ADV_TYPE_FLAGS, BEACON_FLAGS]);
    payload.extend_from_slice(&[3, ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, uuid[0], uuid[1]]);
    payload.extend_from_slice(&[
        (5 + encoded.len()) as u8,
        ADV_TYPE_SERVICE_DATA_16BIT,
        uuid[0],
        uuid[1],
        FRAME_TYPE_URL,
        TX_POWER as u8,
    ]);
    payload.extend_from_slice(&encoded);
    Ok(payload)
}
