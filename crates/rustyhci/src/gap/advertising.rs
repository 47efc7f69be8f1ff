//! Advertising payload construction and parsing
//!
//! An advertising payload is a sequence of AD structures, each a
//! length-prefixed (type, data) entry. The whole payload must fit in the
//! 31 bytes carried by the LE Set Advertising Data command.

use crate::error::HciError;
use crate::gap::constants::*;
use crate::hci::constants::LE_MAX_ADV_DATA_LEN;

/// Builds an advertising or scan response payload from AD structures.
///
/// `build` fails rather than truncating when the serialized payload would
/// exceed 31 bytes.
#[derive(Debug, Clone, Default)]
pub struct AdvertisingDataBuilder {
    structures: Vec<(u8, Vec<u8>)>,
}

impl AdvertisingDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary AD structure
    pub fn structure(mut self, ad_type: u8, data: &[u8]) -> Self {
        self.structures.push((ad_type, data.to_vec()));
        self
    }

    /// Adds a Flags AD structure
    pub fn flags(self, flags: u8) -> Self {
        self.structure(ADV_TYPE_FLAGS, &[flags])
    }

    /// Adds a complete list of 16-bit service UUIDs
    pub fn complete_16bit_uuids(self, uuids: &[u16]) -> Self {
        let data: Vec<u8> = uuids.iter().flat_map(|uuid| uuid.to_le_bytes()).collect();
        self.structure(ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, &data)
    }

    /// Adds a Service Data AD structure for a 16-bit service UUID
    pub fn service_data_16bit(self, uuid: u16, payload: &[u8]) -> Self {
        let mut data = Vec::with_capacity(2 + payload.len());
        data.extend_from_slice(&uuid.to_le_bytes());
        data.extend_from_slice(payload);
        self.structure(ADV_TYPE_SERVICE_DATA_16BIT, &data)
    }

    /// Adds a Complete Local Name AD structure
    pub fn complete_local_name(self, name: &str) -> Self {
        self.structure(ADV_TYPE_COMPLETE_LOCAL_NAME, name.as_bytes())
    }

    /// Serialized length of the payload built so far
    pub fn len(&self) -> usize {
        self.structures.iter().map(|(_, data)| 2 + data.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Serializes the AD structures
    pub fn build(&self) -> Result<Vec<u8>, HciError> {
        let len = self.len();
        if len > LE_MAX_ADV_DATA_LEN {
            return Err(HciError::PayloadTooLong {
                len,
                max: LE_MAX_ADV_DATA_LEN,
            });
        }

        let mut payload = Vec::with_capacity(len);
        for (ad_type, data) in &self.structures {
            payload.push((data.len() + 1) as u8);
            payload.push(*ad_type);
            payload.extend_from_slice(data);
        }
        Ok(payload)
    }
}

/// Parse advertisement data from a LE Advertising Report
///
/// # Arguments
///
/// * `data` - The advertisement data
///
/// # Returns
///
/// A vector of (type, data) tuples. Parsing stops at the first zero-length
/// or overrunning structure.
pub fn parse_advertising_data(data: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i] as usize;
        if length == 0 || i + length >= data.len() {
            break;
        }

        let ad_type = data[i + 1];
        let ad_data = data[i + 2..i + 1 + length].to_vec();

        result.push((ad_type, ad_data));

        i += 1 + length;
    }

    result
}
