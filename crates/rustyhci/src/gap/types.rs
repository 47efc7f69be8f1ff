use crate::error::HciError;
use crate::gap::constants::*;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Central,
    Peripheral,
}

impl From<u8> for Role {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Role::Central,
            _ => Role::Peripheral,
        }
    }
}

/// LE device address type as reported in advertising reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Random,
}

impl TryFrom<u8> for AddressType {
    type Error = HciError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            PUBLIC_DEVICE_ADDRESS => Ok(AddressType::Public),
            RANDOM_DEVICE_ADDRESS => Ok(AddressType::Random),
            _ => Err(HciError::InvalidValue {
                field: "address type",
                value,
            }),
        }
    }
}

impl From<AddressType> for u8 {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::Public => PUBLIC_DEVICE_ADDRESS,
            AddressType::Random => RANDOM_DEVICE_ADDRESS,
        }
    }
}

/// Advertising PDU type reported in an LE Advertising Report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingType {
    AdvInd,
    AdvDirectInd,
    AdvScanInd,
    AdvNonconnInd,
    ScanRsp,
}

impl AdvertisingType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdvInd => "ADV_IND",
            Self::AdvDirectInd => "ADV_DIRECT_IND",
            Self::AdvScanInd => "ADV_SCAN_IND",
            Self::AdvNonconnInd => "ADV_NONCONN_IND",
            Self::ScanRsp => "SCAN_RSP",
        }
    }
}

impl TryFrom<u8> for AdvertisingType {
    type Error = HciError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            ADV_IND => Ok(Self::AdvInd),
            ADV_DIRECT_IND => Ok(Self::AdvDirectInd),
            ADV_SCAN_IND => Ok(Self::AdvScanInd),
            ADV_NONCONN_IND => Ok(Self::AdvNonconnInd),
            SCAN_RSP => Ok(Self::ScanRsp),
            _ => Err(HciError::InvalidValue {
                field: "advertising type",
                value,
            }),
        }
    }
}

impl fmt::Display for AdvertisingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bluetooth device address.
///
/// The bytes are kept in wire order (least significant byte first), the order
/// in which they appear in HCI packets. `Display` and `FromStr` use the
/// conventional colon-separated form, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    /// Creates an address from wire-order bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    /// Creates an address from bytes in human (most significant first) order
    pub fn from_human(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self { bytes }
    }

    /// Returns the address bytes in human (most significant first) order
    pub fn to_human(&self) -> [u8; 6] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

impl FromStr for BdAddr {
    type Err = HciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(HciError::InvalidAddress(s.to_string()));
        }

        let mut human = [0u8; 6];
        for (octet, part) in human.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(HciError::InvalidAddress(s.to_string()));
            }
            let mut byte = [0u8; 1];
            hex::decode_to_slice(part, &mut byte)
                .map_err(|_| HciError::InvalidAddress(s.to_string()))?;
            *octet = byte[0];
        }

        Ok(Self::from_human(human))
    }
}
