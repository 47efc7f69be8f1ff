//! HCI command packets
//!
//! Every command serializes to a self-contained frame: packet type, opcode
//! (little-endian), parameter length and the parameters themselves. The
//! parameter length byte always equals the number of parameter bytes.

use crate::error::HciError;
use crate::gap::BdAddr;
use crate::hci::constants::*;

/// Advertising or scan response payload, at most 31 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingData {
    len: u8,
    bytes: [u8; LE_MAX_ADV_DATA_LEN],
}

impl AdvertisingData {
    /// Wraps `data`, failing if it exceeds 31 bytes
    pub fn new(data: &[u8]) -> Result<Self, HciError> {
        if data.len() > LE_MAX_ADV_DATA_LEN {
            return Err(HciError::PayloadTooLong {
                len: data.len(),
                max: LE_MAX_ADV_DATA_LEN,
            });
        }

        let mut bytes = [0u8; LE_MAX_ADV_DATA_LEN];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self {
            len: data.len() as u8,
            bytes,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 1-byte length prefix followed by the zero-padded 31-byte payload
    fn write_to(&self, params: &mut Vec<u8>) {
        params.push(self.len);
        params.extend_from_slice(&self.bytes);
    }
}

/// Parameters for LE Set Advertising Parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingParameters {
    /// Minimum advertising interval in 0.625 ms units
    pub min_interval: u16,
    /// Maximum advertising interval in 0.625 ms units
    pub max_interval: u16,
    pub advertising_type: u8,
    pub own_address_type: u8,
    pub direct_address_type: u8,
    pub direct_address: BdAddr,
    pub channel_map: u8,
    pub filter_policy: u8,
}

impl Default for AdvertisingParameters {
    fn default() -> Self {
        Self {
            min_interval: 0x00a0,
            max_interval: 0x00a0,
            advertising_type: 0x00,
            own_address_type: LE_PUBLIC_ADDRESS,
            direct_address_type: LE_PUBLIC_ADDRESS,
            direct_address: BdAddr::default(),
            channel_map: 0x07,
            filter_policy: 0x00,
        }
    }
}

/// Scan and connection parameters for LE Create Connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub scan_interval: u16,
    pub scan_window: u16,
    pub initiator_filter: u8,
    pub own_address_type: u8,
    /// Connection interval bounds in 1.25 ms units
    pub conn_interval_min: u16,
    pub conn_interval_max: u16,
    pub conn_latency: u16,
    /// Supervision timeout in 10 ms units
    pub supervision_timeout: u16,
    pub min_ce_length: u16,
    pub max_ce_length: u16,
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            scan_interval: 0x0060,
            scan_window: 0x0030,
            initiator_filter: 0x00,
            own_address_type: LE_PUBLIC_ADDRESS,
            conn_interval_min: 0x0028,
            conn_interval_max: 0x0038,
            conn_latency: 0x0000,
            supervision_timeout: 0x002a,
            min_ce_length: 0x0000,
            max_ce_length: 0x0000,
        }
    }
}

/// A command given as a bare opcode and parameter block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    opcode: u16,
    parameters: Vec<u8>,
}

impl RawCommand {
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }
}

/// HCI commands understood by this crate
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HciCommand {
    // Link Control Commands (OGF: 0x01)
    Disconnect { handle: u16, reason: u8 },

    // Host Controller Commands (OGF: 0x03)
    Reset,
    SetEventMask { event_mask: u64 },

    // LE Commands (OGF: 0x08)
    LeSetEventMask { event_mask: u64 },
    LeSetAdvertisingParameters(AdvertisingParameters),
    LeSetAdvertisingData(AdvertisingData),
    LeSetScanResponseData(AdvertisingData),
    LeSetAdvertiseEnable { enable: bool },
    LeSetScanParameters {
        scan_type: u8,
        scan_interval: u16,
        scan_window: u16,
        own_address_type: u8,
        filter_policy: u8,
    },
    LeSetScanEnable { enable: bool, filter_duplicates: bool },
    LeCreateConnection {
        peer_addr: BdAddr,
        peer_addr_type: u8,
        params: ConnectionParameters,
    },
    LeCreateConnectionCancel,

    Raw(RawCommand),
}

impl HciCommand {
    /// Creates a command from its group/command fields and raw parameters
    pub fn new(ogf: u8, ocf: u16, parameters: Vec<u8>) -> Result<Self, HciError> {
        if parameters.len() > HCI_MAX_PARAM_LEN {
            return Err(HciError::InvalidParamLength(parameters.len()));
        }
        Ok(Self::Raw(RawCommand {
            opcode: opcode(ogf, ocf),
            parameters,
        }))
    }

    /// LE Set Advertising Data from a raw payload
    pub fn le_set_advertising_data(data: &[u8]) -> Result<Self, HciError> {
        Ok(Self::LeSetAdvertisingData(AdvertisingData::new(data)?))
    }

    /// LE Set Scan Response Data from a raw payload
    pub fn le_set_scan_response_data(data: &[u8]) -> Result<Self, HciError> {
        Ok(Self::LeSetScanResponseData(AdvertisingData::new(data)?))
    }

    /// The 16-bit opcode (OGF << 10 | OCF)
    pub fn opcode(&self) -> u16 {
        match self {
            Self::Disconnect { .. } => opcode(OGF_LINK_CTL, OCF_DISCONNECT),
            Self::Reset => opcode(OGF_HOST_CTL, OCF_RESET),
            Self::SetEventMask { .. } => opcode(OGF_HOST_CTL, OCF_SET_EVENT_MASK),
            Self::LeSetEventMask { .. } => opcode(OGF_LE, OCF_LE_SET_EVENT_MASK),
            Self::LeSetAdvertisingParameters(_) => opcode(OGF_LE, OCF_LE_SET_ADVERTISING_PARAMETERS),
            Self::LeSetAdvertisingData(_) => opcode(OGF_LE, OCF_LE_SET_ADVERTISING_DATA),
            Self::LeSetScanResponseData(_) => opcode(OGF_LE, OCF_LE_SET_SCAN_RESPONSE_DATA),
            Self::LeSetAdvertiseEnable { .. } => opcode(OGF_LE, OCF_LE_SET_ADVERTISE_ENABLE),
            Self::LeSetScanParameters { .. } => opcode(OGF_LE, OCF_LE_SET_SCAN_PARAMETERS),
            Self::LeSetScanEnable { .. } => opcode(OGF_LE, OCF_LE_SET_SCAN_ENABLE),
            Self::LeCreateConnection { .. } => opcode(OGF_LE, OCF_LE_CREATE_CONNECTION),
            Self::LeCreateConnectionCancel => opcode(OGF_LE, OCF_LE_CREATE_CONNECTION_CANCEL),
            Self::Raw(raw) => raw.opcode,
        }
    }

    /// Convert the command to its raw parameter bytes
    fn parameters(&self) -> Vec<u8> {
        match self {
            Self::Reset | Self::LeCreateConnectionCancel => vec![],

            Self::Disconnect { handle, reason } => {
                let mut params = Vec::with_capacity(3);
                params.extend_from_slice(&handle.to_le_bytes());
                params.push(*reason);
                params
            }

            Self::SetEventMask { event_mask } | Self::LeSetEventMask { event_mask } => {
                event_mask.to_le_bytes().to_vec()
            }

            Self::LeSetAdvertisingParameters(adv) => {
                let mut params = Vec::with_capacity(15);
                params.extend_from_slice(&adv.min_interval.to_le_bytes());
                params.extend_from_slice(&adv.max_interval.to_le_bytes());
                params.push(adv.advertising_type);
                params.push(adv.own_address_type);
                params.push(adv.direct_address_type);
                params.extend_from_slice(adv.direct_address.as_slice());
                params.push(adv.channel_map);
                params.push(adv.filter_policy);
                params
            }

            Self::LeSetAdvertisingData(data) | Self::LeSetScanResponseData(data) => {
                let mut params = Vec::with_capacity(1 + LE_MAX_ADV_DATA_LEN);
                data.write_to(&mut params);
                params
            }

            Self::LeSetAdvertiseEnable { enable } => vec![*enable as u8],

            Self::LeSetScanParameters {
                scan_type,
                scan_interval,
                scan_window,
                own_address_type,
                filter_policy,
            } => {
                let mut params = Vec::with_capacity(7);
                params.push(*scan_type);
                params.extend_from_slice(&scan_interval.to_le_bytes());
                params.extend_from_slice(&scan_window.to_le_bytes());
                params.push(*own_address_type);
                params.push(*filter_policy);
                params
            }

            Self::LeSetScanEnable {
                enable,
                filter_duplicates,
            } => vec![*enable as u8, *filter_duplicates as u8],

            Self::LeCreateConnection {
                peer_addr,
                peer_addr_type,
                params: conn,
            } => {
                let mut params = Vec::with_capacity(25);
                params.extend_from_slice(&conn.scan_interval.to_le_bytes());
                params.extend_from_slice(&conn.scan_window.to_le_bytes());
                params.push(conn.initiator_filter);
                params.push(*peer_addr_type);
                // BdAddr already holds wire order
                params.extend_from_slice(peer_addr.as_slice());
                params.push(conn.own_address_type);
                for value in [
                    conn.conn_interval_min,
                    conn.conn_interval_max,
                    conn.conn_latency,
                    conn.supervision_timeout,
                    conn.min_ce_length,
                    conn.max_ce_length,
                ] {
                    params.extend_from_slice(&value.to_le_bytes());
                }
                params
            }

            Self::Raw(raw) => raw.parameters.clone(),
        }
    }

    /// Convert the command to a raw HCI packet
    pub fn to_packet(&self) -> Vec<u8> {
        let params = self.parameters();

        let mut packet = Vec::with_capacity(HCI_COMMAND_HDR_SIZE + params.len());
        packet.push(HCI_COMMAND_PKT);
        packet.extend_from_slice(&self.opcode().to_le_bytes());
        packet.push(params.len() as u8);
        packet.extend_from_slice(&params);
        packet
    }
}
