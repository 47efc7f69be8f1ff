//! HCI packet and event decoding
//!
//! All decoders work on a complete received frame, packet type indicator
//! included, and read fields at fixed offsets. Each event shape has a minimum
//! frame length; shorter frames yield [`HciError::Truncated`].

use crate::error::HciError;
use crate::gap::{parse_advertising_data, AddressType, AdvertisingType, BdAddr, Role};
use crate::hci::acl::AclPacket;
use crate::hci::constants::*;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use std::time::Duration;

fn require(frame: &[u8], needed: usize) -> Result<(), HciError> {
    if frame.len() < needed {
        return Err(HciError::Truncated {
            needed,
            actual: frame.len(),
        });
    }
    Ok(())
}

fn read_addr(cursor: &mut Cursor<&[u8]>) -> Result<BdAddr, HciError> {
    let mut bytes = [0u8; 6];
    std::io::Read::read_exact(cursor, &mut bytes)?;
    Ok(BdAddr::new(bytes))
}

/// Connection interval field (1.25 ms units) as a duration
fn interval_duration(units: u16) -> Duration {
    Duration::from_micros(units as u64 * 1250)
}

/// Supervision timeout field (10 ms units) as a duration
fn timeout_duration(units: u16) -> Duration {
    Duration::from_millis(units as u64 * 10)
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HciPacket {
    Event(HciEvent),
    AclData(AclPacket),
    /// Command, SCO and other packet types, which only show up in loopback setups
    Ignored { packet_type: u8 },
}

impl HciPacket {
    /// Decode a received frame
    pub fn parse(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, 1)?;

        match frame[0] {
            HCI_EVENT_PKT => Ok(Self::Event(HciEvent::parse(frame)?)),
            HCI_ACL_PKT => Ok(Self::AclData(AclPacket::parse(frame)?)),
            packet_type => Ok(Self::Ignored { packet_type }),
        }
    }
}

/// Command Complete event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandComplete {
    pub num_commands: u8,
    pub opcode: u16,
    pub status: u8,
    /// Command specific return parameters following the status byte
    pub return_parameters: Vec<u8>,
}

impl CommandComplete {
    pub const MIN_FRAME_LEN: usize = HCI_EVENT_HDR_SIZE + 4;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        let mut cursor = Cursor::new(&frame[HCI_EVENT_HDR_SIZE..]);
        let num_commands = cursor.read_u8()?;
        let opcode = cursor.read_u16::<LittleEndian>()?;
        let status = cursor.read_u8()?;

        Ok(Self {
            num_commands,
            opcode,
            status,
            return_parameters: frame[Self::MIN_FRAME_LEN..].to_vec(),
        })
    }

    /// Check whether this completes the command with the given OGF and OCF
    pub fn is_for(&self, ogf: u8, ocf: u16) -> bool {
        self.opcode == opcode(ogf, ocf)
    }

    pub fn is_success(&self) -> bool {
        self.status == HCI_SUCCESS
    }
}

/// Command Status event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub status: u8,
    pub num_commands: u8,
    pub opcode: u16,
}

impl CommandStatus {
    pub const MIN_FRAME_LEN: usize = HCI_EVENT_HDR_SIZE + 4;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        let mut cursor = Cursor::new(&frame[HCI_EVENT_HDR_SIZE..]);
        Ok(Self {
            status: cursor.read_u8()?,
            num_commands: cursor.read_u8()?,
            opcode: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

/// Disconnection Complete event. The connection handle is no longer valid
/// once this is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectionComplete {
    pub status: u8,
    pub connection_handle: u16,
    pub reason: u8,
}

impl DisconnectionComplete {
    pub const MIN_FRAME_LEN: usize = HCI_EVENT_HDR_SIZE + 4;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        let mut cursor = Cursor::new(&frame[HCI_EVENT_HDR_SIZE..]);
        Ok(Self {
            status: cursor.read_u8()?,
            connection_handle: cursor.read_u16::<LittleEndian>()?,
            reason: cursor.read_u8()?,
        })
    }
}

/// LE Connection Complete subevent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeConnectionComplete {
    pub status: u8,
    pub connection_handle: u16,
    pub role: Role,
    pub peer_address_type: u8,
    pub peer_address: BdAddr,
    /// Connection interval in 1.25 ms units
    pub conn_interval: u16,
    pub conn_latency: u16,
    /// Supervision timeout in 10 ms units
    pub supervision_timeout: u16,
    pub master_clock_accuracy: u8,
}

impl LeConnectionComplete {
    pub const MIN_FRAME_LEN: usize = HCI_EVENT_HDR_SIZE + 19;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        let mut cursor = Cursor::new(&frame[HCI_EVENT_HDR_SIZE + 1..]);
        Ok(Self {
            status: cursor.read_u8()?,
            connection_handle: cursor.read_u16::<LittleEndian>()?,
            role: Role::from(cursor.read_u8()?),
            peer_address_type: cursor.read_u8()?,
            peer_address: read_addr(&mut cursor)?,
            conn_interval: cursor.read_u16::<LittleEndian>()?,
            conn_latency: cursor.read_u16::<LittleEndian>()?,
            supervision_timeout: cursor.read_u16::<LittleEndian>()?,
            master_clock_accuracy: cursor.read_u8()?,
        })
    }

    pub fn interval(&self) -> Duration {
        interval_duration(self.conn_interval)
    }

    pub fn supervision_timeout(&self) -> Duration {
        timeout_duration(self.supervision_timeout)
    }
}

/// LE Connection Update Complete subevent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeConnectionUpdateComplete {
    pub status: u8,
    pub connection_handle: u16,
    pub conn_interval: u16,
    pub conn_latency: u16,
    pub supervision_timeout: u16,
}

impl LeConnectionUpdateComplete {
    pub const MIN_FRAME_LEN: usize = HCI_EVENT_HDR_SIZE + 10;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        let mut cursor = Cursor::new(&frame[HCI_EVENT_HDR_SIZE + 1..]);
        Ok(Self {
            status: cursor.read_u8()?,
            connection_handle: cursor.read_u16::<LittleEndian>()?,
            conn_interval: cursor.read_u16::<LittleEndian>()?,
            conn_latency: cursor.read_u16::<LittleEndian>()?,
            supervision_timeout: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn interval(&self) -> Duration {
        interval_duration(self.conn_interval)
    }

    pub fn supervision_timeout(&self) -> Duration {
        timeout_duration(self.supervision_timeout)
    }
}

/// A device seen in an LE Advertising Report.
///
/// Only the first report of an event is decoded. The EIR bytes run from the
/// fixed data offset up to the RSSI, which is always the last byte of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub address: BdAddr,
    pub address_type: AddressType,
    pub advertising_type: AdvertisingType,
    pub eir: Vec<u8>,
    pub rssi: i8,
}

impl ScanResult {
    const EIR_OFFSET: usize = HCI_EVENT_HDR_SIZE + 11;
    pub const MIN_FRAME_LEN: usize = Self::EIR_OFFSET + 1;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        // subevent, num_reports
        let mut cursor = Cursor::new(&frame[HCI_EVENT_HDR_SIZE + 2..]);
        let advertising_type = AdvertisingType::try_from(cursor.read_u8()?)?;
        let address_type = AddressType::try_from(cursor.read_u8()?)?;
        let address = read_addr(&mut cursor)?;

        let rssi_offset = frame.len() - 1;
        Ok(Self {
            address,
            address_type,
            advertising_type,
            eir: frame[Self::EIR_OFFSET..rssi_offset].to_vec(),
            rssi: frame[rssi_offset] as i8,
        })
    }

    /// The AD structures carried in the EIR bytes as (type, data) pairs
    pub fn ad_structures(&self) -> Vec<(u8, Vec<u8>)> {
        parse_advertising_data(&self.eir)
    }
}

/// LE Meta event, selected by its subevent code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeMetaEvent {
    ConnectionComplete(LeConnectionComplete),
    ConnectionUpdateComplete(LeConnectionUpdateComplete),
    AdvertisingReport(ScanResult),
    Unknown { subevent: u8, parameters: Vec<u8> },
}

impl LeMetaEvent {
    pub const MIN_FRAME_LEN: usize = HCI_EVENT_HDR_SIZE + 1;

    fn decode(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, Self::MIN_FRAME_LEN)?;

        match frame[HCI_EVENT_HDR_SIZE] {
            EVT_LE_CONN_COMPLETE => Ok(Self::ConnectionComplete(LeConnectionComplete::decode(frame)?)),
            EVT_LE_CONN_UPDATE_COMPLETE => Ok(Self::ConnectionUpdateComplete(
                LeConnectionUpdateComplete::decode(frame)?,
            )),
            EVT_LE_ADVERTISING_REPORT => Ok(Self::AdvertisingReport(ScanResult::decode(frame)?)),
            subevent => Ok(Self::Unknown {
                subevent,
                parameters: frame[Self::MIN_FRAME_LEN..].to_vec(),
            }),
        }
    }

    pub fn subevent_code(&self) -> u8 {
        match self {
            Self::ConnectionComplete(_) => EVT_LE_CONN_COMPLETE,
            Self::ConnectionUpdateComplete(_) => EVT_LE_CONN_UPDATE_COMPLETE,
            Self::AdvertisingReport(_) => EVT_LE_ADVERTISING_REPORT,
            Self::Unknown { subevent, .. } => *subevent,
        }
    }
}

/// HCI Event packet, selected by its event code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HciEvent {
    CommandComplete(CommandComplete),
    CommandStatus(CommandStatus),
    DisconnectionComplete(DisconnectionComplete),
    LeMeta(LeMetaEvent),
    Unknown { event_code: u8, parameters: Vec<u8> },
}

impl HciEvent {
    /// Parse an HCI event from a complete frame
    pub fn parse(frame: &[u8]) -> Result<Self, HciError> {
        require(frame, HCI_EVENT_HDR_SIZE)?;
        if frame[0] != HCI_EVENT_PKT {
            return Err(HciError::InvalidValue {
                field: "packet type",
                value: frame[0],
            });
        }

        match frame[1] {
            EVT_CMD_COMPLETE => Ok(Self::CommandComplete(CommandComplete::decode(frame)?)),
            EVT_CMD_STATUS => Ok(Self::CommandStatus(CommandStatus::decode(frame)?)),
            EVT_DISCONN_COMPLETE => Ok(Self::DisconnectionComplete(DisconnectionComplete::decode(frame)?)),
            EVT_LE_META_EVENT => Ok(Self::LeMeta(LeMetaEvent::decode(frame)?)),
            event_code => Ok(Self::Unknown {
                event_code,
                parameters: frame[HCI_EVENT_HDR_SIZE..].to_vec(),
            }),
        }
    }

    pub fn event_code(&self) -> u8 {
        match self {
            Self::CommandComplete(_) => EVT_CMD_COMPLETE,
            Self::CommandStatus(_) => EVT_CMD_STATUS,
            Self::DisconnectionComplete(_) => EVT_DISCONN_COMPLETE,
            Self::LeMeta(_) => EVT_LE_META_EVENT,
            Self::Unknown { event_code, .. } => *event_code,
        }
    }

    /// The status byte, for events that carry one
    pub fn status(&self) -> Option<u8> {
        match self {
            Self::CommandComplete(evt) => Some(evt.status),
            Self::CommandStatus(evt) => Some(evt.status),
            Self::DisconnectionComplete(evt) => Some(evt.status),
            Self::LeMeta(LeMetaEvent::ConnectionComplete(evt)) => Some(evt.status),
            Self::LeMeta(LeMetaEvent::ConnectionUpdateComplete(evt)) => Some(evt.status),
            Self::LeMeta(_) | Self::Unknown { .. } => None,
        }
    }

    /// Check whether this is a Command Complete for the given OGF and OCF
    pub fn is_command_complete(&self, ogf: u8, ocf: u16) -> bool {
        matches!(self, Self::CommandComplete(evt) if evt.is_for(ogf, ocf))
    }
}
