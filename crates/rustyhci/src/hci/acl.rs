//! HCI ACL data packets carrying a basic L2CAP frame

use crate::error::HciError;
use crate::hci::constants::*;
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

bitflags! {
    /// Packet boundary and broadcast flags, the top four bits of the handle field
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AclFlags: u8 {
        /// Continuing fragment of a higher layer message
        const PB_CONTINUING = 0b0001;
        /// First fragment, automatically flushable
        const PB_START_FLUSHABLE = 0b0010;
        /// Active peripheral broadcast
        const BC_ACTIVE_BROADCAST = 0b0100;
    }
}

/// An ACL data packet with its L2CAP basic header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclPacket {
    /// Connection handle (12 bits)
    pub handle: u16,
    pub flags: AclFlags,
    /// L2CAP channel identifier
    pub channel_id: u16,
    pub payload: Vec<u8>,
}

impl AclPacket {
    /// Full frame size up to and including the channel id
    pub const MIN_FRAME_LEN: usize = HCI_ACL_HDR_SIZE + L2CAP_HDR_SIZE;

    /// An ATT payload for `handle`, sent as a first non-flushable fragment
    pub fn new(handle: u16, payload: Vec<u8>) -> Self {
        Self {
            handle: handle & 0x0fff,
            flags: AclFlags::empty(),
            channel_id: ATT_CID,
            payload,
        }
    }

    /// Returns `true` if this packet carries Attribute Protocol data
    pub fn is_att(&self) -> bool {
        self.channel_id == ATT_CID
    }

    /// Serialize to a complete frame, packet type indicator included
    pub fn to_packet(&self) -> Result<Vec<u8>, HciError> {
        let max = u16::MAX as usize - L2CAP_HDR_SIZE;
        if self.payload.len() > max {
            return Err(HciError::PayloadTooLong {
                len: self.payload.len(),
                max,
            });
        }

        let l2cap_len = self.payload.len() as u16;
        let handle_field = (self.handle & 0x0fff) | ((self.flags.bits() as u16) << 12);

        let mut packet = Vec::with_capacity(Self::MIN_FRAME_LEN + self.payload.len());
        packet.push(HCI_ACL_PKT);
        packet.write_u16::<LittleEndian>(handle_field)?;
        packet.write_u16::<LittleEndian>(l2cap_len + L2CAP_HDR_SIZE as u16)?;
        packet.write_u16::<LittleEndian>(l2cap_len)?;
        packet.write_u16::<LittleEndian>(self.channel_id)?;
        packet.extend_from_slice(&self.payload);
        Ok(packet)
    }

    /// Parse a complete frame, packet type indicator included
    pub fn parse(frame: &[u8]) -> Result<Self, HciError> {
        if frame.len() < Self::MIN_FRAME_LEN {
            return Err(HciError::Truncated {
                needed: Self::MIN_FRAME_LEN,
                actual: frame.len(),
            });
        }
        if frame[0] != HCI_ACL_PKT {
            return Err(HciError::InvalidValue {
                field: "packet type",
                value: frame[0],
            });
        }

        let mut cursor = Cursor::new(&frame[1..]);
        let handle_field = cursor.read_u16::<LittleEndian>()?;
        let _total_length = cursor.read_u16::<LittleEndian>()?;
        let _l2cap_length = cursor.read_u16::<LittleEndian>()?;
        let channel_id = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            handle: handle_field & 0x0fff,
            flags: AclFlags::from_bits_retain((handle_field >> 12) as u8),
            channel_id,
            payload: frame[Self::MIN_FRAME_LEN..].to_vec(),
        })
    }
}
