//! Kernel-side HCI socket filter

use crate::hci::constants::*;

/// Mirror of the kernel's `struct hci_ufilter`.
///
/// Only frames whose packet type bit is set in `type_mask` and, for events,
/// whose event code bit is set in `event_mask` reach the socket.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HciFilter {
    pub type_mask: u32,
    pub event_mask: [u32; 2],
    pub opcode: u16,
}

impl HciFilter {
    /// A filter that lets nothing through
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_masks(type_mask: u32, event_mask1: u32, event_mask2: u32, opcode: u16) -> Self {
        Self {
            type_mask,
            event_mask: [event_mask1, event_mask2],
            opcode,
        }
    }

    /// Accept packets of the given type
    pub fn packet_type(mut self, packet_type: u8) -> Self {
        self.type_mask |= 1 << (packet_type & 31);
        self
    }

    /// Accept events with the given code; codes 32 and up land in the second mask
    pub fn event(mut self, event_code: u8) -> Self {
        let bit = (event_code & 63) as usize;
        self.event_mask[bit / 32] |= 1 << (bit % 32);
        self
    }

    /// Only accept Command Complete / Command Status events for this opcode
    pub fn opcode(mut self, opcode: u16) -> Self {
        self.opcode = opcode;
        self
    }

    pub fn accepts_packet_type(&self, packet_type: u8) -> bool {
        self.type_mask & (1 << (packet_type & 31)) != 0
    }

    pub fn accepts_event(&self, event_code: u8) -> bool {
        let bit = (event_code & 63) as usize;
        self.event_mask[bit / 32] & (1 << (bit % 32)) != 0
    }

    /// Command results and LE meta events
    pub fn scanning() -> Self {
        Self::new()
            .packet_type(HCI_EVENT_PKT)
            .event(EVT_CMD_COMPLETE)
            .event(EVT_CMD_STATUS)
            .event(EVT_LE_META_EVENT)
    }

    /// Everything needed to drive a connection: events plus ACL data
    pub fn connection() -> Self {
        Self::scanning()
            .packet_type(HCI_ACL_PKT)
            .event(EVT_DISCONN_COMPLETE)
    }
}
