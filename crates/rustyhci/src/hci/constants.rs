//! HCI protocol constants
//!
//! This module contains constants used in the Bluetooth HCI protocol and the
//! Linux raw HCI socket interface.

// Bluetooth socket constants
pub const AF_BLUETOOTH: libc::c_int = 31;
pub const BTPROTO_HCI: libc::c_int = 1;
pub const HCI_CHANNEL_RAW: u16 = 0;
pub const SOL_HCI: libc::c_int = 0;
pub const HCI_FILTER: libc::c_int = 2;

// HCI packet types
pub const HCI_COMMAND_PKT: u8 = 0x01;
pub const HCI_ACL_PKT: u8 = 0x02;
pub const HCI_SCO_PKT: u8 = 0x03;
pub const HCI_EVENT_PKT: u8 = 0x04;
pub const HCI_ISO_PKT: u8 = 0x05;

// Maximum size of HCI command parameters
pub const HCI_MAX_PARAM_LEN: usize = 255;

// Maximum size of an LE advertising or scan response payload
pub const LE_MAX_ADV_DATA_LEN: usize = 31;

// Header sizes, packet type byte included
pub const HCI_COMMAND_HDR_SIZE: usize = 4;
pub const HCI_EVENT_HDR_SIZE: usize = 3;
pub const HCI_ACL_HDR_SIZE: usize = 5;
pub const L2CAP_HDR_SIZE: usize = 4;

// Common OGF (Opcode Group Field) values
pub const OGF_LINK_CTL: u8 = 0x01;
pub const OGF_HOST_CTL: u8 = 0x03;
pub const OGF_INFO_PARAM: u8 = 0x04;
pub const OGF_LE: u8 = 0x08;

// Link Control Commands (OGF: 0x01)
pub const OCF_DISCONNECT: u16 = 0x0006;

// Host Controller Commands (OGF: 0x03)
pub const OCF_SET_EVENT_MASK: u16 = 0x0001;
pub const OCF_RESET: u16 = 0x0003;

// LE Command OCF values (OGF: 0x08)
pub const OCF_LE_SET_EVENT_MASK: u16 = 0x0001;
pub const OCF_LE_SET_ADVERTISING_PARAMETERS: u16 = 0x0006;
pub const OCF_LE_SET_ADVERTISING_DATA: u16 = 0x0008;
pub const OCF_LE_SET_SCAN_RESPONSE_DATA: u16 = 0x0009;
pub const OCF_LE_SET_ADVERTISE_ENABLE: u16 = 0x000A;
pub const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
pub const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;
pub const OCF_LE_CREATE_CONNECTION: u16 = 0x000D;
pub const OCF_LE_CREATE_CONNECTION_CANCEL: u16 = 0x000E;

/// Compose a 16-bit opcode from its group and command fields
pub const fn opcode(ogf: u8, ocf: u16) -> u16 {
    ((ogf as u16) << 10) | (ocf & 0x03ff)
}

pub const LE_SET_ADVERTISING_PARAMETERS_CMD: u16 = opcode(OGF_LE, OCF_LE_SET_ADVERTISING_PARAMETERS);
pub const LE_SET_ADVERTISING_DATA_CMD: u16 = opcode(OGF_LE, OCF_LE_SET_ADVERTISING_DATA);
pub const LE_SET_SCAN_RESPONSE_DATA_CMD: u16 = opcode(OGF_LE, OCF_LE_SET_SCAN_RESPONSE_DATA);
pub const LE_SET_ADVERTISE_ENABLE_CMD: u16 = opcode(OGF_LE, OCF_LE_SET_ADVERTISE_ENABLE);
pub const LE_SET_SCAN_PARAMETERS_CMD: u16 = opcode(OGF_LE, OCF_LE_SET_SCAN_PARAMETERS);
pub const LE_SET_SCAN_ENABLE_CMD: u16 = opcode(OGF_LE, OCF_LE_SET_SCAN_ENABLE);
pub const LE_CREATE_CONN_CMD: u16 = opcode(OGF_LE, OCF_LE_CREATE_CONNECTION);
pub const DISCONNECT_CMD: u16 = opcode(OGF_LINK_CTL, OCF_DISCONNECT);

// HCI Events
pub const EVT_DISCONN_COMPLETE: u8 = 0x05;
pub const EVT_CMD_COMPLETE: u8 = 0x0E;
pub const EVT_CMD_STATUS: u8 = 0x0F;
pub const EVT_LE_META_EVENT: u8 = 0x3E;

// LE Meta Events
pub const EVT_LE_CONN_COMPLETE: u8 = 0x01;
pub const EVT_LE_ADVERTISING_REPORT: u8 = 0x02;
pub const EVT_LE_CONN_UPDATE_COMPLETE: u8 = 0x03;

// Status and reason codes
pub const HCI_SUCCESS: u8 = 0x00;
pub const HCI_OE_USER_ENDED_CONNECTION: u8 = 0x13;

// LE scan / address parameters
pub const SCAN_TYPE_PASSIVE: u8 = 0x00;
pub const SCAN_TYPE_ACTIVE: u8 = 0x01;
pub const LE_PUBLIC_ADDRESS: u8 = 0x00;
pub const LE_RANDOM_ADDRESS: u8 = 0x01;
pub const FILTER_POLICY_NO_WHITELIST: u8 = 0x00;

// L2CAP fixed channels
pub const ATT_CID: u16 = 0x0004;

// Device control requests: _IOW('H', 201, int), _IOW('H', 202, int), _IOR('H', 211, int)
const IOC_WRITE: libc::c_ulong = 1;
const IOC_READ: libc::c_ulong = 2;

const fn ioc(dir: libc::c_ulong, nr: libc::c_ulong) -> libc::c_ulong {
    (dir << 30) | ((std::mem::size_of::<libc::c_int>() as libc::c_ulong) << 16) | ((b'H' as libc::c_ulong) << 8) | nr
}

pub const HCIDEVUP: libc::c_ulong = ioc(IOC_WRITE, 201);
pub const HCIDEVDOWN: libc::c_ulong = ioc(IOC_WRITE, 202);
pub const HCIGETDEVINFO: libc::c_ulong = ioc(IOC_READ, 211);

// Size of `struct hci_dev_info` in the kernel's native layout
pub const HCI_DEV_INFO_SIZE: usize = 92;

/// Size field of an ioctl request code (bits 16..30)
pub const fn ioc_size(request: libc::c_ulong) -> usize {
    ((request >> 16) & 0x3fff) as usize
}
