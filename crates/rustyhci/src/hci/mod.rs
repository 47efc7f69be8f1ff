//! Bluetooth HCI (Host Controller Interface) implementation
//!
//! This module provides the raw socket transport and the codecs for the
//! command, event and ACL data packets exchanged over it.

pub mod acl;
pub mod command;
pub mod constants;
pub mod event;
pub mod filter;
pub mod socket;


pub use acl::{AclFlags, AclPacket};
pub use command::{AdvertisingData, AdvertisingParameters, ConnectionParameters, HciCommand, RawCommand};
pub use event::{
    CommandComplete, CommandStatus, DisconnectionComplete, HciEvent, HciPacket, LeConnectionComplete,
    LeConnectionUpdateComplete, LeMetaEvent, ScanResult,
};
pub use filter::HciFilter;
pub use socket::{CallbackHandle, CallbackResult, DataCallback, DeviceInfo, HciSocket};
