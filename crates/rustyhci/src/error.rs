//! Error types for the rustyhci library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

pub use crate::eddystone::EddystoneError;

/// Errors that can occur when working with HCI sockets and HCI packets
#[derive(Error, Debug)]
pub enum HciError {
    #[error("Failed to open HCI socket: {0}")]
    SocketError(std::io::Error),

    #[error("HCI device {dev_id} unavailable: {source}")]
    DeviceUnavailable {
        dev_id: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("HCI socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HCI socket is closed")]
    Closed,

    #[error("Payload too long: {len} bytes (max {max})")]
    PayloadTooLong { len: usize, max: usize },

    #[error("Truncated HCI packet: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("Invalid parameter length: {0}")]
    InvalidParamLength(usize),

    #[error("Invalid value {value:#04x} for {field}")]
    InvalidValue { field: &'static str, value: u8 },

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Control buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(&'static str),
}

impl HciError {
    /// Returns `true` for failures of the socket itself, as opposed to codec failures
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::SocketError(_) | Self::DeviceUnavailable { .. } | Self::Io(_) | Self::Closed
        )
    }
}

/// Umbrella error for callers mixing transport and beacon operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Hci(#[from] HciError),

    #[error(transparent)]
    Eddystone(#[from] EddystoneError),
}

pub type Result<T> = std::result::Result<T, HciError>;
