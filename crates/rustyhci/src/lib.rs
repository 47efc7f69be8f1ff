//! RustyHCI - A Rust library for raw Bluetooth HCI communication
//!
//! This library drives a Bluetooth controller directly over a raw HCI socket
//! on Linux, without going through a Bluetooth daemon. It provides the socket
//! transport with a background reader, builders for the LE advertising,
//! scanning and connection commands, an event decoder, and the Eddystone-URL
//! beacon codec.

pub mod config;
pub mod eddystone;
pub mod error;
pub mod gap;
pub mod hci;

// Re-export common types for convenience
pub use config::TransportConfig;
pub use eddystone::{build_advertisement, encode_url, EddystoneError};
pub use error::{Error, HciError};
pub use gap::{AddressType, AdvertisingDataBuilder, AdvertisingType, BdAddr};
pub use hci::{HciCommand, HciEvent, HciFilter, HciPacket, HciSocket, ScanResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_hci_socket() {
        // This test will only pass if run with sufficient privileges
        // and if a Bluetooth adapter is available
        let result = HciSocket::open(0);

        // We don't assert here because the test might fail in environments
        // without Bluetooth hardware or sufficient privileges
        match result {
            Ok(socket) => {
                assert!(socket.is_open());
                socket.close();
                assert!(!socket.is_open());
            }
            Err(e) => assert!(e.is_io()),
        }
    }
}
