//! Example: LE scanning
//!
//! Runs an active scan and logs every advertising report until Enter is
//! pressed.

use log::{info, warn};
use rustyhci::hci::constants::*;
use rustyhci::hci::{HciCommand, HciEvent, HciFilter, HciPacket, HciSocket, LeMetaEvent};
use rustyhci::TransportConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let config = TransportConfig::default().with_filter(HciFilter::scanning());
    let socket = HciSocket::open_with_config(0, config)?;

    socket.register_data_callback(|frame| {
        match HciPacket::parse(&frame)? {
            HciPacket::Event(HciEvent::LeMeta(LeMetaEvent::AdvertisingReport(report))) => {
                info!(
                    "{} ({:?}) {} rssi={} eir={}",
                    report.address,
                    report.address_type,
                    report.advertising_type,
                    report.rssi,
                    hex::encode(&report.eir)
                );
                for (ad_type, data) in report.ad_structures() {
                    info!("  AD {:#04x}: {}", ad_type, hex::encode(data));
                }
            }
            HciPacket::Event(HciEvent::CommandComplete(complete)) if !complete.is_success() => {
                warn!("Command {:#06x} failed with status {:#04x}", complete.opcode, complete.status);
            }
            _ => {}
        }
        Ok(())
    });

    socket.send_command(&HciCommand::LeSetScanEnable {
        enable: false,
        filter_duplicates: true,
    })?;
    socket.send_command(&HciCommand::LeSetScanParameters {
        scan_type: SCAN_TYPE_ACTIVE,
        scan_interval: 0x0010,
        scan_window: 0x0010,
        own_address_type: LE_PUBLIC_ADDRESS,
        filter_policy: FILTER_POLICY_NO_WHITELIST,
    })?;
    socket.send_command(&HciCommand::LeSetScanEnable {
        enable: true,
        filter_duplicates: true,
    })?;

    info!("Scanning, press Enter to stop...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    socket.send_command(&HciCommand::LeSetScanEnable {
        enable: false,
        filter_duplicates: true,
    })?;
    socket.close();
    Ok(())
}
