//! Example: connectable LE advertising
//!
//! Advertises a local name with a scan response until Enter is pressed.

use log::info;
use rustyhci::gap::{AdvertisingDataBuilder, FLAG_BR_EDR_NOT_SUPPORTED, FLAG_LE_GENERAL_DISCOVERABLE};
use rustyhci::hci::{AdvertisingParameters, HciCommand, HciSocket};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let socket = HciSocket::open(0)?;

    let adv_data = AdvertisingDataBuilder::new()
        .flags(FLAG_LE_GENERAL_DISCOVERABLE | FLAG_BR_EDR_NOT_SUPPORTED)
        .complete_16bit_uuids(&[0x180F])
        .build()?;
    let scan_response = AdvertisingDataBuilder::new().complete_local_name("rustyhci").build()?;

    socket.send_command(&HciCommand::LeSetAdvertiseEnable { enable: false })?;
    socket.send_command(&HciCommand::LeSetAdvertisingParameters(AdvertisingParameters::default()))?;
    socket.send_command(&HciCommand::le_set_advertising_data(&adv_data)?)?;
    socket.send_command(&HciCommand::le_set_scan_response_data(&scan_response)?)?;
    socket.send_command(&HciCommand::LeSetAdvertiseEnable { enable: true })?;

    info!("Advertising, press Enter to stop...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    socket.send_command(&HciCommand::LeSetAdvertiseEnable { enable: false })?;
    socket.close();
    Ok(())
}
