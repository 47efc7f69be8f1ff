//! Example: Eddystone-URL beacon
//!
//! Advertises a compressed URL as a non-connectable Eddystone beacon until
//! Enter is pressed.

use log::info;
use rustyhci::eddystone::build_advertisement;
use rustyhci::hci::{AdvertisingParameters, HciCommand, HciSocket};

const URL: &str = "https://www.thebubbleworks.com/";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let socket = HciSocket::open(0)?;

    let payload = build_advertisement(URL)?;
    info!("Advertising {} as {}", URL, hex::encode(&payload));

    socket.send_command(&HciCommand::LeSetAdvertiseEnable { enable: false })?;
    socket.send_command(&HciCommand::LeSetAdvertisingParameters(AdvertisingParameters {
        advertising_type: 0x03, // ADV_NONCONN_IND
        ..AdvertisingParameters::default()
    }))?;
    socket.send_command(&HciCommand::le_set_advertising_data(&payload)?)?;
    socket.send_command(&HciCommand::LeSetAdvertiseEnable { enable: true })?;

    info!("Press Enter to stop advertising...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    socket.send_command(&HciCommand::LeSetAdvertiseEnable { enable: false })?;
    socket.close();
    Ok(())
}
