//! Example: cycling a controller down and up
//!
//! Equivalent to `hciconfig hci0 down && hciconfig hci0 up`. Requires
//! CAP_NET_ADMIN.

use log::info;
use rustyhci::HciSocket;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let socket = HciSocket::open(0)?;

    let device = socket.device_info()?;
    info!("{} {} up={}", device.name, device.address, device.is_up());

    socket.device_down()?;
    info!("{} up={}", device.name, socket.device_info()?.is_up());

    socket.device_up()?;
    info!("{} up={}", device.name, socket.device_info()?.is_up());

    socket.close();
    Ok(())
}
