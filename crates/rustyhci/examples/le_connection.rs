//! Example: LE connection
//!
//! Connects to a peripheral, writes an ATT request once the connection
//! parameters are updated, and exits on disconnection.
//!
//! Usage: `le_connection <address> [public|random]`

use log::{info, warn};
use rustyhci::hci::constants::*;
use rustyhci::hci::{ConnectionParameters, HciCommand, HciEvent, HciFilter, HciPacket, HciSocket, LeMetaEvent};
use rustyhci::{BdAddr, TransportConfig};
use std::sync::{mpsc, Arc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let mut args = std::env::args().skip(1);
    let peer_addr: BdAddr = args.next().ok_or("missing peer address")?.parse()?;
    let peer_addr_type = match args.next().as_deref() {
        Some("random") => LE_RANDOM_ADDRESS,
        _ => LE_PUBLIC_ADDRESS,
    };

    let config = TransportConfig::default().with_filter(HciFilter::connection());
    let socket = Arc::new(HciSocket::open_with_config(0, config)?);
    let (done_tx, done_rx) = mpsc::channel();

    let weak = Arc::downgrade(&socket);
    socket.register_data_callback(move |frame| {
        match HciPacket::parse(&frame)? {
            HciPacket::Event(HciEvent::CommandStatus(status)) => {
                info!("Command {:#06x} status {:#04x}", status.opcode, status.status);
            }
            HciPacket::Event(HciEvent::LeMeta(LeMetaEvent::ConnectionComplete(conn))) => {
                info!(
                    "Connected to {} handle={:#06x} role={:?} interval={:?} timeout={:?}",
                    conn.peer_address,
                    conn.connection_handle,
                    conn.role,
                    conn.interval(),
                    conn.supervision_timeout()
                );
            }
            HciPacket::Event(HciEvent::LeMeta(LeMetaEvent::ConnectionUpdateComplete(update))) => {
                info!("Connection {:#06x} updated, interval={:?}", update.connection_handle, update.interval());
                if let Some(socket) = weak.upgrade() {
                    // ATT Exchange MTU request
                    socket.write_acl_data(update.connection_handle, &[0x02, 0x00, 0x01])?;
                }
            }
            HciPacket::AclData(acl) if acl.is_att() => {
                info!("ATT data on {:#06x}: {}", acl.handle, hex::encode(&acl.payload));
                if let Some(socket) = weak.upgrade() {
                    socket.send_command(&HciCommand::Disconnect {
                        handle: acl.handle,
                        reason: HCI_OE_USER_ENDED_CONNECTION,
                    })?;
                }
            }
            HciPacket::Event(HciEvent::DisconnectionComplete(disc)) => {
                info!("Disconnected {:#06x}, reason {:#04x}", disc.connection_handle, disc.reason);
                done_tx.send(())?;
            }
            HciPacket::Event(HciEvent::CommandComplete(complete)) if !complete.is_success() => {
                warn!("Command {:#06x} failed with status {:#04x}", complete.opcode, complete.status);
            }
            _ => {}
        }
        Ok(())
    });

    info!("Connecting to {}", peer_addr);
    socket.send_command(&HciCommand::LeCreateConnection {
        peer_addr,
        peer_addr_type,
        params: ConnectionParameters::default(),
    })?;

    done_rx.recv()?;
    socket.close();
    Ok(())
}
