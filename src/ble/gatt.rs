//! GATT service definition and the filter-request write handler.
//!
//! The service layout is fixed by the companion app:
//!
//! | Characteristic | UUID   | Perms        |
//! |----------------|--------|--------------|
//! | CAN data       | 0x0001 | Read, Notify |
//! | Filter request | 0x0002 | Write        |

use defmt::{info, warn};
use heapless::Vec;
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::ble::Connection;

use crate::ble::FILTER_COMMANDS;
use crate::protocol::{FilterCommand, MAX_NOTIFY_LEN};

/// Longest well-formed filter request (opcode 2).
pub const MAX_FILTER_REQUEST_LEN: usize = 7;

#[nrf_softdevice::gatt_service(uuid = "1ff8")]
pub struct CanBusService {
    /// Outbound CAN data: 4-byte little-endian PID + up to 8 data bytes.
    #[characteristic(uuid = "0001", read, notify)]
    pub can_data: Vec<u8, MAX_NOTIFY_LEN>,

    /// Inbound filter requests from the companion app.
    #[characteristic(uuid = "0002", write, write_without_response)]
    pub filter_request: Vec<u8, MAX_FILTER_REQUEST_LEN>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub canbus: CanBusService,
}

impl Server {
    /// Service GATT events for one connection until it drops.
    ///
    /// Writes to the filter-request characteristic are decoded here, on
    /// the SoftDevice's context, and forwarded as commands; the registry
    /// itself is owned by the control loop and never touched from here.
    pub async fn run(&self, conn: &Connection) -> gatt_server::DisconnectedError {
        gatt_server::run(conn, self, |event| match event {
            ServerEvent::Canbus(e) => match e {
                CanBusServiceEvent::FilterRequestWrite(data) => {
                    match FilterCommand::decode(&data) {
                        Some(cmd) => {
                            if FILTER_COMMANDS.try_send(cmd).is_err() {
                                warn!("filter queue full, dropping command");
                            }
                        }
                        // No NACK primitive in the peer protocol; drop and
                        // wait for a well-formed frame.
                        None => warn!("malformed filter request dropped ({} bytes)", data.len()),
                    }
                }
                CanBusServiceEvent::CanDataCccdWrite { notifications } => {
                    info!("CAN data notifications {}", if notifications { "on" } else { "off" });
                }
            },
        })
        .await
    }
}
