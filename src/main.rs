//! can2ble firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Task layout:
//! - `softdevice_task` - runs the SoftDevice event loop.
//! - `can_source_task` - stands in for the CAN driver: pushes frames
//!   into `CAN_FRAMES`. Wire the real bus reader here.
//! - main loop - advertises, then per connection: services GATT events
//!   and streams registry-filtered CAN data until the peer drops.
//!
//! The PID registry is owned by the main loop. The GATT write handler
//! never touches it; decoded filter commands arrive over
//! `ble::FILTER_COMMANDS` and are drained strictly between registry
//! passes, so SoftDevice-context mutation can never interleave with an
//! iteration.

#![no_std]
#![no_main]

use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;
use nrf_softdevice::ble::peripheral;
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use can2ble::ble::gatt::Server;
use can2ble::ble::transport::{BleTransport, GattTransport};
use can2ble::ble::FILTER_COMMANDS;
use can2ble::config::{
    BLE_ADV_FAST_TIMEOUT_SECS, BLE_ADV_INTERVAL_FAST, BLE_DEVICE_NAME, MAIN_SERVICE_UUID,
    MAX_PID_ENTRIES,
};
use can2ble::pid::PidRegistry;
use can2ble::protocol::{encode_can_data, FilterStats, MAX_CAN_DATA_LEN};

/// One frame as read off the CAN bus.
struct CanFrame {
    pid: u32,
    data: Vec<u8, MAX_CAN_DATA_LEN>,
}

/// Frames from the CAN reader to the main loop.
static CAN_FRAMES: Channel<CriticalSectionRawMutex, CanFrame, 16> = Channel::new();

/// Per-entry bookkeeping: when we last notified this PID.
type Registry = PidRegistry<Option<Instant>, MAX_PID_ENTRIES>;

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Placeholder CAN source: a counter frame on a fixed PID plus a sweep
/// over a few others. Replace with the actual bus read path.
#[embassy_executor::task]
async fn can_source_task() {
    let mut counter: u32 = 0;
    loop {
        let pid = 0x100 + (counter % 4);
        let mut data = Vec::new();
        let _ = data.extend_from_slice(&counter.to_le_bytes());
        CAN_FRAMES.send(CanFrame { pid, data }).await;
        counter = counter.wrapping_add(1);
        Timer::after(Duration::from_millis(10)).await;
    }
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Drain pending filter commands. Called only between registry passes.
fn apply_filter_commands(registry: &mut Registry, stats: &mut FilterStats) {
    while let Ok(cmd) = FILTER_COMMANDS.try_receive() {
        match cmd.apply(registry) {
            Ok(()) => {
                stats.record_applied();
                info!("filter applied, {} PIDs tracked", registry.len());
            }
            Err(_) => {
                // Hard ceiling; invisible to the peer by protocol design.
                stats.record_registry_full();
                warn!("PID registry full, subscription dropped");
            }
        }
    }
}

/// Stream CAN data to the connected peer until it disconnects.
async fn stream_can_data(transport: &GattTransport<'_>, registry: &mut Registry) {
    let mut stats = FilterStats::new();

    while transport.is_connected() {
        apply_filter_commands(registry, &mut stats);

        let frame = CAN_FRAMES.receive().await;
        let Some(entry) = registry.lookup_or_create(frame.pid) else {
            continue; // Peer did not ask for this PID.
        };

        let now = Instant::now();
        let interval = Duration::from_millis(entry.update_interval_ms() as u64);
        let due = match entry.extra {
            None => true,
            Some(last_sent) => now - last_sent >= interval,
        };
        if !due {
            continue;
        }

        let payload = encode_can_data(frame.pid, &frame.data);
        match transport.send_notification(&payload) {
            Ok(()) => entry.extra = Some(now),
            // Peer gone or TX queue full; drop the frame and move on.
            Err(e) => warn!("notify failed: {}", e),
        }
    }

    info!(
        "session stats: {} applied, {} malformed, {} full-drops",
        stats.applied, stats.malformed, stats.registry_full
    );
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("can2ble starting");

    // The SoftDevice claims its interrupt priorities; stay clear of them.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = embassy_nrf::interrupt::Priority::P2;
    nrf_config.time_interrupt_priority = embassy_nrf::interrupt::Priority::P2;
    let _p = embassy_nrf::init(nrf_config);

    let sd = Softdevice::enable(&softdevice_config());

    static SERVER: StaticCell<Server> = StaticCell::new();
    let server = SERVER.init(unwrap!(Server::new(sd)));

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(can_source_task()));

    #[rustfmt::skip]
    let adv_data = &[
        0x02, raw::BLE_GAP_AD_TYPE_FLAGS as u8,
            raw::BLE_GAP_ADV_FLAGS_LE_ONLY_GENERAL_DISC_MODE as u8,
        0x03, raw::BLE_GAP_AD_TYPE_16BIT_SERVICE_UUID_COMPLETE as u8,
            (MAIN_SERVICE_UUID & 0xFF) as u8, (MAIN_SERVICE_UUID >> 8) as u8,
        0x08, raw::BLE_GAP_AD_TYPE_COMPLETE_LOCAL_NAME as u8,
            b'c', b'a', b'n', b'2', b'b', b'l', b'e',
    ];
    #[rustfmt::skip]
    let scan_data = &[
        0x03, raw::BLE_GAP_AD_TYPE_16BIT_SERVICE_UUID_COMPLETE as u8,
            (MAIN_SERVICE_UUID & 0xFF) as u8, (MAIN_SERVICE_UUID >> 8) as u8,
    ];

    let mut registry = Registry::new();

    loop {
        let config = peripheral::Config {
            interval: BLE_ADV_INTERVAL_FAST as u32,
            timeout: Some(BLE_ADV_FAST_TIMEOUT_SECS * 100), // 10 ms units
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data,
            scan_data,
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(peripheral::AdvertiseError::Timeout) => continue,
            Err(e) => {
                warn!("advertise error: {}", e);
                continue;
            }
        };
        info!("peer connected");

        let transport = GattTransport::new(server, &conn);
        let gatt = server.run(&conn);
        let stream = stream_can_data(&transport, &mut registry);

        match select(gatt, stream).await {
            Either::First(e) => info!("disconnected: {}", e),
            Either::Second(()) => info!("stream ended"),
        }

        // A reconnecting peer must not inherit stale subscriptions.
        registry.reset();
    }
}
