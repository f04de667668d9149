#![allow(clippy::unwrap_used)]
// Loopback tests for Govee LAN discovery. A local UDP responder stands
// in for lamps on the multicast group.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::net::UdpSocket;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netnest_sources::DeviceStatus;
use netnest_sources::govee::{GoveeClient, GoveeConfig};

// ── Helpers ─────────────────────────────────────────────────────────

/// Binds a loopback UDP socket and answers the first scan request with
/// each canned reply after its delay. Returns the bound port.
async fn spawn_responder(replies: Vec<(Duration, String)>) -> u16 {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        let Ok((_, from)) = socket.recv_from(&mut buf).await else {
            return;
        };
        for (delay, reply) in replies {
            tokio::time::sleep(delay).await;
            // The requester may be gone by the time a late reply fires.
            let _ = socket.send_to(reply.as_bytes(), from).await;
        }
    });
    port
}

fn lan_config(port: u16, window: Duration) -> GoveeConfig {
    GoveeConfig {
        enabled: true,
        lan_discovery: true,
        lan_multicast_addr: Ipv4Addr::LOCALHOST,
        lan_multicast_port: port,
        lan_listen_port: 0,
        lan_timeout: window,
        ..GoveeConfig::default()
    }
}

fn scan_reply(ip: &str, device: &str, sku: &str) -> String {
    json!({"msg": {"cmd": "scan", "data": {"ip": ip, "device": device, "sku": sku}}})
        .to_string()
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_replies_within_window_are_collected() {
    let port = spawn_responder(vec![
        (
            Duration::from_millis(50),
            scan_reply("192.168.1.50", "AA:BB", "H6159"),
        ),
        (
            Duration::from_millis(100),
            scan_reply("192.168.1.51", "CC:DD", "H5080"),
        ),
    ])
    .await;

    let client = GoveeClient::new(lan_config(port, Duration::from_millis(600))).unwrap();
    let inventory = client.fetch_devices().await.unwrap();

    assert_eq!(inventory.total, 2);
    let lamp = &inventory.devices[0];
    assert_eq!(lamp.name, "H6159");
    assert_eq!(lamp.identity, "AA:BB");
    assert_eq!(lamp.address, "192.168.1.50");
    assert_eq!(lamp.source, "lan");
    assert_eq!(lamp.status, Some(DeviceStatus::Online));
    assert!(lamp.controllable);
    assert_eq!(inventory.devices[1].identity, "CC:DD");
}

#[tokio::test]
async fn test_late_reply_does_not_extend_window() {
    let port = spawn_responder(vec![
        (
            Duration::from_millis(100),
            scan_reply("192.168.1.50", "AA:BB", "H6159"),
        ),
        // Fires well after the window closes.
        (
            Duration::from_millis(800),
            scan_reply("192.168.1.51", "CC:DD", "H5080"),
        ),
    ])
    .await;

    let client = GoveeClient::new(lan_config(port, Duration::from_millis(400))).unwrap();
    let started = Instant::now();
    let inventory = client.fetch_devices().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(inventory.total, 1);
    assert_eq!(inventory.devices[0].identity, "AA:BB");
    assert!(elapsed >= Duration::from_millis(400));
    assert!(elapsed < Duration::from_millis(1400));
}

#[tokio::test]
async fn test_silent_network_yields_empty_inventory_after_window() {
    let port = spawn_responder(Vec::new()).await;

    let window = Duration::from_millis(300);
    let client = GoveeClient::new(lan_config(port, window)).unwrap();
    let started = Instant::now();
    let inventory = client.fetch_devices().await.unwrap();

    assert_eq!(inventory.total, 0);
    assert!(started.elapsed() >= window);
}

#[tokio::test]
async fn test_garbage_datagrams_are_skipped() {
    let port = spawn_responder(vec![
        (Duration::from_millis(30), "not json at all".into()),
        (
            Duration::from_millis(60),
            json!({"msg": {"cmd": "devStatus", "data": {}}}).to_string(),
        ),
        (
            Duration::from_millis(90),
            scan_reply("192.168.1.50", "AA:BB", "H6159"),
        ),
    ])
    .await;

    let client = GoveeClient::new(lan_config(port, Duration::from_millis(500))).unwrap();
    let inventory = client.fetch_devices().await.unwrap();

    assert_eq!(inventory.total, 1);
    assert_eq!(inventory.devices[0].identity, "AA:BB");
}

// ── Merge with the cloud channel ────────────────────────────────────

#[tokio::test]
async fn test_cloud_entry_wins_over_lan_duplicate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/router/api/v1/user/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"devices": [
                {"device": "AA:BB", "model": "H6159", "deviceName": "Desk strip"},
            ]}
        })))
        .mount(&server)
        .await;

    let port = spawn_responder(vec![(
        Duration::from_millis(50),
        scan_reply("192.168.1.50", "AA:BB", "H6159"),
    )])
    .await;

    let mut cfg = lan_config(port, Duration::from_millis(400));
    cfg.api_key = "test-key".to_string().into();
    cfg.openapi_base = server.uri();
    cfg.legacy_base = server.uri();

    let client = GoveeClient::new(cfg).unwrap();
    let inventory = client.fetch_devices().await.unwrap();

    assert_eq!(inventory.total, 1);
    assert_eq!(inventory.devices[0].source, "cloud");
    assert_eq!(inventory.devices[0].name, "Desk strip");
}
