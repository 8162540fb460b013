//! Test helpers: mock SeaweedFS servers and clients pointed at them.
//!
//! Run from workspace root: `cargo test -p seaweed-client`. One mockito
//! server usually plays master and volume server at once; lookups answer
//! with the mock's own address.

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use seaweed_client::{FilerClient, SeaweedClient};
use seaweed_core::{ClientConfig, FilerConfig};
use serde_json::json;

/// File id on volume 3, as issued by a master.
pub const FID: &str = "3,01637037d6";

pub fn config_for(server: &ServerGuard) -> ClientConfig {
    let address = server.host_with_port();
    let (host, port) = address
        .rsplit_once(':')
        .expect("mock server address has a port");
    ClientConfig::new(host, Some(port.parse().expect("mock server port is numeric")))
}

pub fn master_client(server: &ServerGuard) -> SeaweedClient {
    SeaweedClient::new(config_for(server)).expect("valid master config")
}

pub fn filer_client(server: &ServerGuard) -> FilerClient {
    FilerClient::new(FilerConfig(config_for(server))).expect("valid filer config")
}

/// Lookup of `volume_id` answering with the given locations.
pub async fn mock_lookup_at(
    server: &mut ServerGuard,
    volume_id: u32,
    locations: serde_json::Value,
) -> Mock {
    lookup_mock(server, volume_id, locations).create_async().await
}

/// Lookup of `volume_id` pointing back at the mock server itself.
pub async fn mock_lookup(server: &mut ServerGuard, volume_id: u32) -> Mock {
    let locations = self_location(server);
    mock_lookup_at(server, volume_id, locations).await
}

/// Like [`mock_lookup`], but expecting exactly `hits` lookups.
pub async fn mock_lookup_expecting(server: &mut ServerGuard, volume_id: u32, hits: usize) -> Mock {
    let locations = self_location(server);
    lookup_mock(server, volume_id, locations)
        .expect(hits)
        .create_async()
        .await
}

fn self_location(server: &ServerGuard) -> serde_json::Value {
    let address = server.host_with_port();
    json!([{ "url": address, "publicUrl": address, "dataCenter": "dc1" }])
}

fn lookup_mock(server: &mut ServerGuard, volume_id: u32, locations: serde_json::Value) -> Mock {
    server
        .mock("GET", "/dir/lookup")
        .match_query(Matcher::UrlEncoded(
            "volumeId".into(),
            volume_id.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "volumeId": volume_id.to_string(), "locations": locations }).to_string())
}

/// Filer listing body with one file entry per name.
pub fn listing_body(dir: &str, names: &[&str], limit: u32) -> String {
    let entries: Vec<_> = names
        .iter()
        .map(|name| {
            json!({
                "FullPath": format!("{}/{}", dir, name),
                "Mtime": "2024-03-01T10:00:00Z",
                "Mode": 432,
                "FileSize": 8,
                "chunks": [{ "file_id": FID, "size": 8 }]
            })
        })
        .collect();

    json!({
        "Path": dir,
        "Entries": if entries.is_empty() { serde_json::Value::Null } else { json!(entries) },
        "Limit": limit,
        "LastFileName": names.last().copied().unwrap_or(""),
        "ShouldDisplayLoadMore": names.len() as u32 >= limit
    })
    .to_string()
}
