//! Integration tests for the HTTP server against a live listener.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use routewatch::http::RequestRouter;
use routewatch::lifecycle::Shutdown;
use routewatch::net::Server;
use routewatch::routes::{RouteEntry, RouteTable};

fn sample_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new("0.0.0.0", "0.0.0.0", 3, "192.168.0.1", 55),
        RouteEntry::new("127.0.0.0", "255.0.0.0", 1, "0.0.0.0", 331),
        RouteEntry::new("127.0.0.1", "255.255.255.255", 1, "0.0.0.0", 331),
    ]
}

/// Bind on an ephemeral port and run the server in the background.
async fn start_server(
    entries: Vec<RouteEntry>,
    read_timeout: Duration,
) -> (SocketAddr, Shutdown, Arc<Server>) {
    let table = Arc::new(ArcSwap::from_pointee(RouteTable::new(entries)));
    let router = Arc::new(RequestRouter::new(table));
    let server = Server::new(router, read_timeout);

    let listener = server.open("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    tokio::spawn(Arc::clone(&server).run(listener, shutdown.subscribe()));

    (addr, shutdown, server)
}

async fn read_to_eof(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let _ = stream.read_to_end(&mut raw).await;
    String::from_utf8_lossy(&raw).into_owned()
}

/// Read exactly one response (head plus Content-Length body) off a
/// keep-alive stream.
async fn read_one_response(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let head_end = raw.windows(4).position(|w| w == b"\r\n\r\n");
        if let Some(end) = head_end {
            let head = String::from_utf8_lossy(&raw[..end]).into_owned();
            let content_length: usize = head
                .lines()
                .find_map(|line| line.strip_prefix("Content-Length: "))
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            if raw.len() >= end + 4 + content_length {
                return String::from_utf8_lossy(&raw[..end + 4 + content_length]).into_owned();
            }
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert_ne!(n, 0, "stream closed mid-response");
        raw.extend_from_slice(&chunk[..n]);
    }
}

#[tokio::test]
async fn get_routes_returns_snapshot_as_synthetic_entries() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let response = client
        .get(format!("http://{addr}/routes"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let payload: serde_json::Value = response.json().await.unwrap();
    let object = payload.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["entry_0"]["destination"], "0.0.0.0");
    assert_eq!(object["entry_0"]["gateway"], "192.168.0.1");
    assert_eq!(object["entry_0"]["metric"], 55);
    assert_eq!(object["entry_2"]["mask"], "255.255.255.255");

    shutdown.trigger();
}

#[tokio::test]
async fn post_gets_fixed_bad_method_response_and_close() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /routes HTTP/1.1\r\nHost: x\r\nContent-Length: 2\r\n\r\n{}")
        .await
        .unwrap();

    // The bad-method response forces connection close, so EOF follows.
    let response = read_to_eof(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.ends_with("Unknown HTTP-method"));

    shutdown.trigger();
}

#[tokio::test]
async fn unknown_path_is_invalid_path() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let response = client
        .get(format!("http://{addr}/not-a-thing"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "invalid path");

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /routes HTTP/1.1\r\nHost: x\r\nContent-Length: 9\r\n\r\n{not json")
        .await
        .unwrap();

    let response = read_one_response(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("bad request"));

    shutdown.trigger();
}

#[tokio::test]
async fn keep_alive_serves_multiple_requests_on_one_connection() {
    let (addr, shutdown, server) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();

    for _ in 0..2 {
        stream
            .write_all(b"GET /routes HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        let response = read_one_response(&mut stream).await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Connection: keep-alive\r\n"));
    }

    // Both requests rode the same registered connection.
    assert_eq!(server.connection_count(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn head_returns_headers_without_body() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"HEAD /routes HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let response = read_to_eof(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    // Content-Length advertises the GET body, but none follows.
    let content_length: usize = response
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .and_then(|v| v.parse().ok())
        .unwrap();
    assert!(content_length > 2);
    assert!(response.ends_with("\r\n\r\n"));

    shutdown.trigger();
}

#[tokio::test]
async fn idle_connection_is_closed_at_the_read_deadline() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_millis(200)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // Send nothing; the deadline should close the stream.
    let started = tokio::time::Instant::now();
    let response = read_to_eof(&mut stream).await;
    assert!(response.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));

    shutdown.trigger();
}

#[tokio::test]
async fn slow_client_does_not_delay_other_connections() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    // A stalled client holding a half-written request.
    let mut slow = TcpStream::connect(addr).await.unwrap();
    slow.write_all(b"GET /routes HT").await.unwrap();

    // A well-behaved client must still be answered promptly.
    let started = tokio::time::Instant::now();
    let mut fast = TcpStream::connect(addr).await.unwrap();
    fast.write_all(b"GET /routes HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    let response = read_one_response(&mut fast).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "fast client was starved by the stalled one"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn shutdown_force_closes_live_connections() {
    let (addr, shutdown, server) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /routes HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    let _ = read_one_response(&mut stream).await;
    assert_eq!(server.connection_count(), 1);

    shutdown.trigger();

    // The connection observes the close signal and half-closes; the client
    // sees EOF.
    let eof = read_to_eof(&mut stream).await;
    assert!(eof.is_empty());

    // Deregistration drains the registry.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.connection_count(), 0);
}

#[tokio::test]
async fn concurrent_connections_each_complete_a_cycle() {
    let (addr, shutdown, _) = start_server(sample_routes(), Duration::from_secs(30)).await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        tasks.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /routes HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            read_to_eof(&mut stream).await
        }));
    }

    for task in tasks {
        let response = task.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    shutdown.trigger();
}
