//! The real listener: HTTP/1.1 over a local socket and graceful shutdown

use stashmark_core::MemoryBookmarkStore;
use stashmark_server::{build_app, ServerConfig};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn send(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).to_lowercase()
}

#[tokio::test]
async fn test_serves_over_tcp_until_shutdown() {
    let store = MemoryBookmarkStore::new();
    let app = build_app(&ServerConfig::default(), Arc::new(store.clone())).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(app.serve(listener, async move {
        let _ = stopped.await;
    }));

    let sw = send(
        addr,
        "GET /assets/js/sw.js HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(sw.starts_with("http/1.1 200"));
    assert!(sw.contains("cache-control: no-store, no-cache, must-revalidate, max-age=0"));
    assert!(sw.contains("service-worker-allowed: /"));

    let body = "url=https%3A%2F%2Fexample.com%2F%3Futm_medium%3Dsocial";
    let created = send(
        addr,
        &format!(
            "POST /api/v1/pwa/share-target HTTP/1.1\r\nHost: localhost\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
    )
    .await;
    assert!(created.starts_with("http/1.1 201"));
    assert_eq!(store.get(1).unwrap().url, "https://example.com/");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
