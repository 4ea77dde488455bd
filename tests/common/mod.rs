//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use forward_proxy::config::ProxyConfig;
use forward_proxy::net::Listener;
use forward_proxy::ProxyServer;

/// Build a minimal HTTP/1.0 response with the given body.
pub fn origin_response(body: &[u8]) -> Vec<u8> {
    let mut response =
        format!("HTTP/1.0 200 OK\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
    response.extend_from_slice(body);
    response
}

/// Start a mock origin on an ephemeral port that answers every request
/// with the same response. Returns the bound address and a counter of
/// accepted connections.
pub async fn start_mock_origin(response: Vec<u8>) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = response.clone();
                    tokio::spawn(async move {
                        let (read_half, mut write_half) = socket.into_split();
                        let mut reader = BufReader::new(read_half);
                        let mut line = String::new();
                        // Consume the request through the blank line
                        loop {
                            line.clear();
                            match reader.read_line(&mut line).await {
                                Ok(0) => break,
                                Ok(_) if line == "\r\n" => break,
                                Ok(_) => continue,
                                Err(_) => break,
                            }
                        }
                        let _ = write_half.write_all(&response).await;
                        let _ = write_half.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, connections)
}

/// Spawn a proxy on an ephemeral port and return its address.
pub async fn start_proxy(mut config: ProxyConfig) -> SocketAddr {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = ProxyServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}

/// Send a raw request to the proxy and collect the whole response.
pub async fn raw_request(proxy: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

/// Issue `GET <target> HTTP/1.0` through the proxy.
pub async fn http_get(proxy: SocketAddr, target: &str) -> Vec<u8> {
    raw_request(proxy, format!("GET {} HTTP/1.0\r\n\r\n", target).as_bytes()).await
}
