//! Local stand-in for the listing site, so fetcher tests never leave the machine.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct StubServer {
    pub url: String,
    handle: JoinHandle<String>,
}

impl StubServer {
    /// Raw request head received by the server
    pub async fn request(self) -> String {
        self.handle.await.expect("stub server task panicked")
    }
}

/// Answer exactly one HTTP request with the given status line, content type and body
pub async fn serve_once(status: &'static str, content_type: &'static str, body: &'static str) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");

        let mut received = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.expect("read request");
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
            if received.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&received).to_string()
    });

    StubServer {
        url: format!("http://{}/", addr),
        handle,
    }
}

/// URL of a local port with nothing listening on it
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}/", addr)
}
