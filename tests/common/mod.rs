//! Shared fixtures: a mock upstream and a log capture buffer

#![allow(dead_code)]

use axum::{Router, extract::Path, http::StatusCode, routing::get};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Serves:
/// - `/hello/{date}` -> 200 `hello`
/// - `/echo/{date}` -> 200 `price data for {date}`
/// - `/missing/{date}` -> 404
/// - `/large/{date}` -> 200 with 4 KiB of zeros
pub async fn start_mock_server() -> String {
    let app = Router::new()
        .route("/hello/{date}", get(|| async { "hello" }))
        .route(
            "/echo/{date}",
            get(|Path(date): Path<String>| async move { format!("price data for {date}") }),
        )
        .route(
            "/missing/{date}",
            get(|| async { (StatusCode::NOT_FOUND, "no data yet") }),
        )
        .route("/large/{date}", get(|| async { vec![0u8; 4096] }));

    // Bind to random available port
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", bound_addr)
}

/// A port nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Collects formatted log output for assertions
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
