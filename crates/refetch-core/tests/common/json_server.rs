//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers the first `fail_first` requests with `fail_status`, then serves a
//! fixed JSON body with 200. Counts every request it receives.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct JsonServerOptions {
    /// Number of leading requests that get `fail_status`.
    pub fail_first: u32,
    pub fail_status: u16,
    /// Delay before writing any response (simulates a slow upstream).
    pub delay: Duration,
}

impl Default for JsonServerOptions {
    fn default() -> Self {
        Self {
            fail_first: 0,
            fail_status: 503,
            delay: Duration::ZERO,
        }
    }
}

pub struct JsonServer {
    pub url: String,
    hits: Arc<AtomicU32>,
}

impl JsonServer {
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: &str, opts: JsonServerOptions) -> JsonServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body.to_string());
    let hits = Arc::new(AtomicU32::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let n = hits_srv.fetch_add(1, Ordering::SeqCst) + 1;
            thread::spawn(move || handle(stream, &body, n, opts));
        }
    });
    JsonServer {
        url: format!("http://127.0.0.1:{}/todos/1", port),
        hits,
    }
}

/// A URL on a port nobody listens on (connection refused).
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, body: &str, request_no: u32, opts: JsonServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 4096];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    if !opts.delay.is_zero() {
        thread::sleep(opts.delay);
    }
    let response = if request_no <= opts.fail_first {
        let msg = r#"{"error":"unavailable"}"#;
        format!(
            "HTTP/1.1 {} Failing\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            opts.fail_status,
            msg.len(),
            msg
        )
    } else {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    };
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
