//! A canned OSRM endpoint served from a local socket.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// What the canned server answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer every request with `status` and `body`.
    Respond { status: u16, body: String },
    /// Accept connections but never answer.
    Silent,
}

/// A local HTTP server replaying a single [`Reply`].
#[derive(Debug)]
pub struct CannedServer {
    base_url: String,
    paths: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    /// Bind an ephemeral port on `runtime` and serve `reply` until the runtime stops.
    pub fn start(runtime: &Runtime, reply: Reply) -> Self {
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind canned server");
        let address = listener.local_addr().expect("local address");
        let paths = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&paths);
        runtime.spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let reply = reply.clone();
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let mut buffer = vec![0_u8; 8192];
                    let read = socket.read(&mut buffer).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default());
                    if let Some(path) = request.split_whitespace().nth(1) {
                        recorded
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(path.to_owned());
                    }
                    match reply {
                        Reply::Respond { status, body } => {
                            let response = format!(
                                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\n\
                                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                                body.len()
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        Reply::Silent => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                });
            }
        });
        Self {
            base_url: format!("http://{address}"),
            paths,
        }
    }

    /// Base URL to configure the routing service with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request paths received so far, including query strings.
    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A base URL on which nothing listens.
pub fn unreachable_base_url(runtime: &Runtime) -> String {
    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .expect("bind probe listener");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{address}")
}

/// A two-step route from the Nest to CIRS with two interior vertices.
pub const NEST_TO_CIRS: &str = r#"{
    "code": "Ok",
    "routes": [{
        "geometry": {
            "type": "LineString",
            "coordinates": [[-123.25, 49.2665], [-123.2512, 49.2651], [-123.2525, 49.2634], [-123.2531, 49.2621]]
        },
        "legs": [{
            "steps": [
                {"name": "Main Mall", "distance": 120.4, "maneuver": {"type": "depart"}},
                {"name": "Agronomy Road", "distance": 80.0, "maneuver": {"type": "turn", "modifier": "left"}},
                {"name": "", "distance": 0.0, "maneuver": {"type": "arrive"}}
            ]
        }]
    }]
}"#;
