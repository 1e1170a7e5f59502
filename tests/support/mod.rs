#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aquadiary::{
    AquaClient, ApiConfig, ConnectivitySignal, KeyValueStore, MemoryStore, SessionCredentials,
    UserSummary,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("recorded body should be JSON")
    }
}

/// Local HTTP server answering each request with the next scripted
/// response, in arrival order, and recording what it received.
pub struct ScriptedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn new(scripts: Vec<(u16, Value)>) -> Self {
        let scripts = Arc::new(scripts);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let base_url = format!("http://{addr}/api");

        let handle = tokio::spawn({
            let scripts = Arc::clone(&scripts);
            let requests = Arc::clone(&requests);

            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    let scripts = Arc::clone(&scripts);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        serve_one(socket, scripts, requests).await;
                    });
                }
            }
        });

        Self {
            base_url,
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: Arc<Vec<(u16, Value)>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Ok(Some(request)) = read_request(&mut socket).await else {
        return;
    };

    let index = {
        let mut requests = requests.lock().expect("requests lock");
        requests.push(request);
        requests.len() - 1
    };
    let (status, body) = scripts.get(index).cloned().unwrap_or_else(|| {
        (
            500,
            serde_json::json!({"message": format!("unexpected request #{index}")}),
        )
    });
    write_response(&mut socket, status, &body).await;
}

/// Write a JSON response and close the connection.
pub async fn write_response(socket: &mut TcpStream, status: u16, body: &Value) {
    let body = body.to_string();
    let reason = match status {
        200 => "OK",
        201 => "Created",
        401 => "Unauthorized",
        _ => "Error",
    };
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len(),
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    let _ = socket.write_all(body.as_bytes()).await;
    let _ = socket.shutdown().await;
}

pub async fn read_request(socket: &mut TcpStream) -> std::io::Result<Option<RecordedRequest>> {
    let mut raw = Vec::new();
    let mut buffer = [0_u8; 2048];

    let header_end = loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Ok(None);
        }
        raw.extend_from_slice(&buffer[..n]);
        if let Some(position) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_owned();
    let path = request_line.next().unwrap_or_default().to_owned();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_owned()))
        .collect::<Vec<_>>();
    let content_length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = raw[header_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buffer[..n]);
    }

    Ok(Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}

pub struct Harness {
    pub client: Arc<AquaClient>,
    pub store: Arc<MemoryStore>,
    pub connectivity: Arc<ConnectivitySignal>,
}

pub fn harness(base_url: &str, connected: bool) -> Harness {
    harness_with_store(base_url, connected, Arc::new(MemoryStore::new()))
}

pub fn harness_with_store(base_url: &str, connected: bool, store: Arc<MemoryStore>) -> Harness {
    let connectivity = Arc::new(ConnectivitySignal::new(connected));
    let config = ApiConfig::new(base_url).with_timeout(Duration::from_secs(5));
    let shared: Arc<dyn KeyValueStore> = store.clone();
    let client = AquaClient::new(config, shared, connectivity.clone()).expect("client");
    Harness {
        client: Arc::new(client),
        store,
        connectivity,
    }
}

pub fn credentials(access_token: &str, refresh_token: &str) -> SessionCredentials {
    SessionCredentials {
        access_token: access_token.to_owned(),
        refresh_token: refresh_token.to_owned(),
        user: UserSummary {
            id: "u-1".to_owned(),
            email: "keeper@example.com".to_owned(),
            first_name: Some("Ada".to_owned()),
            last_name: None,
        },
    }
}

/// Poll `condition` until it holds or a generous deadline passes.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let polled = timeout(Duration::from_secs(5), async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "condition not reached before deadline");
}

/// Await `future`, failing the test instead of hanging forever.
pub async fn within<F: Future>(future: F) -> F::Output {
    timeout(Duration::from_secs(5), future)
        .await
        .expect("future should complete before deadline")
}
