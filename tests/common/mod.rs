// Shared test helpers: a scripted SystemSource and an in-process ingest receiver.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use hostpulse::models::*;
use hostpulse::source::SystemSource;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MB: u64 = 1024 * 1024;
pub const GB: u64 = 1024 * 1024 * 1024;

pub fn fs(mount: &str, size_bytes: u64, usage_percent: f64) -> FilesystemUsage {
    FilesystemUsage {
        mount: mount.to_string(),
        size_bytes,
        usage_percent,
    }
}

/// Scripted readings plus per-query call counters.
pub struct FakeSource {
    pub os: OsIdentity,
    pub cpu: CpuIdentity,
    pub cpu_load: Mutex<f64>,
    pub memory: MemoryReading,
    pub filesystems: Vec<FilesystemUsage>,
    pub network: Mutex<Option<NetworkCounters>>,
    /// Applied to the identity queries, to widen first-call races.
    pub identity_delay: Duration,
    pub fail_cpu_load: AtomicBool,
    pub fail_os_identity: AtomicBool,
    pub fail_filesystems: AtomicBool,
    pub fail_network: AtomicBool,
    pub os_identity_calls: AtomicUsize,
    pub cpu_identity_calls: AtomicUsize,
    pub memory_calls: AtomicUsize,
    pub filesystems_calls: AtomicUsize,
    pub network_calls: AtomicUsize,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            os: OsIdentity {
                hostname: "web-01".into(),
                distro: "Ubuntu".into(),
                release: "24.04".into(),
            },
            cpu: CpuIdentity {
                manufacturer: "Intel".into(),
                brand: "Xeon E-2288G".into(),
                cores: 16,
            },
            cpu_load: Mutex::new(45.2),
            memory: MemoryReading {
                total_bytes: 8192 * MB,
                used_bytes: 4096 * MB,
            },
            filesystems: vec![fs("/boot", GB, 12.0), fs("/", 99 * GB, 63.5)],
            network: Mutex::new(Some(NetworkCounters {
                rx_bytes: 1000,
                tx_bytes: 500,
            })),
            identity_delay: Duration::ZERO,
            fail_cpu_load: AtomicBool::new(false),
            fail_os_identity: AtomicBool::new(false),
            fail_filesystems: AtomicBool::new(false),
            fail_network: AtomicBool::new(false),
            os_identity_calls: AtomicUsize::new(0),
            cpu_identity_calls: AtomicUsize::new(0),
            memory_calls: AtomicUsize::new(0),
            filesystems_calls: AtomicUsize::new(0),
            network_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeSource {
    pub fn set_network(&self, counters: Option<NetworkCounters>) {
        *self.network.lock().unwrap() = counters;
    }
}

#[async_trait]
impl SystemSource for FakeSource {
    async fn os_identity(&self) -> anyhow::Result<OsIdentity> {
        self.os_identity_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.identity_delay).await;
        if self.fail_os_identity.load(Ordering::SeqCst) {
            anyhow::bail!("os-release unreadable");
        }
        Ok(self.os.clone())
    }

    async fn cpu_identity(&self) -> anyhow::Result<CpuIdentity> {
        self.cpu_identity_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.identity_delay).await;
        Ok(self.cpu.clone())
    }

    async fn cpu_load(&self) -> anyhow::Result<f64> {
        if self.fail_cpu_load.load(Ordering::SeqCst) {
            anyhow::bail!("cpu counters unavailable");
        }
        Ok(*self.cpu_load.lock().unwrap())
    }

    async fn memory(&self) -> anyhow::Result<MemoryReading> {
        self.memory_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.memory)
    }

    async fn filesystems(&self) -> anyhow::Result<Vec<FilesystemUsage>> {
        self.filesystems_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_filesystems.load(Ordering::SeqCst) {
            anyhow::bail!("statvfs failed");
        }
        Ok(self.filesystems.clone())
    }

    async fn network_counters(&self) -> anyhow::Result<Option<NetworkCounters>> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_network.load(Ordering::SeqCst) {
            anyhow::bail!("no /proc/net/dev");
        }
        Ok(*self.network.lock().unwrap())
    }
}

/// One request as seen by the receiver.
#[derive(Debug, Clone)]
pub struct Received {
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct ReceiverState {
    status: StatusCode,
    delay: Duration,
    requests: Arc<Mutex<Vec<Received>>>,
}

pub struct Receiver {
    pub url: reqwest::Url,
    requests: Arc<Mutex<Vec<Received>>>,
}

impl Receiver {
    pub fn requests(&self) -> Vec<Received> {
        self.requests.lock().unwrap().clone()
    }
}

async fn ingest(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(Received {
        authorization: text(header::AUTHORIZATION),
        user_agent: text(header::USER_AGENT),
        body,
    });
    tokio::time::sleep(state.delay).await;
    state.status
}

/// Starts an ingest endpoint on 127.0.0.1 answering every POST /ingest with `status` after `delay`.
pub async fn spawn_receiver(status: StatusCode, delay: Duration) -> Receiver {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ReceiverState {
        status,
        delay,
        requests: requests.clone(),
    };
    let app = Router::new().route("/ingest", post(ingest)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Receiver {
        url: format!("http://{addr}/ingest").parse().unwrap(),
        requests,
    }
}

/// A local URL nothing listens on (connection refused).
pub async fn unreachable_url() -> reqwest::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/ingest").parse().unwrap()
}

/// Log lines written by the current thread's subscriber while the guard is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.text().lines().filter(|l| l.contains(needle)).count()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Installs a DEBUG-level subscriber for the current thread; use with current-thread runtimes.
pub fn capture_logs() -> (tracing::subscriber::DefaultGuard, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}
