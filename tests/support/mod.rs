// Shared primitives for one-time server bootstrapping across integration tests.
use battle_tanks::domain::{Bounds, CELL_SIZE, LevelStorage};
use battle_tanks::interface_adapters::storage::MemoryStorage;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

// Global base address ("127.0.0.1:port") used by all tests after the server binds.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return its `host:port`.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                // Small grid, in-memory level: nothing touches the working directory.
                let storage: Arc<dyn LevelStorage> = Arc::new(MemoryStorage::default());
                battle_tanks::run_with_storage(
                    listener,
                    Bounds::from_cells(10, 10, CELL_SIZE),
                    storage,
                )
                .await
                .expect("server failed");
            });
        });
        wait_for_server_addr_and_readiness(published_addr);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

pub fn http_url(path: &str) -> String {
    format!("http://{}{path}", ensure_server())
}

#[allow(dead_code)]
pub fn ws_url() -> String {
    format!("ws://{}/ws", ensure_server())
}

// Wait for address publication and then for the server socket to accept TCP connections.
fn wait_for_server_addr_and_readiness(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_ADDR.set(addr.clone());

    // Retry for a short period to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
