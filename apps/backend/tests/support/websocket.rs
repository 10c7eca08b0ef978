// WebSocket test utilities

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use backend::generation::OfflineGenerator;
use backend::services::registry::RoomRegistry;
use backend::services::rooms::RoomService;
use backend::state::app_state::AppState;
use backend::ws::hub::RoomHub;

/// Build an `AppState` wired to the offline generator.
///
/// Returns both the state and the hub so tests can:
/// 1. Use the state for WebSocket connections
/// 2. Poll the hub to observe session registration directly
pub fn offline_app_state(max_rounds: u32) -> (AppState, Arc<RoomHub>) {
    let hub = Arc::new(RoomHub::new());
    let rooms = Arc::new(RoomService::new(
        Arc::new(RoomRegistry::new()),
        Arc::new(OfflineGenerator),
        max_rounds,
    ));
    (AppState::new(rooms, hub.clone()), hub)
}

pub async fn wait_for_connections(
    hub: &RoomHub,
    room_code: &str,
    expected: usize,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = tokio::time::Instant::now();
    loop {
        if hub.connected_count(room_code) == expected {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!(
                "timeout waiting for connected_count == {expected} (got {})",
                hub.connected_count(room_code)
            )
            .into());
        }
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Start a test HTTP server with the real route table
///
/// This function creates a real HTTP server bound to a random port, allowing
/// tests to connect via real WebSocket clients (e.g., tokio-tungstenite).
///
/// # Returns
/// Returns a tuple of (server_handle, socket_addr, join_handle) where:
/// - `server_handle` can be used to gracefully stop the server
/// - `socket_addr` is the address the server is listening on
/// - `join_handle` can be awaited to wait for server shutdown and check for errors
pub async fn start_test_server(
    state: AppState,
) -> Result<
    (
        actix_web::dev::ServerHandle,
        std::net::SocketAddr,
        tokio::task::JoinHandle<Result<(), std::io::Error>>,
    ),
    Box<dyn std::error::Error>,
> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .configure(backend::routes::configure)
    })
    .listen(listener)?
    .run();

    // Start server in background and return handle + join
    let server_handle = server.handle();
    let join = tokio::spawn(server);

    Ok((server_handle, addr, join))
}
