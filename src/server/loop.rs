// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Run the accept loop.
///
/// Must be polled inside a `tokio::task::LocalSet`, connections are served
/// with `spawn_local`. Once `shutdown` resolves the listener is closed and the
/// loop waits for in-flight connections, bounded by the connection timeout.
pub async fn start_server_loop<S>(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: S,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: Future<Output = std::io::Result<&'static str>>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            reason = &mut shutdown => {
                logger::log_shutdown(reason?);
                break;
            }
        }
    }

    drop(listener);

    let performance = &state.config.performance;
    let grace = Duration::from_secs(performance.read_timeout.max(performance.write_timeout));
    if drain_connections(&active_connections, grace).await {
        logger::log_info("All connections closed");
    } else {
        logger::log_warning(&format!(
            "{} connection(s) still open after {}s, exiting",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
    Ok(())
}

/// Wait until the active connection counter reaches zero.
///
/// Returns `false` if `grace` elapses first.
pub async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) -> bool {
    let drained = async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(grace, drained).await.is_ok()
}

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);
