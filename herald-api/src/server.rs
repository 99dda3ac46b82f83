//! HTTP server entry point.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

/// Binds the configured address and serves the API until `shutdown`
/// resolves.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound or the server
/// fails while running.
pub async fn serve(
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let router = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Herald API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Herald API stopped");
    Ok(())
}
