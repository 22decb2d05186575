//! # Quill Client Library
//!
//! Session, state containers and routing for the Quill Invoicing client.
//!
//! ## Module Organization
//! ```text
//! quill_client/
//! ├── lib.rs          ◄─── You are here (tracing setup & run)
//! ├── session.rs      ◄─── Session: owns config, API client, containers
//! ├── router.rs       ◄─── Routes and the navigation guard
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── clients.rs  ◄─── Client list + persisted selection
//! │   ├── products.rs ◄─── Selected client's products (load token)
//! │   ├── draft.rs    ◄─── Invoice draft being edited
//! │   ├── selection.rs◄─── Selection store (TOML file / memory)
//! │   └── config.rs   ◄─── Configuration state
//! └── error.rs        ◄─── AppError {code, message}
//! ```

pub mod error;
pub mod router;
pub mod session;
pub mod state;

pub use error::{AppError, AppResult, ErrorCode};
pub use router::{guard, Navigation, Route};
pub use session::Session;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use state::ConfigState;

/// Runs the client headlessly: loads everything a first screen needs and
/// reports it.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Client Startup                                    │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info,quill=debug,reqwest=warn; RUST_LOG overrides        │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • ConfigState::from_env (QUILL_* variables)                         │
/// │                                                                         │
/// │  3. Start Session ────────────────────────────────────────────────────► │
/// │     • Restore persisted selection                                       │
/// │     • Load clients BEFORE any route is resolved                         │
/// │     • Load the selected client's products                               │
/// │                                                                         │
/// │  4. Resolve Initial Route ────────────────────────────────────────────► │
/// │     • /invoice if a client is selected, else /clients                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() {
    init_tracing();

    info!("Starting Quill Invoicing client");

    let session = Session::start(ConfigState::from_env()).await;
    launch(&session);
}

/// Resolves the landing route for a started session and logs a summary.
///
/// A failed client load is logged and the client list screen is shown;
/// nothing here ends the process.
pub fn launch(session: &Session) -> Navigation {
    let clients = session.clients();
    if let Some(message) = clients.error() {
        error!(%message, "Clients could not be loaded");
    }
    if let Some(message) = session.products().error() {
        warn!(%message, "Products could not be loaded");
    }

    let products = session.products().by_type();
    let landing = guard(Route::Invoice, clients);

    info!(
        clients = clients.clients().len(),
        selected = ?clients.selected_client().map(|c| c.name),
        style_products = products.style.len(),
        sample_products = products.sample.len(),
        route = %landing.route(),
        "Session ready"
    );

    landing
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=quill_http=trace` - Show trace for the HTTP layer only
/// - Default: INFO, DEBUG for quill crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quill=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ConfigState, MemorySelectionStore};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_failed_client_load_lands_on_clients() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = ConfigState {
            api_base_url: server.uri(),
            ..Default::default()
        };
        let session =
            Session::start_with_store(config, Arc::new(MemorySelectionStore::new(Some(1)))).await;

        assert_eq!(session.clients().error().as_deref(), Some("Response status: 500"));
        assert_eq!(launch(&session), Navigation::Redirect(Route::Clients));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_not_fatal() {
        let config = ConfigState {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let session =
            Session::start_with_store(config, Arc::new(MemorySelectionStore::default())).await;

        assert_eq!(
            session.clients().error().as_deref(),
            Some("Could not reach the invoicing server")
        );
        assert_eq!(launch(&session).route(), Route::Clients);
    }
}
