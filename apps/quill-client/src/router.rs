//! # Router
//!
//! The three screens and the guard that decides whether a screen may open.
//!
//! ## Navigation Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  /clients ───────────────────────────────────────────► Allow           │
//! │                                                                         │
//! │  /invoice, /editor                                                     │
//! │     │                                                                   │
//! │     ├── no clients loaded ──────────► Redirect(/clients)               │
//! │     ├── no client selected ─────────► Redirect(/clients)               │
//! │     └── selected client in list ────► Allow                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Clients must be loaded before the first guard runs; see
//! [`Session::start`](crate::Session::start).

use serde::{Deserialize, Serialize};

use crate::state::ClientsState;

/// A screen of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Client list and selection
    Clients,
    /// Invoice overview for the selected client
    Invoice,
    /// Line editor for the open draft
    Editor,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Clients, Route::Invoice, Route::Editor];

    /// Parses a path such as `/editor`. Trailing slashes and query strings
    /// are ignored; unknown paths give `None`.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "/clients" => Some(Route::Clients),
            "/invoice" => Some(Route::Invoice),
            "/editor" => Some(Route::Editor),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Clients => "/clients",
            Route::Invoice => "/invoice",
            Route::Editor => "/editor",
        }
    }

    /// True for screens that only make sense with a selected client.
    pub fn needs_client(&self) -> bool {
        !matches!(self, Route::Clients)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a guarded navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "route", rename_all = "lowercase")]
pub enum Navigation {
    Allow(Route),
    Redirect(Route),
}

impl Navigation {
    /// The route that will actually be shown.
    pub fn route(&self) -> Route {
        match self {
            Navigation::Allow(route) | Navigation::Redirect(route) => *route,
        }
    }
}

/// Decides whether `route` may open given the current client state.
pub fn guard(route: Route, clients: &ClientsState) -> Navigation {
    if !route.needs_client() {
        return Navigation::Allow(route);
    }
    if clients.has_clients() && clients.selected_client().is_some() {
        Navigation::Allow(route)
    } else {
        tracing::debug!(%route, "No client selected, redirecting to /clients");
        Navigation::Redirect(Route::Clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemorySelectionStore;
    use quill_http::ApiClient;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/clients"), Some(Route::Clients));
        assert_eq!(Route::from_path("/editor/"), Some(Route::Editor));
        assert_eq!(Route::from_path("/invoice?tab=lines"), Some(Route::Invoice));
        assert_eq!(Route::from_path("/settings"), None);
        assert_eq!(Route::from_path(""), None);

        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[tokio::test]
    async fn test_guard_redirects_without_selection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "name": "Ada",
                "created_at": "2025-01-02T10:00:00.000Z"
            }])))
            .mount(&server)
            .await;

        let clients = ClientsState::new(
            ApiClient::new(server.uri()).clients(),
            Arc::new(MemorySelectionStore::default()),
        );
        clients.load().await;

        assert_eq!(guard(Route::Clients, &clients), Navigation::Allow(Route::Clients));
        assert_eq!(
            guard(Route::Editor, &clients),
            Navigation::Redirect(Route::Clients)
        );

        clients.select(Some(1)).unwrap();
        assert_eq!(guard(Route::Editor, &clients), Navigation::Allow(Route::Editor));
        assert_eq!(guard(Route::Invoice, &clients).route(), Route::Invoice);
    }

    #[tokio::test]
    async fn test_guard_redirects_when_clients_failed_to_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // a persisted selection is not enough without a loaded list
        let clients = ClientsState::new(
            ApiClient::new(server.uri()).clients(),
            Arc::new(MemorySelectionStore::new(Some(1))),
        );
        clients.load().await;
        assert_eq!(
            guard(Route::Invoice, &clients),
            Navigation::Redirect(Route::Clients)
        );
    }

    #[test]
    fn test_navigation_serializes() {
        assert_eq!(
            serde_json::to_value(Navigation::Redirect(Route::Clients)).unwrap(),
            json!({ "kind": "redirect", "route": "clients" })
        );
    }
}
