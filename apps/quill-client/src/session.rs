//! # Session
//!
//! Owns every container for one run of the client. There are no globals:
//! whatever needs state gets it from here.
//!
//! ## Selection Changes
//! ```text
//! select_client(id) ──► ClientsState::select ──► ProductsState::on_selection_changed
//!                                           └──► DraftState::clear (other client's draft)
//! remove_client(id) ──► ClientsState::remove ──► (selection cleared?) ──► same as above
//! refresh_clients() ──► invalidate + load    ──► (selection cleared?) ──► same as above
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppResult;
use crate::router::{guard, Navigation, Route};
use crate::state::{
    ClientsState, ConfigState, DraftState, FileSelectionStore, MemorySelectionStore,
    ProductsState, SelectionStore,
};
use quill_core::types::{ClientId, InvoiceDraft};
use quill_core::CoreError;
use quill_http::ApiClient;

/// One client session: config, API client and state containers.
#[derive(Debug)]
pub struct Session {
    config: ConfigState,
    api: ApiClient,
    clients: Arc<ClientsState>,
    products: ProductsState,
    draft: DraftState,
}

impl Session {
    /// Builds the containers without touching the network.
    pub fn new(config: ConfigState, store: Arc<dyn SelectionStore>) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        let clients = Arc::new(ClientsState::new(api.clients(), store));
        let products = ProductsState::new(api.products(), clients.clone());

        Session {
            config,
            api,
            clients,
            products,
            draft: DraftState::new(),
        }
    }

    /// Builds a session with the file-backed selection store and loads
    /// clients (then the selected client's products) before returning.
    ///
    /// When no selection file can be located the selection is kept in
    /// memory for this run only.
    pub async fn start(config: ConfigState) -> Self {
        let store: Arc<dyn SelectionStore> =
            match FileSelectionStore::locate(config.state_path.as_deref()) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!(error = %e, "Selection will not be persisted");
                    Arc::new(MemorySelectionStore::default())
                }
            };
        Self::start_with_store(config, store).await
    }

    /// Like [`start`](Self::start) with an explicit selection store.
    pub async fn start_with_store(config: ConfigState, store: Arc<dyn SelectionStore>) -> Self {
        let session = Session::new(config, store);
        info!(base_url = %session.api.base_url(), "Starting session");
        session.clients.load().await;
        session.products.reload().await;
        session
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn clients(&self) -> &ClientsState {
        &self.clients
    }

    pub fn products(&self) -> &ProductsState {
        &self.products
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    // =========================================================================
    // Selection-aware operations
    // =========================================================================

    /// Selects a client (or none) and reloads products for it.
    pub async fn select_client(&self, id: Option<ClientId>) -> AppResult<()> {
        let before = self.clients.selected_client_id();
        self.clients.select(id)?;
        self.after_selection(before).await;
        Ok(())
    }

    /// Deletes a client; if it was selected, products are emptied.
    pub async fn remove_client(&self, id: ClientId) -> AppResult<()> {
        let before = self.clients.selected_client_id();
        self.clients.remove(id).await?;
        self.after_selection(before).await;
        Ok(())
    }

    /// Refetches the client list, dropping a selection that disappeared.
    pub async fn refresh_clients(&self) {
        let before = self.clients.selected_client_id();
        self.clients.invalidate();
        self.clients.load().await;
        self.after_selection(before).await;
    }

    async fn after_selection(&self, before: Option<ClientId>) {
        let after = self.clients.selected_client_id();
        if before == after {
            return;
        }
        let stale_draft = self
            .draft
            .with_draft(|d| Some(d.client_id) != after)
            .unwrap_or(false);
        if stale_draft {
            self.draft.clear();
        }
        self.products.on_selection_changed().await;
    }

    // =========================================================================
    // Navigation & drafts
    // =========================================================================

    /// Resolves a path through the route guard. Unknown paths give `None`.
    pub fn navigate(&self, path: &str) -> Option<Navigation> {
        let route = Route::from_path(path)?;
        Some(guard(route, &self.clients))
    }

    /// Starts a new draft for the selected client.
    pub fn start_invoice(&self) -> AppResult<InvoiceDraft> {
        let client = self
            .clients
            .selected_client()
            .ok_or(CoreError::NoClientSelected)?;
        Ok(self.draft.start_for_client(&client, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "Ada", "created_at": "2025-01-02T10:00:00.000Z" },
                { "id": 2, "name": "Grace", "created_at": "2025-01-03T10:00:00.000Z" }
            ])))
            .mount(&server)
            .await;
        for client_id in [1, 2] {
            Mock::given(method("GET"))
                .and(path(format!("/api/clients/{}/products", client_id)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                    "id": client_id * 10,
                    "productType": "style",
                    "pricingMode": "flat",
                    "productName": "Bodice",
                    "flatPriceMinor": 2500,
                    "clientId": client_id,
                    "created_at": "2025-02-01T09:30:00.000Z"
                }])))
                .mount(&server)
                .await;
        }
        Mock::given(method("DELETE"))
            .and(path("/api/clients/2"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        server
    }

    fn config(server: &MockServer) -> ConfigState {
        ConfigState {
            api_base_url: server.uri(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_start_loads_clients_and_selected_products() {
        let server = backend().await;
        let store = Arc::new(MemorySelectionStore::new(Some(2)));
        let session = Session::start_with_store(config(&server), store).await;

        assert_eq!(session.clients().clients().len(), 2);
        let products = session.products().products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].client_id, 2);
    }

    #[tokio::test]
    async fn test_select_client_reloads_products_and_opens_routes() {
        let server = backend().await;
        let session =
            Session::start_with_store(config(&server), Arc::new(MemorySelectionStore::default()))
                .await;

        assert!(session.products().products().is_empty());
        assert_eq!(
            session.navigate("/editor"),
            Some(Navigation::Redirect(Route::Clients))
        );

        session.select_client(Some(1)).await.unwrap();
        assert_eq!(session.products().products()[0].id, 10);
        assert_eq!(session.navigate("/editor"), Some(Navigation::Allow(Route::Editor)));
        assert_eq!(session.navigate("/nowhere"), None);
    }

    #[tokio::test]
    async fn test_start_invoice_needs_selection() {
        let server = backend().await;
        let session =
            Session::start_with_store(config(&server), Arc::new(MemorySelectionStore::default()))
                .await;

        let err = session.start_invoice().unwrap_err();
        assert_eq!(err.code, ErrorCode::NoClientSelected);

        session.select_client(Some(1)).await.unwrap();
        let draft = session.start_invoice().unwrap();
        assert_eq!(draft.client_snapshot.name, "Ada");
        assert!(session.draft().snapshot().is_some());

        // switching client drops the other client's draft
        session.select_client(Some(2)).await.unwrap();
        assert!(session.draft().snapshot().is_none());
    }

    #[tokio::test]
    async fn test_removing_selected_client_empties_products() {
        let server = backend().await;
        let store = Arc::new(MemorySelectionStore::new(Some(2)));
        let session = Session::start_with_store(config(&server), store.clone()).await;
        assert_eq!(session.products().products().len(), 1);

        session.remove_client(2).await.unwrap();
        assert_eq!(session.clients().selected_client_id(), None);
        assert_eq!(store.get(), None);
        assert!(session.products().products().is_empty());
    }

    #[tokio::test]
    async fn test_quick_reselect_keeps_latest_clients_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "Ada", "created_at": "2025-01-02T10:00:00.000Z" },
                { "id": 2, "name": "Grace", "created_at": "2025-01-03T10:00:00.000Z" }
            ])))
            .mount(&server)
            .await;
        for (client_id, delay) in [(1, 300), (2, 0)] {
            Mock::given(method("GET"))
                .and(path(format!("/api/clients/{}/products", client_id)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([{
                            "id": client_id * 10,
                            "productType": "style",
                            "pricingMode": "flat",
                            "productName": "Bodice",
                            "flatPriceMinor": 2500,
                            "clientId": client_id,
                            "created_at": "2025-02-01T09:30:00.000Z"
                        }]))
                        .set_delay(Duration::from_millis(delay)),
                )
                .mount(&server)
                .await;
        }
        let session =
            Session::start_with_store(config(&server), Arc::new(MemorySelectionStore::default()))
                .await;

        // client 1's products answer after client 2's
        let (first, second) = tokio::join!(
            session.select_client(Some(1)),
            session.select_client(Some(2))
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(session.clients().selected_client_id(), Some(2));
        let products = session.products().products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].client_id, 2);
        assert!(!session.products().is_loading());
    }
}
