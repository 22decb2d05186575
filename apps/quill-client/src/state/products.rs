//! # Products State
//!
//! The selected client's products.
//!
//! ## Load Token
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why Loads Carry a Token                                    │
//! │                                                                         │
//! │  select A ──► reload() token=1 ──► GET /clients/A/products ...slow...  │
//! │  select B ──► reload() token=2 ──► GET /clients/B/products ─► apply ✔  │
//! │                                                     ...A arrives ─► ✘  │
//! │                                                     (token 1 ≠ 2)       │
//! │                                                                         │
//! │  Only the newest load may write products, error or the loading flag.   │
//! │  Older requests are not cancelled; their results are dropped.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::state::clients::ClientsState;
use quill_core::types::{ClientId, Product, ProductId, ProductUpsert, ProductsByType};
use quill_core::validation::validate_product_upsert;
use quill_core::CoreError;
use quill_http::ProductsApi;

const LOAD_FAILED: &str = "Failed to load products";
const SAVE_FAILED: &str = "Failed to save product";
const DELETE_FAILED: &str = "Failed to delete product";

#[derive(Debug, Default)]
struct ProductsData {
    products: Vec<Product>,
    is_loading: bool,
    error: Option<String>,
    load_token: u64,
}

/// Product list container, scoped to the selected client.
pub struct ProductsState {
    api: ProductsApi,
    clients: Arc<ClientsState>,
    data: Mutex<ProductsData>,
}

impl ProductsState {
    pub fn new(api: ProductsApi, clients: Arc<ClientsState>) -> Self {
        ProductsState {
            api,
            clients,
            data: Mutex::new(ProductsData::default()),
        }
    }

    fn with_data<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ProductsData) -> R,
    {
        let mut data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut data)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Reloads products for the currently selected client.
    ///
    /// With no selection the list is emptied and nothing is fetched.
    pub async fn reload(&self) {
        match self.clients.selected_client_id() {
            Some(client_id) => self.load_for(client_id).await,
            None => self.with_data(|data| {
                // bump the token so an in-flight load for the old client is dropped
                data.load_token += 1;
                data.products.clear();
                data.error = None;
                data.is_loading = false;
            }),
        }
    }

    /// Called after every selection change.
    pub async fn on_selection_changed(&self) {
        debug!(client_id = ?self.clients.selected_client_id(), "Selection changed, reloading products");
        self.reload().await;
    }

    async fn load_for(&self, client_id: ClientId) {
        let token = self.with_data(|data| {
            data.load_token += 1;
            data.is_loading = true;
            data.error = None;
            data.load_token
        });

        let result = self.api.list(client_id).await;

        self.with_data(|data| {
            if token != data.load_token {
                debug!(client_id, token, current = data.load_token, "Discarding stale product load");
                return;
            }
            data.is_loading = false;
            match result {
                Ok(products) => {
                    info!(client_id, count = products.len(), "Products loaded");
                    data.products = products;
                }
                Err(e) => {
                    let err = AppError::from(e);
                    warn!(client_id, error = %err, "Product load failed");
                    data.products.clear();
                    data.error = Some(err.message_or(LOAD_FAILED).to_string());
                }
            }
        });
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a product for the selected client.
    pub async fn create(&self, input: ProductUpsert) -> AppResult<Product> {
        self.clear_error();
        let result = async {
            let client_id = self.require_client()?;
            let input = validate_product_upsert(input)?;
            let product = self.api.create(client_id, &input).await?;
            Ok::<_, AppError>((client_id, product))
        }
        .await;

        match result {
            Ok((client_id, product)) => {
                if self.still_selected(client_id) {
                    self.with_data(|data| data.products.push(product.clone()));
                }
                Ok(product)
            }
            Err(err) => Err(self.record(err, SAVE_FAILED)),
        }
    }

    /// Replaces a product. The full upsert is sent, not a partial patch.
    pub async fn update(&self, product_id: ProductId, input: ProductUpsert) -> AppResult<Product> {
        self.clear_error();
        let result = async {
            let client_id = self.require_client()?;
            let input = validate_product_upsert(input)?;
            let updated = self.api.update(client_id, product_id, &input).await?;
            Ok::<_, AppError>((client_id, updated))
        }
        .await;

        match result {
            Ok((client_id, updated)) => {
                if self.still_selected(client_id) {
                    self.with_data(|data| {
                        for product in data.products.iter_mut().filter(|p| p.id == updated.id) {
                            *product = updated.clone();
                        }
                    });
                }
                Ok(updated)
            }
            Err(err) => Err(self.record(err, SAVE_FAILED)),
        }
    }

    /// Deletes a product of the selected client.
    pub async fn remove(&self, product_id: ProductId) -> AppResult<()> {
        self.clear_error();
        let result = async {
            let client_id = self.require_client()?;
            self.api.delete(client_id, product_id).await?;
            Ok::<_, AppError>(client_id)
        }
        .await;

        match result {
            Ok(client_id) => {
                if self.still_selected(client_id) {
                    self.with_data(|data| data.products.retain(|p| p.id != product_id));
                }
                Ok(())
            }
            Err(err) => Err(self.record(err, DELETE_FAILED)),
        }
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn products(&self) -> Vec<Product> {
        self.with_data(|data| data.products.clone())
    }

    /// Products split into style and sample lists.
    pub fn by_type(&self) -> ProductsByType {
        self.with_data(|data| ProductsByType::group(&data.products))
    }

    pub fn is_loading(&self) -> bool {
        self.with_data(|data| data.is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.with_data(|data| data.error.clone())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require_client(&self) -> AppResult<ClientId> {
        self.clients
            .selected_client_id()
            .ok_or_else(|| CoreError::NoClientSelected.into())
    }

    /// False when the selection moved on while a mutation was in flight;
    /// the list then belongs to another client and is left alone.
    fn still_selected(&self, client_id: ClientId) -> bool {
        let current = self.clients.selected_client_id();
        if current != Some(client_id) {
            debug!(client_id, ?current, "Selection changed during product mutation, not applying");
            return false;
        }
        true
    }

    fn clear_error(&self) {
        self.with_data(|data| data.error = None);
    }

    fn record(&self, err: AppError, fallback: &str) -> AppError {
        warn!(error = %err, "{}", fallback);
        let message = err.message_or(fallback).to_string();
        self.with_data(|data| data.error = Some(message));
        err
    }
}

impl std::fmt::Debug for ProductsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductsState")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::selection::MemorySelectionStore;
    use quill_core::types::ProductType;
    use quill_http::ApiClient;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn product_json(id: i64, client_id: i64, product_type: &str) -> serde_json::Value {
        json!({
            "id": id,
            "productType": product_type,
            "pricingMode": "flat",
            "productName": format!("Product {}", id),
            "flatPriceMinor": 2500,
            "clientId": client_id,
            "created_at": "2025-02-01T09:30:00.000Z"
        })
    }

    fn client_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Client {}", id),
            "created_at": "2025-01-02T10:00:00.000Z"
        })
    }

    /// Builds containers over `server` with clients 1 and 2 loaded.
    async fn setup(server: &MockServer, selected: Option<ClientId>) -> (Arc<ClientsState>, ProductsState) {
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([client_json(1), client_json(2)])),
            )
            .mount(server)
            .await;

        let api = ApiClient::new(server.uri());
        let store = Arc::new(MemorySelectionStore::new(selected));
        let clients = Arc::new(ClientsState::new(api.clients(), store));
        clients.load().await;
        let products = ProductsState::new(api.products(), clients.clone());
        (clients, products)
    }

    #[tokio::test]
    async fn test_reload_without_selection_empties() {
        let server = MockServer::start().await;
        let (_clients, products) = setup(&server, None).await;

        products.reload().await;
        assert!(products.products().is_empty());
        assert_eq!(products.error(), None);
        assert!(!products.is_loading());
    }

    #[tokio::test]
    async fn test_reload_loads_selected_clients_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients/1/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                product_json(10, 1, "style"),
                product_json(11, 1, "sample"),
                product_json(12, 1, "sample")
            ])))
            .mount(&server)
            .await;
        let (_clients, products) = setup(&server, Some(1)).await;

        products.reload().await;
        assert_eq!(products.products().len(), 3);
        let grouped = products.by_type();
        assert_eq!(grouped.style.len(), 1);
        assert_eq!(grouped.sample.len(), 2);
    }

    #[tokio::test]
    async fn test_slow_earlier_load_does_not_overwrite_newer_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients/1/products"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([product_json(10, 1, "style")]))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/clients/2/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([product_json(20, 2, "sample")])),
            )
            .mount(&server)
            .await;
        let (_clients, products) = setup(&server, None).await;

        // A is issued first, B second; A resolves last
        tokio::join!(products.load_for(1), products.load_for(2));

        let loaded = products.products();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].client_id, 2);
        assert!(!products.is_loading());
    }

    #[tokio::test]
    async fn test_slow_earlier_failure_does_not_record_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients/1/products"))
            .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/clients/2/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let (_clients, products) = setup(&server, None).await;

        tokio::join!(products.load_for(1), products.load_for(2));
        assert_eq!(products.error(), None);
    }

    #[tokio::test]
    async fn test_load_failure_records_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients/1/products"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": { "message": "products unavailable" } })),
            )
            .mount(&server)
            .await;
        let (_clients, products) = setup(&server, Some(1)).await;

        products.reload().await;
        assert!(products.products().is_empty());
        assert_eq!(products.error().as_deref(), Some("products unavailable"));
    }

    #[tokio::test]
    async fn test_mutations_require_selected_client() {
        let server = MockServer::start().await;
        let (_clients, products) = setup(&server, None).await;

        let err = products
            .create(ProductUpsert::flat(ProductType::Style, "Bodice", 2500))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoClientSelected);
        assert_eq!(err.message, "No client selected");

        let err = products.remove(3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoClientSelected);
    }

    #[tokio::test]
    async fn test_create_update_remove_keep_cache_in_sync() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients/1/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(10, 1, "style")])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/clients/1/products"))
            .respond_with(ResponseTemplate::new(201).set_body_json(product_json(11, 1, "sample")))
            .mount(&server)
            .await;
        let mut renamed = product_json(10, 1, "style");
        renamed["productName"] = json!("Bodice v2");
        Mock::given(method("PATCH"))
            .and(path("/api/clients/1/products/10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(renamed))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/clients/1/products/11"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let (_clients, products) = setup(&server, Some(1)).await;
        products.reload().await;

        products
            .create(ProductUpsert::flat(ProductType::Sample, "Toile", 900))
            .await
            .unwrap();
        assert_eq!(products.products().len(), 2);

        products
            .update(10, ProductUpsert::flat(ProductType::Style, "Bodice v2", 2500))
            .await
            .unwrap();
        assert_eq!(products.products()[0].product_name, "Bodice v2");

        products.remove(11).await.unwrap();
        let ids: Vec<_> = products.products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[tokio::test]
    async fn test_mutation_clears_previous_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/clients/1/products/10"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let (_clients, products) = setup(&server, Some(1)).await;

        let mut bad = ProductUpsert::flat(ProductType::Style, "Bodice", 2500);
        bad.product_name = "x".to_string();
        assert!(products.create(bad).await.is_err());
        assert!(products.error().is_some());

        products.remove(10).await.unwrap();
        assert_eq!(products.error(), None);
    }

    #[tokio::test]
    async fn test_mutation_finishing_after_switch_leaves_new_list_alone() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/clients/1/products"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(product_json(11, 1, "sample"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/clients/2/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([product_json(20, 2, "style")])),
            )
            .mount(&server)
            .await;
        let (clients, products) = setup(&server, Some(1)).await;

        let switch = async {
            clients.select(Some(2)).unwrap();
            products.on_selection_changed().await;
        };
        let (created, ()) = tokio::join!(
            products.create(ProductUpsert::flat(ProductType::Sample, "Toile", 900)),
            switch
        );

        assert_eq!(created.unwrap().client_id, 1);
        let ids: Vec<_> = products.products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![20]);
    }

    #[tokio::test]
    async fn test_invalid_upsert_is_rejected_locally() {
        let server = MockServer::start().await;
        let (_clients, products) = setup(&server, Some(1)).await;

        let mut bad = ProductUpsert::hourly("Fitting", 4000, 60);
        bad.product_type = ProductType::Style;
        let err = products.create(bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "pricingMode must be 'flat' for style");
        assert_eq!(products.error().as_deref(), Some("pricingMode must be 'flat' for style"));
    }
}
