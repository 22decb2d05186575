//! # Products Handler
//!
//! REST calls for a client's products.
//!
//! Products always live under a client, so every call takes the owning
//! client id. Update sends the whole [`ProductUpsert`] rather than a partial
//! patch: the backend re-checks the pricing rules against the full record.

use reqwest::Method;
use tracing::{debug, info};

use crate::client::{check_id, ApiClient};
use crate::error::HttpResult;
use quill_core::types::{ClientId, Product, ProductId, ProductUpsert};

/// Handler for product endpoints.
#[derive(Debug, Clone)]
pub struct ProductsApi {
    api: ApiClient,
}

impl ProductsApi {
    pub fn new(api: ApiClient) -> Self {
        ProductsApi { api }
    }

    /// Lists a client's products.
    pub async fn list(&self, client_id: ClientId) -> HttpResult<Vec<Product>> {
        let client_id = check_id("client", client_id)?;
        let products: Vec<Product> = self.api.get_list(&products_path(client_id)).await?;
        debug!(client_id, count = products.len(), "Products loaded");
        Ok(products)
    }

    /// Creates a product for `client_id`.
    pub async fn create(&self, client_id: ClientId, input: &ProductUpsert) -> HttpResult<Product> {
        let client_id = check_id("client", client_id)?;
        let product: Product = self
            .api
            .request_entity(Method::POST, &products_path(client_id), Some(input))
            .await?;
        info!(client_id, product_id = product.id, "Product created");
        Ok(product)
    }

    /// Replaces a product's editable fields.
    pub async fn update(
        &self,
        client_id: ClientId,
        product_id: ProductId,
        input: &ProductUpsert,
    ) -> HttpResult<Product> {
        let client_id = check_id("client", client_id)?;
        let product_id = check_id("product", product_id)?;
        let product: Product = self
            .api
            .request_entity(
                Method::PATCH,
                &product_path(client_id, product_id),
                Some(input),
            )
            .await?;
        info!(client_id, product_id, "Product updated");
        Ok(product)
    }

    /// Deletes a product.
    pub async fn delete(&self, client_id: ClientId, product_id: ProductId) -> HttpResult<()> {
        let client_id = check_id("client", client_id)?;
        let product_id = check_id("product", product_id)?;
        self.api.delete(&product_path(client_id, product_id)).await?;
        info!(client_id, product_id, "Product deleted");
        Ok(())
    }
}

fn products_path(client_id: ClientId) -> String {
    format!("/api/clients/{}/products", client_id)
}

fn product_path(client_id: ClientId, product_id: ProductId) -> String {
    format!("{}/{}", products_path(client_id), product_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
