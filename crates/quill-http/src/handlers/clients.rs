//! # Clients Handler
//!
//! REST calls for `/api/clients`.
//!
//! ## Endpoints
//! ```text
//! ┌──────────┬──────────────────────────┬──────────────┬─────────────────┐
//! │ method   │ path                     │ body         │ returns         │
//! ├──────────┼──────────────────────────┼──────────────┼─────────────────┤
//! │ GET      │ /api/clients             │ -            │ [Client]        │
//! │ POST     │ /api/clients             │ NewClient    │ Client or {id}  │
//! │ PATCH    │ /api/clients/{id}        │ ClientPatch  │ Client or 204   │
//! │ DELETE   │ /api/clients/{id}        │ -            │ no content      │
//! └──────────┴──────────────────────────┴──────────────┴─────────────────┘
//! ```

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::{check_id, ApiClient};
use crate::error::HttpResult;
use quill_core::types::{Client, ClientId, ClientPatch, NewClient};

const CLIENTS_PATH: &str = "/api/clients";

/// What `POST /api/clients` answered with: the stored record, or only the
/// new id (`{"message": "client created", "id": 7}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CreatedClient {
    Record(Client),
    Id { id: ClientId },
}

impl CreatedClient {
    pub fn id(&self) -> ClientId {
        match self {
            CreatedClient::Record(client) => client.id,
            CreatedClient::Id { id } => *id,
        }
    }
}

/// Handler for client endpoints.
///
/// ## Usage
/// ```rust,ignore
/// let clients = api.clients().list().await?;
/// let ada = api.clients().create(&NewClient { name: "Ada".into(), ..Default::default() }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClientsApi {
    api: ApiClient,
}

impl ClientsApi {
    pub fn new(api: ApiClient) -> Self {
        ClientsApi { api }
    }

    /// Lists every client.
    pub async fn list(&self) -> HttpResult<Vec<Client>> {
        let clients: Vec<Client> = self.api.get_list(CLIENTS_PATH).await?;
        debug!(count = clients.len(), "Clients loaded");
        Ok(clients)
    }

    /// Creates a client and returns the record or the new id.
    pub async fn create(&self, input: &NewClient) -> HttpResult<CreatedClient> {
        let created: CreatedClient = self
            .api
            .request_entity(Method::POST, CLIENTS_PATH, Some(input))
            .await?;
        info!(client_id = created.id(), "Client created");
        Ok(created)
    }

    /// Applies a partial update. Only the fields present in `patch` are sent.
    ///
    /// The backend may answer with the updated record or with 204; the
    /// latter gives `None`.
    pub async fn update(&self, id: ClientId, patch: &ClientPatch) -> HttpResult<Option<Client>> {
        let id = check_id("client", id)?;
        let client: Option<Client> = self
            .api
            .request(Method::PATCH, &client_path(id), Some(patch))
            .await?;
        info!(client_id = id, returned_record = client.is_some(), "Client updated");
        Ok(client)
    }

    /// Deletes a client.
    pub async fn delete(&self, id: ClientId) -> HttpResult<()> {
        let id = check_id("client", id)?;
        self.api.delete(&client_path(id)).await?;
        info!(client_id = id, "Client deleted");
        Ok(())
    }
}

fn client_path(id: ClientId) -> String {
    format!("{}/{}", CLIENTS_PATH, id)
}

// =============================================================================
// Unit Tests
// =============================================================================
