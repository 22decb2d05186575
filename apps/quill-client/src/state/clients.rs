//! # Clients State
//!
//! Cached client list plus the persisted client selection.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Clients State Operations                             │
//! │                                                                         │
//! │  Caller                   Operation               State Change          │
//! │  ──────                   ─────────               ────────────          │
//! │                                                                         │
//! │  App start ──────────────► load() ──────────────► clients = GET list   │
//! │                             (once, until invalidate())                  │
//! │                                                                         │
//! │  New client form ────────► create() ────────────► clients.push(c)      │
//! │                             (id-only reply ⇒ refetch list)              │
//! │                                                                         │
//! │  Edit form ──────────────► edit() ──────────────► clients[id] = c      │
//! │                             (204 ⇒ patch merged into cached record)     │
//! │                                                                         │
//! │  Delete button ──────────► remove() ────────────► clients.retain(≠id)  │
//! │                                                                         │
//! │  Client picker ──────────► select() ────────────► selected + store     │
//! │                                                                         │
//! │  After load()/remove(): selected id missing from list ⇒ selection and  │
//! │  persisted key are both cleared.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Handling
//! `load()` never fails: the message lands in `error()` and the list is
//! emptied. Mutations record the message and also return the error.
//!
//! ## Locking
//! The inner `Mutex` is a std mutex and is never held across an `.await`.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::selection::SelectionStore;
use quill_core::types::{Client, ClientId, ClientPatch, NewClient};
use quill_core::validation::{validate_client_patch, validate_id, validate_new_client};
use quill_http::{ClientsApi, CreatedClient};

const LOAD_FAILED: &str = "Failed to load clients";
const CREATE_FAILED: &str = "Failed to create client";
const UPDATE_FAILED: &str = "Failed to update client";
const DELETE_FAILED: &str = "Failed to delete client";

/// Mutable part of [`ClientsState`].
#[derive(Debug, Default)]
pub struct ClientsData {
    pub clients: Vec<Client>,
    pub selected_client_id: Option<ClientId>,
    pub is_loading: bool,
    pub error: Option<String>,
    loaded: bool,
}

impl ClientsData {
    fn contains(&self, id: ClientId) -> bool {
        self.clients.iter().any(|c| c.id == id)
    }

    fn selected_client(&self) -> Option<&Client> {
        let id = self.selected_client_id?;
        self.clients.iter().find(|c| c.id == id)
    }
}

/// Client list container.
///
/// ## Usage
/// ```rust,ignore
/// let clients = ClientsState::new(api.clients(), Arc::new(store));
/// clients.load().await;
/// clients.select(Some(4))?;
/// ```
pub struct ClientsState {
    api: ClientsApi,
    store: Arc<dyn SelectionStore>,
    data: Mutex<ClientsData>,
}

impl ClientsState {
    /// Creates the container and restores any persisted selection.
    pub fn new(api: ClientsApi, store: Arc<dyn SelectionStore>) -> Self {
        let selected_client_id = match store.load() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Could not read persisted selection");
                None
            }
        };
        debug!(?selected_client_id, "Clients state created");

        ClientsState {
            api,
            store,
            data: Mutex::new(ClientsData {
                selected_client_id,
                ..Default::default()
            }),
        }
    }

    /// Executes a function with read access to the data.
    pub fn with_data<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ClientsData) -> R,
    {
        let data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        f(&data)
    }

    fn with_data_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ClientsData) -> R,
    {
        let mut data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut data)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetches the client list once.
    ///
    /// Later calls return immediately until [`invalidate`](Self::invalidate)
    /// is called. A failed load does not count, so the next call retries.
    pub async fn load(&self) {
        let should_fetch = self.with_data_mut(|data| {
            if data.loaded {
                return false;
            }
            data.loaded = true;
            data.is_loading = true;
            data.error = None;
            true
        });
        if !should_fetch {
            debug!("Clients already loaded");
            return;
        }

        let result = self.api.list().await;

        let cleared = self.with_data_mut(|data| {
            data.is_loading = false;
            match result {
                Ok(clients) => {
                    info!(count = clients.len(), "Clients loaded");
                    data.clients = clients;
                    Self::revalidate_selection(data)
                }
                Err(e) => {
                    let err = AppError::from(e);
                    warn!(error = %err, "Client load failed");
                    data.error = Some(err.message_or(LOAD_FAILED).to_string());
                    data.clients.clear();
                    data.loaded = false;
                    false
                }
            }
        });

        if cleared {
            self.clear_persisted();
        }
    }

    /// Makes the next [`load`](Self::load) fetch again.
    pub fn invalidate(&self) {
        self.with_data_mut(|data| data.loaded = false);
        debug!("Client list invalidated");
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates and creates a client, appending it to the list.
    ///
    /// When the backend only answers with the new id, the list is fetched
    /// again to pick up the stored record.
    pub async fn create(&self, input: NewClient) -> AppResult<Client> {
        self.clear_error();
        let result = async {
            let input = validate_new_client(input)?;
            Ok::<_, AppError>(self.api.create(&input).await?)
        }
        .await;

        match result {
            Ok(CreatedClient::Record(client)) => {
                self.with_data_mut(|data| data.clients.push(client.clone()));
                Ok(client)
            }
            Ok(CreatedClient::Id { id }) => self.refetch(id, CREATE_FAILED).await,
            Err(err) => Err(self.record(err, CREATE_FAILED)),
        }
    }

    /// Applies a partial update and replaces the cached record.
    ///
    /// A 204 reply carries no record, so the validated patch is merged into
    /// the cached client instead (or the list is refetched if it is not
    /// cached).
    pub async fn edit(&self, id: ClientId, patch: ClientPatch) -> AppResult<Client> {
        self.clear_error();
        let result = async {
            let patch = validate_client_patch(patch)?;
            let updated = self.api.update(id, &patch).await?;
            Ok::<_, AppError>((patch, updated))
        }
        .await;

        match result {
            Ok((_, Some(updated))) => {
                self.with_data_mut(|data| {
                    for client in data.clients.iter_mut().filter(|c| c.id == id) {
                        *client = updated.clone();
                    }
                });
                Ok(updated)
            }
            Ok((patch, None)) => {
                let merged = self.with_data_mut(|data| {
                    data.clients.iter_mut().find(|c| c.id == id).map(|client| {
                        patch.apply_to(client);
                        client.clone()
                    })
                });
                match merged {
                    Some(client) => Ok(client),
                    None => self.refetch(id, UPDATE_FAILED).await,
                }
            }
            Err(err) => Err(self.record(err, UPDATE_FAILED)),
        }
    }

    /// Deletes a client and drops it from the list. Deleting the selected
    /// client clears the selection.
    pub async fn remove(&self, id: ClientId) -> AppResult<()> {
        self.clear_error();
        if let Err(err) = self.api.delete(id).await {
            return Err(self.record(err.into(), DELETE_FAILED));
        }

        let cleared = self.with_data_mut(|data| {
            data.clients.retain(|c| c.id != id);
            Self::revalidate_selection(data)
        });
        if cleared {
            self.clear_persisted();
        }
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selects a client, or clears the selection with `None`.
    ///
    /// Once the list is loaded, only listed ids can be selected.
    pub fn select(&self, id: Option<ClientId>) -> AppResult<()> {
        let Some(id) = id else {
            self.with_data_mut(|data| data.selected_client_id = None);
            self.clear_persisted();
            info!("Client selection cleared");
            return Ok(());
        };

        validate_id("client", id)?;
        self.with_data_mut(|data| {
            if data.loaded && !data.is_loading && !data.contains(id) {
                return Err(AppError::not_found("Client", id));
            }
            data.selected_client_id = Some(id);
            Ok(())
        })?;

        if let Err(e) = self.store.save(id) {
            warn!(error = %e, client_id = id, "Could not persist selection");
        }
        info!(client_id = id, "Client selected");
        Ok(())
    }

    pub fn selected_client_id(&self) -> Option<ClientId> {
        self.with_data(|data| data.selected_client_id)
    }

    /// The selected client's record, if it is in the loaded list.
    pub fn selected_client(&self) -> Option<Client> {
        self.with_data(|data| data.selected_client().cloned())
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn clients(&self) -> Vec<Client> {
        self.with_data(|data| data.clients.clone())
    }

    pub fn has_clients(&self) -> bool {
        self.with_data(|data| !data.clients.is_empty())
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

    /// Drops a selection that no longer points at a listed client.
    /// Returns true when the selection was cleared.
    fn revalidate_selection(data: &mut ClientsData) -> bool {
        match data.selected_client_id {
            Some(id) if !data.contains(id) => {
                info!(client_id = id, "Selected client no longer exists, clearing selection");
                data.selected_client_id = None;
                true
            }
            _ => false,
        }
    }

    /// Refetches the list and returns the client with `id` from it.
    async fn refetch(&self, id: ClientId, fallback: &str) -> AppResult<Client> {
        self.invalidate();
        self.load().await;
        if let Some(client) = self.with_data(|data| data.clients.iter().find(|c| c.id == id).cloned()) {
            return Ok(client);
        }
        let err = match self.error() {
            Some(message) => AppError::new(ErrorCode::BackendError, message),
            None => AppError::not_found("Client", id),
        };
        Err(self.record(err, fallback))
    }

    fn clear_persisted(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Could not clear persisted selection");
        }
    }

    fn clear_error(&self) {
        self.with_data_mut(|data| data.error = None);
    }

    fn record(&self, err: AppError, fallback: &str) -> AppError {
        warn!(error = %err, "{}", fallback);
        let message = err.message_or(fallback).to_string();
        self.with_data_mut(|data| data.error = Some(message));
        err
    }
}

impl std::fmt::Debug for ClientsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientsState")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
