//! # Handler Module
//!
//! One handler per backend resource.
//!
//! ## Handler Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  State container                                                       │
//! │       │                                                                 │
//! │       │  api.products().list(client_id)                                │
//! │       ▼                                                                 │
//! │  ProductsApi                                                           │
//! │  ├── list(&self, client_id)                                            │
//! │  ├── create(&self, client_id, upsert)                                  │
//! │  ├── update(&self, client_id, product_id, upsert)                      │
//! │  └── delete(&self, client_id, product_id)                              │
//! │       │                                                                 │
//! │       │  check ids, build path, ApiClient::request_*                   │
//! │       ▼                                                                 │
//! │  Invoicing backend (REST + JSON)                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers do not validate payloads; the state containers do that before
//! calling in. Ids are always checked here so a bad id never hits the wire.
//!
//! ## Available Handlers
//!
//! - [`ClientsApi`] - Client CRUD
//! - [`ProductsApi`] - Per-client product CRUD

pub mod clients;
pub mod products;

pub use clients::{ClientsApi, CreatedClient};
pub use products::ProductsApi;
