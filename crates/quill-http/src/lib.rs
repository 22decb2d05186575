//! # quill-http: Backend REST Layer for Quill Invoicing
//!
//! Typed calls to the invoicing backend's `/api/clients` resources.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quill Invoicing Data Flow                          │
//! │                                                                         │
//! │  ClientsState / ProductsState (quill-client)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    quill-http (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   ApiClient   │    │   Handlers     │    │   HttpError  │  │   │
//! │  │   │  (client.rs)  │◄───│  ClientsApi    │    │  (error.rs)  │  │   │
//! │  │   │  send/decode  │    │  ProductsApi   │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Invoicing backend (JSON over HTTP, default http://localhost:8080)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - `ApiClient` and the response contract
//! - [`handlers`] - Per-resource calls (clients, products)
//! - [`error`] - HTTP error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_http::ApiClient;
//!
//! let api = ApiClient::new("http://localhost:8080");
//! let clients = api.clients().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod error;
pub mod handlers;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{HttpError, HttpResult};
pub use handlers::{ClientsApi, CreatedClient, ProductsApi};
