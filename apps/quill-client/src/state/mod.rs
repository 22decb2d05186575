//! # State Module
//!
//! State containers for the invoicing client.
//!
//! ## Why Multiple State Types?
//! Each container owns one slice of state and one error field, so a failed
//! product load never hides a client error and vice versa.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         Session                                 │   │
//! │  │  owns one of each, built once at startup                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │     ┌───────────────┬────────┴───────┬──────────────┐                  │
//! │     ▼               ▼                ▼              ▼                   │
//! │  ┌──────────┐  ┌──────────────┐  ┌────────────┐  ┌─────────────┐       │
//! │  │ Clients  │◄─│  Products    │  │   Draft    │  │   Config    │       │
//! │  │ State    │  │  State       │  │   State    │  │   State     │       │
//! │  │          │  │              │  │            │  │             │       │
//! │  │ list +   │  │ selected     │  │ Option<    │  │ base URL    │       │
//! │  │ selection│  │ client's     │  │  Invoice   │  │ VAT, terms  │       │
//! │  │ (store)  │  │ products     │  │  Draft>    │  │ currency    │       │
//! │  └──────────┘  └──────────────┘  └────────────┘  └─────────────┘       │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Clients/Products/Draft: std Mutex, never held across .await         │
//! │  • ProductsState reads the selection through Arc<ClientsState>         │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod clients;
mod config;
mod draft;
mod products;
mod selection;

pub use clients::{ClientsData, ClientsState};
pub use config::ConfigState;
pub use draft::DraftState;
pub use products::ProductsState;
pub use selection::{FileSelectionStore, MemorySelectionStore, SelectionError, SelectionStore};
