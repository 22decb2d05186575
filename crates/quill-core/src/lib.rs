//! # quill-core: Pure Business Logic for Quill Invoicing
//!
//! This crate is the arithmetic heart of the invoicing client. Everything
//! here is a pure function over plain data: no network, no files, no clocks
//! (callers pass dates in).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quill Invoicing Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               quill-client (Session + State)                    │   │
//! │  │    ClientsState ──► ProductsState ──► DraftState ──► Router     │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐   ┌───────────────▼─────────────────┐ │
//! │  │   quill-http (REST calls)   │   │  ★ quill-core (THIS CRATE) ★    │ │
//! │  │   /api/clients ...          │──►│                                 │ │
//! │  └─────────────────────────────┘   │  money · types · totals         │ │
//! │                                    │  draft · validation · error     │ │
//! │                                    │                                 │ │
//! │                                    │  NO I/O • PURE FUNCTIONS        │ │
//! │                                    └─────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Minor-unit money type and GBP formatting helpers
//! - [`types`] - Domain types (Client, Product, InvoiceDraft, InvoiceLine)
//! - [`totals`] - Line totals and the invoice totals aggregator
//! - [`draft`] - Sort-order-preserving line editor for drafts
//! - [`validation`] - Client/product input rules mirrored from the backend
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use quill_core::totals::line_total_minor;
//! use quill_core::types::PricingMode;
//!
//! // 1.5 hours at £60.00/hour
//! let total = line_total_minor(1.0, 6000, PricingMode::Hourly, Some(90));
//! assert_eq!(total, 9000);
//! ```

pub mod draft;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// Re-exports so callers can write `quill_core::Money`
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::{calculate_totals, line_total_minor, InvoiceTotals};
pub use types::*;

/// Basis points representing 100%.
///
/// VAT rates and percent discounts are both expressed against this scale:
/// 2000 bps = 20.00%.
pub const BPS_SCALE: i64 = 10_000;
