//! # Draft Line Editor
//!
//! Keeps an invoice's lines addressable by a dense, 1-based `sort_order`.
//!
//! ## Sort Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_line     [1, 2, 3]        + new ──► [1, 2, 3, 4]   (max + 1)      │
//! │                                                                         │
//! │  update_line  [1, 2, 3, 4]     patch #2 ──► same orders, #2 merged     │
//! │                                                                         │
//! │  remove_line  [1, 2, 3, 4]     drop #2 ──► [1, 2, 3]   (renumbered)    │
//! │                                   old #3 becomes #2, old #4 becomes #3  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sort order is an address, not an identity: after a removal the same
//! number can point at a different line. Only `InvoiceLine::id` is stable.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{InvoiceDraft, InvoiceLine, LineType, NewLine, PricingMode, ProductId};

/// A partial update to one invoice line.
///
/// `None` means "leave this field alone". Fields that are optional on the
/// line itself take `Option<Option<T>>`: `Some(None)` clears the value,
/// `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Option<ProductId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_mode: Option<PricingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price_minor: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub minutes_worked: Option<Option<i64>>,
}

/// Maps a key that is present in JSON (even as `null`) to `Some(..)`.
/// Missing keys fall back to `#[serde(default)]`, i.e. `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl LinePatch {
    /// Merges every present field into `line`. `sort_order` is never patched.
    pub fn apply_to(&self, line: &mut InvoiceLine) {
        if let Some(id) = self.id {
            line.id = id;
        }
        if let Some(product_id) = self.product_id {
            line.product_id = product_id;
        }
        if let Some(name) = &self.name {
            line.name = name.clone();
        }
        if let Some(line_type) = self.line_type {
            line.line_type = line_type;
        }
        if let Some(pricing_mode) = self.pricing_mode {
            line.pricing_mode = pricing_mode;
        }
        if let Some(quantity) = self.quantity {
            line.quantity = quantity;
        }
        if let Some(unit_price_minor) = self.unit_price_minor {
            line.unit_price_minor = unit_price_minor;
        }
        if let Some(minutes_worked) = self.minutes_worked {
            line.minutes_worked = minutes_worked;
        }
    }
}

impl InvoiceDraft {
    /// Appends a line at `max(sort_order) + 1` (1 on an empty draft) and
    /// returns the assigned sort order.
    ///
    /// A freed number is never handed out again while a higher one exists.
    pub fn add_line(&mut self, line: NewLine) -> u32 {
        let next = self.lines.iter().map(|l| l.sort_order).max().unwrap_or(0) + 1;
        self.lines.push(line.into_line(next));
        next
    }

    /// Merges `patch` into the line at `sort_order`.
    ///
    /// Returns `false` when no line has that sort order.
    pub fn update_line(&mut self, sort_order: u32, patch: &LinePatch) -> bool {
        match self.lines.iter_mut().find(|l| l.sort_order == sort_order) {
            Some(line) => {
                patch.apply_to(line);
                true
            }
            None => false,
        }
    }

    /// Removes the line at `sort_order`, then renumbers the rest 1..N in
    /// their existing order.
    ///
    /// Returns `false` (and leaves the lines untouched) when nothing matched.
    pub fn remove_line(&mut self, sort_order: u32) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.sort_order != sort_order);
        if self.lines.len() == before {
            return false;
        }
        self.renumber_lines();
        true
    }

    /// Sorts lines by current sort order and reassigns 1..N.
    pub fn renumber_lines(&mut self) {
        self.lines.sort_by_key(|l| l.sort_order);
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.sort_order = index as u32 + 1;
        }
    }

    /// Looks a line up by its sort order.
    pub fn line(&self, sort_order: u32) -> Option<&InvoiceLine> {
        self.lines.iter().find(|l| l.sort_order == sort_order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
