//! # Domain Types
//!
//! Core domain types shared by the HTTP layer, the state containers and the
//! totals engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │     Product     │   │  InvoiceDraft   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──│  client_id      │   │  client_id      │       │
//! │  │  name           │   │  product_type   │   │  client_snapshot│       │
//! │  │  company_name   │   │  pricing_mode   │   │  vat_rate (bps) │       │
//! │  │  address, email │   │  *_minor prices │   │  discount_*     │       │
//! │  └─────────────────┘   └─────────────────┘   │  lines ─────────┼──┐    │
//! │                                              └─────────────────┘  │    │
//! │                                              ┌─────────────────┐  │    │
//! │                                              │   InvoiceLine   │◄─┘    │
//! │                                              │  sort_order 1..N│       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names follow the backend's JSON (camelCase, except the snake_case
//! timestamps the backend emits). Timestamps are read either as RFC 3339 or
//! as SQLite's `CURRENT_TIMESTAMP` text (`YYYY-MM-DD HH:MM:SS`, UTC).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::money::{from_minor, Money};

/// Backend identity for clients.
pub type ClientId = i64;

/// Backend identity for products.
pub type ProductId = i64;

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2000 bps = 20.00% (UK standard rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct VatRate(u32);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Creates a VAT rate from a percentage (for config input).
    ///
    /// Negative or non-finite percentages collapse to zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return VatRate(0);
        }
        VatRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Freely editable.
    #[default]
    Draft,
    Issued,
    Paid,
    Void,
}

/// How `discount_value` on a draft is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// No discount; `discount_value` is ignored.
    #[default]
    None,
    /// `discount_value` is basis points of the subtotal (10000 = 100%).
    Percent,
    /// `discount_value` is an amount in minor units.
    Fixed,
}

/// Kind of billable line on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Style,
    Sample,
    /// Free-form line not backed by a product.
    Custom,
}

/// How a price is applied to a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    /// `quantity × unit price`.
    #[default]
    Flat,
    /// `quantity × hourly rate × minutes / 60`.
    Hourly,
}

/// Product category. Style products are always priced flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Style,
    Sample,
}

impl From<ProductType> for LineType {
    fn from(product_type: ProductType) -> Self {
        match product_type {
            ProductType::Style => LineType::Style,
            ProductType::Sample => LineType::Sample,
        }
    }
}

// =============================================================================
// Backend Timestamps
// =============================================================================

mod backend_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    /// Zone-less layouts, all taken as UTC.
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub(super) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw))),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer being invoiced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "created_at", deserialize_with = "backend_time::deserialize")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updated_at",
        default,
        deserialize_with = "backend_time::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/clients`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    pub company_name: String,
    pub address: String,
    pub email: String,
}

/// Body of `PATCH /api/clients/{id}`.
///
/// Only `Some` fields are sent, so the backend leaves the rest untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ClientPatch {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company_name.is_none()
            && self.address.is_none()
            && self.email.is_none()
    }

    /// Writes the present fields onto `client`, leaving the rest alone.
    pub fn apply_to(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if let Some(company_name) = &self.company_name {
            client.company_name = company_name.clone();
        }
        if let Some(address) = &self.address {
            client.address = address.clone();
        }
        if let Some(email) = &self.email {
            client.email = email.clone();
        }
    }
}

/// Client identity frozen onto an invoice when it is created.
///
/// Later edits to the live client record do not change issued invoices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot {
    pub name: String,
    pub company_name: String,
    pub address: String,
    pub email: String,
}

impl From<&Client> for ClientSnapshot {
    fn from(client: &Client) -> Self {
        ClientSnapshot {
            name: client.name.clone(),
            company_name: client.company_name.clone(),
            address: client.address.clone(),
            email: client.email.clone(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A billable product belonging to one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_type: ProductType,
    pub pricing_mode: PricingMode,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_price_minor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate_minor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_worked: Option<i64>,
    pub client_id: ClientId,
    #[serde(rename = "created_at", deserialize_with = "backend_time::deserialize")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updated_at",
        default,
        deserialize_with = "backend_time::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The per-unit price a line built from this product starts with:
    /// the flat price, or the hourly rate for hourly products.
    pub fn unit_price(&self) -> Money {
        let minor = match self.pricing_mode {
            PricingMode::Flat => self.flat_price_minor,
            PricingMode::Hourly => self.hourly_rate_minor,
        };
        Money::from_minor(minor.unwrap_or(0))
    }
}

/// Body of both `POST` and `PATCH` on `/api/clients/{id}/products`.
///
/// Prices are held in minor units but the backend expects major-unit
/// decimals (`"flatPrice": 25.65`), so they are converted on the way out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsert {
    pub product_type: ProductType,
    pub pricing_mode: PricingMode,
    pub product_name: String,
    #[serde(
        rename = "flatPrice",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_major_units"
    )]
    pub flat_price_minor: Option<i64>,
    #[serde(
        rename = "hourlyRate",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_major_units"
    )]
    pub hourly_rate_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_worked: Option<i64>,
}

impl ProductUpsert {
    /// A flat-priced product.
    pub fn flat(product_type: ProductType, name: impl Into<String>, price_minor: i64) -> Self {
        ProductUpsert {
            product_type,
            pricing_mode: PricingMode::Flat,
            product_name: name.into(),
            flat_price_minor: Some(price_minor),
            hourly_rate_minor: None,
            minutes_worked: None,
        }
    }

    /// An hourly product (always a sample; styles are flat).
    pub fn hourly(name: impl Into<String>, rate_minor: i64, minutes_worked: i64) -> Self {
        ProductUpsert {
            product_type: ProductType::Sample,
            pricing_mode: PricingMode::Hourly,
            product_name: name.into(),
            flat_price_minor: None,
            hourly_rate_minor: Some(rate_minor),
            minutes_worked: Some(minutes_worked),
        }
    }
}

fn serialize_major_units<S>(minor: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match minor {
        Some(value) => serializer.serialize_some(&from_minor(*value)),
        None => serializer.serialize_none(),
    }
}

/// Products split by [`ProductType`] for the two pickers in the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductsByType {
    pub style: Vec<Product>,
    pub sample: Vec<Product>,
}

impl ProductsByType {
    pub fn group(products: &[Product]) -> Self {
        let mut grouped = ProductsByType::default();
        for product in products {
            match product.product_type {
                ProductType::Style => grouped.style.push(product.clone()),
                ProductType::Sample => grouped.sample.push(product.clone()),
            }
        }
        grouped
    }
}

// =============================================================================
// Invoice Lines
// =============================================================================

/// A billable line on an invoice draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    /// Persisted identity; survives renumbering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub line_type: LineType,
    pub pricing_mode: PricingMode,
    /// Decimal quantity; non-finite values count as zero in totals.
    pub quantity: f64,
    pub unit_price_minor: i64,
    /// Required when `pricing_mode` is hourly; absent counts as zero.
    #[serde(default)]
    pub minutes_worked: Option<i64>,
    /// Dense 1-based position within the invoice.
    pub sort_order: u32,
}

/// A line before it has been placed on a draft (no sort order yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLine {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub line_type: LineType,
    pub pricing_mode: PricingMode,
    pub quantity: f64,
    pub unit_price_minor: i64,
    #[serde(default)]
    pub minutes_worked: Option<i64>,
}

impl NewLine {
    /// A free-form flat line.
    pub fn custom(name: impl Into<String>, quantity: f64, unit_price_minor: i64) -> Self {
        NewLine {
            id: None,
            product_id: None,
            name: name.into(),
            line_type: LineType::Custom,
            pricing_mode: PricingMode::Flat,
            quantity,
            unit_price_minor,
            minutes_worked: None,
        }
    }

    /// Builds a quantity-1 line from a product.
    ///
    /// ## Price Freezing
    /// The product's price and minutes are copied now; later product edits
    /// do not reach lines already on a draft.
    pub fn from_product(product: &Product) -> Self {
        NewLine {
            id: None,
            product_id: Some(product.id),
            name: product.product_name.clone(),
            line_type: product.product_type.into(),
            pricing_mode: product.pricing_mode,
            quantity: 1.0,
            unit_price_minor: product.unit_price().minor(),
            minutes_worked: match product.pricing_mode {
                PricingMode::Hourly => product.minutes_worked,
                PricingMode::Flat => None,
            },
        }
    }

    pub(crate) fn into_line(self, sort_order: u32) -> InvoiceLine {
        InvoiceLine {
            id: self.id,
            product_id: self.product_id,
            name: self.name,
            line_type: self.line_type,
            pricing_mode: self.pricing_mode,
            quantity: self.quantity,
            unit_price_minor: self.unit_price_minor,
            minutes_worked: self.minutes_worked,
            sort_order,
        }
    }
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// An invoice being edited, with its header fields and lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    pub client_id: ClientId,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "String")]
    pub due_by_date: NaiveDate,
    pub client_snapshot: ClientSnapshot,
    #[serde(default)]
    pub note: String,
    /// Basis points: 2000 = 20.00%.
    pub vat_rate: VatRate,
    pub discount_type: DiscountType,
    /// Minor units when fixed, basis points when percent.
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub paid_minor: i64,
    #[serde(default)]
    pub deposit_minor: i64,
}

impl InvoiceDraft {
    /// A blank draft for `client` with no lines and no discount.
    pub fn for_client(
        client: &Client,
        issue_date: NaiveDate,
        due_by_date: NaiveDate,
        vat_rate: VatRate,
    ) -> Self {
        InvoiceDraft {
            invoice_id: None,
            base_number: None,
            status: Some(InvoiceStatus::Draft),
            client_id: client.id,
            issue_date,
            due_by_date,
            client_snapshot: ClientSnapshot::from(client),
            note: String::new(),
            vat_rate,
            discount_type: DiscountType::None,
            discount_value: 0,
            lines: Vec::new(),
            paid_minor: 0,
            deposit_minor: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
