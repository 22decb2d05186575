//! # Configuration State
//!
//! Stores client configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`QUILL_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use quill_core::money::{Money, GBP_SYMBOL};
use quill_core::VatRate;
use quill_http::DEFAULT_BASE_URL;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Backend base URL, without a trailing slash.
    pub api_base_url: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// VAT rate applied to new drafts.
    /// e.g., 2000 = 20.00%
    pub default_vat_rate: VatRate,

    /// Days between issue date and due date on new drafts.
    pub payment_terms_days: u32,

    /// Override for the selection file. `None` uses the platform data dir.
    pub state_path: Option<PathBuf>,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Backend: http://localhost:8080
    /// - Currency: GBP (£)
    /// - VAT: 20% (UK standard rate)
    /// - Payment terms: 30 days
    fn default() -> Self {
        ConfigState {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            currency_symbol: GBP_SYMBOL.to_string(),
            default_vat_rate: VatRate::from_bps(2000),
            payment_terms_days: 30,
            state_path: None,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `QUILL_API_BASE_URL`: Backend base URL
    /// - `QUILL_CURRENCY_SYMBOL`: Display symbol (e.g. "€")
    /// - `QUILL_VAT_RATE`: Default VAT as a percentage (e.g. "20" or "12.5")
    /// - `QUILL_PAYMENT_TERMS_DAYS`: Days until a new draft is due
    /// - `QUILL_STATE_PATH`: Selection file location
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(url) = lookup("QUILL_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(symbol) = lookup("QUILL_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(rate) = lookup("QUILL_VAT_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) => config.default_vat_rate = VatRate::from_percentage(pct),
                Err(_) => warn!(value = %rate, "Ignoring unparseable QUILL_VAT_RATE"),
            }
        }

        if let Some(days) = lookup("QUILL_PAYMENT_TERMS_DAYS") {
            match days.trim().parse::<u32>() {
                Ok(days) => config.payment_terms_days = days,
                Err(_) => warn!(value = %days, "Ignoring unparseable QUILL_PAYMENT_TERMS_DAYS"),
            }
        }

        if let Some(path) = lookup("QUILL_STATE_PATH") {
            config.state_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Formats a minor-unit amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(123456), "£1,234.56");
    /// ```
    pub fn format_currency(&self, minor: i64) -> String {
        Money::from_minor(minor).format_with(&self.currency_symbol)
    }

    /// Due date for a draft issued on `issue_date`.
    ///
    /// Terms that run past the last representable date fall back to the
    /// issue date.
    pub fn due_date(&self, issue_date: NaiveDate) -> NaiveDate {
        let terms = Duration::days(i64::from(self.payment_terms_days));
        issue_date.checked_add_signed(terms).unwrap_or_else(|| {
            warn!(%issue_date, days = self.payment_terms_days, "Payment terms overflow the calendar");
            issue_date
        })
    }
}
