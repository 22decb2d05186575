//! # Validation Module
//!
//! Input checks run before a request leaves the client.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form widgets                                                 │
//! │  └── Immediate feedback while typing                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: State containers (Rust)                                      │
//! │  └── THIS MODULE: same field rules the backend enforces                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative; its {error:{message}} still reaches the UI         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators return the sanitized (trimmed) value so callers send exactly
//! what was checked. Lengths are counted in characters, not bytes.
//!
//! ## Usage
//! ```rust
//! use quill_core::types::NewClient;
//! use quill_core::validation::validate_new_client;
//!
//! let client = NewClient { name: "  Ada  ".into(), ..Default::default() };
//! assert_eq!(validate_new_client(client).unwrap().name, "Ada");
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ClientPatch, NewClient, PricingMode, ProductType, ProductUpsert};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const CLIENT_NAME_MIN: usize = 2;
const CLIENT_NAME_MAX: usize = 50;
const CLIENT_FIELD_MAX: usize = 70;
const EMAIL_MAX: usize = 50;
const PRODUCT_NAME_MIN: usize = 2;
const PRODUCT_NAME_MAX: usize = 80;

// =============================================================================
// Identifiers
// =============================================================================

/// Checks that a backend id is a positive integer.
///
/// ## Example
/// ```rust
/// use quill_core::validation::validate_id;
///
/// assert_eq!(validate_id("client", 4).unwrap(), 4);
/// assert!(validate_id("client", 0).is_err());
/// ```
pub fn validate_id(entity: &str, id: i64) -> CoreResult<i64> {
    if id <= 0 {
        return Err(CoreError::invalid_id(entity, id));
    }
    Ok(id)
}

// =============================================================================
// Text
// =============================================================================

/// Rules for a single text field.
#[derive(Debug, Clone, Copy)]
pub struct TextRules<'a> {
    pub field: &'a str,
    pub required: bool,
    pub min: usize,
    pub max: usize,
}

impl<'a> TextRules<'a> {
    pub fn optional(field: &'a str, max: usize) -> Self {
        TextRules {
            field,
            required: false,
            min: 0,
            max,
        }
    }

    pub fn required(field: &'a str, min: usize, max: usize) -> Self {
        TextRules {
            field,
            required: true,
            min,
            max,
        }
    }
}

/// Trims `value` and checks it against `rules`. All fields are single-line:
/// newlines, tabs and other control characters are rejected.
pub fn validate_text(value: &str, rules: TextRules<'_>) -> ValidationResult<String> {
    let value = value.trim();
    let len = value.chars().count();

    if value.is_empty() {
        if rules.required {
            return Err(ValidationError::required(rules.field));
        }
        return Ok(String::new());
    }

    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: rules.field.to_string(),
            reason: "must be a single line".to_string(),
        });
    }

    if len < rules.min {
        return Err(ValidationError::TooShort {
            field: rules.field.to_string(),
            min: rules.min,
        });
    }

    if len > rules.max {
        return Err(ValidationError::TooLong {
            field: rules.field.to_string(),
            max: rules.max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional email address. Empty is allowed.
///
/// Accepts a bare `local@domain.tld` address; display-name forms such as
/// `Ada <ada@example.com>` are rejected.
pub fn validate_email(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = validate_text(value, TextRules::optional(field, max))?;
    if value.is_empty() {
        return Ok(value);
    }

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "email format is invalid".to_string(),
    };

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    let no_specials = !value.chars().any(|c| c.is_whitespace() || "<>()[],;:\"".contains(c));

    if local.is_empty() || !domain_ok || !no_specials {
        return Err(invalid());
    }

    Ok(value)
}

// =============================================================================
// Clients
// =============================================================================

/// Validates and trims a client before `POST /api/clients`.
pub fn validate_new_client(client: NewClient) -> ValidationResult<NewClient> {
    Ok(NewClient {
        name: validate_text(
            &client.name,
            TextRules::required("name", CLIENT_NAME_MIN, CLIENT_NAME_MAX),
        )?,
        company_name: validate_text(
            &client.company_name,
            TextRules::optional("companyName", CLIENT_FIELD_MAX),
        )?,
        address: validate_text(&client.address, TextRules::optional("address", CLIENT_FIELD_MAX))?,
        email: validate_email("email", &client.email, EMAIL_MAX)?,
    })
}

/// Validates the present fields of a client PATCH.
///
/// An empty patch is rejected: there is nothing to send.
pub fn validate_client_patch(patch: ClientPatch) -> ValidationResult<ClientPatch> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }

    Ok(ClientPatch {
        name: patch
            .name
            .map(|v| validate_text(&v, TextRules::required("name", CLIENT_NAME_MIN, CLIENT_NAME_MAX)))
            .transpose()?,
        company_name: patch
            .company_name
            .map(|v| validate_text(&v, TextRules::optional("companyName", CLIENT_FIELD_MAX)))
            .transpose()?,
        address: patch
            .address
            .map(|v| validate_text(&v, TextRules::optional("address", CLIENT_FIELD_MAX)))
            .transpose()?,
        email: patch
            .email
            .map(|v| validate_email("email", &v, EMAIL_MAX))
            .transpose()?,
    })
}

// =============================================================================
// Products
// =============================================================================

/// Validates a product create/update payload.
///
/// ## Pricing Rules
/// ```text
/// ┌──────────┬──────────────────────────────┬──────────────────────────────┐
/// │ mode     │ required                     │ forbidden                    │
/// ├──────────┼──────────────────────────────┼──────────────────────────────┤
/// │ flat     │ flatPrice                    │ hourlyRate, minutesWorked    │
/// │ hourly   │ hourlyRate, minutesWorked    │ flatPrice                    │
/// └──────────┴──────────────────────────────┴──────────────────────────────┘
/// Style products must be flat. Money and minutes must be >= 0.
/// ```
pub fn validate_product_upsert(input: ProductUpsert) -> ValidationResult<ProductUpsert> {
    let product_name = validate_text(
        &input.product_name,
        TextRules::required("productName", PRODUCT_NAME_MIN, PRODUCT_NAME_MAX),
    )?;

    if input.product_type == ProductType::Style && input.pricing_mode == PricingMode::Hourly {
        return Err(ValidationError::not_allowed("pricingMode", "must be 'flat' for style"));
    }

    match input.pricing_mode {
        PricingMode::Flat => {
            require_non_negative("flatPrice", input.flat_price_minor)?;
            if input.hourly_rate_minor.is_some() {
                return Err(ValidationError::not_allowed(
                    "hourlyRate",
                    "not allowed for flat pricing",
                ));
            }
            if input.minutes_worked.is_some() {
                return Err(ValidationError::not_allowed(
                    "minutesWorked",
                    "not allowed for flat pricing",
                ));
            }
        }
        PricingMode::Hourly => {
            require_non_negative("hourlyRate", input.hourly_rate_minor)?;
            require_non_negative("minutesWorked", input.minutes_worked)?;
            if input.flat_price_minor.is_some() {
                return Err(ValidationError::not_allowed(
                    "flatPrice",
                    "not allowed for hourly pricing",
                ));
            }
        }
    }

    Ok(ProductUpsert {
        product_name,
        ..input
    })
}

fn require_non_negative(field: &str, value: Option<i64>) -> ValidationResult<i64> {
    match value {
        None => Err(ValidationError::required(field)),
        Some(v) if v < 0 => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
        Some(v) => Ok(v),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
