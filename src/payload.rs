//! Rows sent to the backend
//!
//! A payload is the trimmed, normalized projection of a valid form plus the
//! context the user did not type: the active locale, the consent flag and,
//! for the sample and lead tables, an opaque unsubscribe token. Field names
//! are the table's column names.

use rand::Rng;
use serde::Serialize;

use crate::Locale;

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of generated unsubscribe tokens.
pub const TOKEN_LEN: usize = 24;

/// Random URL-safe token used in unsubscribe links.
///
/// ```
/// let token = bites_forms::payload::unsubscribe_token();
/// assert_eq!(token.len(), 24);
/// assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
/// ```
pub fn unsubscribe_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Context fixed at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadContext {
    /// Active site language
    pub locale: Locale,
    /// State of the policy checkbox (always true once the gate passed)
    pub accepted_privacy_policy: bool,
    /// Token for the unsubscribe link
    pub unsubscribe_token: String,
}

impl PayloadContext {
    /// Context for an accepted submission with a fresh token.
    pub fn accepted(locale: Locale) -> Self {
        PayloadContext {
            locale,
            accepted_privacy_policy: true,
            unsubscribe_token: unsubscribe_token(),
        }
    }
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a business name for storage and lookup.
pub fn normalize_business(name: &str) -> String {
    name.trim().to_lowercase()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Row of `contact_requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct ContactRequest {
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub city: String,
    pub phone: Option<String>,
    pub message: String,
    pub request_type: String,
    pub accepted_privacy_policy: bool,
    pub language: Locale,
}

/// Row of `sample_requests`.
///
/// `establishment_type` and `interested_products` hold option ids, not
/// translated labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct SampleRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub establishment_name: String,
    pub establishment_type: String,
    pub shipping_address: String,
    pub location: String,
    pub interested_products: Option<Vec<String>>,
    pub accepted_privacy_policy: bool,
    pub unsubscribe_token: String,
    pub language: Locale,
}

/// Row of `leads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct LeadRecord {
    pub name: String,
    pub email: String,
    pub business_name: String,
    pub city: String,
    pub accepted_privacy_policy: bool,
    pub unsubscribe_token: String,
    pub language: Locale,
}

/// Validated contact form values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ContactFields {
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub city: String,
    pub phone: String,
    pub message: String,
}

impl ContactRequest {
    /// Build the row from validated values.
    pub fn new(fields: ContactFields, request_type: &str, ctx: &PayloadContext) -> Self {
        ContactRequest {
            full_name: fields.full_name.trim().to_string(),
            email: normalize_email(&fields.email),
            company: fields.company.trim().to_string(),
            city: fields.city.trim().to_string(),
            phone: non_empty(&fields.phone),
            message: fields.message.trim().to_string(),
            request_type: request_type.to_string(),
            accepted_privacy_policy: ctx.accepted_privacy_policy,
            language: ctx.locale,
        }
    }
}

/// Validated free sample form values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct SampleFields {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub establishment_name: String,
    pub establishment_type: String,
    pub shipping_address: String,
    pub location: String,
    pub products: Vec<String>,
}

impl SampleRequest {
    /// Build the row from validated values.
    pub fn new(fields: SampleFields, ctx: &PayloadContext) -> Self {
        SampleRequest {
            full_name: fields.full_name.trim().to_string(),
            email: normalize_email(&fields.email),
            phone: non_empty(&fields.phone),
            establishment_name: normalize_business(&fields.establishment_name),
            establishment_type: fields.establishment_type,
            shipping_address: fields.shipping_address.trim().to_string(),
            location: fields.location.trim().to_string(),
            interested_products: (!fields.products.is_empty()).then_some(fields.products),
            accepted_privacy_policy: ctx.accepted_privacy_policy,
            unsubscribe_token: ctx.unsubscribe_token.clone(),
            language: ctx.locale,
        }
    }
}

/// Validated lead magnet form values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LeadFields {
    pub name: String,
    pub email: String,
    pub business: String,
    pub city: String,
}

impl LeadRecord {
    /// Build the row from validated values.
    pub fn new(fields: LeadFields, ctx: &PayloadContext) -> Self {
        LeadRecord {
            name: fields.name.trim().to_string(),
            email: normalize_email(&fields.email),
            business_name: normalize_business(&fields.business),
            city: fields.city.trim().to_string(),
            accepted_privacy_policy: ctx.accepted_privacy_policy,
            unsubscribe_token: ctx.unsubscribe_token.clone(),
            language: ctx.locale,
        }
    }
}
