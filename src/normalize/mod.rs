//! Field normalizers: canonicalize single raw CRM values and assemble whole
//! normalized contact records. All functions here are pure; the only state
//! is the pair of read-only lookup tables injected at construction time.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::common::constants::{
    PHONE_LOCAL_DIGITS, PROP_ADDRESS, PROP_COUNTRY, PROP_CREATE_DATE, PROP_EMAIL,
    PROP_FIRST_NAME, PROP_INDUSTRY, PROP_LAST_NAME, PROP_OBJECT_ID, PROP_ORIGINAL_INDUSTRY,
    PROP_PHONE, PROP_RAW_EMAIL, TAG_SEPARATOR, UNKNOWN_DIAL_CODE,
};
use crate::domain::{NormalizedContact, RawContactData};
use crate::reference::{CityCountryTable, DialCodeTable};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._-]+@[A-Za-z0-9.-]+\.[A-Za-z0-9.-]{2,}\b")
        .expect("email pattern compiles")
});

/// First email-shaped substring in free text, if any. No deliverability
/// validation beyond the shape.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Timestamp from a raw CRM value. Source dates are extended ISO-8601
/// strings carrying a trailing UTC marker, which is dropped before parsing.
/// Anything unparseable yields `None`; this never errors. Callers that
/// already hold a structured timestamp keep it as-is and skip this path.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    let mut chars = text.chars();
    chars.next_back()?;
    let body = chars.as_str();
    NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Industry tags from the CRM's `;`-joined encoding. Empty segments, which
/// doubled separators produce, are dropped; first appearance order is kept.
pub fn split_industry_tags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for segment in text.split(TAG_SEPARATOR) {
        let tag = segment.trim();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

/// Look a property up either under the CRM's `properties` envelope or at
/// the top level of the record.
fn prop<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get("properties")
        .and_then(|props| props.get(key))
        .or_else(|| raw.get(key))
}

/// Property as a trimmed, non-empty string. Numbers are stringified so that
/// numeric object ids survive.
fn prop_string(raw: &Value, key: &str) -> Option<String> {
    match prop(raw, key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Applies the field normalizers to raw contact records. Holds the lookup
/// tables; construction is the only injection point, there is no ambient
/// table state.
pub struct ContactNormalizer {
    dial_codes: Arc<DialCodeTable>,
    gazetteer: Arc<CityCountryTable>,
}

impl ContactNormalizer {
    pub fn new(dial_codes: Arc<DialCodeTable>, gazetteer: Arc<CityCountryTable>) -> Self {
        Self {
            dial_codes,
            gazetteer,
        }
    }

    /// Phone number in `(+<code>) <head> <last-6>` form. Everything but
    /// digits is stripped first; an empty result stays empty. A country
    /// without a dial-code entry gets the literal `unknown` marker. Numbers
    /// shorter than six digits produce an empty head block; that is accepted
    /// source behavior, not corrected here.
    pub fn format_phone(&self, raw_phone: &str, country: &str) -> String {
        let digits: String = raw_phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return String::new();
        }

        let code = self
            .dial_codes
            .dial_code(country)
            .unwrap_or(UNKNOWN_DIAL_CODE);
        let split = digits.len().saturating_sub(PHONE_LOCAL_DIGITS);
        format!("(+{}) {} {}", code, &digits[..split], &digits[split..])
    }

    /// Resolve a free-text location to a `(country, city)` pair. Exact
    /// matches only: a known country name maps to itself, a known city name
    /// maps to its country, anything else to two empty strings.
    pub fn resolve_location(&self, text: &str) -> (String, String) {
        if self.gazetteer.is_country(text) {
            return (text.to_string(), String::new());
        }
        if let Some(country) = self.gazetteer.country_of(text) {
            return (country.to_string(), text.to_string());
        }
        (String::new(), String::new())
    }

    /// Normalize one raw record. Per-field failures leave the field absent;
    /// a record is never rejected here.
    pub fn normalize(&self, raw: &RawContactData) -> NormalizedContact {
        let id = prop_string(raw, PROP_OBJECT_ID)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let email = prop_string(raw, PROP_RAW_EMAIL)
            .or_else(|| prop_string(raw, PROP_EMAIL))
            .and_then(|text| extract_email(&text));

        // Full name exists only when both components do
        let full_name = match (
            prop_string(raw, PROP_FIRST_NAME),
            prop_string(raw, PROP_LAST_NAME),
        ) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        };

        let address = prop_string(raw, PROP_ADDRESS);

        let (country, city) = match prop_string(raw, PROP_COUNTRY) {
            Some(location) => self.resolve_location(&location),
            None => (String::new(), String::new()),
        };

        let phone = prop_string(raw, PROP_PHONE)
            .map(|p| self.format_phone(&p, &country))
            .and_then(non_empty);

        let mut industry_tags = Vec::new();
        for key in [PROP_INDUSTRY, PROP_ORIGINAL_INDUSTRY] {
            if let Some(text) = prop_string(raw, key) {
                for tag in split_industry_tags(&text) {
                    if !industry_tags.contains(&tag) {
                        industry_tags.push(tag);
                    }
                }
            }
        }

        let created_at = prop(raw, PROP_CREATE_DATE).and_then(parse_timestamp);
        if created_at.is_none() {
            debug!("No parseable creation timestamp for contact {}", id);
        }

        NormalizedContact {
            id,
            email,
            full_name,
            address,
            country: non_empty(country),
            city: non_empty(city),
            phone,
            industry_tags,
            created_at,
        }
    }
}
