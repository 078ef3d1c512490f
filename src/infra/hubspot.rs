//! HubSpot adapters for the contact source and sink ports. Everything the
//! core is not allowed to know lives here: URLs, bearer auth, the pagination
//! cursor, remote property names and status-code inspection.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::app::ports::{ContactSinkPort, ContactSourcePort};
use crate::common::error::{Result, ScrubberError};
use crate::domain::{CanonicalContact, RawContactData};

/// Properties requested from the search endpoint.
const SEARCH_PROPERTIES: &[&str] = &[
    "hs_object_id",
    "raw_email",
    "email",
    "firstname",
    "lastname",
    "address",
    "country",
    "phone",
    "industry",
    "original_industry",
    "createdate",
];

#[derive(Default)]
struct PageCursor {
    after: Option<String>,
    exhausted: bool,
}

/// Paginated reader for the CRM contact search endpoint.
pub struct HubSpotSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
    batch_size: usize,
    cursor: Mutex<PageCursor>,
}

impl HubSpotSource {
    pub fn new(
        base_url: &str,
        token: &str,
        batch_size: usize,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            batch_size,
            cursor: Mutex::new(PageCursor::default()),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/crm/v3/objects/contacts/search", self.base_url)
    }
}

#[async_trait]
impl ContactSourcePort for HubSpotSource {
    #[instrument(skip(self))]
    async fn next_page(&self) -> Result<Option<Vec<RawContactData>>> {
        let mut cursor = self.cursor.lock().await;
        if cursor.exhausted {
            return Ok(None);
        }

        let mut body = json!({
            "limit": self.batch_size,
            "properties": SEARCH_PROPERTIES,
        });
        if let Some(after) = &cursor.after {
            body["after"] = json!(after);
        }

        let response = self
            .client
            .post(self.search_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScrubberError::Api {
                message: format!("Contact search returned {}: {}", status.as_u16(), text),
            });
        }

        let payload: Value = response.json().await?;
        let results = payload["results"].as_array().cloned().unwrap_or_default();
        debug!("Search page returned {} contacts", results.len());

        match payload
            .pointer("/paging/next/after")
            .and_then(Value::as_str)
        {
            Some(after) => cursor.after = Some(after.to_string()),
            None => cursor.exhausted = true,
        }

        if results.is_empty() && cursor.exhausted {
            return Ok(None);
        }
        Ok(Some(results))
    }
}

/// Remote property payload for one canonical contact. Tags are re-joined
/// with the CRM's separator; the original creation date rides along in a
/// custom property since `createdate` is read-only on create.
fn contact_properties(record: &CanonicalContact) -> Value {
    let contact = &record.contact;
    let industry = if contact.industry_tags.is_empty() {
        Value::Null
    } else {
        Value::String(contact.industry_tags.join(";"))
    };

    json!({
        "properties": {
            "temporary_id": contact.id,
            "email": contact.email,
            "address": contact.address,
            "country": contact.country,
            "phone": contact.phone,
            "original_industry": industry,
            "city": contact.city,
            "fullname": contact.full_name,
            "original_create_date": contact.created_at.map(|t| t.to_rfc3339()),
        }
    })
}

/// Per-record writer for the CRM contact create endpoint.
pub struct HubSpotSink {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubSpotSink {
    pub fn new(base_url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn create_url(&self) -> String {
        format!("{}/crm/v3/objects/contacts", self.base_url)
    }
}

#[async_trait]
impl ContactSinkPort for HubSpotSink {
    async fn upload(&self, contact: &CanonicalContact) -> Result<()> {
        let response = self
            .client
            .post(self.create_url())
            .bearer_auth(&self.token)
            .json(&contact_properties(contact))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The remote rejects duplicate emails with a conflict status;
            // that surfaces here like any other failure and is aggregated
            // by the caller.
            let text = response.text().await.unwrap_or_default();
            return Err(ScrubberError::Api {
                message: format!("Contact create returned {}: {}", status.as_u16(), text),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NormalizedContact;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_contact_properties_mapping() {
        let record = CanonicalContact {
            contact: NormalizedContact {
                id: "4221".to_string(),
                email: Some("ana@x.co".to_string()),
                full_name: Some("Ana Garcia".to_string()),
                address: None,
                country: Some("France".to_string()),
                city: Some("Paris".to_string()),
                phone: Some("(+33) 33612 345678".to_string()),
                industry_tags: vec!["fintech".to_string(), "retail".to_string()],
                created_at: Some(Utc.with_ymd_and_hms(2023, 5, 15, 2, 39, 2).unwrap()),
            },
            merged_records: 2,
        };

        let payload = contact_properties(&record);
        let properties = &payload["properties"];

        assert_eq!(properties["temporary_id"], "4221");
        assert_eq!(properties["email"], "ana@x.co");
        assert_eq!(properties["fullname"], "Ana Garcia");
        assert_eq!(properties["original_industry"], "fintech;retail");
        assert!(properties["address"].is_null());
        assert!(properties["original_create_date"]
            .as_str()
            .unwrap()
            .starts_with("2023-05-15T02:39:02"));
    }

    #[test]
    fn test_contact_properties_empty_tags_are_null() {
        let record = CanonicalContact {
            contact: NormalizedContact {
                id: "1".to_string(),
                email: None,
                full_name: None,
                address: None,
                country: None,
                city: None,
                phone: None,
                industry_tags: Vec::new(),
                created_at: None,
            },
            merged_records: 1,
        };

        let payload = contact_properties(&record);
        assert!(payload["properties"]["original_industry"].is_null());
        assert!(payload["properties"]["email"].is_null());
    }
}
