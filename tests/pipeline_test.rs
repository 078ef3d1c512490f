use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tempfile::tempdir;

use contact_scrubber::app::ports::ContactSourcePort;
use contact_scrubber::app::scrub_use_case::ScrubUseCase;
use contact_scrubber::common::error::Result as ScrubberResult;
use contact_scrubber::domain::RawContactData;
use contact_scrubber::infra::snapshot::JsonSnapshotSink;
use contact_scrubber::normalize::ContactNormalizer;
use contact_scrubber::reference::{CityCountryTable, DialCodeTable};
use contact_scrubber::CanonicalContact;

/// Source serving canned pages, the way the CRM search endpoint would.
struct CannedSource {
    pages: Mutex<Vec<Vec<RawContactData>>>,
}

#[async_trait]
impl ContactSourcePort for CannedSource {
    async fn next_page(&self) -> ScrubberResult<Option<Vec<RawContactData>>> {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            Ok(None)
        } else {
            Ok(Some(pages.remove(0)))
        }
    }
}

fn reference_normalizer() -> ContactNormalizer {
    let dial_codes = DialCodeTable::from_entries(vec![
        ("France".to_string(), "33".to_string()),
        ("Germany".to_string(), "49".to_string()),
    ]);
    let gazetteer = CityCountryTable::from_entries(vec![
        ("Paris".to_string(), "France".to_string()),
        ("Berlin".to_string(), "Germany".to_string()),
    ]);
    ContactNormalizer::new(Arc::new(dial_codes), Arc::new(gazetteer))
}

#[tokio::test]
async fn test_full_pipeline_from_raw_pages_to_canonical_export() -> Result<()> {
    // Three raw records describing two people. Ana appears twice under the
    // same email: the newer record is missing the city, the older one is
    // missing the phone, and their industry tags overlap.
    let page_one = vec![
        json!({
            "id": "4221",
            "properties": {
                "hs_object_id": "4221",
                "raw_email": "Please use ana.garcia@example.com from now on",
                "firstname": "Ana",
                "lastname": "Garcia",
                "phone": "+33 6 12 34 56 78",
                "country": "France",
                "industry": "fintech",
                "createdate": "2023-05-20T10:00:00.000Z"
            }
        }),
        json!({
            "id": "1002",
            "properties": {
                "hs_object_id": "1002",
                "raw_email": "bo.lin@example.org",
                "firstname": "Bo",
                "lastname": "Lin",
                "country": "Berlin",
                "industry": "logistics",
                "createdate": "2023-04-01T08:30:00.000Z"
            }
        }),
    ];
    let page_two = vec![json!({
        "id": "3377",
        "properties": {
            "hs_object_id": "3377",
            "raw_email": "ana.garcia@example.com",
            "address": "12 Rue de Rivoli",
            "country": "Paris",
            "industry": "retail;;fintech",
            "createdate": "2023-02-11T09:15:00.000Z"
        }
    })];

    let source = Arc::new(CannedSource {
        pages: Mutex::new(vec![page_one, page_two]),
    });

    let export_dir = tempdir()?;
    let sink = Arc::new(JsonSnapshotSink::new(
        export_dir.path().to_str().unwrap().to_string(),
    ));

    let use_case = ScrubUseCase::new(source, sink.clone(), reference_normalizer());
    let report = use_case.run().await?;

    assert_eq!(report.fetched, 3);
    assert_eq!(report.canonical, 2);
    assert_eq!(report.merged_away, 1);
    assert_eq!(report.upload.succeeded, 2);
    assert_eq!(report.upload.failed, 0);

    // Inspect the exported canonical set
    let path = sink.write_file()?;
    let exported: Vec<CanonicalContact> =
        serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(exported.len(), 2);

    let ana = exported
        .iter()
        .find(|c| c.contact.email.as_deref() == Some("ana.garcia@example.com"))
        .expect("merged Ana record present");

    // Survivor is the most recent record; absent fields were backfilled
    // from the older duplicate and the tag union kept first-seen order.
    assert_eq!(ana.contact.id, "4221");
    assert_eq!(ana.contact.full_name.as_deref(), Some("Ana Garcia"));
    assert_eq!(ana.contact.phone.as_deref(), Some("(+33) 33612 345678"));
    assert_eq!(ana.contact.city.as_deref(), Some("Paris"));
    assert_eq!(ana.contact.address.as_deref(), Some("12 Rue de Rivoli"));
    assert_eq!(ana.contact.industry_tags, vec!["fintech", "retail"]);
    assert_eq!(ana.merged_records, 2);

    let bo = exported
        .iter()
        .find(|c| c.contact.full_name.as_deref() == Some("Bo Lin"))
        .expect("Bo record present");
    assert_eq!(bo.contact.country.as_deref(), Some("Germany"));
    assert_eq!(bo.contact.city.as_deref(), Some("Berlin"));
    assert_eq!(bo.merged_records, 1);

    Ok(())
}
