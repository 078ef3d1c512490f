use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw contact data as returned from the CRM search endpoint. No schema is
/// guaranteed; fields may sit at the top level or under a `properties`
/// object. Never mutated after fetch.
pub type RawContactData = serde_json::Value;

/// A contact after field normalization. `email` and `phone`, when present,
/// are non-empty normalizer output; raw formatting never survives into this
/// type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedContact {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    /// Ordered, duplicate-free industry tags.
    pub industry_tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The single surviving, merged representation of a duplicate group.
/// Produced only by the dedupe engine and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalContact {
    pub contact: NormalizedContact,
    /// Number of normalized records folded into this one (1 = pass-through).
    pub merged_records: usize,
}

/// Aggregate result of one scrub run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrubReport {
    pub fetched: usize,
    pub canonical: usize,
    pub merged_away: usize,
    pub upload: UploadReport,
}

/// Per-record upload outcomes, aggregated for the caller instead of being
/// printed and discarded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// First few failure messages, for the run summary.
    pub failure_samples: Vec<String>,
}
