use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{ContactSinkPort, ContactSourcePort};
use crate::common::error::Result;
use crate::dedupe::{Deduper, TwoPassDeduper};
use crate::domain::{CanonicalContact, NormalizedContact, RawContactData, ScrubReport, UploadReport};
use crate::normalize::ContactNormalizer;

/// How many upload failure messages are kept verbatim in the report.
const FAILURE_SAMPLE_LIMIT: usize = 5;

/// Drain a contact source page by page until it signals exhaustion.
pub async fn drain_source(source: &dyn ContactSourcePort) -> Result<Vec<RawContactData>> {
    let mut contacts = Vec::new();
    let mut pages = 0usize;
    while let Some(page) = source.next_page().await? {
        pages += 1;
        counter!("scrub_contacts_fetched_total").increment(page.len() as u64);
        debug!("Fetched page {} with {} contacts", pages, page.len());
        contacts.extend(page);
    }
    info!("Fetched {} contacts across {} pages", contacts.len(), pages);
    Ok(contacts)
}

/// Use case sequencing the whole scrub: fetch, normalize, deduplicate,
/// upload. Stateless between runs apart from the read-only lookup tables
/// held by the normalizer.
pub struct ScrubUseCase {
    source: Arc<dyn ContactSourcePort>,
    sink: Arc<dyn ContactSinkPort>,
    normalizer: ContactNormalizer,
    deduper: Box<dyn Deduper>,
}

impl ScrubUseCase {
    /// Create a use case with the default two-pass deduper.
    pub fn new(
        source: Arc<dyn ContactSourcePort>,
        sink: Arc<dyn ContactSinkPort>,
        normalizer: ContactNormalizer,
    ) -> Self {
        Self {
            source,
            sink,
            normalizer,
            deduper: Box::new(TwoPassDeduper),
        }
    }

    /// Create a use case with a custom deduper.
    pub fn with_deduper(
        source: Arc<dyn ContactSourcePort>,
        sink: Arc<dyn ContactSinkPort>,
        normalizer: ContactNormalizer,
        deduper: Box<dyn Deduper>,
    ) -> Self {
        Self {
            source,
            sink,
            normalizer,
            deduper,
        }
    }

    /// Run the pipeline. A fetch failure aborts the run; upload failures
    /// are collected per record into the report instead.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<ScrubReport> {
        let raw_contacts = drain_source(self.source.as_ref()).await?;
        let fetched = raw_contacts.len();

        let t_normalize = Instant::now();
        let normalized: Vec<NormalizedContact> = raw_contacts
            .iter()
            .map(|raw| self.normalizer.normalize(raw))
            .collect();
        histogram!("scrub_normalize_duration_seconds")
            .record(t_normalize.elapsed().as_secs_f64());

        let without_email = normalized.iter().filter(|c| c.email.is_none()).count();
        if without_email > 0 {
            debug!(
                "{} of {} normalized contacts have no usable email",
                without_email,
                normalized.len()
            );
        }

        let t_dedupe = Instant::now();
        let canonical = self.deduper.deduplicate(normalized);
        histogram!("scrub_dedupe_duration_seconds").record(t_dedupe.elapsed().as_secs_f64());

        let merged_away = fetched - canonical.len();
        counter!("scrub_contacts_merged_total").increment(merged_away as u64);
        info!(
            "Deduplicated {} contacts into {} canonical records ({} merged away)",
            fetched,
            canonical.len(),
            merged_away
        );

        let upload = self.upload_all(&canonical).await;

        Ok(ScrubReport {
            fetched,
            canonical: canonical.len(),
            merged_away,
            upload,
        })
    }

    async fn upload_all(&self, canonical: &[CanonicalContact]) -> UploadReport {
        let mut report = UploadReport {
            attempted: canonical.len(),
            ..Default::default()
        };

        for record in canonical {
            match self.sink.upload(record).await {
                Ok(()) => {
                    counter!("scrub_uploads_succeeded_total").increment(1);
                    report.succeeded += 1;
                }
                Err(e) => {
                    counter!("scrub_uploads_failed_total").increment(1);
                    warn!("Upload failed for contact {}: {}", record.contact.id, e);
                    report.failed += 1;
                    if report.failure_samples.len() < FAILURE_SAMPLE_LIMIT {
                        report
                            .failure_samples
                            .push(format!("{}: {}", record.contact.id, e));
                    }
                }
            }
        }

        if report.failed > 0 {
            warn!(
                "{} of {} uploads failed",
                report.failed, report.attempted
            );
        }
        report
    }
}
