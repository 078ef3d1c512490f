//! JSON snapshot persistence: raw pull archives and the dry-run sink.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::app::ports::ContactSinkPort;
use crate::common::error::Result;
use crate::domain::{CanonicalContact, RawContactData};

/// Write a fetched batch of raw contacts to a timestamped JSON file and
/// return its path.
pub fn persist_raw_contacts(contacts: &[RawContactData], output_dir: &str) -> Result<String> {
    fs::create_dir_all(output_dir)?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("contacts_raw_{timestamp}.json");
    let filepath = Path::new(output_dir).join(&filename);

    let json_content = serde_json::to_string_pretty(contacts)?;
    fs::write(&filepath, json_content)?;

    info!("Saved {} raw contacts to {}", contacts.len(), filepath.display());
    Ok(filepath.to_string_lossy().to_string())
}

/// Sink that collects canonical contacts instead of uploading them; a dry
/// run exports the collected set as JSON afterwards.
pub struct JsonSnapshotSink {
    output_dir: String,
    collected: Mutex<Vec<CanonicalContact>>,
}

impl JsonSnapshotSink {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            collected: Mutex::new(Vec::new()),
        }
    }

    /// Flush everything collected so far to a timestamped file and return
    /// its path.
    pub fn write_file(&self) -> Result<String> {
        let collected = self.collected.lock().unwrap();
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("contacts_canonical_{timestamp}.json");
        let filepath = Path::new(&self.output_dir).join(&filename);

        let json_content = serde_json::to_string_pretty(&*collected)?;
        fs::write(&filepath, json_content)?;

        info!(
            "Exported {} canonical contacts to {}",
            collected.len(),
            filepath.display()
        );
        Ok(filepath.to_string_lossy().to_string())
    }
}

#[async_trait]
impl ContactSinkPort for JsonSnapshotSink {
    async fn upload(&self, contact: &CanonicalContact) -> Result<()> {
        self.collected.lock().unwrap().push(contact.clone());
        Ok(())
    }
}
