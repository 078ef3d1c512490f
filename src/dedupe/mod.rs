//! Deduplication engine: collapses normalized contacts that refer to the
//! same person into single canonical records.
//!
//! Two passes run in a fixed order, email first and full name second. Email
//! is the stronger identity signal; merging by name first would conflate
//! unrelated people who share a common name before their emails could
//! disambiguate them.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::domain::{CanonicalContact, NormalizedContact};

/// The identity key a merge pass groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeKey {
    Email,
    FullName,
}

impl MergeKey {
    fn of<'a>(self, contact: &'a NormalizedContact) -> Option<&'a str> {
        match self {
            MergeKey::Email => contact.email.as_deref(),
            MergeKey::FullName => contact.full_name.as_deref(),
        }
    }
}

/// Trait for collapsing duplicate contacts into canonical records. Pure and
/// total over well-formed input; no I/O, no error path.
pub trait Deduper: Send + Sync {
    fn deduplicate(&self, records: Vec<NormalizedContact>) -> Vec<CanonicalContact>;
}

/// Default engine: sort by creation time descending, then an email pass
/// followed by a full-name pass over the shrunken set.
pub struct TwoPassDeduper;

/// Builds one canonical record from a duplicate group: seeded from the
/// survivor, absent fields filled from later group members, tags unioned.
/// A fresh record is constructed here rather than mutating rows of a shared
/// working set.
struct CanonicalBuilder {
    contact: NormalizedContact,
    merged_records: usize,
}

impl CanonicalBuilder {
    fn from_survivor(survivor: &NormalizedContact, weight: usize) -> Self {
        Self {
            contact: survivor.clone(),
            merged_records: weight,
        }
    }

    /// Fold one non-survivor group member in. The pass key itself is exempt
    /// from backfill since the whole group already shares it.
    fn absorb(&mut self, member: &NormalizedContact, weight: usize, key: MergeKey) {
        if key == MergeKey::FullName {
            fill(&mut self.contact.email, &member.email);
        }
        if key == MergeKey::Email {
            fill(&mut self.contact.full_name, &member.full_name);
        }
        fill(&mut self.contact.address, &member.address);
        fill(&mut self.contact.country, &member.country);
        fill(&mut self.contact.city, &member.city);
        fill(&mut self.contact.phone, &member.phone);

        for tag in &member.industry_tags {
            if !self.contact.industry_tags.contains(tag) {
                self.contact.industry_tags.push(tag.clone());
            }
        }

        self.merged_records += weight;
    }

    fn build(self) -> (NormalizedContact, usize) {
        (self.contact, self.merged_records)
    }
}

/// Backfill: set `target` only when it is absent. A present value is never
/// overwritten; the first non-absent candidate in sort order wins.
fn fill(target: &mut Option<String>, candidate: &Option<String>) {
    if target.is_none() {
        if let Some(value) = candidate {
            *target = Some(value.clone());
        }
    }
}

/// Most recent creation first; records without a timestamp go last. Used
/// with a stable sort so equal timestamps keep their input order.
fn compare_recency(a: &NormalizedContact, b: &NormalizedContact) -> Ordering {
    match (&a.created_at, &b.created_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl TwoPassDeduper {
    /// One grouping/merge pass. Records whose key is absent pass through
    /// untouched and are never grouped with each other. The output keeps the
    /// input order with non-survivors removed.
    fn merge_pass(
        records: Vec<(NormalizedContact, usize)>,
        key: MergeKey,
    ) -> Vec<(NormalizedContact, usize)> {
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, (contact, _)) in records.iter().enumerate() {
            if let Some(k) = key.of(contact) {
                groups.entry(k.to_string()).or_default().push(idx);
            }
        }

        let mut merged = Vec::with_capacity(records.len());
        for (idx, (contact, weight)) in records.iter().enumerate() {
            let Some(k) = key.of(contact) else {
                merged.push((contact.clone(), *weight));
                continue;
            };

            let members = &groups[k];
            if members[0] != idx {
                // Absorbed into an earlier survivor
                continue;
            }
            if members.len() == 1 {
                merged.push((contact.clone(), *weight));
                continue;
            }

            let mut builder = CanonicalBuilder::from_survivor(contact, *weight);
            for &member_idx in &members[1..] {
                let (member, member_weight) = &records[member_idx];
                builder.absorb(member, *member_weight, key);
            }
            merged.push(builder.build());
        }
        merged
    }
}

impl Deduper for TwoPassDeduper {
    fn deduplicate(&self, records: Vec<NormalizedContact>) -> Vec<CanonicalContact> {
        let mut working: Vec<(NormalizedContact, usize)> =
            records.into_iter().map(|contact| (contact, 1)).collect();

        working.sort_by(|(a, _), (b, _)| compare_recency(a, b));

        let input_len = working.len();
        working = Self::merge_pass(working, MergeKey::Email);
        debug!("Email pass: {} -> {} records", input_len, working.len());

        let after_email = working.len();
        working = Self::merge_pass(working, MergeKey::FullName);
        debug!(
            "Full-name pass: {} -> {} records",
            after_email,
            working.len()
        );

        working
            .into_iter()
            .map(|(contact, merged_records)| CanonicalContact {
                contact,
                merged_records,
            })
            .collect()
    }
}
