//! Duplicate detection over the local catalog.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use storekeep_core::LocalProductRecord;

/// Records sharing the same value for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub records: Vec<LocalProductRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateReport {
    pub total: usize,
    pub by_handle: Vec<DuplicateGroup>,
    pub by_title: Vec<DuplicateGroup>,
    /// Titles that collide only after lowercasing and trimming.
    pub by_title_case_variant: Vec<DuplicateGroup>,
    pub by_external_product_id: Vec<DuplicateGroup>,
    pub unique_handles: usize,
    pub unique_titles: usize,
    pub unique_external_product_ids: usize,
    pub status_counts: BTreeMap<String, usize>,
}

impl DuplicateReport {
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !(self.by_handle.is_empty()
            && self.by_title.is_empty()
            && self.by_title_case_variant.is_empty()
            && self.by_external_product_id.is_empty())
    }
}

/// Group records by handle, title, case-folded title and external product id.
///
/// Empty handles and titles and absent external ids are not grouped.
#[must_use]
pub fn find_duplicates(records: &[LocalProductRecord]) -> DuplicateReport {
    let mut by_handle: BTreeMap<&str, Vec<&LocalProductRecord>> = BTreeMap::new();
    let mut by_title: BTreeMap<&str, Vec<&LocalProductRecord>> = BTreeMap::new();
    let mut by_title_lower: BTreeMap<String, Vec<&LocalProductRecord>> = BTreeMap::new();
    let mut by_external: BTreeMap<&str, Vec<&LocalProductRecord>> = BTreeMap::new();
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        if !record.handle.is_empty() {
            by_handle.entry(record.handle.as_str()).or_default().push(record);
        }
        if !record.title.is_empty() {
            by_title.entry(record.title.as_str()).or_default().push(record);
            by_title_lower
                .entry(record.title.trim().to_lowercase())
                .or_default()
                .push(record);
        }
        if let Some(id) = record.external_product_id.as_deref() {
            by_external.entry(id).or_default().push(record);
        }
        *status_counts.entry(record.status.clone()).or_default() += 1;
    }

    let by_title_case_variant = by_title_lower
        .iter()
        .filter(|(_, group)| {
            group.iter().map(|r| r.title.as_str()).collect::<BTreeSet<_>>().len() > 1
        })
        .map(|(key, group)| to_group(key, group))
        .collect();

    DuplicateReport {
        total: records.len(),
        by_handle: repeated(&by_handle),
        by_title: repeated(&by_title),
        by_title_case_variant,
        by_external_product_id: repeated(&by_external),
        unique_handles: by_handle.len(),
        unique_titles: by_title.len(),
        unique_external_product_ids: by_external.len(),
        status_counts,
    }
}

fn repeated(groups: &BTreeMap<&str, Vec<&LocalProductRecord>>) -> Vec<DuplicateGroup> {
    groups
        .iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(key, group)| to_group(key, group))
        .collect()
}

fn to_group(key: &str, group: &[&LocalProductRecord]) -> DuplicateGroup {
    DuplicateGroup {
        key: key.to_string(),
        records: group.iter().map(|r| (*r).clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str, handle: &str, external: Option<&str>) -> LocalProductRecord {
        LocalProductRecord {
            id: id.to_string(),
            title: title.to_string(),
            handle: handle.to_string(),
            external_product_id: external.map(str::to_string),
            external_price_id: None,
            status: "active".to_string(),
        }
    }

    #[test]
    fn clean_catalog_has_no_duplicates() {
        let report = find_duplicates(&[
            record("1", "Bevel Tool", "bevel-tool", Some("p1")),
            record("2", "Mesh Cleaner", "mesh-cleaner", Some("p2")),
        ]);
        assert!(!report.has_duplicates());
        assert_eq!(report.unique_handles, 2);
        assert_eq!(report.unique_external_product_ids, 2);
    }

    #[test]
    fn shared_handle_is_grouped_in_input_order() {
        let report = find_duplicates(&[
            record("1", "Bevel Tool", "bevel-tool", None),
            record("2", "Bevel Tool v2", "bevel-tool", None),
        ]);
        assert_eq!(report.by_handle.len(), 1);
        let ids: Vec<&str> = report.by_handle[0]
            .records
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn exact_title_duplicates_are_not_case_variants() {
        let report = find_duplicates(&[
            record("1", "Bevel Tool", "bevel-tool", None),
            record("2", "Bevel Tool", "bevel-tool-2", None),
        ]);
        assert_eq!(report.by_title.len(), 1);
        assert!(report.by_title_case_variant.is_empty());
    }

    #[test]
    fn case_variants_require_distinct_spellings() {
        let report = find_duplicates(&[
            record("1", "Bevel Tool", "bevel-tool", None),
            record("2", "bevel tool ", "bevel-tool-lower", None),
        ]);
        assert!(report.by_title.is_empty());
        assert_eq!(report.by_title_case_variant.len(), 1);
        assert_eq!(report.by_title_case_variant[0].key, "bevel tool");
    }

    #[test]
    fn absent_external_ids_are_ignored() {
        let report = find_duplicates(&[
            record("1", "A", "a", None),
            record("2", "B", "b", None),
            record("3", "C", "c", Some("p1")),
            record("4", "D", "d", Some("p1")),
        ]);
        assert_eq!(report.by_external_product_id.len(), 1);
        assert_eq!(report.by_external_product_id[0].key, "p1");
        assert_eq!(report.unique_external_product_ids, 1);
    }

    #[test]
    fn status_counts_cover_every_record() {
        let mut draft = record("3", "C", "c", None);
        draft.status = "draft".to_string();
        let report = find_duplicates(&[record("1", "A", "a", None), record("2", "B", "b", None), draft]);
        assert_eq!(report.status_counts.get("active"), Some(&2));
        assert_eq!(report.status_counts.get("draft"), Some(&1));
        assert_eq!(report.total, 3);
    }
}
