//! Classifies local product records against the remote catalog.
//!
//! The remote catalog arrives in two partitions (active, archived) because
//! the platform lists them separately. Each local record lands in exactly one
//! [`Classification`]; active remote products no local record references are
//! reported as orphans.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use storekeep_core::{LocalProductRecord, RemoteProduct};

use crate::error::InvalidInputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// The record has no external product id.
    NoReference,
    /// The external id names an active remote product.
    Ok,
    /// The external id names an archived remote product only.
    PointsToArchived,
    /// The external id names no remote product at all.
    Dangling,
}

impl Classification {
    #[must_use]
    pub fn is_problem(self) -> bool {
        self != Classification::Ok
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::NoReference => write!(f, "NO_REFERENCE"),
            Classification::Ok => write!(f, "OK"),
            Classification::PointsToArchived => write!(f, "POINTS_TO_ARCHIVED"),
            Classification::Dangling => write!(f, "DANGLING"),
        }
    }
}

/// Classify a single external product id.
///
/// Checked in declaration order of [`Classification`]; an id present in both
/// maps is `Ok`.
#[must_use]
pub fn classify(
    external_product_id: Option<&str>,
    active: &HashMap<String, RemoteProduct>,
    archived: &HashMap<String, RemoteProduct>,
) -> Classification {
    let Some(id) = external_product_id else {
        return Classification::NoReference;
    };
    if active.contains_key(id) {
        Classification::Ok
    } else if archived.contains_key(id) {
        Classification::PointsToArchived
    } else {
        Classification::Dangling
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationEntry {
    pub record_id: String,
    pub title: String,
    pub handle: String,
    pub external_product_id: Option<String>,
    pub classification: Classification,
}

/// An active remote product with no local record pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedProduct {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// One entry per local record, in input order.
    pub entries: Vec<ReconciliationEntry>,
    /// Sorted by remote id.
    pub orphans: Vec<OrphanedProduct>,
    pub active_count: usize,
    pub archived_count: usize,
}

impl ReconciliationReport {
    pub fn good(&self) -> impl Iterator<Item = &ReconciliationEntry> {
        self.entries
            .iter()
            .filter(|e| !e.classification.is_problem())
    }

    pub fn problems(&self) -> impl Iterator<Item = &ReconciliationEntry> {
        self.entries
            .iter()
            .filter(|e| e.classification.is_problem())
    }

    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.problems().next().is_some()
    }

    #[must_use]
    pub fn count(&self, classification: Classification) -> usize {
        self.entries
            .iter()
            .filter(|e| e.classification == classification)
            .count()
    }

    pub fn orphan_ids(&self) -> impl Iterator<Item = &str> {
        self.orphans.iter().map(|o| o.id.as_str())
    }
}

/// Classify every local record and collect orphaned active remote products.
///
/// Runs in O(L + A). Never fails: a missing external id is a classification,
/// not an error.
#[must_use]
pub fn reconcile(
    local_records: &[LocalProductRecord],
    active: &HashMap<String, RemoteProduct>,
    archived: &HashMap<String, RemoteProduct>,
) -> ReconciliationReport {
    let entries = local_records
        .iter()
        .map(|record| ReconciliationEntry {
            record_id: record.id.clone(),
            title: record.title.clone(),
            handle: record.handle.clone(),
            external_product_id: record.external_product_id.clone(),
            classification: classify(record.external_product_id.as_deref(), active, archived),
        })
        .collect();

    let referenced: HashSet<&str> = local_records
        .iter()
        .filter_map(|r| r.external_product_id.as_deref())
        .collect();

    let mut orphans: Vec<OrphanedProduct> = active
        .iter()
        .filter(|(id, _)| !referenced.contains(id.as_str()))
        .map(|(id, product)| OrphanedProduct {
            id: id.clone(),
            name: product.name.clone(),
        })
        .collect();
    orphans.sort_by(|a, b| a.id.cmp(&b.id));

    ReconciliationReport {
        entries,
        orphans,
        active_count: active.len(),
        archived_count: archived.len(),
    }
}

/// Remote catalog snapshot keyed by remote product id.
#[derive(Debug, Clone, Default)]
pub struct RemoteCatalog {
    pub active: HashMap<String, RemoteProduct>,
    pub archived: HashMap<String, RemoteProduct>,
}

impl RemoteCatalog {
    /// Index the two fetched partitions.
    ///
    /// # Errors
    ///
    /// - [`InvalidInputError::DuplicateRemoteId`] if an id repeats within a partition.
    /// - [`InvalidInputError::PartitionMismatch`] if a product's archived flag
    ///   contradicts the partition it was fetched in.
    pub fn from_partitions(
        active: Vec<RemoteProduct>,
        archived: Vec<RemoteProduct>,
    ) -> Result<Self, InvalidInputError> {
        Ok(Self {
            active: index_partition(active, false)?,
            archived: index_partition(archived, true)?,
        })
    }

    #[must_use]
    pub fn reconcile(&self, local_records: &[LocalProductRecord]) -> ReconciliationReport {
        reconcile(local_records, &self.active, &self.archived)
    }
}

fn index_partition(
    products: Vec<RemoteProduct>,
    archived: bool,
) -> Result<HashMap<String, RemoteProduct>, InvalidInputError> {
    let partition = if archived { "archived" } else { "active" };
    let mut map = HashMap::with_capacity(products.len());
    for product in products {
        if product.is_archived != archived {
            return Err(InvalidInputError::PartitionMismatch {
                id: product.id,
                is_archived: product.is_archived,
                partition,
            });
        }
        if map.contains_key(&product.id) {
            return Err(InvalidInputError::DuplicateRemoteId {
                id: product.id,
                partition,
            });
        }
        map.insert(product.id.clone(), product);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(id: &str, external: Option<&str>) -> LocalProductRecord {
        LocalProductRecord {
            id: id.to_string(),
            title: format!("Product {id}"),
            handle: format!("product-{id}"),
            external_product_id: external.map(str::to_string),
            external_price_id: None,
            status: "active".to_string(),
        }
    }

    fn remote(id: &str, archived: bool) -> RemoteProduct {
        RemoteProduct {
            id: id.to_string(),
            name: format!("Remote {id}"),
            is_archived: archived,
            prices: Vec::new(),
        }
    }

    fn map_of(products: &[RemoteProduct]) -> HashMap<String, RemoteProduct> {
        products.iter().map(|p| (p.id.clone(), p.clone())).collect()
    }

    #[test]
    fn active_reference_is_ok_with_no_orphans() {
        let report = reconcile(
            &[local("1", Some("A"))],
            &map_of(&[remote("A", false)]),
            &HashMap::new(),
        );
        assert_eq!(report.entries[0].classification, Classification::Ok);
        assert!(report.orphans.is_empty());
        assert!(!report.has_problems());
    }

    #[test]
    fn archived_only_reference_points_to_archived() {
        let report = reconcile(
            &[local("2", Some("B"))],
            &HashMap::new(),
            &map_of(&[remote("B", true)]),
        );
        assert_eq!(
            report.entries[0].classification,
            Classification::PointsToArchived
        );
    }

    #[test]
    fn unknown_reference_is_dangling() {
        let report = reconcile(&[local("3", Some("C"))], &HashMap::new(), &HashMap::new());
        assert_eq!(report.entries[0].classification, Classification::Dangling);
    }

    #[test]
    fn missing_reference_is_no_reference() {
        let report = reconcile(
            &[local("4", None)],
            &map_of(&[remote("A", false)]),
            &map_of(&[remote("B", true)]),
        );
        assert_eq!(report.entries[0].classification, Classification::NoReference);
    }

    #[test]
    fn empty_local_catalog_orphans_every_active_product() {
        let report = reconcile(&[], &map_of(&[remote("X", false)]), &HashMap::new());
        assert_eq!(report.orphan_ids().collect::<Vec<_>>(), vec!["X"]);
        assert_eq!(report.orphans[0].name, "Remote X");
    }

    #[test]
    fn active_wins_when_id_is_in_both_partitions() {
        let report = reconcile(
            &[local("5", Some("D"))],
            &map_of(&[remote("D", false)]),
            &map_of(&[remote("D", true)]),
        );
        assert_eq!(report.entries[0].classification, Classification::Ok);
    }

    #[test]
    fn archived_products_are_never_orphans() {
        let report = reconcile(&[], &HashMap::new(), &map_of(&[remote("Z", true)]));
        assert!(report.orphans.is_empty());
    }

    #[test]
    fn orphans_are_set_difference_sorted_by_id() {
        let active = map_of(&[
            remote("c", false),
            remote("a", false),
            remote("b", false),
            remote("d", false),
        ]);
        let records = [local("1", Some("b")), local("2", Some("zzz")), local("3", None)];
        let report = reconcile(&records, &active, &HashMap::new());
        assert_eq!(report.orphan_ids().collect::<Vec<_>>(), vec!["a", "c", "d"]);
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let active = map_of(&[remote("A", false), remote("B", false)]);
        let archived = map_of(&[remote("C", true)]);
        let forward = [local("1", Some("A")), local("2", Some("C")), local("3", None)];
        let mut backward = forward.clone();
        backward.reverse();

        let a = reconcile(&forward, &active, &archived);
        let b = reconcile(&backward, &active, &archived);
        assert_eq!(a.orphans, b.orphans);
        for entry in &a.entries {
            let other = b
                .entries
                .iter()
                .find(|e| e.record_id == entry.record_id)
                .expect("same records");
            assert_eq!(entry.classification, other.classification);
        }
    }

    #[test]
    fn every_record_gets_exactly_one_entry_and_counts_add_up() {
        let active = map_of(&[remote("A", false)]);
        let archived = map_of(&[remote("B", true)]);
        let records = [
            local("1", Some("A")),
            local("2", Some("B")),
            local("3", Some("C")),
            local("4", None),
            local("5", Some("A")),
        ];
        let report = reconcile(&records, &active, &archived);
        assert_eq!(report.entries.len(), records.len());
        assert_eq!(report.count(Classification::Ok), 2);
        assert_eq!(report.count(Classification::PointsToArchived), 1);
        assert_eq!(report.count(Classification::Dangling), 1);
        assert_eq!(report.count(Classification::NoReference), 1);
        assert_eq!(report.good().count(), 2);
        assert_eq!(report.problems().count(), 3);
        assert_eq!(report.active_count, 1);
        assert_eq!(report.archived_count, 1);
    }

    #[test]
    fn from_partitions_rejects_duplicate_ids() {
        let err = RemoteCatalog::from_partitions(
            vec![remote("A", false), remote("A", false)],
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::DuplicateRemoteId {
                id: "A".to_string(),
                partition: "active"
            }
        );
    }

    #[test]
    fn from_partitions_rejects_misfiled_products() {
        let err =
            RemoteCatalog::from_partitions(Vec::new(), vec![remote("A", false)]).unwrap_err();
        assert!(matches!(
            err,
            InvalidInputError::PartitionMismatch { partition: "archived", .. }
        ));
    }

    #[test]
    fn catalog_reconcile_matches_free_function() {
        let catalog =
            RemoteCatalog::from_partitions(vec![remote("A", false)], vec![remote("B", true)])
                .expect("valid partitions");
        let report = catalog.reconcile(&[local("1", Some("B"))]);
        assert_eq!(
            report.entries[0].classification,
            Classification::PointsToArchived
        );
        assert_eq!(report.orphan_ids().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn classification_serializes_in_screaming_case() {
        let json = serde_json::to_string(&Classification::PointsToArchived).expect("serialize");
        assert_eq!(json, "\"POINTS_TO_ARCHIVED\"");
        assert_eq!(Classification::NoReference.to_string(), "NO_REFERENCE");
    }
}
