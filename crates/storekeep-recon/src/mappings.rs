//! Proposed links for local records that do not point at an active remote
//! product, matched by product title.
//!
//! Matching tries, in order: the case-insensitive exact name, the
//! normalized title (see [`normalize_title`]), then a word-containment
//! match. Among remote products the first one in listing order wins.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use storekeep_core::RemoteProduct;

use crate::reconcile::{Classification, ReconciliationEntry, ReconciliationReport};

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-\s]+").expect("valid regex"));
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)v\d+\.?\d*").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ExactName,
    NormalizedTitle,
    /// Every word of one title appears in the other.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingProposal {
    pub record_id: String,
    pub title: String,
    pub handle: String,
    pub classification: Classification,
    pub current_product_id: Option<String>,
    pub product_id: String,
    pub product_name: String,
    /// First non-archived price of the matched product.
    pub price_id: Option<String>,
    pub matched_by: MatchKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MappingPlan {
    pub proposals: Vec<MappingProposal>,
    /// Problem records no active product title matched.
    pub unmatched: Vec<ReconciliationEntry>,
    /// Records already linked to an active product; left alone.
    pub already_linked: usize,
}

/// Lowercase, turn runs of `_`, `-` and whitespace into one space, and drop
/// version markers such as `v2` or `v1.5`.
///
/// Removing a version marker can leave a double space behind; both sides of
/// a comparison are normalized the same way, so it is not collapsed again.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let spaced = SEPARATORS.replace_all(lowered.trim(), " ");
    VERSION_SUFFIX.replace_all(&spaced, "").trim().to_string()
}

fn exact_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn words_contained(words_of: &str, haystack: &str) -> bool {
    words_of.split_whitespace().all(|w| haystack.contains(w))
}

fn find_match<'a>(title: &str, active: &'a [RemoteProduct]) -> Option<(&'a RemoteProduct, MatchKind)> {
    let key = exact_key(title);
    if key.is_empty() {
        return None;
    }
    if let Some(p) = active.iter().find(|p| exact_key(&p.name) == key) {
        return Some((p, MatchKind::ExactName));
    }

    let normalized = normalize_title(title);
    if !normalized.is_empty() {
        if let Some(p) = active.iter().find(|p| normalize_title(&p.name) == normalized) {
            return Some((p, MatchKind::NormalizedTitle));
        }
    }

    active
        .iter()
        .find(|p| {
            let name = exact_key(&p.name);
            !name.is_empty() && (words_contained(&key, &name) || words_contained(&name, &key))
        })
        .map(|p| (p, MatchKind::Partial))
}

/// Propose an active remote product for every problem entry in `report`.
///
/// `active` must be the active partition in listing order; archived products
/// are never proposed.
#[must_use]
pub fn suggest_mappings(report: &ReconciliationReport, active: &[RemoteProduct]) -> MappingPlan {
    let active: Vec<RemoteProduct> = active.iter().filter(|p| !p.is_archived).cloned().collect();
    let mut plan = MappingPlan {
        already_linked: report.good().count(),
        ..MappingPlan::default()
    };

    for entry in report.problems() {
        match find_match(&entry.title, &active) {
            Some((product, matched_by)) => plan.proposals.push(MappingProposal {
                record_id: entry.record_id.clone(),
                title: entry.title.clone(),
                handle: entry.handle.clone(),
                classification: entry.classification,
                current_product_id: entry.external_product_id.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                price_id: product.primary_price().map(|p| p.id.clone()),
                matched_by,
            }),
            None => plan.unmatched.push(entry.clone()),
        }
    }
    plan
}
