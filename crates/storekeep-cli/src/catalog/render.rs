//! Plain-text rendering of check reports.

use std::collections::BTreeMap;
use std::fmt::Write;

use storekeep_core::{LocalProductRecord, RemoteProduct};
use storekeep_recon::{
    Classification, DuplicateGroup, DuplicateReport, MappingPlan, MatchKind, PriceSummary,
    ReconciliationReport,
};

fn issue_label(classification: Classification) -> &'static str {
    match classification {
        Classification::Ok => "OK",
        Classification::NoReference => "NO POLAR ID",
        Classification::PointsToArchived => "POINTS TO ARCHIVED",
        Classification::Dangling => "POLAR ID NOT FOUND",
    }
}

/// First eight characters of an id, for compact listings.
fn short_id(id: &str) -> String {
    if id.chars().count() > 8 {
        format!("{}...", id.chars().take(8).collect::<String>())
    } else {
        id.to_string()
    }
}

pub(super) fn status_report(report: &ReconciliationReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== ALL SUPABASE PRODUCTS STATUS ===")?;
    writeln!(out, "Total Supabase products: {}", report.entries.len())?;
    writeln!(out, "Active Polar products: {}", report.active_count)?;
    writeln!(out, "Archived Polar products: {}", report.archived_count)?;
    writeln!(out)?;

    writeln!(out, "GOOD ({} products):", report.good().count())?;
    for entry in report.good() {
        writeln!(out, "   - {}", entry.title)?;
    }

    writeln!(out)?;
    writeln!(out, "PROBLEMS ({} products):", report.problems().count())?;
    for entry in report.problems() {
        writeln!(
            out,
            "   - {}: {}",
            entry.title,
            issue_label(entry.classification)
        )?;
        if let Some(id) = &entry.external_product_id {
            writeln!(out, "     Polar ID: {id}")?;
        }
        writeln!(out, "     Handle: {}", entry.handle)?;
    }

    writeln!(out)?;
    writeln!(out, "ACTIVE POLAR PRODUCTS NOT IN SUPABASE:")?;
    if report.orphans.is_empty() {
        writeln!(out, "   (none)")?;
    }
    for orphan in &report.orphans {
        writeln!(out, "   - {} ({})", orphan.name, orphan.id)?;
    }
    Ok(out)
}

fn write_groups(
    out: &mut String,
    heading: &str,
    groups: &[DuplicateGroup],
) -> Result<(), std::fmt::Error> {
    writeln!(out, "--- {heading} ---")?;
    for group in groups {
        writeln!(
            out,
            "\n\"{}\" has {} products:",
            group.key,
            group.records.len()
        )?;
        for r in &group.records {
            writeln!(
                out,
                "   - ID: {} | Handle: \"{}\" | Title: \"{}\" | Status: {}",
                short_id(&r.id),
                r.handle,
                r.title,
                r.status
            )?;
        }
    }
    writeln!(out)?;
    Ok(())
}

pub(super) fn duplicate_report(
    report: &DuplicateReport,
    records: &[LocalProductRecord],
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== Supabase Duplicate Check ===")?;
    writeln!(out, "Total products in database: {}\n", report.total)?;

    write_groups(&mut out, "Duplicate Handles", &report.by_handle)?;
    write_groups(&mut out, "Duplicate Titles (Exact)", &report.by_title)?;
    write_groups(
        &mut out,
        "Duplicate Titles (Case-Insensitive)",
        &report.by_title_case_variant,
    )?;
    write_groups(
        &mut out,
        "Duplicate Polar Product IDs",
        &report.by_external_product_id,
    )?;

    if !report.has_duplicates() {
        writeln!(out, "No duplicates found by handle, title, or Polar product id.\n")?;
    }

    writeln!(out, "--- Summary ---")?;
    writeln!(out, "Total products: {}", report.total)?;
    writeln!(out, "Unique handles: {}", report.unique_handles)?;
    writeln!(out, "Unique titles: {}", report.unique_titles)?;
    writeln!(out, "Unique Polar IDs: {}", report.unique_external_product_ids)?;
    writeln!(out, "\nBy Status:")?;
    for (status, count) in &report.status_counts {
        writeln!(out, "  {status}: {count}")?;
    }

    writeln!(out, "\n--- All Products ---")?;
    for (i, r) in records.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<40} | {:<40} | {}",
            i + 1,
            r.title,
            r.handle,
            r.status
        )?;
    }
    Ok(out)
}

pub(super) fn product_listing(
    products: &[RemoteProduct],
    prices: &BTreeMap<String, PriceSummary>,
) -> Result<String, std::fmt::Error> {
    let active: Vec<&RemoteProduct> = products.iter().filter(|p| !p.is_archived).collect();
    let mut out = String::new();
    writeln!(out, "Found {} products:\n", active.len())?;
    writeln!(out, "{:<40}{:<42}Price", "Name", "Product ID")?;
    writeln!(out, "{}", "-".repeat(100))?;
    for product in &active {
        let price = prices
            .get(&product.id)
            .map_or("No price", |p| p.formatted.as_str());
        writeln!(out, "{:<40}{:<42}{}", product.name, product.id, price)?;
    }

    writeln!(out, "\n=== JSON Mapping ===\n")?;
    for product in &active {
        writeln!(out, "\"{}\": \"{}\",", product.name, product.id)?;
    }
    Ok(out)
}

fn match_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::ExactName => "exact name",
        MatchKind::NormalizedTitle => "normalized title",
        MatchKind::Partial => "partial",
    }
}

pub(super) fn mapping_plan(plan: &MappingPlan) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== POLAR MAPPING FIXES ===")?;
    writeln!(out, "Already linked to an active product: {}", plan.already_linked)?;
    writeln!(out)?;

    writeln!(out, "Updates needed: {}", plan.proposals.len())?;
    for p in &plan.proposals {
        let old = p.current_product_id.as_deref().map_or("NULL".to_string(), short_id);
        writeln!(out, "   - \"{}\" [{}]", p.title, issue_label(p.classification))?;
        writeln!(
            out,
            "     Old: {old} -> New: {} ({}, by {})",
            short_id(&p.product_id),
            p.product_name,
            match_label(p.matched_by)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "No match found: {}", plan.unmatched.len())?;
    for entry in &plan.unmatched {
        writeln!(out, "   - \"{}\" (handle: {})", entry.title, entry.handle)?;
    }
    Ok(out)
}
