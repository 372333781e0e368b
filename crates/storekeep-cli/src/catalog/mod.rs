//! Catalog check command handlers.
//!
//! Each handler builds its clients once from the loaded config, fetches
//! what it needs, runs a pure check from `storekeep_recon`, and prints the
//! result. Fetches that do not depend on each other run concurrently.

mod render;

use anyhow::Context;
use storekeep_core::AppConfig;
use storekeep_polar::PolarClient;
use storekeep_recon::{find_duplicates, price_table, suggest_mappings, RemoteCatalog};
use storekeep_supabase::SupabaseClient;

/// Compare the Supabase catalog against both Polar partitions.
///
/// # Errors
///
/// Returns an error if configuration is missing, either fetch fails, the
/// fetched Polar partitions are inconsistent, or `fail_on_problems` is set
/// and at least one product is not OK.
pub(crate) async fn run_status(
    config: &AppConfig,
    json: bool,
    fail_on_problems: bool,
) -> anyhow::Result<()> {
    let polar_config = config.polar()?;
    let polar = PolarClient::from_config(&polar_config, config.http_timeout_secs)?;
    let supabase = SupabaseClient::from_config(&config.supabase()?, config.http_timeout_secs)?;

    let (records, partitions) = tokio::try_join!(
        async {
            supabase
                .list_products()
                .await
                .context("failed to fetch Supabase products")
        },
        async {
            polar
                .fetch_catalog(&polar_config.organization_id)
                .await
                .context("failed to fetch Polar products")
        },
    )?;

    let catalog = RemoteCatalog::from_partitions(partitions.active, partitions.archived)
        .context("Polar returned an inconsistent catalog")?;
    let report = catalog.reconcile(&records);

    let problems = report.problems().count();
    tracing::info!(
        local = records.len(),
        active = report.active_count,
        archived = report.archived_count,
        problems,
        orphans = report.orphans.len(),
        "reconciliation complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::status_report(&report)?);
    }

    if fail_on_problems && problems > 0 {
        anyhow::bail!("{problems} products are not linked to an active Polar product");
    }
    Ok(())
}

/// Report duplicate handles, titles, and Polar ids in the Supabase catalog.
///
/// # Errors
///
/// Returns an error if Supabase is not configured or the fetch fails.
pub(crate) async fn run_duplicates(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let supabase = SupabaseClient::from_config(&config.supabase()?, config.http_timeout_secs)?;
    let records = supabase
        .list_products()
        .await
        .context("failed to fetch Supabase products")?;

    let report = find_duplicates(&records);
    if report.has_duplicates() {
        tracing::warn!(total = report.total, "duplicate products found");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::duplicate_report(&report, &records)?);
    }
    Ok(())
}

/// List active Polar products with their primary price and a name → id mapping.
///
/// # Errors
///
/// Returns an error if Polar is not configured or the fetch fails.
pub(crate) async fn run_products(config: &AppConfig) -> anyhow::Result<()> {
    let polar_config = config.polar()?;
    let polar = PolarClient::from_config(&polar_config, config.http_timeout_secs)?;
    let mut products = polar
        .list_products(&polar_config.organization_id, false)
        .await
        .context("failed to fetch Polar products")?;

    if products.is_empty() {
        println!("No products found");
        return Ok(());
    }

    products.sort_by(|a, b| a.name.cmp(&b.name));
    let prices = price_table(&products);
    print!("{}", render::product_listing(&products, &prices)?);
    Ok(())
}

/// Propose active Polar products for records that are not OK, matched by
/// title, and apply them unless `dry_run` is set.
///
/// # Errors
///
/// Returns an error if configuration is missing, a fetch fails, or any
/// update is rejected. Updates that succeeded before a failure are kept.
pub(crate) async fn run_fix_mappings(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let polar_config = config.polar()?;
    let polar = PolarClient::from_config(&polar_config, config.http_timeout_secs)?;
    let supabase = SupabaseClient::from_config(&config.supabase()?, config.http_timeout_secs)?;

    let (records, partitions) = tokio::try_join!(
        async {
            supabase
                .list_products()
                .await
                .context("failed to fetch Supabase products")
        },
        async {
            polar
                .fetch_catalog(&polar_config.organization_id)
                .await
                .context("failed to fetch Polar products")
        },
    )?;

    let active_in_order = partitions.active.clone();
    let catalog = RemoteCatalog::from_partitions(partitions.active, partitions.archived)
        .context("Polar returned an inconsistent catalog")?;
    let report = catalog.reconcile(&records);
    let plan = suggest_mappings(&report, &active_in_order);
    tracing::info!(
        proposals = plan.proposals.len(),
        unmatched = plan.unmatched.len(),
        dry_run,
        "mapping plan built"
    );

    print!("{}", render::mapping_plan(&plan)?);
    if plan.proposals.is_empty() {
        println!("\nNo updates needed.");
        return Ok(());
    }
    if dry_run {
        println!("\nDry run: re-run without --dry-run to apply these updates.");
        return Ok(());
    }

    let mut failed = 0usize;
    for proposal in &plan.proposals {
        match supabase
            .update_product_mapping(
                &proposal.record_id,
                &proposal.product_id,
                proposal.price_id.as_deref(),
            )
            .await
        {
            Ok(()) => println!("Updated \"{}\"", proposal.title),
            Err(e) => {
                tracing::error!(record_id = %proposal.record_id, error = %e, "mapping update failed");
                failed += 1;
            }
        }
    }

    println!(
        "\nUpdated {} of {} products",
        plan.proposals.len() - failed,
        plan.proposals.len()
    );
    if failed > 0 {
        anyhow::bail!("{failed} mapping updates failed");
    }
    Ok(())
}
