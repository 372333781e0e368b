//! Consistency checks between the storefront catalog and the payments
//! platform catalog.
//!
//! Every function here is pure: callers fetch both catalogs first and pass
//! in-memory snapshots.

pub mod duplicates;
pub mod error;
pub mod mappings;
pub mod prices;
pub mod reconcile;

pub use duplicates::{find_duplicates, DuplicateGroup, DuplicateReport};
pub use error::InvalidInputError;
pub use mappings::{
    normalize_title, suggest_mappings, MappingPlan, MappingProposal, MatchKind,
};
pub use prices::{format_minor_units, price_table, PriceSummary};
pub use reconcile::{
    classify, reconcile, Classification, OrphanedProduct, ReconciliationEntry,
    ReconciliationReport, RemoteCatalog,
};
