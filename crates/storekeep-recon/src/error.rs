use thiserror::Error;

/// Inputs that break the checker's contract. Raised at the boundary, before
/// classification runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("duplicate remote product id {id} in the {partition} partition")]
    DuplicateRemoteId {
        id: String,
        partition: &'static str,
    },

    #[error("remote product {id} has is_archived={is_archived} but was listed in the {partition} partition")]
    PartitionMismatch {
        id: String,
        is_archived: bool,
        partition: &'static str,
    },
}
