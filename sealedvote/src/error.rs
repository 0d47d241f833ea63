use crate::*;

use thiserror::Error;

/// Transaction errors
///
/// Every error is terminal for the transaction that raised it: the staged
/// writes of that transaction are discarded and nothing reaches the ledger.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sealedvote: {0} not found")]
    NotFound(String),

    #[error("sealedvote: {0} already exists")]
    AlreadyExists(String),

    #[error("sealedvote: election must be {required} but is {actual}")]
    InvalidState {
        required: ElectionStatus,
        actual: ElectionStatus,
    },

    #[error("sealedvote: unauthorized: {0}")]
    Unauthorized(String),

    #[error("sealedvote: client from org {caller} cannot access peer from org {node}")]
    OrgMismatch { caller: OrgId, node: OrgId },

    #[error("sealedvote: revealed ballot for vote {token} does not match its commitment")]
    CommitmentMismatch { token: VoteToken },

    #[error("sealedvote: vote {0} has already been revealed")]
    AlreadyRevealed(VoteToken),

    #[error("sealedvote: no votes have been made public in election {0}")]
    EmptyTally(String),

    #[error("sealedvote: ledger commit failed: {0}")]
    Commit(#[from] StoreError),

    #[error("sealedvote: invalid argument: {0}")]
    InvalidArgument(String),

    #[error("sealedvote: transient field '{0}' was not supplied")]
    MissingTransient(&'static str),

    #[error("sealedvote: malformed ballot: {0}")]
    MalformedBallot(String),

    #[error("sealedvote: vote {token} is for unknown candidate '{candidate}'")]
    UnknownCandidate { token: VoteToken, candidate: String },

    #[error("sealedvote: failed to resolve identity: {0}")]
    Identity(String),

    #[error("sealedvote: unknown transaction '{0}'")]
    UnknownTransaction(String),

    #[error("sealedvote: JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ledger store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key {key} already written to collection {collection}")]
    DuplicateKey { collection: String, key: String },

    #[error("peer of org {node} cannot read collection {collection}")]
    AccessDenied { collection: String, node: OrgId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt ledger: {0}")]
    Corrupt(String),
}
