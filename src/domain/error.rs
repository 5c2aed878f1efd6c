//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected input.
/// Operations on an empty tree are no-ops, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid array input `{input}`: {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("unknown input mode: {0} (expected level or preorder)")]
    UnknownInputMode(String),

    #[error("unknown traversal: {0} (expected inorder, preorder, postorder or levelorder)")]
    UnknownTraversal(String),

    #[error("unknown trace algorithm: {0} (expected inorder, preorder, postorder or bfs)")]
    UnknownTraceAlgorithm(String),
}

impl DomainError {
    pub fn invalid_input(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
