//! Error types for probability-space construction and algebra.
//!
//! Every failure in this crate happens while a space is being built or
//! while operands are being checked for compatibility. Nothing is retried;
//! the error is the whole explanation.

use thiserror::Error;

/// Coarse classification of a [`ProbError`].
///
/// - `Type`: a label or number could not be interpreted at all.
/// - `Value`: a probability is out of range, the total law fails, or an
///   operation is invalid for these operands.
/// - `Name`: a sample is attached to the wrong variable.
/// - `Dimension`: tuple lengths or per-index names disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Type,
    Value,
    Name,
    Dimension,
}

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbError {
    // ═══════════════════════════════════════════════════════════════════
    // Type: input cannot be read as a label or number
    // ═══════════════════════════════════════════════════════════════════
    #[error("invalid label {0:?}: expected an identifier such as `X` or `x_1`")]
    InvalidLabel(String),

    #[error("invalid numeric value {0:?}")]
    InvalidNumber(String),

    #[error("invalid predicate {0:?}: expected one of <=, >=, ==, <, > followed by a number")]
    InvalidPredicate(String),

    // ═══════════════════════════════════════════════════════════════════
    // Value: probabilities and algebra
    // ═══════════════════════════════════════════════════════════════════
    #[error("{probability} is not a valid probability")]
    ProbabilityOutOfRange { probability: String },

    #[error("total law of probability violated, got {total} but expected 1")]
    TotalLawViolated { total: String },

    #[error("outcome {0} appears more than once")]
    DuplicateOutcome(String),

    #[error("{0} cannot be combined with itself under independence, use RandVec for dependent variables")]
    SelfCombination(String),

    // ═══════════════════════════════════════════════════════════════════
    // Name: sample owned by a different variable
    // ═══════════════════════════════════════════════════════════════════
    #[error("sample {sample} erroneously assigned to {owner}")]
    NameMismatch { sample: String, owner: String },

    // ═══════════════════════════════════════════════════════════════════
    // Dimension: joint tuple shape
    // ═══════════════════════════════════════════════════════════════════
    #[error("expected {expected} coordinates, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("name mismatch at index {index}: got {found} but expected {expected}")]
    IndexNameMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("joint distribution must have at least one dimension")]
    EmptyDimension,
}

impl ProbError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLabel(_) | Self::InvalidNumber(_) | Self::InvalidPredicate(_) => {
                ErrorKind::Type
            }
            Self::ProbabilityOutOfRange { .. }
            | Self::TotalLawViolated { .. }
            | Self::DuplicateOutcome(_)
            | Self::SelfCombination(_) => ErrorKind::Value,
            Self::NameMismatch { .. } => ErrorKind::Name,
            Self::DimensionMismatch { .. }
            | Self::IndexNameMismatch { .. }
            | Self::EmptyDimension => ErrorKind::Dimension,
        }
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProbError>;
