//! # Error Types
//!
//! Domain-specific error types for shopkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopkeep-core errors (this file)                                       │
//! │  ├── CoreError        - Rejected commits                                │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  shopkeep-db errors (separate crate)                                    │
//! │  ├── DbError          - Storage failures                                │
//! │  └── CommitError      - CoreError | DbError from a commit               │
//! │                                                                         │
//! │  App errors                                                             │
//! │  └── ApiError         - What the presentation layer sees (serialized)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal: every variant means "fix the input and retry".

use thiserror::Error;

use crate::types::LedgerKind;

// =============================================================================
// Core Error
// =============================================================================

/// Reasons a cart commit is rejected.
///
/// A rejected commit writes nothing and leaves the cart untouched so the
/// user can correct it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Commit attempted with no lines in the cart.
    #[error("Cannot confirm {kind}: cart is empty")]
    EmptyCart { kind: LedgerKind },

    /// Input validation failed (blank name, negative paid amount, ...).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value exceeds an upper limit.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },

    /// Amount does not fit in the money range.
    #[error("{field} is out of range")]
    OutOfRange { field: String },

    /// Invalid format (e.g. unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
