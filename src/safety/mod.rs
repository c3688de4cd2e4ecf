//! Read-only SQL gate.
//!
//! Every candidate query produced by the model passes through [`validate_sql`]
//! before it can reach the warehouse. The check is purely textual: the query
//! must start with `select` and must not contain any mutating keyword as a
//! substring, case-insensitively.
//!
//! The substring test is deliberately coarse. `select updated_at from t` is
//! rejected because `updated_at` contains `update`, and so is a string literal
//! such as `'update'`. Do not narrow this to word boundaries.
//!
//! Known limitation: only surrounding whitespace is stripped before the prefix
//! check, so comment tricks (`/* ... */ select`) are not recognised as SELECTs
//! and leading comments are not parsed at all.

use std::fmt;
use thiserror::Error;

/// Mutating or schema-changing statement keywords, matched as raw substrings.
pub const FORBIDDEN_KEYWORDS: [&str; 6] = ["delete", "update", "insert", "drop", "alter", "merge"];

/// The only statement type the gate accepts.
const REQUIRED_PREFIX: &str = "select";

const NOT_A_SELECT_MESSAGE: &str = "Only SELECT queries allowed";
const FORBIDDEN_KEYWORD_MESSAGE: &str = "Unsafe SQL detected";

/// Which gate rule a query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The normalized query does not begin with `select`.
    NotASelect,
    /// The normalized query contains a forbidden keyword.
    ForbiddenKeyword,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotASelect => write!(f, "NotASelect"),
            Self::ForbiddenKeyword => write!(f, "ForbiddenKeyword"),
        }
    }
}

/// Rejection raised by the SQL gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{message}")]
    NotASelect { message: String },

    #[error("{message}")]
    ForbiddenKeyword {
        /// The first forbidden keyword found in the query.
        keyword: &'static str,
        message: String,
    },
}

impl ValidationError {
    /// Creates a rejection for a query that is not a SELECT.
    pub fn not_a_select() -> Self {
        Self::NotASelect {
            message: NOT_A_SELECT_MESSAGE.to_string(),
        }
    }

    /// Creates a rejection for a query containing `keyword`.
    pub fn forbidden_keyword(keyword: &'static str) -> Self {
        Self::ForbiddenKeyword {
            keyword,
            message: FORBIDDEN_KEYWORD_MESSAGE.to_string(),
        }
    }

    /// Returns which rule was violated.
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::NotASelect { .. } => ValidationErrorKind::NotASelect,
            Self::ForbiddenKeyword { .. } => ValidationErrorKind::ForbiddenKeyword,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::NotASelect { message } | Self::ForbiddenKeyword { message, .. } => message,
        }
    }
}

/// Checks a candidate query against the read-only policy.
///
/// Returns the input unchanged on success. The lowercased, trimmed copy is
/// used only for inspection; callers execute exactly what they passed in.
pub fn validate_sql(sql: &str) -> Result<&str, ValidationError> {
    let normalized = sql.trim().to_lowercase();

    if !normalized.starts_with(REQUIRED_PREFIX) {
        return Err(ValidationError::not_a_select());
    }

    if let Some(keyword) = FORBIDDEN_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| normalized.contains(keyword))
    {
        return Err(ValidationError::forbidden_keyword(keyword));
    }

    Ok(sql)
}
