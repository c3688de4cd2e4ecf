//! Read-only SQL gate tests.
//!
//! Exercises the gate through the public API only.

use bq_agent::error::AgentError;
use bq_agent::safety::{validate_sql, ValidationErrorKind, FORBIDDEN_KEYWORDS};

#[test]
fn test_plain_select_passes_unchanged() {
    let sql = "SELECT region, SUM(amount) FROM t GROUP BY region";
    assert_eq!(validate_sql(sql).unwrap(), sql);
}

#[test]
fn test_leading_whitespace_and_case_are_ignored() {
    let sql = "   select * from t";
    assert_eq!(validate_sql(sql).unwrap(), sql);
}

#[test]
fn test_non_select_statements_are_rejected() {
    for sql in ["DELETE FROM t", "WITH x AS (SELECT 1) SELECT * FROM x", "", "   "] {
        let err = validate_sql(sql).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NotASelect, "{sql:?}");
        assert_eq!(err.message(), "Only SELECT queries allowed");
    }
}

#[test]
fn test_forbidden_keyword_anywhere_is_rejected() {
    let err = validate_sql("SELECT * FROM t; DROP TABLE t").unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::ForbiddenKeyword);
    assert_eq!(err.message(), "Unsafe SQL detected");
}

#[test]
fn test_substring_match_rejects_innocent_identifiers() {
    let err = validate_sql("SELECT last_updated_at FROM t").unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::ForbiddenKeyword);
}

#[test]
fn test_every_forbidden_keyword_is_caught() {
    for keyword in FORBIDDEN_KEYWORDS {
        let sql = format!("SELECT 1 /* {} */", keyword.to_uppercase());
        assert!(validate_sql(&sql).is_err(), "{keyword} slipped through");
    }
}

#[test]
fn test_validation_error_converts_to_agent_error() {
    let err: AgentError = validate_sql("UPDATE t SET a = 1").unwrap_err().into();
    assert!(err.is_validation());
    assert_eq!(err.category(), "Validation Error");
}
