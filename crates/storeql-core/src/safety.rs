//! Static safety gate for generated SQL.
//!
//! Classification happens on text alone: an uppercase copy of the candidate
//! is scanned for deny-listed keywords and suspicious patterns, and the
//! statement must start with SELECT. No parsing, no execution. Substring
//! matching over-rejects (a column named `last_updated` trips the UPDATE
//! keyword) and that is the intended trade-off: anything ambiguous is
//! rejected, and a passing query reaches the executor byte for byte.

use std::fmt;

/// Keywords that disqualify a candidate outright, wherever they appear.
const DENY_LIST: &[&str] = &[
    // data mutation
    "INSERT",
    "UPDATE",
    "DELETE",
    "DROP",
    "TRUNCATE",
    // schema changes
    "CREATE",
    "ALTER",
    // privilege management
    "GRANT",
    "REVOKE",
    // stored routines
    "EXEC",
    "EXECUTE",
    "CALL",
    // file access and external state
    "COPY",
    "EXPORT DATABASE",
    "IMPORT DATABASE",
    "ATTACH",
    "DETACH",
    "INSTALL",
    // catalog introspection
    "SHOW TABLES",
    "SHOW DATABASES",
    "INFORMATION_SCHEMA",
    "PG_CATALOG",
    "DUCKDB_",
    "PRAGMA",
];

/// A query that has passed [`validate`]. The only way to construct one is
/// through the validator, so an executor that takes `&SafeQuery` cannot be
/// handed unvetted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeQuery(String);

impl SafeQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of validation. The rejected arm carries only the reason; nothing
/// executable survives a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Safe(SafeQuery),
    Rejected { reason: String },
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe(_))
    }
}

/// Classifies a candidate query without executing or parsing it.
///
/// Checks run in order and stop at the first hit: deny-listed keywords
/// anywhere in the text, then the SELECT prefix, then comment markers and
/// stacked or UNION-chained statements. Matching is case-insensitive; the
/// returned [`SafeQuery`] preserves the candidate unchanged.
pub fn validate(candidate: &str) -> Verdict {
    let upper = candidate.trim().to_uppercase();

    for keyword in DENY_LIST {
        if upper.contains(keyword) {
            return Verdict::Rejected {
                reason: format!("Query contains dangerous keyword: {keyword}"),
            };
        }
    }

    if !upper.starts_with("SELECT") {
        return Verdict::Rejected {
            reason: "Only SELECT queries are allowed".to_string(),
        };
    }

    if let Some(pattern) = suspicious_pattern(&upper) {
        return Verdict::Rejected {
            reason: format!("Query contains suspicious pattern: {pattern}"),
        };
    }

    Verdict::Safe(SafeQuery(candidate.to_string()))
}

/// Comment markers, stacked statements, and UNION chaining. The positional
/// scans run over the whole text, newlines included.
fn suspicious_pattern(upper: &str) -> Option<&'static str> {
    if upper.contains("--") {
        return Some("--");
    }
    if upper.contains("/*") {
        return Some("/*");
    }
    if upper.contains("*/") {
        return Some("*/");
    }
    if followed_by(upper, ";", "SELECT") {
        return Some("; followed by SELECT");
    }
    if followed_by(upper, "UNION", "SELECT") {
        return Some("UNION followed by SELECT");
    }
    None
}

/// True when `needle` occurs after the first occurrence of `marker`. A later
/// occurrence of `marker` with `needle` after it implies the same for the
/// first one, so scanning from the first hit covers every pair.
fn followed_by(text: &str, marker: &str, needle: &str) -> bool {
    match text.find(marker) {
        Some(position) => text[position + marker.len()..].contains(needle),
        None => false,
    }
}
