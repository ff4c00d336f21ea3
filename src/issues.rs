//! Diagnostic accumulation for graph construction.
//!
//! Both compilation stages report every recoverable problem to an [`Issues`]
//! sink instead of failing fast: a malformed field or dangling reference
//! skips the smallest possible unit of work while the rest of the dataset
//! description keeps compiling. Callers inspect the sink afterwards and
//! decide whether the compiled graph is fit for execution.
//!
//! # Examples
//!
//! ```
//! use harvestgraph::issues::Issues;
//!
//! let mut issues = Issues::new();
//! issues.add_error("reference to unknown node \"files/train\"");
//! issues.add_warning("encoding format is empty");
//!
//! assert!(issues.has_errors());
//! assert_eq!(issues.errors().count(), 1);
//! assert_eq!(issues.iter().count(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Suspicious but non-blocking; the compiled graph is still usable.
    Warning,
    /// A structural or referential problem. The affected unit of work was
    /// skipped and the graph is best-effort.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic recorded during graph construction or validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// Human-readable description, naming the offending uid where one exists.
    pub message: String,
    /// Timestamp for when the issue was observed.
    pub when: DateTime<Utc>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Write-mostly accumulator of [`Issue`] records.
///
/// There is no deduplication: reporting order follows detection order, which
/// for referential checks follows input order. The sink is call-scoped and
/// handed through both compilation stages before ending up inside the
/// returned [`ComputationGraph`](crate::graphs::ComputationGraph).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issues {
    entries: Vec<Issue>,
}

impl Issues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error-level diagnostic.
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "graph error recorded");
        self.entries.push(Issue {
            severity: Severity::Error,
            message,
            when: Utc::now(),
        });
    }

    /// Record a warning-level diagnostic.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "graph warning recorded");
        self.entries.push(Issue {
            severity: Severity::Warning,
            message,
            when: Utc::now(),
        });
    }

    /// Whether any error-level diagnostic has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    /// Iterate over error-level diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.entries
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    /// Iterate over all recorded diagnostics in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.entries {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_and_warnings_are_kept_separate() {
        let mut issues = Issues::new();
        assert!(!issues.has_errors());

        issues.add_warning("first");
        assert!(!issues.has_errors());

        issues.add_error("second");
        assert!(issues.has_errors());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues.errors().count(), 1);
    }

    #[test]
    fn no_dedup_and_detection_order_is_preserved() {
        let mut issues = Issues::new();
        issues.add_error("same message");
        issues.add_error("same message");
        let messages: Vec<_> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["same message", "same message"]);
    }

    #[test]
    fn display_prefixes_severity() {
        let mut issues = Issues::new();
        issues.add_error("broken reference");
        assert_eq!(issues.to_string(), "error: broken reference\n");
    }
}
