//! Explain plan output
//!
//! Produces deterministic, human-readable output describing how a query
//! compiles: the index, the predicate, every range the executor will scan
//! and whether a post-filter is needed.

use std::fmt;

use serde::Serialize;

use super::ast::Query;
use super::errors::PlannerError;
use crate::index::RangeSet;

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainPlan {
    /// Whether compilation succeeded
    pub accepted: bool,
    /// Index scanned, as `table.index`
    pub index: String,
    /// Predicate description
    pub predicate: String,
    /// Ranges in scan order
    pub ranges: Vec<String>,
    /// Scan direction
    pub direction: String,
    /// Whether candidates are re-checked after the scan
    pub post_filter: bool,
    /// Whether an auxiliary filter is attached
    pub auxiliary_filter: bool,
    /// Limit
    pub limit: Option<usize>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a compiled query
    pub fn from_ranges(query: &Query<'_>, ranges: &RangeSet) -> Self {
        let mut scan: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
        if query.direction.is_descending() {
            scan.reverse();
        }

        // Ranges made only of points are exact for case-sensitive predicates
        let exact = !query.predicate.is_case_insensitive() && ranges.iter().all(|r| r.is_point());

        Self {
            accepted: true,
            index: query.index.to_string(),
            predicate: query.predicate.to_string(),
            ranges: scan,
            direction: query.direction.as_str().to_string(),
            post_filter: !exact,
            auxiliary_filter: query.filter.is_some(),
            limit: query.limit,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a compilation error
    pub fn from_error(query: &Query<'_>, err: &PlannerError) -> Self {
        Self {
            accepted: false,
            index: query.index.to_string(),
            predicate: query.predicate.to_string(),
            ranges: Vec::new(),
            direction: query.direction.as_str().to_string(),
            post_filter: false,
            auxiliary_filter: query.filter.is_some(),
            limit: query.limit,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }

    /// Serializes the plan as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Predicate: {}", self.predicate)?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            writeln!(f, "Direction: {}", self.direction)?;
            writeln!(f, "Ranges ({}):", self.ranges.len())?;
            for range in &self.ranges {
                writeln!(f, "  - {}", range)?;
            }
            writeln!(f, "Post Filter: {}", if self.post_filter { "yes" } else { "no" })?;
            if self.auxiliary_filter {
                writeln!(f, "Auxiliary Filter: yes")?;
            }
            if let Some(limit) = self.limit {
                writeln!(f, "Limit: {}", limit)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ast::Predicate;
    use crate::planner::compiler::RangeSetCompiler;
    use crate::store::IndexRef;

    fn explain(query: &Query<'_>) -> ExplainPlan {
        match RangeSetCompiler::default().compile(&query.predicate) {
            Ok(ranges) => ExplainPlan::from_ranges(query, &ranges),
            Err(err) => ExplainPlan::from_error(query, &err),
        }
    }

    #[test]
    fn test_explain_accepted_plan() {
        let query = Query::new(
            IndexRef::new("files", "filename"),
            Predicate::equals_ignore_case("hello"),
        )
        .desc()
        .with_limit(10);

        let plan = explain(&query);
        assert!(plan.accepted);
        assert_eq!(plan.index, "files.filename");
        assert_eq!(plan.ranges, vec!["[\"h\", \"i\")", "[\"H\", \"I\")"]);
        assert_eq!(plan.direction, "desc");
        assert!(plan.post_filter);
        assert_eq!(plan.limit, Some(10));

        let output = format!("{}", plan);
        assert!(output.contains("ACCEPTED"));
        assert!(output.contains("Ranges (2):"));
    }

    #[test]
    fn test_explain_exact_points_skip_post_filter() {
        let query = Query::new(
            IndexRef::new("files", "filename"),
            Predicate::equals_any_of(["hello", "README"]),
        );
        let plan = explain(&query);
        assert!(!plan.post_filter);
        assert!(format!("{}", plan).contains("Post Filter: no"));
    }

    #[test]
    fn test_explain_rejected_plan() {
        let query = Query::new(
            IndexRef::new("files", "filename"),
            Predicate::any_of_ignore_case(Vec::<String>::new()),
        );
        let plan = explain(&query);

        assert!(!plan.accepted);
        assert_eq!(plan.rejection_code, Some("FOLDSCAN_PREDICATE_MALFORMED".into()));

        let output = format!("{}", plan);
        assert!(output.contains("REJECTED"));
        assert!(output.contains("FOLDSCAN_PREDICATE_MALFORMED"));
    }

    #[test]
    fn test_explain_deterministic() {
        let query = Query::new(
            IndexRef::new("folders", "path"),
            Predicate::starts_with_ignore_case("/usr"),
        )
        .with_filter(|_| true);

        let first = format!("{}", explain(&query));
        let second = format!("{}", explain(&query));
        assert_eq!(first, second);
        assert!(first.contains("Auxiliary Filter: yes"));
    }

    #[test]
    fn test_to_json() {
        let query = Query::new(IndexRef::new("files", "filename"), Predicate::equals("a"));
        let parsed: serde_json::Value = serde_json::from_str(&explain(&query).to_json()).unwrap();
        assert_eq!(parsed["accepted"], true);
        assert_eq!(parsed["index"], "files.filename");
        assert_eq!(parsed["post_filter"], false);
    }
}
