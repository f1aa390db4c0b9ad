//! Query resolver
//!
//! The single entry point callers need:
//!
//! 1. Compile the predicate into a range set (rejects malformed predicates)
//! 2. Scan the ranges inside the caller's read transaction
//! 3. Post-filter candidates against the exact predicate and auxiliary filter
//! 4. Stream accepted records, stopping at the limit
//!
//! The resolver holds no per-query state and may be shared across threads.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::ResolverConfig;
use crate::fold::CaseFolder;
use crate::index::{Direction, RangeSet};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::planner::{ExplainPlan, PlannerError, PlannerResult, Predicate, Query, RangeSetCompiler};
use crate::store::{IndexRef, ReadTransaction};

use super::errors::QueryResult;
use super::filters::PostFilter;
use super::result::Matches;
use super::scan::RangeScan;

/// Compiles, executes and filters queries
#[derive(Debug)]
pub struct Resolver {
    config: ResolverConfig,
    compiler: RangeSetCompiler,
    metrics: Arc<MetricsRegistry>,
}

impl Resolver {
    /// Creates a resolver with its own metrics registry
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_metrics(config, Arc::new(MetricsRegistry::new()))
    }

    /// Creates a resolver reporting into a shared metrics registry
    pub fn with_metrics(config: ResolverConfig, metrics: Arc<MetricsRegistry>) -> Self {
        let compiler = RangeSetCompiler::new(config.folder()).with_max_ranges(config.max_ranges);
        Self {
            config,
            compiler,
            metrics,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the folder shared by the compiler and the post-filter
    pub fn folder(&self) -> CaseFolder {
        self.compiler.folder()
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Compiles a predicate into a sorted, non-overlapping range set.
    pub fn compile(&self, predicate: &Predicate) -> PlannerResult<RangeSet> {
        self.compile_logged(predicate, None, None)
    }

    /// Scans `ranges` of `index` inside `txn`, returning raw candidates.
    ///
    /// No post-filtering is applied.
    pub fn execute<'t, T: ReadTransaction + 't>(
        &self,
        txn: &'t T,
        index: &IndexRef,
        ranges: RangeSet,
        direction: Direction,
    ) -> RangeScan<'t, T> {
        let scan = RangeScan::new(txn, index.clone(), ranges, direction, Arc::clone(&self.metrics));
        if self.config.log_queries {
            scan.with_logging(&Uuid::new_v4().to_string())
        } else {
            scan
        }
    }

    /// Resolves a query into a lazy stream of matching records.
    ///
    /// Fails only if the query is rejected at compile time; store and filter
    /// failures surface as an `Err` item of the stream.
    pub fn resolve<'t, 'q, T: ReadTransaction + 't>(
        &self,
        txn: &'t T,
        query: Query<'q>,
    ) -> QueryResult<Matches<'t, 'q, T>> {
        let query_id = Uuid::new_v4().to_string();

        if query.limit == Some(0) {
            let err = PlannerError::limit_invalid();
            self.reject(&query.predicate, Some(&query.index), Some(&query_id), &err);
            return Err(err.into());
        }

        let ranges = self.compile_logged(&query.predicate, Some(&query.index), Some(&query_id))?;

        let Query {
            index,
            predicate,
            filter,
            direction,
            limit,
        } = query;

        let mut scan = RangeScan::new(txn, index, ranges, direction, Arc::clone(&self.metrics));
        if self.config.log_queries {
            scan = scan.with_logging(&query_id);
        }
        let filter = PostFilter::new(self.folder(), predicate, filter);

        Ok(Matches::new(scan, filter, limit, Arc::clone(&self.metrics)))
    }

    /// Describes how a query compiles without scanning
    pub fn explain(&self, query: &Query<'_>) -> ExplainPlan {
        match self.compiler.compile(&query.predicate) {
            Ok(ranges) if query.limit != Some(0) => ExplainPlan::from_ranges(query, &ranges),
            Ok(_) => ExplainPlan::from_error(query, &PlannerError::limit_invalid()),
            Err(err) => ExplainPlan::from_error(query, &err),
        }
    }

    fn compile_logged(
        &self,
        predicate: &Predicate,
        index: Option<&IndexRef>,
        query_id: Option<&str>,
    ) -> PlannerResult<RangeSet> {
        match self.compiler.compile(predicate) {
            Ok(ranges) => {
                self.metrics.increment_queries_compiled();
                if self.config.log_queries {
                    let count = ranges.len().to_string();
                    let description = predicate.to_string();
                    let index = index.map(|i| i.to_string());
                    let mut fields = vec![("predicate", description.as_str()), ("ranges", count.as_str())];
                    if let Some(index) = index.as_deref() {
                        fields.push(("index", index));
                    }
                    if let Some(id) = query_id {
                        fields.push(("query_id", id));
                    }
                    log_event_with_fields(Event::QueryCompiled, &fields);
                }
                Ok(ranges)
            }
            Err(err) => {
                self.reject(predicate, index, query_id, &err);
                Err(err)
            }
        }
    }

    fn reject(
        &self,
        predicate: &Predicate,
        index: Option<&IndexRef>,
        query_id: Option<&str>,
        err: &PlannerError,
    ) {
        self.metrics.increment_queries_rejected();
        if !self.config.log_queries {
            return;
        }
        let description = predicate.to_string();
        let index = index.map(|i| i.to_string());
        let mut fields = vec![
            ("code", err.code().code()),
            ("predicate", description.as_str()),
            ("reason", err.message()),
        ];
        if let Some(index) = index.as_deref() {
            fields.push(("index", index));
        }
        if let Some(id) = query_id {
            fields.push(("query_id", id));
        }
        log_event_with_fields(Event::QueryRejected, &fields);
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
