//! Result stream for query execution
//!
//! `Matches` is a single-pass lazy stream of accepted records in scan order.
//! Consumers may stop pulling at any time; the underlying scan is closed as
//! soon as a limit is reached and released when the stream is dropped.

use std::sync::Arc;

use crate::index::{Key, PrimaryKey};
use crate::observability::MetricsRegistry;
use crate::store::{ReadTransaction, Record};

use super::errors::QueryResult;
use super::filters::PostFilter;
use super::scan::{RangeScan, ScanStats};

/// Filtered, ordered record stream returned by `resolve`
pub struct Matches<'t, 'q, T: ReadTransaction + 't> {
    scan: RangeScan<'t, T>,
    filter: PostFilter<'q>,
    remaining: Option<usize>,
    metrics: Arc<MetricsRegistry>,
    done: bool,
}

impl<'t, 'q, T: ReadTransaction + 't> Matches<'t, 'q, T> {
    pub(crate) fn new(
        scan: RangeScan<'t, T>,
        filter: PostFilter<'q>,
        limit: Option<usize>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            scan,
            filter,
            remaining: limit,
            metrics,
            done: false,
        }
    }

    /// Stops after `n` more accepted records. Tightens an existing limit.
    pub fn limit(mut self, n: usize) -> Self {
        self.remaining = Some(self.remaining.map_or(n, |r| r.min(n)));
        if self.remaining == Some(0) {
            self.stop();
        }
        self
    }

    /// Materializes every remaining record in stream order
    pub fn to_vec(self) -> QueryResult<Vec<Record>> {
        self.collect()
    }

    /// Counts the remaining records, stopping at the first error
    pub fn count(self) -> QueryResult<usize> {
        let mut n = 0;
        for record in self {
            record?;
            n += 1;
        }
        Ok(n)
    }

    /// Returns the first record and closes the scan
    pub fn first(mut self) -> QueryResult<Option<Record>> {
        let first = self.next().transpose()?;
        self.stop();
        Ok(first)
    }

    /// Collects the index keys of the remaining records
    pub fn keys(self) -> QueryResult<Vec<Key>> {
        self.map(|r| r.map(|record| record.key)).collect()
    }

    /// Collects the primary keys of the remaining records
    pub fn primary_keys(self) -> QueryResult<Vec<PrimaryKey>> {
        self.map(|r| r.map(|record| record.primary_key)).collect()
    }

    /// Returns the scan counters so far
    pub fn stats(&self) -> ScanStats {
        self.scan.stats()
    }

    fn stop(&mut self) {
        self.done = true;
        self.scan.close();
    }
}

impl<'t, 'q, T: ReadTransaction + 't> Iterator for Matches<'t, 'q, T> {
    type Item = QueryResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let record = match self.scan.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(record)) => record,
            };

            match self.filter.accept(&record) {
                Ok(true) => {
                    self.metrics.increment_records_returned();
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                        if *remaining == 0 {
                            self.stop();
                        }
                    }
                    return Some(Ok(record));
                }
                Ok(false) => self.metrics.increment_candidates_rejected(),
                Err(err) => {
                    self.done = true;
                    self.scan.abort(&err);
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<'t, 'q, T: ReadTransaction + 't> std::iter::FusedIterator for Matches<'t, 'q, T> {}
