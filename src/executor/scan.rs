//! Range-scan executor
//!
//! Drives one store cursor per range, strictly in sequence. Ranges are
//! disjoint and sorted, so concatenating the per-range streams yields the
//! global key order without a merge step:
//!
//! - Ascending: ranges in order, each cursor ascending
//! - Descending: ranges reversed, each cursor descending
//!
//! At most one cursor is open at a time. It is released when its range is
//! exhausted, when the scan fails, or when the scan is dropped.

use std::sync::Arc;

use crate::index::{Direction, KeyRange, RangeSet};
use crate::observability::{MetricsRegistry, ObservationScope, Timer};
use crate::store::{IndexCursor, IndexRef, ReadTransaction, Record};

use super::errors::{QueryError, QueryResult};

/// Counters for one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanStats {
    /// Ranges in the compiled set
    pub ranges_total: usize,
    /// Cursors opened so far
    pub ranges_opened: usize,
    /// Entries read from cursors
    pub candidates_scanned: u64,
    /// Entries dropped for lying outside their range's bounds
    pub out_of_range: u64,
}

enum Step {
    Open,
    Yield(Record),
    Skip,
    Exhausted,
    Fail(QueryError),
}

/// Lazy stream of candidate records over a range set
pub struct RangeScan<'t, T: ReadTransaction + 't> {
    txn: &'t T,
    index: IndexRef,
    direction: Direction,
    ranges: std::vec::IntoIter<KeyRange>,
    current: Option<(KeyRange, T::Cursor<'t>)>,
    stats: ScanStats,
    finished: bool,
    metrics: Arc<MetricsRegistry>,
    scope: Option<ObservationScope<'static>>,
    timer: Timer,
}

impl<'t, T: ReadTransaction + 't> RangeScan<'t, T> {
    /// Creates a scan over `ranges` inside `txn`. No cursor is opened until
    /// the first pull.
    pub fn new(
        txn: &'t T,
        index: IndexRef,
        ranges: RangeSet,
        direction: Direction,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let mut ranges = ranges.into_ranges();
        if direction.is_descending() {
            ranges.reverse();
        }

        Self {
            txn,
            index,
            direction,
            stats: ScanStats {
                ranges_total: ranges.len(),
                ..ScanStats::default()
            },
            ranges: ranges.into_iter(),
            current: None,
            finished: false,
            metrics,
            scope: None,
            timer: Timer::new(),
        }
    }

    /// Enables structured logging of the scan's lifecycle
    pub(crate) fn with_logging(mut self, query_id: &str) -> Self {
        let index = self.index.to_string();
        let ranges = self.stats.ranges_total.to_string();
        self.scope = Some(ObservationScope::with_fields(
            "SCAN",
            &[
                ("direction", self.direction.as_str()),
                ("index", &index),
                ("query_id", query_id),
                ("ranges", &ranges),
            ],
        ));
        self
    }

    /// Returns the scan direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the index being scanned
    pub fn index(&self) -> &IndexRef {
        &self.index
    }

    /// Returns the counters so far
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Returns true once the scan has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Ends the scan early and releases the open cursor.
    ///
    /// Used when the consumer has taken every record it needs.
    pub fn close(&mut self) {
        if self.finished {
            return;
        }
        self.current = None;
        self.finish_complete(true);
    }

    /// Ends the scan because of a failure downstream of the cursor.
    pub(crate) fn abort(&mut self, err: &QueryError) {
        if self.finished {
            return;
        }
        self.current = None;
        self.finish_failed(err);
    }

    fn stat_fields(&self) -> [(&'static str, String); 4] {
        [
            ("candidates", self.stats.candidates_scanned.to_string()),
            ("elapsed_us", self.timer.elapsed_us()),
            ("out_of_range", self.stats.out_of_range.to_string()),
            ("ranges_opened", self.stats.ranges_opened.to_string()),
        ]
    }

    fn finish_complete(&mut self, truncated: bool) {
        self.finished = true;
        self.metrics.increment_scans_completed();
        if let Some(scope) = self.scope.take() {
            let stats = self.stat_fields();
            let mut fields: Vec<(&str, &str)> = stats.iter().map(|(k, v)| (*k, v.as_str())).collect();
            fields.push(("truncated", if truncated { "true" } else { "false" }));
            scope.complete_with_fields(&fields);
        }
    }

    fn finish_failed(&mut self, err: &QueryError) {
        self.finished = true;
        self.metrics.increment_scans_aborted();
        if let Some(scope) = self.scope.take() {
            let stats = self.stat_fields();
            let mut fields: Vec<(&str, &str)> = stats.iter().map(|(k, v)| (*k, v.as_str())).collect();
            fields.push(("code", err.code()));
            scope.fail_with_fields(&err.to_string(), &fields);
        }
    }

    fn step(&mut self) -> Step {
        match self.current.as_mut() {
            None => Step::Open,
            Some((range, cursor)) => match cursor.next_entry() {
                Ok(Some(record)) => {
                    if range.contains(&record.key) {
                        Step::Yield(record)
                    } else {
                        Step::Skip
                    }
                }
                Ok(None) => Step::Exhausted,
                Err(err) => Step::Fail(err.into()),
            },
        }
    }

    fn open_next(&mut self) -> QueryResult<bool> {
        let range = match self.ranges.next() {
            Some(range) => range,
            None => return Ok(false),
        };
        let cursor = self.txn.open_cursor(&self.index, &range, self.direction)?;
        self.stats.ranges_opened += 1;
        self.metrics.increment_ranges_scanned();
        self.current = Some((range, cursor));
        Ok(true)
    }

    fn fail(&mut self, err: QueryError) -> Option<QueryResult<Record>> {
        self.current = None;
        self.finish_failed(&err);
        Some(Err(err))
    }
}

impl<'t, T: ReadTransaction + 't> Iterator for RangeScan<'t, T> {
    type Item = QueryResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            match self.step() {
                Step::Open => match self.open_next() {
                    Ok(true) => {}
                    Ok(false) => {
                        self.finish_complete(false);
                        return None;
                    }
                    Err(err) => return self.fail(err),
                },
                Step::Yield(record) => {
                    self.stats.candidates_scanned += 1;
                    self.metrics.add_candidates_scanned(1);
                    return Some(Ok(record));
                }
                Step::Skip => {
                    self.stats.candidates_scanned += 1;
                    self.stats.out_of_range += 1;
                    self.metrics.add_candidates_scanned(1);
                }
                Step::Exhausted => self.current = None,
                Step::Fail(err) => return self.fail(err),
            }
        }
    }
}

impl<'t, T: ReadTransaction + 't> std::iter::FusedIterator for RangeScan<'t, T> {}

impl<'t, T: ReadTransaction + 't> Drop for RangeScan<'t, T> {
    fn drop(&mut self) {
        if !self.finished {
            self.metrics.increment_scans_cancelled();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Key;
    use crate::store::{IndexSpec, MemoryStore, StoreError, StoreResult};
    use serde_json::json;
    use std::cell::Cell;
    use std::ops::Bound;

    fn store_with(names: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_table("files", vec![IndexSpec::new("filename")])
            .unwrap();
        for name in names {
            store.insert("files", json!({ "filename": name })).unwrap();
        }
        store
    }

    fn index() -> IndexRef {
        IndexRef::new("files", "filename")
    }

    fn text_range(lower: &str, upper: &str) -> KeyRange {
        KeyRange::new(
            Bound::Included(Key::text(lower)),
            Bound::Excluded(Key::text(upper)),
        )
        .unwrap()
    }

    fn keys<T: ReadTransaction>(scan: RangeScan<'_, T>) -> Vec<String> {
        scan.map(|r| r.unwrap().key.as_text().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_ascending_concatenates_ranges() {
        let store = store_with(&["b", "A", "a", "B", "c", "Ab"]);
        let txn = store.read();
        let ranges = RangeSet::from_ranges([text_range("A", "B"), text_range("a", "b")]);

        let scan = RangeScan::new(&txn, index(), ranges, Direction::Ascending, Arc::default());
        assert_eq!(keys(scan), vec!["A", "Ab", "a"]);
    }

    #[test]
    fn test_descending_reverses_ranges_and_entries() {
        let store = store_with(&["b", "A", "a", "B", "c", "Ab"]);
        let txn = store.read();
        let ranges = RangeSet::from_ranges([text_range("A", "B"), text_range("a", "b")]);

        let scan = RangeScan::new(&txn, index(), ranges, Direction::Descending, Arc::default());
        assert_eq!(keys(scan), vec!["a", "Ab", "A"]);
    }

    #[test]
    fn test_empty_ranges_are_not_errors() {
        let store = store_with(&["hello"]);
        let txn = store.read();
        let ranges = RangeSet::from_ranges([text_range("A", "B"), text_range("x", "z")]);

        let mut scan = RangeScan::new(&txn, index(), ranges, Direction::Ascending, Arc::default());
        assert!(scan.next().is_none());
        assert_eq!(scan.stats().ranges_opened, 2);
        assert!(scan.is_finished());
    }

    #[test]
    fn test_metrics_on_completion() {
        let store = store_with(&["a", "b", "c"]);
        let txn = store.read();
        let metrics = Arc::new(MetricsRegistry::new());
        let ranges = RangeSet::from_ranges([KeyRange::point(Key::text("b"))]);

        let scan = RangeScan::new(&txn, index(), ranges, Direction::Ascending, metrics.clone());
        assert_eq!(keys(scan), vec!["b"]);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ranges_scanned, 1);
        assert_eq!(snapshot.candidates_scanned, 1);
        assert_eq!(snapshot.scans_completed, 1);
        assert_eq!(snapshot.scans_cancelled, 0);
    }

    #[test]
    fn test_drop_counts_as_cancelled() {
        let store = store_with(&["a", "b", "c"]);
        let txn = store.read();
        let metrics = Arc::new(MetricsRegistry::new());

        let mut scan = RangeScan::new(
            &txn,
            index(),
            RangeSet::from_ranges([KeyRange::all_text()]),
            Direction::Ascending,
            metrics.clone(),
        )
        .with_logging("test");
        assert!(scan.next().is_some());
        drop(scan);

        assert_eq!(metrics.snapshot().scans_cancelled, 1);
        assert_eq!(metrics.snapshot().scans_completed, 0);
    }

    #[test]
    fn test_close_ends_scan() {
        let store = store_with(&["a", "b", "c"]);
        let txn = store.read();
        let metrics = Arc::new(MetricsRegistry::new());

        let mut scan = RangeScan::new(
            &txn,
            index(),
            RangeSet::from_ranges([KeyRange::all_text()]),
            Direction::Ascending,
            metrics.clone(),
        );
        assert!(scan.next().is_some());
        scan.close();
        assert!(scan.next().is_none());
        drop(scan);

        assert_eq!(metrics.snapshot().scans_completed, 1);
        assert_eq!(metrics.snapshot().scans_cancelled, 0);
    }

    /// Transaction whose cursors ignore the requested bounds and
    /// replay a fixed key list, optionally failing after some entries.
    struct SloppyTxn {
        keys: Vec<&'static str>,
        fail_after: Option<usize>,
        opened: Cell<usize>,
    }

    struct SloppyCursor<'t> {
        keys: std::slice::Iter<'t, &'static str>,
        remaining_ok: Option<usize>,
    }

    impl IndexCursor for SloppyCursor<'_> {
        fn next_entry(&mut self) -> StoreResult<Option<Record>> {
            if let Some(remaining) = self.remaining_ok.as_mut() {
                if *remaining == 0 {
                    return Err(StoreError::io("transaction aborted"));
                }
                *remaining -= 1;
            }
            Ok(self
                .keys
                .next()
                .map(|k| Record::new(1, Key::text(*k), json!({}))))
        }
    }

    impl ReadTransaction for SloppyTxn {
        type Cursor<'t> = SloppyCursor<'t> where Self: 't;

        fn open_cursor(
            &self,
            _index: &IndexRef,
            _range: &KeyRange,
            _direction: Direction,
        ) -> StoreResult<SloppyCursor<'_>> {
            self.opened.set(self.opened.get() + 1);
            Ok(SloppyCursor {
                keys: self.keys.iter(),
                remaining_ok: self.fail_after,
            })
        }
    }

    #[test]
    fn test_entries_outside_bounds_are_dropped() {
        let txn = SloppyTxn {
            keys: vec!["A", "B", "a", "b"],
            fail_after: None,
            opened: Cell::new(0),
        };
        let ranges = RangeSet::from_ranges([
            KeyRange::new(
                Bound::Excluded(Key::text("A")),
                Bound::Included(Key::text("a")),
            )
            .unwrap(),
        ]);

        let mut scan = RangeScan::new(&txn, index(), ranges, Direction::Ascending, Arc::default());
        let records: Vec<_> = scan.by_ref().map(|r| r.unwrap().key).collect();
        assert_eq!(records, vec![Key::text("B"), Key::text("a")]);
        assert_eq!(scan.stats().out_of_range, 2);
        assert_eq!(scan.stats().candidates_scanned, 4);
    }

    #[test]
    fn test_store_failure_is_yielded_once_then_fused() {
        let txn = SloppyTxn {
            keys: vec!["a", "b", "c"],
            fail_after: Some(1),
            opened: Cell::new(0),
        };
        let metrics = Arc::new(MetricsRegistry::new());
        let ranges = RangeSet::from_ranges([KeyRange::all_text()]);

        let mut scan = RangeScan::new(&txn, index(), ranges, Direction::Ascending, metrics.clone())
            .with_logging("test");
        assert!(scan.next().unwrap().is_ok());
        match scan.next() {
            Some(Err(QueryError::StoreFailure(err))) => assert!(err.is_fatal()),
            other => panic!("expected store failure, got {:?}", other),
        }
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
        assert_eq!(metrics.snapshot().scans_aborted, 1);
    }

    #[test]
    fn test_ranges_opened_lazily_and_in_sequence() {
        let txn = SloppyTxn {
            keys: vec!["a"],
            fail_after: None,
            opened: Cell::new(0),
        };
        let ranges = RangeSet::from_ranges([
            KeyRange::point(Key::text("a")),
            KeyRange::point(Key::text("c")),
        ]);

        let mut scan = RangeScan::new(&txn, index(), ranges, Direction::Ascending, Arc::default());
        assert_eq!(txn.opened.get(), 0);
        assert!(scan.next().is_some());
        assert_eq!(txn.opened.get(), 1);
        assert!(scan.next().is_none());
        assert_eq!(txn.opened.get(), 2);
    }
}
