//! Domain-specific assertion macros for evs harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! search invariant was violated.

/// Assert the records of a report carry exactly these `EventRecordID`s, in
/// order.
///
/// ```rust
/// assert_record_ids!(report, [1, 2, 3]);
/// ```
#[macro_export]
macro_rules! assert_record_ids {
    ($report:expr, [$($id:expr),* $(,)?]) => {{
        let report: &evs_core::SearchReport = &$report;
        let actual: Vec<u64> = report
            .records
            .iter()
            .map(|r| $crate::common::record_id(r.data()))
            .collect();
        let expected: Vec<u64> = vec![$($id),*];
        pretty_assertions::assert_eq!(
            actual, expected,
            "assert_record_ids! failed: result records out of order or incomplete"
        );
    }};
}

/// Assert every record in a report matches the requested event ID.
#[macro_export]
macro_rules! assert_all_match {
    ($report:expr) => {{
        let report: &evs_core::SearchReport = &$report;
        let wanted = report.request.criterion.event_id;
        for (ordinal, record) in report.records.iter().enumerate() {
            assert_eq!(
                record.event_id(),
                Some(wanted),
                "assert_all_match! failed: record #{} has EventID {:?}, search was for {}",
                ordinal,
                record.event_id(),
                wanted
            );
        }
    }};
}

/// Assert a report carries a notice whose text contains `needle`.
#[macro_export]
macro_rules! assert_notice {
    ($report:expr, $needle:expr) => {{
        let report: &evs_core::SearchReport = &$report;
        let needle: &str = $needle;
        let notices: Vec<String> = report.notices().iter().map(|n| n.to_string()).collect();
        assert!(
            notices.iter().any(|n| n.contains(needle)),
            "assert_notice! failed: no notice contains {:?}.\n  Notices: {:#?}",
            needle,
            notices
        );
    }};
}
