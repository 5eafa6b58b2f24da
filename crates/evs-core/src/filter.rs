//! Filter predicate — decides whether one record matches a search criterion.

use crate::types::{Record, SearchCriterion};

/// True when the record's `EventID` equals the criterion.
///
/// Total: a record without a readable `EventID` is simply not a match.
pub fn matches(record: &Record, criterion: &SearchCriterion) -> bool {
    record.event_id() == Some(criterion.event_id)
}
