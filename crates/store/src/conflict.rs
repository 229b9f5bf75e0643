//! Duplicate handling for batch writes.

/// What a batch write does when a row's primary key already exists.
///
/// Replayed batches (at-least-once redelivery) rely on `SkipDuplicates` to
/// stay idempotent at the row level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Leave the existing row untouched and continue with the rest of the
    /// batch.
    SkipDuplicates,
    /// Abort the unit of work.
    Error,
}
