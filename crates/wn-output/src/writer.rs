//! The `OutputWriter` trait implemented by backend writers.

use crate::{AgentSnapshotRow, EventRow, OutputResult, TickSummaryRow};

/// A sink for simulation rows.
///
/// Errors surface through [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error]
/// because observer hooks cannot fail.
pub trait OutputWriter {
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write a batch of agent snapshots taken on the same tick.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
