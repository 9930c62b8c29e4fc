//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `events.csv`
//! - `tick_summaries.csv`
//! - `agent_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{AgentSnapshotRow, EventRow, OutputResult, TickSummaryRow};
use crate::writer::OutputWriter;

pub const EVENTS_FILE:    &str = "events.csv";
pub const SUMMARIES_FILE: &str = "tick_summaries.csv";
pub const SNAPSHOTS_FILE: &str = "agent_snapshots.csv";

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    events:    Writer<File>,
    summaries: Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the three CSV files in it, and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut events = Writer::from_path(dir.join(EVENTS_FILE))?;
        events.write_record(["tick", "event", "agent", "subject", "detail"])?;

        let mut summaries = Writer::from_path(dir.join(SUMMARIES_FILE))?;
        summaries.write_record(["tick", "elapsed_ms", "events"])?;

        let mut snapshots = Writer::from_path(dir.join(SNAPSHOTS_FILE))?;
        snapshots.write_record([
            "tick", "agent_id", "kind", "x", "y", "z", "speed", "state", "target_node", "permitted", "enabled",
        ])?;

        Ok(Self { events, summaries, snapshots, finished: false })
    }
}

fn opt(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.tick.to_string(),
            row.event.to_owned(),
            opt(row.agent),
            opt(row.subject),
            row.detail.clone(),
        ])?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_ms.to_string(),
            row.events.to_string(),
        ])?;
        Ok(())
    }

    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.kind.to_owned(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                format!("{:.3}", row.z),
                format!("{:.3}", row.speed),
                row.state.to_owned(),
                row.target_node.to_string(),
                (row.permitted as u8).to_string(),
                (row.enabled as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summaries.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}
