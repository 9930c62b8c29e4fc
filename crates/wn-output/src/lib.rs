//! `wn-output`: simulation recording for the waynet traffic core.
//!
//! [`CsvWriter`] creates three files in the output directory:
//!
//! | File                  | One row per                                   |
//! |-----------------------|-----------------------------------------------|
//! | `events.csv`          | [`SimEvent`](wn_sim::SimEvent), in emission order |
//! | `tick_summaries.csv`  | tick                                          |
//! | `agent_snapshots.csv` | agent, every `output_interval_ticks` ticks    |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `wn_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wn_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config.sim);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentSnapshotRow, EventRow, TickSummaryRow};
pub use writer::OutputWriter;
