//! Pipeline stages for one monitoring cycle.
//!
//! - `diff`: keyed, field-level comparison between snapshots
//! - `render`: per-audience message rendering
//! - `cycle`: the check-and-notify cycle itself

pub mod cycle;
pub mod diff;
pub mod render;

pub use cycle::{CycleSummary, run_cycle};
pub use diff::{DiffEngine, DiffOutcome, RowDiff};
pub use render::{RenderedMessage, Renderer};
