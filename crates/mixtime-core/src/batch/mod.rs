//! Table-driven batch processing
//!
//! - CSV table reading, writing and column helpers ([`table`])
//! - Per-row mixing-time estimation over a worker pool ([`runner`])
//! - Mixing time to boundary sample conversion ([`boundary`])

pub mod boundary;
pub mod runner;
pub mod table;

pub use boundary::{boundary_sample, derive_boundary_column};
pub use runner::{run_batch, BatchReport, RowOutcome, RowReport};
pub use table::{read_numeric_column, Table};
