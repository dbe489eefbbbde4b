//! Human-readable text written around the table.
pub mod header;

pub use header::{format_footer, format_header, run_description};
