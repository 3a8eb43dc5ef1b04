//! Directive syntax extraction.
//!
//! Finds inline `:name`, leaf block `::name` and container `:::name`
//! occurrences and produces the raw records the directive core consumes.

mod attrs;
pub(crate) mod fence;
mod scan;

pub(crate) use scan::{find_closing, scan_block_header, scan_inline};
