//! IO modules - archive input, row parsing and result egress
//!
//! This module contains all external IO operations:
//! - `archive` - ZIP (or base64 ZIP) extraction of sensor text files
//! - `row_parser` - Header detection and row tokenization
//! - `egress` - Analysis output to file (JSONL format)

pub mod archive;
pub mod egress;
pub mod row_parser;

// Re-export commonly used types
pub use archive::{read_archive, read_base64_archive};
pub use egress::Egress;
pub use row_parser::{parse_rows, ParsedRows};
