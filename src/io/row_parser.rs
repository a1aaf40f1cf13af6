//! Row parser for loosely delimited sensor exports
//!
//! Sensor apps prepend free-form metadata before the column header and mix
//! commas, tabs and runs of spaces as delimiters. The header is located
//! heuristically and every later line is tokenized the same way.

use crate::domain::types::{FieldValue, Sample};
use std::sync::Arc;
use tracing::debug;

/// Tokens that mark the column header of a sensor export
const HEADER_TOKENS: [&str; 4] = ["PacketCounter", "SampleTimeFine", "Quat_", "Euler_"];

/// Rows with fewer populated values are treated as truncated writes
pub const MIN_POPULATED_VALUES: usize = 4;

const COMMENT_PREFIXES: [&str; 2] = ["//", "#"];

/// Output of parsing one file
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub header: Vec<Arc<str>>,
    pub samples: Vec<Sample>,
    /// Data lines dropped for having too few populated values
    pub skipped_rows: usize,
}

/// Parse one file's raw text into ordered samples.
///
/// Never fails: a file without a recognizable header or without valid rows
/// simply yields no samples.
pub fn parse_rows(text: &str) -> ParsedRows {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.lines();

    let Some(header_line) = lines.by_ref().find(|line| is_header_line(line)) else {
        debug!("no_header_found");
        return ParsedRows::default();
    };

    let header: Vec<Arc<str>> = tokenize(header_line).into_iter().map(Arc::from).collect();
    let mut samples = Vec::new();
    let mut skipped_rows = 0;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            continue;
        }

        let values = tokenize(trimmed);
        let populated = values.iter().filter(|v| !v.is_empty()).count();
        if populated < MIN_POPULATED_VALUES {
            skipped_rows += 1;
            continue;
        }

        let mut sample = Sample::new();
        for (name, raw) in header.iter().zip(values.iter()) {
            if !raw.is_empty() {
                sample.insert(Arc::clone(name), FieldValue::parse(raw));
            }
        }
        samples.push(sample);
    }

    debug!(
        columns = header.len(),
        rows = samples.len(),
        skipped_rows = skipped_rows,
        "rows_parsed"
    );

    ParsedRows { header, samples, skipped_rows }
}

fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(|c: char| c.is_ascii_digit())
        || HEADER_TOKENS.iter().any(|token| trimmed.contains(token))
}

/// Split a line on commas and runs of whitespace. Whitespace next to a comma
/// does not open an extra column; empty fields between commas are kept.
fn tokenize(line: &str) -> Vec<String> {
    let trimmed = line.trim().trim_matches(',');
    if trimmed.trim().is_empty() {
        return Vec::new();
    }

    let mut values = Vec::new();
    for field in trimmed.split(',') {
        let field = field.trim();
        if field.is_empty() {
            values.push(String::new());
        } else {
            values.extend(field.split_whitespace().map(str::to_string));
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{QUAT_W, QUAT_X, QUAT_Z};

    const MOVELLA_EXPORT: &str = "\
// Start Time: 2024-03-01 10:15:02
// Update Rate: 60.0Hz
// Filter Profile: human (46.1)
PacketCounter,SampleTimeFine,Quat_W,Quat_X,Quat_Y,Quat_Z
1,1000,1.0,0.0,0.0,0.0
2,1016,0.99,0.01,0.0,0.0
";

    #[test]
    fn test_skips_metadata_before_header() {
        let parsed = parse_rows(MOVELLA_EXPORT);

        assert_eq!(parsed.header.len(), 6);
        assert_eq!(&*parsed.header[0], "PacketCounter");
        assert_eq!(parsed.samples.len(), 2);
        assert_eq!(parsed.samples[1].number(QUAT_W), Some(0.99));
        assert_eq!(parsed.samples[1].number(QUAT_X), Some(0.01));
    }

    #[test]
    fn test_irregular_whitespace_delimiters() {
        let text =
            "  PacketCounter \t Quat_W   Quat_X Quat_Y  Quat_Z  \n  7   0.5\t0.5  0.5 0.5 \n";
        let parsed = parse_rows(text);

        assert_eq!(parsed.header.len(), 5);
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.samples[0].number("PacketCounter"), Some(7.0));
        assert_eq!(parsed.samples[0].number(QUAT_Z), Some(0.5));
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        let text = "Quat_W,Quat_X,Quat_Y,Quat_Z\r\n1,0,0,0\r0.5,0.5,0.5,0.5\r\n";
        let parsed = parse_rows(text);
        assert_eq!(parsed.samples.len(), 2);
    }

    #[test]
    fn test_row_with_two_values_is_dropped() {
        let text = "PacketCounter,Quat_W,Quat_X,Quat_Y,Quat_Z\n1,1,0,0,0\n2,1\n3,1,0,0,0\n";
        let parsed = parse_rows(text);

        assert_eq!(parsed.samples.len(), 2);
        assert_eq!(parsed.skipped_rows, 1);
        assert_eq!(parsed.samples[0].number("PacketCounter"), Some(1.0));
        assert_eq!(parsed.samples[1].number("PacketCounter"), Some(3.0));
    }

    #[test]
    fn test_empty_fields_keep_column_positions() {
        let text = "PacketCounter,Quat_W,Quat_X,Quat_Y,Quat_Z\n1,,0.2,0.3,0.4\n";
        let parsed = parse_rows(text);

        let sample = &parsed.samples[0];
        assert_eq!(sample.number(QUAT_W), None);
        assert_eq!(sample.number(QUAT_X), Some(0.2));
        assert_eq!(sample.number(QUAT_Z), Some(0.4));
    }

    #[test]
    fn test_non_numeric_values_kept_as_text() {
        let text = "PacketCounter,Status,Quat_W,Quat_X\n1,OK,1,0\n";
        let parsed = parse_rows(text);

        let sample = &parsed.samples[0];
        assert_eq!(sample.get("Status"), Some(&FieldValue::Text("OK".to_string())));
        assert_eq!(sample.number(QUAT_W), Some(1.0));
    }

    #[test]
    fn test_comment_lines_skipped() {
        let text = "Quat_W,Quat_X,Quat_Y,Quat_Z\n# pause\n// marker\n1,0,0,0\n\n";
        let parsed = parse_rows(text);
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.skipped_rows, 0);
    }

    #[test]
    fn test_line_starting_with_digit_is_header() {
        // Headerless numeric exports: the first numeric line names the columns
        let text = "device A\n1,2,3,4\n5,6,7,8\n";
        let parsed = parse_rows(text);

        assert_eq!(parsed.header.len(), 4);
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.samples[0].number("1"), Some(5.0));
    }

    #[test]
    fn test_no_header_yields_no_samples() {
        let parsed = parse_rows("just some notes\nnothing tabular here\n");
        assert!(parsed.samples.is_empty());
        assert!(parsed.header.is_empty());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  a  b\tc "), vec!["a", "b", "c"]);
        assert_eq!(tokenize("a,,b"), vec!["a", "", "b"]);
        assert_eq!(tokenize(",a, b,"), vec!["a", "b"]);
        assert_eq!(tokenize("1 , 2,3  4"), vec!["1", "2", "3", "4"]);
        assert_eq!(tokenize("a, ,b"), vec!["a", "", "b"]);
        assert!(tokenize("   ").is_empty());
    }
}
