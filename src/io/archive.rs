//! Archive reader - extracts sensor export text from a ZIP archive
//!
//! Only `.csv` and `.txt` entries are returned; directories and any other
//! files (PDF reports, images) are skipped. Entries come back sorted by name,
//! which is how segment roles are assigned downstream.

use crate::error::ArchiveError;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::debug;

const SENSOR_EXTENSIONS: [&str; 2] = [".csv", ".txt"];

/// Largest sensor file accepted, declared or actual (uncompressed)
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// Upper bound on the buffer reserved from a header's declared size
const MAX_PREALLOC_BYTES: u64 = 1024 * 1024;

/// Extract every sensor text file from archive bytes, keyed by entry name
pub fn read_archive(bytes: &[u8]) -> Result<BTreeMap<String, String>, ArchiveError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut files = BTreeMap::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if !is_sensor_file(&name) {
            debug!(entry = %name, "archive_entry_skipped");
            continue;
        }

        // Declared sizes come from the archive itself and are not trusted
        let declared = entry.size();
        if declared > MAX_ENTRY_BYTES {
            return Err(ArchiveError::EntryTooLarge {
                name,
                size: declared,
                limit: MAX_ENTRY_BYTES,
            });
        }

        let mut raw = Vec::with_capacity(declared.min(MAX_PREALLOC_BYTES) as usize);
        entry
            .by_ref()
            .take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut raw)
            .map_err(|source| ArchiveError::Entry { name: name.clone(), source })?;
        if raw.len() as u64 > MAX_ENTRY_BYTES {
            return Err(ArchiveError::EntryTooLarge {
                name,
                size: raw.len() as u64,
                limit: MAX_ENTRY_BYTES,
            });
        }

        let text = decode_text(&raw);
        debug!(entry = %name, bytes = raw.len(), "archive_entry_read");
        files.insert(name, text);
    }

    Ok(files)
}

/// Decode a base64 archive payload (as sent by mobile clients) and extract it
pub fn read_base64_archive(payload: &str) -> Result<BTreeMap<String, String>, ArchiveError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes())?;
    read_archive(&bytes)
}

fn is_sensor_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SENSOR_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Lossy UTF-8 with any byte-order mark removed
fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &str)], dirs: &[&str]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for dir in dirs {
            writer.add_directory(*dir, SimpleFileOptions::default()).unwrap();
        }
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_csv_and_txt_only() {
        let bytes = build_zip(
            &[
                ("thigh.csv", "a,b"),
                ("shin.TXT", "c,d"),
                ("report.pdf", "%PDF"),
                ("readme.md", "# notes"),
            ],
            &["session/"],
        );

        let files = read_archive(&bytes).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files["thigh.csv"], "a,b");
        assert_eq!(files["shin.TXT"], "c,d");
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let bytes = build_zip(&[("b_shin.csv", "2"), ("a_thigh.csv", "1")], &[]);
        let names: Vec<String> = read_archive(&bytes).unwrap().into_keys().collect();
        assert_eq!(names, vec!["a_thigh.csv", "b_shin.csv"]);
    }

    #[test]
    fn test_nested_entries_keep_full_name() {
        let bytes = build_zip(&[("session/thigh.csv", "x")], &["session/"]);
        let files = read_archive(&bytes).unwrap();
        assert!(files.contains_key("session/thigh.csv"));
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let bytes = build_zip(&[("thigh.csv", "\u{feff}PacketCounter")], &[]);
        let files = read_archive(&bytes).unwrap();
        assert_eq!(files["thigh.csv"], "PacketCounter");
    }

    #[test]
    fn test_invalid_bytes_are_archive_error() {
        let result = read_archive(b"definitely not a zip file");
        assert!(matches!(result, Err(ArchiveError::Invalid(_))));
    }

    #[test]
    fn test_oversized_declared_entry_rejected() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let stored =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("a.csv", stored).unwrap();
        writer.write_all(b"1,2,3,4").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        // Uncompressed size sits 24 bytes into the central directory header
        let central = bytes.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
        bytes[central + 24..central + 28].copy_from_slice(&0xFFFF_FFFEu32.to_le_bytes());

        match read_archive(&bytes) {
            Err(ArchiveError::EntryTooLarge { name, size, .. }) => {
                assert_eq!(name, "a.csv");
                assert_eq!(size, 0xFFFF_FFFE);
            }
            other => panic!("expected EntryTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_base64_payload() {
        let bytes = build_zip(&[("thigh.csv", "1,2,3,4")], &[]);
        let mut payload = STANDARD.encode(&bytes);
        // Line-wrapped payloads are tolerated
        payload.insert(10, '\n');

        let files = read_base64_archive(&payload).unwrap();
        assert_eq!(files["thigh.csv"], "1,2,3,4");
    }

    #[test]
    fn test_invalid_base64_is_archive_error() {
        let result = read_base64_archive("!!!not base64!!!");
        assert!(matches!(result, Err(ArchiveError::Base64(_))));
    }
}
