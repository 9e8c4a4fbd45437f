//! Shared test utilities for the websketch test suite.
//!
//! Builders for in-memory file records and manifests (no filesystem needed
//! to exercise generation), plus substring assertions that dump the
//! generated document on failure so a mismatch is diagnosable from the test
//! output alone.

use crate::types::{AggregateStats, FileRecord, ScanManifest};
use std::path::Path;

/// Fixed MIME map so test assertions never depend on the mime db shipped
/// with the production lookup.
fn test_mime(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
    {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// A file record with no gzip variant and a fixed hash.
pub fn record(filename: &str, content: &[u8]) -> FileRecord {
    FileRecord {
        filename: filename.to_string(),
        content: content.to_vec(),
        compressed: None,
        mime_type: test_mime(filename).to_string(),
        content_hash: "0123456789abcdef0123456789abcdef".to_string(),
    }
}

/// A file record with a specific content hash.
pub fn record_with_hash(filename: &str, content: &[u8], hash: &str) -> FileRecord {
    FileRecord {
        content_hash: hash.to_string(),
        ..record(filename, content)
    }
}

/// A compressible file record carrying a gzip variant.
pub fn gz_record(filename: &str, content: &[u8], compressed: &[u8]) -> FileRecord {
    FileRecord {
        compressed: Some(compressed.to_vec()),
        ..record(filename, content)
    }
}

/// Build a manifest from records, deriving aggregate stats the way the scan
/// stage does.
pub fn manifest_of(files: Vec<FileRecord>) -> ScanManifest {
    let mut stats = AggregateStats::default();
    for file in &files {
        let ext = Path::new(&file.filename)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        stats.record(&ext, file.content.len() as u64);
    }
    ScanManifest { files, stats }
}

/// Assert the document contains `needle`, printing the document on failure.
pub fn assert_has(doc: &str, needle: &str) {
    assert!(
        doc.contains(needle),
        "expected document to contain {needle:?}\n--- document ---\n{doc}"
    );
}

/// Assert the document does not contain `needle`.
pub fn assert_lacks(doc: &str, needle: &str) {
    assert!(
        !doc.contains(needle),
        "expected document to NOT contain {needle:?}\n--- document ---\n{doc}"
    );
}
