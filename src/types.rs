//! Shared types passed between the scan and generate stages.
//!
//! The scan stage produces a [`ScanManifest`]; the generate stage consumes it
//! without further filesystem access. Byte buffers are deliberately excluded
//! from serialization; `scan --json` reports metadata, not content.

use serde::Serialize;
use std::collections::BTreeMap;

/// One asset file, fully read into memory.
///
/// `filename` is the `/`-separated path relative to the asset root and is
/// unique within a manifest. `content_hash` is a stable hex digest of
/// `content`, used verbatim as the generated ETag value.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub filename: String,
    pub content: Vec<u8>,
    /// Gzip variant, present only when compression actually shrank the file.
    pub compressed: Option<Vec<u8>>,
    pub mime_type: String,
    pub content_hash: String,
}

impl FileRecord {
    /// Whether a gzip variant exists for this file.
    pub fn is_compressible(&self) -> bool {
        self.compressed.is_some()
    }
}

/// Serializable per-file summary for `scan --json`.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub mime_type: String,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_length: Option<usize>,
    pub content_hash: String,
}

impl From<&FileRecord> for FileReport {
    fn from(record: &FileRecord) -> Self {
        Self {
            filename: record.filename.clone(),
            mime_type: record.mime_type.clone(),
            length: record.content.len(),
            gzip_length: record.compressed.as_ref().map(Vec::len),
            content_hash: record.content_hash.clone(),
        }
    }
}

/// Per-extension file counts and byte totals.
///
/// Informational only, rendered into the generated file's `//files:` comment
/// and the CLI scan report. `BTreeMap` keeps iteration order stable so the
/// generated text is byte-identical across runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    pub total_files: usize,
    pub total_bytes: u64,
    pub by_extension: BTreeMap<String, ExtensionStats>,
}

/// Count and byte total for a single extension.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExtensionStats {
    pub files: usize,
    pub bytes: u64,
}

impl AggregateStats {
    /// Record one file under `extension` (empty string for extensionless files).
    pub fn record(&mut self, extension: &str, bytes: u64) {
        self.total_files += 1;
        self.total_bytes += bytes;
        let entry = self.by_extension.entry(extension.to_string()).or_default();
        entry.files += 1;
        entry.bytes += bytes;
    }

    /// One-line summary: `3 files, 4567 bytes (css: 1, html: 1, js: 1)`.
    pub fn summary(&self) -> String {
        let noun = if self.total_files == 1 { "file" } else { "files" };
        let mut line = format!("{} {}, {} bytes", self.total_files, noun, self.total_bytes);
        if !self.by_extension.is_empty() {
            let parts: Vec<String> = self
                .by_extension
                .iter()
                .map(|(ext, stats)| {
                    let label = if ext.is_empty() { "(none)" } else { ext };
                    format!("{}: {}", label, stats.files)
                })
                .collect();
            line.push_str(&format!(" ({})", parts.join(", ")));
        }
        line
    }
}

/// Output of the scan stage: every embeddable file plus aggregate statistics,
/// in the order the generate stage will emit them.
#[derive(Debug, Clone)]
pub struct ScanManifest {
    pub files: Vec<FileRecord>,
    pub stats: AggregateStats,
}
