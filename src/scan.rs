//! Asset discovery and file record building.
//!
//! Stage 1 of the websketch pipeline. Walks the asset root and produces a
//! [`ScanManifest`]: every embeddable file read into memory with its MIME
//! type, content hash, and (where worthwhile) a gzip variant, plus aggregate
//! statistics for the generated file's informational comment.
//!
//! ## Ordering
//!
//! Files are sorted lexicographically by relative path before any processing.
//! The manifest order is the emission order, so a stable walk is what makes
//! repeated builds byte-identical.
//!
//! ## What is skipped
//!
//! - directories (only regular files embed)
//! - hidden entries (any path component starting with `.`)
//! - `websketch.toml` at the asset root (tool config, not an asset)
//!
//! ## Compression policy
//!
//! Only extensions in [`COMPRESSIBLE_EXTENSIONS`] are gzipped, and the
//! variant is kept only when it is strictly smaller than the raw bytes.
//! Already-compressed formats (PNG, JPEG, WOFF2) would waste flash on a
//! second copy that saves nothing on the wire. Compression runs in parallel
//! across files; the order-preserving collect keeps output deterministic.

use crate::config::CONFIG_FILENAME;
use crate::types::{AggregateStats, FileRecord, ScanManifest};
use flate2::Compression;
use flate2::write::GzEncoder;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("file name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),
}

/// Extensions worth gzipping. Everything else ships raw.
pub const COMPRESSIBLE_EXTENSIONS: &[&str] = &[
    "css",
    "htm",
    "html",
    "ico",
    "js",
    "json",
    "map",
    "mjs",
    "svg",
    "txt",
    "wasm",
    "webmanifest",
    "xml",
];

/// Hex digits of the SHA-256 digest kept as the ETag value. ETags need
/// stability, not collision resistance, and shorter strings cost less flash.
const ETAG_HEX_CHARS: usize = 32;

/// Scan an asset directory into a manifest.
///
/// An empty directory yields an empty manifest; zero files is a valid
/// input for generation, not an error.
pub fn scan(root: &Path) -> Result<ScanManifest, ScanError> {
    let mut paths: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if rel
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            continue;
        }
        let rel_str = rel
            .to_str()
            .ok_or_else(|| ScanError::NonUtf8Name(entry.path().to_path_buf()))?
            .replace('\\', "/");
        if rel_str == CONFIG_FILENAME {
            continue;
        }
        paths.push((rel_str, entry.path().to_path_buf()));
    }
    paths.sort();

    let files: Vec<FileRecord> = paths
        .par_iter()
        .map(|(rel, abs)| build_record(rel, abs))
        .collect::<Result<Vec<_>, ScanError>>()?;

    let mut stats = AggregateStats::default();
    for file in &files {
        stats.record(&extension_of(&file.filename), file.content.len() as u64);
    }

    Ok(ScanManifest { files, stats })
}

fn build_record(filename: &str, path: &Path) -> Result<FileRecord, ScanError> {
    let content = fs::read(path)?;

    let mut content_hash = format!("{:x}", Sha256::digest(&content));
    content_hash.truncate(ETAG_HEX_CHARS);

    let compressed = if is_compressible_name(filename) && !content.is_empty() {
        let gz = gzip(&content)?;
        // Keep only a variant that actually pays for its flash.
        (gz.len() < content.len()).then_some(gz)
    } else {
        None
    };

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(FileRecord {
        filename: filename.to_string(),
        content,
        compressed,
        mime_type,
        content_hash,
    })
}

fn gzip(content: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(content)?;
    encoder.finish()
}

fn is_compressible_name(filename: &str) -> bool {
    let ext = extension_of(filename);
    COMPRESSIBLE_EXTENSIONS.contains(&ext.as_str())
}

/// Lowercased extension, empty string when there is none.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
