//! CLI output formatting for all pipeline stages.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! Entity lines follow a consistent two-level pattern: a header line with a
//! positional index and identity, then indented context lines.
//!
//! ```text
//! Files
//! 001 index.html (text/html, 1234 bytes, gzip 810)
//! 002 style.css (text/css, 2048 bytes)
//!
//! Total
//!     2 files, 3282 bytes (css: 1, html: 1)
//! ```

use crate::config::ResolvedConfig;
use crate::naming;
use crate::types::ScanManifest;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// One file line: index, name, and a parenthesized detail list.
fn file_line(index: usize, name: &str, details: &[String]) -> String {
    format!("{} {} ({})", format_index(index), name, details.join(", "))
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(manifest: &ScanManifest) -> Vec<String> {
    let mut lines = vec!["Files".to_string()];
    for (i, file) in manifest.files.iter().enumerate() {
        let mut details = vec![
            file.mime_type.clone(),
            format!("{} bytes", file.content.len()),
        ];
        if let Some(gz) = &file.compressed {
            details.push(format!("gzip {}", gz.len()));
        }
        lines.push(file_line(i + 1, &file.filename, &details));
    }
    if manifest.files.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines.push(String::new());
    lines.push("Total".to_string());
    lines.push(format!("    {}", manifest.stats.summary()));
    lines
}

pub fn print_scan_output(manifest: &ScanManifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Route mapping preview: which URL each file will serve, including the
/// default route for the index-equivalent file.
pub fn format_check_output(manifest: &ScanManifest, config: &ResolvedConfig) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    for (i, file) in manifest.files.iter().enumerate() {
        let route = naming::route_path(&config.base_path, &file.filename);
        lines.push(format!(
            "{} {} -> {}",
            format_index(i + 1),
            file.filename,
            route
        ));
        if naming::is_index(&file.filename) {
            lines.push(format!(
                "    default: {}",
                naming::default_route(&config.base_path)
            ));
        }
    }
    if manifest.files.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines
}

pub fn print_check_output(manifest: &ScanManifest, config: &ResolvedConfig) {
    for line in format_check_output(manifest, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(
    manifest: &ScanManifest,
    config: &ResolvedConfig,
    output_path: &Path,
    document_bytes: usize,
) -> Vec<String> {
    let gzipped = manifest
        .files
        .iter()
        .filter(|f| f.compressed.is_some())
        .count();
    vec![
        format!(
            "Generated {} ({} bytes)",
            output_path.display(),
            document_bytes
        ),
        format!(
            "    {} ({} gzip variants)",
            manifest.stats.summary(),
            gzipped
        ),
        format!("    config: {}", config.describe()),
    ]
}

pub fn print_build_output(
    manifest: &ScanManifest,
    config: &ResolvedConfig,
    output_path: &Path,
    document_bytes: usize,
) {
    for line in format_build_output(manifest, config, output_path, document_bytes) {
        println!("{}", line);
    }
}
