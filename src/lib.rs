//! # Websketch
//!
//! Convert a directory of static web assets (HTML/CSS/JS and friends) into a
//! single embeddable C++ source unit that Arduino-class firmware compiles in
//! directly, serving every asset over the `WebServer` API without a
//! filesystem.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      assets/   →  ScanManifest   (filesystem → file records + stats)
//! 2. Generate  manifest  →  websketch.h    (records + config → C++ text)
//! ```
//!
//! The stages are strictly separated: `scan` does all the I/O (reading
//! files, hashing, compressing), `generate` is a pure function from manifest
//! and configuration to text. This is what makes the output reproducible:
//! identical assets and settings produce a byte-identical file, so the
//! generated unit can live in version control and only ever diffs when the
//! web app actually changed.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the asset root, reads/hashes/compresses files, produces the scan manifest |
//! | [`generate`] | Stage 2: emits the C++ source unit from the manifest and resolved config |
//! | [`config`] | `websketch.toml` loading, CLI-flag layering, tri-state flag resolution |
//! | [`naming`] | filename → symbol identifier and URL route derivation |
//! | [`types`] | shared types passed between stages (`FileRecord`, `AggregateStats`) |
//! | [`output`] | CLI output formatting, pure formatters with print wrappers |
//!
//! # Design Decisions
//!
//! ## Tri-State Feature Flags
//!
//! ETag and gzip support are not booleans. Besides on and off, each can be
//! deferred to the firmware's own build: the generated code then wraps the
//! feature in `#ifdef <PREFIX>_ENABLE_ETAG` / `#ifdef <PREFIX>_ENABLE_GZIP`
//! guards, and one generated file serves debug and release firmware configs
//! alike. Parsing the flag is total: unknown values defer rather than fail,
//! because deferral is itself a legitimate deployment choice.
//!
//! ## PROGMEM + Chunked Streaming
//!
//! Asset bytes are emitted as `PROGMEM` arrays and streamed in 4096-byte
//! chunks through a generated `sendContent_P` helper. Peak RAM during a
//! request stays bounded no matter how large the asset, which is what makes
//! multi-hundred-kilobyte bundles servable from a microcontroller.
//!
//! ## Generated Names, Never Text Substitution
//!
//! Every emitted identifier is composed from the symbol prefix and a purpose
//! suffix at emission time (`_sendChunked`, `_onFileServed`, `_FILES`,
//! `_COUNT`, ...). Nothing is string-replaced after the fact, so user
//! content can never collide with the renaming.
//!
//! ## Weak Observer Hook
//!
//! The generated unit declares `<PREFIX>_onFileServed` with a weak no-op
//! body. Firmware that wants serving telemetry defines the symbol; firmware
//! that doesn't links cleanly with no extra configuration.

pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
