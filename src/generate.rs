//! C++ source generation.
//!
//! Stage 2 of the websketch pipeline. Takes the scan manifest and a resolved
//! configuration and emits one embeddable C++ source unit that serves every
//! asset through the Arduino `WebServer` API, without a filesystem.
//!
//! ## Document Layout
//!
//! Emission order is fixed, and every section is a pure function of its
//! inputs, so identical manifests produce byte-identical output:
//!
//! ```text
//! #include lines
//! //engine: / //config: / //files: comment block
//! <PREFIX>_VERSION macro            (only when a version is configured)
//! <PREFIX>_sendChunked helper       (4096-byte streaming loop)
//! <PREFIX>_onFileServed weak hook
//! per-file blocks, input order      (length macros, PROGMEM arrays, ETags)
//! <PREFIX>_FileInfo / <PREFIX>_FILES[] / <PREFIX>_COUNT manifest
//! void <entry>(WebServer * server)  (one route registration per file)
//! ```
//!
//! ## Feature Tri-States
//!
//! ETag and gzip support are each [`FeatureMode`] values. `Enabled` emits the
//! feature unconditionally, `Disabled` leaves no trace of it, and `Deferred`
//! wraps the feature code in `#ifdef <PREFIX>_ENABLE_ETAG` /
//! `#ifdef <PREFIX>_ENABLE_GZIP` so the firmware build flags decide. A file
//! without a gzip variant always serves raw bytes, whatever the mode.
//!
//! ## Memory Model of the Generated Code
//!
//! Asset bytes live in `PROGMEM` arrays and are streamed in 4096-byte chunks
//! through `sendContent_P`, so serving a large file never allocates the whole
//! payload in RAM. Handlers run to completion inside the host server's
//! request dispatch; everything they touch is read-only after initialization.

use crate::config::{FeatureMode, ResolvedConfig};
use crate::naming;
use crate::types::{AggregateStats, FileRecord, ScanManifest};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("files {first:?} and {second:?} both sanitize to symbol {ident:?}")]
    SymbolCollision {
        ident: String,
        first: String,
        second: String,
    },
    #[error("files {first:?} and {second:?} both claim the default route")]
    DuplicateDefaultRoute { first: String, second: String },
}

/// Generate the complete C++ source unit for a scanned asset set.
///
/// Pure: no I/O, no shared state. The only failure modes are upstream
/// defects (two filenames sanitizing to the same symbol, or two files
/// claiming the default route) and both abort loudly rather than emit
/// output the firmware would reject at route registration.
pub fn generate(manifest: &ScanManifest, config: &ResolvedConfig) -> Result<String, GenerateError> {
    let plans = plan_files(&manifest.files, config)?;
    let prefix = &config.symbol_prefix;

    let mut blocks: Vec<String> = Vec::new();
    blocks.push(render_header(config, &manifest.stats));
    if let Some(version) = &config.version {
        blocks.push(format!(
            "#define {}_VERSION \"{}\"",
            prefix,
            c_escape(version)
        ));
    }
    blocks.push(render_send_chunked(prefix));
    blocks.push(render_hook(prefix));
    for plan in &plans {
        blocks.push(render_data_block(plan, config));
    }
    blocks.push(render_manifest_struct(prefix));
    blocks.push(render_manifest_array(&plans, prefix));
    blocks.push(format!("#define {}_COUNT {}", prefix, plans.len()));
    blocks.push(render_entry(&plans, config));

    Ok(blocks.join("\n\n") + "\n")
}

// ============================================================================
// Per-file emission plan
// ============================================================================

/// All names derived for one file, computed once and shared by the data
/// block, the manifest row, and the handler registration.
struct FilePlan<'a> {
    record: &'a FileRecord,
    /// Sanitized identifier root: `index.html` → `index_html`.
    ident: String,
    /// Macro-style variant: `INDEX_HTML`.
    upper: String,
    /// Registered route, base path applied.
    route: String,
    /// Whether this file also serves the default route.
    is_index: bool,
}

fn plan_files<'a>(
    files: &'a [FileRecord],
    config: &ResolvedConfig,
) -> Result<Vec<FilePlan<'a>>, GenerateError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut index_claimed: Option<&str> = None;
    let mut plans = Vec::with_capacity(files.len());

    for record in files {
        let ident = naming::symbol_ident(&record.filename);
        if let Some(first) = seen.insert(ident.clone(), &record.filename) {
            return Err(GenerateError::SymbolCollision {
                ident,
                first: first.to_string(),
                second: record.filename.clone(),
            });
        }
        let is_index = naming::is_index(&record.filename);
        if is_index {
            if let Some(first) = index_claimed {
                return Err(GenerateError::DuplicateDefaultRoute {
                    first: first.to_string(),
                    second: record.filename.clone(),
                });
            }
            index_claimed = Some(&record.filename);
        }
        plans.push(FilePlan {
            record,
            upper: naming::macro_ident(&record.filename),
            route: naming::route_path(&config.base_path, &record.filename),
            ident,
            is_index,
        });
    }
    Ok(plans)
}

/// How a feature's code is emitted for a given site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Always,
    Guarded,
    Never,
}

fn etag_emit(mode: FeatureMode) -> Emit {
    match mode {
        FeatureMode::Enabled => Emit::Always,
        FeatureMode::Deferred => Emit::Guarded,
        FeatureMode::Disabled => Emit::Never,
    }
}

/// Gzip emission is per-file: a record without a compressed variant serves
/// raw bytes regardless of the configured mode.
fn gzip_emit(mode: FeatureMode, compressible: bool) -> Emit {
    if !compressible {
        return Emit::Never;
    }
    match mode {
        FeatureMode::Enabled => Emit::Always,
        FeatureMode::Deferred => Emit::Guarded,
        FeatureMode::Disabled => Emit::Never,
    }
}

fn etag_guard(prefix: &str) -> String {
    format!("{}_ENABLE_ETAG", prefix)
}

fn gzip_guard(prefix: &str) -> String {
    format!("{}_ENABLE_GZIP", prefix)
}

/// Wrap emitted lines in a preprocessor guard. Guards sit at column zero,
/// like hand-written Arduino code.
fn guarded(guard: &str, inner: &str) -> String {
    format!("#ifdef {}\n{}\n#endif", guard, inner)
}

// ============================================================================
// Document sections
// ============================================================================

fn render_header(config: &ResolvedConfig, stats: &AggregateStats) -> String {
    let mut out = String::new();
    out.push_str("#include <Arduino.h>\n");
    out.push_str("#include <WebServer.h>\n");
    out.push('\n');
    out.push_str("//\n");
    out.push_str("// Embedded web assets. Generated by websketch - do not edit.\n");
    out.push_str("//\n");
    out.push_str("//engine:   Arduino WebServer\n");
    out.push_str(&format!("//config:   {}\n", config.describe()));
    out.push_str(&format!("//files:    {}\n", stats.summary()));
    out.push_str("//");
    out
}

/// The chunked-send helper: streams a PROGMEM payload in 4096-byte chunks so
/// peak RAM stays bounded no matter how large the asset is.
fn render_send_chunked(prefix: &str) -> String {
    format!(
        "\
void {prefix}_sendChunked(WebServer * server, const uint8_t * data, size_t length) {{
  size_t offset = 0;
  while (offset < length) {{
    size_t chunk = length - offset;
    if (chunk > 4096) {{
      chunk = 4096;
    }}
    server->sendContent_P((const char *)(data + offset), chunk);
    offset += chunk;
  }}
}}"
    )
}

/// Weak no-op hook: firmware may define its own `<prefix>_onFileServed` to
/// observe every served file; link-time weak resolution keeps it optional.
fn render_hook(prefix: &str) -> String {
    format!(
        "\
extern \"C\" void __attribute__((weak)) {prefix}_onFileServed(const char * path, int status) {{
  (void)path;
  (void)status;
}}"
    )
}

/// Length macro(s), PROGMEM byte array(s), and the optional ETag constant
/// for one file.
fn render_data_block(plan: &FilePlan<'_>, config: &ResolvedConfig) -> String {
    let prefix = &config.symbol_prefix;
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(
        "#define {}_{}_LEN {}",
        prefix,
        plan.upper,
        plan.record.content.len()
    ));
    parts.push(render_byte_array(
        &format!("data_{}", plan.ident),
        &format!("{}_{}_LEN", prefix, plan.upper),
        &plan.record.content,
    ));

    if let Some(compressed) = &plan.record.compressed {
        let gz = format!(
            "#define {prefix}_{upper}_GZLEN {len}\n{array}",
            upper = plan.upper,
            len = compressed.len(),
            array = render_byte_array(
                &format!("datagzip_{}", plan.ident),
                &format!("{}_{}_GZLEN", prefix, plan.upper),
                compressed,
            ),
        );
        match gzip_emit(config.gzip, true) {
            Emit::Always => parts.push(gz),
            Emit::Guarded => parts.push(guarded(&gzip_guard(prefix), &gz)),
            Emit::Never => {}
        }
    }

    let etag = format!(
        "const char * etag_{} = \"\\\"{}\\\"\";",
        plan.ident,
        c_escape(&plan.record.content_hash)
    );
    match etag_emit(config.etag) {
        Emit::Always => parts.push(etag),
        Emit::Guarded => parts.push(guarded(&etag_guard(prefix), &etag)),
        Emit::Never => {}
    }

    parts.join("\n")
}

/// A statically-initialized byte array destined for read-only storage.
/// 16 bytes per line keeps diffs reviewable for small assets.
fn render_byte_array(name: &str, len_macro: &str, bytes: &[u8]) -> String {
    let mut out = format!("const uint8_t {}[{}] PROGMEM = {{", name, len_macro);
    if bytes.is_empty() {
        out.push_str("};");
        return out;
    }
    out.push('\n');
    for chunk in bytes.chunks(16) {
        let line: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
        out.push_str("  ");
        out.push_str(&line.join(", "));
        out.push_str(",\n");
    }
    out.push_str("};");
    out
}

fn render_manifest_struct(prefix: &str) -> String {
    format!(
        "\
struct {prefix}_FileInfo {{
  const char * path;
  const char * mime;
  size_t length;
}};"
    )
}

/// The ordered manifest of every embedded file, in input order. This is the
/// authoritative enumeration for diagnostics and listing code in the
/// firmware.
fn render_manifest_array(plans: &[FilePlan<'_>], prefix: &str) -> String {
    if plans.is_empty() {
        return format!("const {prefix}_FileInfo {prefix}_FILES[] = {{}};");
    }
    let rows: Vec<String> = plans
        .iter()
        .map(|plan| {
            format!(
                "  {{ \"{}\", \"{}\", {}_{}_LEN }},",
                c_escape(&plan.route),
                c_escape(&plan.record.mime_type),
                prefix,
                plan.upper
            )
        })
        .collect();
    format!(
        "const {prefix}_FileInfo {prefix}_FILES[] = {{\n{}\n}};",
        rows.join("\n")
    )
}

/// The public entry point: registers one GET handler per file, plus the
/// default-route duplicate for the index-equivalent file.
fn render_entry(plans: &[FilePlan<'_>], config: &ResolvedConfig) -> String {
    let mut parts: Vec<String> = Vec::new();

    // WebServer only exposes request headers announced up front; without
    // this the If-None-Match check could never fire.
    let collect = "  static const char * headerKeys[] = { \"If-None-Match\" };\n  \
                   server->collectHeaders(headerKeys, 1);";
    match etag_emit(config.etag) {
        Emit::Always => parts.push(collect.to_string()),
        Emit::Guarded => parts.push(guarded(&etag_guard(&config.symbol_prefix), collect)),
        Emit::Never => {}
    }

    for plan in plans {
        parts.push(render_registration(plan, config, &plan.route));
        if plan.is_index {
            parts.push(render_registration(
                plan,
                config,
                &naming::default_route(&config.base_path),
            ));
        }
    }

    if parts.is_empty() {
        return format!("void {}(WebServer * server) {{\n}}", config.entry_name);
    }
    format!(
        "void {}(WebServer * server) {{\n{}\n}}",
        config.entry_name,
        parts.join("\n\n")
    )
}

/// One `server->on` registration. `at_route` is where the handler is bound;
/// the body always reports the file's own route, so the default-route
/// duplicate is byte-identical to the primary handler apart from the binding.
fn render_registration(plan: &FilePlan<'_>, config: &ResolvedConfig, at_route: &str) -> String {
    let prefix = &config.symbol_prefix;
    let etag_name = format!("etag_{}", plan.ident);
    let mut body: Vec<String> = Vec::new();

    let check = format!(
        "    if (server->header(\"If-None-Match\") == {}) {{\n      \
         server->send(304);\n      \
         return;\n    }}",
        etag_name
    );
    match etag_emit(config.etag) {
        Emit::Always => body.push(check),
        Emit::Guarded => body.push(guarded(&etag_guard(prefix), &check)),
        Emit::Never => {}
    }

    body.push(format!(
        "    server->sendHeader(\"Cache-Control\", \"{}\");",
        cache_directive(config.cache_seconds)
    ));

    let etag_header = format!("    server->sendHeader(\"ETag\", {});", etag_name);
    match etag_emit(config.etag) {
        Emit::Always => body.push(etag_header),
        Emit::Guarded => body.push(guarded(&etag_guard(prefix), &etag_header)),
        Emit::Never => {}
    }

    let raw = render_send_sequence(plan, prefix, false);
    match gzip_emit(config.gzip, plan.record.is_compressible()) {
        Emit::Always => body.push(render_send_sequence(plan, prefix, true)),
        Emit::Guarded => body.push(format!(
            "#ifdef {}\n{}\n#else\n{}\n#endif",
            gzip_guard(prefix),
            render_send_sequence(plan, prefix, true),
            raw
        )),
        Emit::Never => body.push(raw),
    }

    body.push(format!(
        "    {}_onFileServed(\"{}\", 200);",
        prefix,
        c_escape(&plan.route)
    ));

    format!(
        "  server->on(\"{}\", HTTP_GET, [server]() {{\n{}\n  }});",
        c_escape(at_route),
        body.join("\n")
    )
}

/// Content-Encoding (gzip only), declared length, response open, chunked
/// stream. Length goes to the transport before the payload starts.
fn render_send_sequence(plan: &FilePlan<'_>, prefix: &str, gzip: bool) -> String {
    let (array, len_macro) = if gzip {
        (
            format!("datagzip_{}", plan.ident),
            format!("{}_{}_GZLEN", prefix, plan.upper),
        )
    } else {
        (
            format!("data_{}", plan.ident),
            format!("{}_{}_LEN", prefix, plan.upper),
        )
    };
    let mut out = String::new();
    if gzip {
        out.push_str("    server->sendHeader(\"Content-Encoding\", \"gzip\");\n");
    }
    out.push_str(&format!("    server->setContentLength({});\n", len_macro));
    out.push_str(&format!(
        "    server->send(200, \"{}\", \"\");\n",
        c_escape(&plan.record.mime_type)
    ));
    out.push_str(&format!(
        "    {}_sendChunked(server, {}, {});",
        prefix, array, len_macro
    ));
    out
}

fn cache_directive(cache_seconds: u32) -> String {
    if cache_seconds > 0 {
        format!("max-age={}", cache_seconds)
    } else {
        "no-cache".to_string()
    }
}

/// Escape a string for inclusion in a C string literal.
fn c_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::test_helpers::*;

    fn generate_with(files: Vec<FileRecord>, config: &ToolConfig) -> String {
        generate(&manifest_of(files), &ResolvedConfig::from_tool(config))
            .expect("generation should succeed")
    }

    // =========================================================================
    // Determinism
    // =========================================================================

    #[test]
    fn identical_inputs_give_byte_identical_output() {
        let files = || {
            vec![
                gz_record("index.html", b"<html>hello</html>", b"gzipped"),
                record("app.js", b"console.log(1);"),
            ]
        };
        let config = ToolConfig::default();
        let first = generate_with(files(), &config);
        let second = generate_with(files(), &config);
        assert_eq!(first, second);
    }

    // =========================================================================
    // Document frame
    // =========================================================================

    #[test]
    fn header_tokens_present() {
        let doc = generate_with(vec![record("index.html", b"x")], &ToolConfig::default());
        assert_has(&doc, "#include <Arduino.h>");
        assert_has(&doc, "#include <WebServer.h>");
        assert_has(&doc, "//engine:   Arduino WebServer");
        assert_has(&doc, "//config:   etag: true, gzip: true, cachetime: 86400");
        assert_has(&doc, "//files:    1 file, 1 bytes (html: 1)");
    }

    #[test]
    fn version_macro_emitted_only_when_set() {
        let base = ToolConfig::default();
        let doc = generate_with(vec![record("a.css", b"x")], &base);
        assert_lacks(&doc, "_VERSION");

        let with_version = ToolConfig {
            version: Some("2.4.1".to_string()),
            ..base
        };
        let doc = generate_with(vec![record("a.css", b"x")], &with_version);
        assert_has(&doc, "#define WEBSKETCH_VERSION \"2.4.1\"");
    }

    #[test]
    fn helper_uses_chunked_progmem_send() {
        let doc = generate_with(vec![], &ToolConfig::default());
        assert_has(
            &doc,
            "void WEBSKETCH_sendChunked(WebServer * server, const uint8_t * data, size_t length)",
        );
        assert_has(&doc, "sendContent_P");
        assert_has(&doc, "4096");
    }

    #[test]
    fn weak_hook_declared() {
        let doc = generate_with(vec![], &ToolConfig::default());
        assert_has(
            &doc,
            "extern \"C\" void __attribute__((weak)) WEBSKETCH_onFileServed(const char * path, int status)",
        );
    }

    #[test]
    fn entry_signature_uses_configured_name() {
        let config = ToolConfig {
            entry: "registerAssets".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![record("a.css", b"x")], &config);
        assert_has(&doc, "void registerAssets(WebServer * server) {");
    }

    // =========================================================================
    // File count and manifest
    // =========================================================================

    #[test]
    fn count_macro_zero_one_many() {
        let config = ToolConfig::default();
        let doc = generate_with(vec![], &config);
        assert_has(&doc, "#define WEBSKETCH_COUNT 0");
        assert_has(&doc, "const WEBSKETCH_FileInfo WEBSKETCH_FILES[] = {};");

        let doc = generate_with(vec![record("a.css", b"x")], &config);
        assert_has(&doc, "#define WEBSKETCH_COUNT 1");

        let doc = generate_with(
            vec![
                record("a.css", b"x"),
                record("b.css", b"y"),
                record("c.css", b"z"),
            ],
            &config,
        );
        assert_has(&doc, "#define WEBSKETCH_COUNT 3");
    }

    #[test]
    fn manifest_rows_in_input_order() {
        let doc = generate_with(
            vec![record("z.css", b"zz"), record("a.js", b"a")],
            &ToolConfig::default(),
        );
        assert_has(&doc, "struct WEBSKETCH_FileInfo {");
        let z = doc
            .find("{ \"/z.css\", \"text/css\", WEBSKETCH_Z_CSS_LEN },")
            .expect("z.css manifest row");
        let a = doc
            .find("{ \"/a.js\", \"application/javascript\", WEBSKETCH_A_JS_LEN },")
            .expect("a.js manifest row");
        assert!(z < a, "manifest must preserve input order");
    }

    // =========================================================================
    // ETag tri-state
    // =========================================================================

    #[test]
    fn etag_enabled_emits_unconditional_check() {
        let doc = generate_with(vec![record("a.css", b"x")], &ToolConfig::default());
        assert_has(&doc, "const char * etag_a_css = ");
        assert_has(&doc, "if (server->header(\"If-None-Match\") == etag_a_css) {");
        assert_has(&doc, "server->send(304);");
        assert_has(&doc, "server->sendHeader(\"ETag\", etag_a_css);");
        assert_has(&doc, "server->collectHeaders(headerKeys, 1);");
        assert_lacks(&doc, "#ifdef WEBSKETCH_ENABLE_ETAG");
    }

    #[test]
    fn etag_disabled_leaves_no_trace() {
        let config = ToolConfig {
            etag: "false".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![record("a.css", b"x")], &config);
        assert_lacks(&doc, "etag_");
        assert_lacks(&doc, "If-None-Match");
        assert_lacks(&doc, "ETag");
    }

    #[test]
    fn etag_deferred_guards_every_occurrence() {
        let config = ToolConfig {
            etag: "compiler".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![record("a.css", b"x")], &config);
        assert_has(&doc, "#ifdef WEBSKETCH_ENABLE_ETAG");
        assert_has(&doc, "etag_a_css");
        // Every conditional-check line sits inside a guard, never bare: the
        // line preceding each check must be the #ifdef.
        for (i, line) in doc.lines().enumerate() {
            if line.contains("If-None-Match") && line.contains("==") {
                let prev = doc.lines().nth(i - 1).unwrap();
                assert_eq!(prev, "#ifdef WEBSKETCH_ENABLE_ETAG", "unguarded check");
            }
        }
    }

    #[test]
    fn etag_value_is_quoted_hash() {
        let rec = record_with_hash("a.css", b"x", "deadbeef00112233");
        let doc = generate_with(vec![rec], &ToolConfig::default());
        assert_has(&doc, "const char * etag_a_css = \"\\\"deadbeef00112233\\\"\";");
    }

    // =========================================================================
    // Gzip tri-state
    // =========================================================================

    #[test]
    fn gzip_enabled_serves_compressed_variant() {
        let doc = generate_with(
            vec![gz_record("a.js", b"full content here", b"gz")],
            &ToolConfig::default(),
        );
        assert_has(&doc, "const uint8_t datagzip_a_js[WEBSKETCH_A_JS_GZLEN] PROGMEM");
        assert_has(&doc, "server->sendHeader(\"Content-Encoding\", \"gzip\");");
        assert_has(&doc, "WEBSKETCH_sendChunked(server, datagzip_a_js, WEBSKETCH_A_JS_GZLEN);");
        assert_lacks(&doc, "#ifdef WEBSKETCH_ENABLE_GZIP");
    }

    #[test]
    fn gzip_disabled_leaves_no_trace() {
        let config = ToolConfig {
            gzip: "false".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![gz_record("a.js", b"content", b"gz")], &config);
        assert_lacks(&doc, "datagzip_");
        assert_lacks(&doc, "Content-Encoding");
        assert_has(&doc, "WEBSKETCH_sendChunked(server, data_a_js, WEBSKETCH_A_JS_LEN);");
    }

    #[test]
    fn gzip_deferred_emits_both_paths_guarded() {
        let config = ToolConfig {
            gzip: "compiler".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![gz_record("a.js", b"content", b"gz")], &config);
        assert_has(&doc, "#ifdef WEBSKETCH_ENABLE_GZIP");
        assert_has(&doc, "#else");
        assert_has(&doc, "datagzip_a_js");
        assert_has(&doc, "data_a_js");
    }

    #[test]
    fn incompressible_file_serves_raw_even_when_gzip_enabled() {
        let doc = generate_with(
            vec![record("logo.png", b"\x89PNG")],
            &ToolConfig::default(),
        );
        assert_lacks(&doc, "datagzip_logo_png");
        assert_lacks(&doc, "Content-Encoding");
        assert_has(&doc, "WEBSKETCH_sendChunked(server, data_logo_png, WEBSKETCH_LOGO_PNG_LEN);");
    }

    // =========================================================================
    // Cache directive
    // =========================================================================

    #[test]
    fn cachetime_zero_emits_no_cache() {
        let config = ToolConfig {
            cachetime: 0,
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![record("a.css", b"x")], &config);
        assert_has(&doc, "server->sendHeader(\"Cache-Control\", \"no-cache\");");
        assert_lacks(&doc, "max-age");
    }

    #[test]
    fn cachetime_positive_emits_decimal_max_age() {
        let config = ToolConfig {
            cachetime: 31536000,
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![record("a.css", b"x")], &config);
        assert_has(&doc, "server->sendHeader(\"Cache-Control\", \"max-age=31536000\");");
    }

    // =========================================================================
    // Routes and base path
    // =========================================================================

    #[test]
    fn default_route_only_for_index() {
        let doc = generate_with(
            vec![record("index.html", b"x"), record("a.css", b"y")],
            &ToolConfig::default(),
        );
        assert_has(&doc, "server->on(\"/index.html\", HTTP_GET, [server]() {");
        assert_has(&doc, "server->on(\"/\", HTTP_GET, [server]() {");
        assert_has(&doc, "server->on(\"/a.css\", HTTP_GET, [server]() {");
    }

    #[test]
    fn no_default_route_without_index() {
        let doc = generate_with(vec![record("a.css", b"y")], &ToolConfig::default());
        assert_lacks(&doc, "server->on(\"/\", HTTP_GET");
    }

    #[test]
    fn nested_index_does_not_claim_default_route() {
        let doc = generate_with(
            vec![record("admin/index.html", b"x")],
            &ToolConfig::default(),
        );
        assert_has(&doc, "server->on(\"/admin/index.html\", HTTP_GET");
        assert_lacks(&doc, "server->on(\"/\", HTTP_GET");
    }

    #[test]
    fn base_path_prefixes_routes_and_default() {
        let config = ToolConfig {
            base_path: "/ui".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![record("index.html", b"x")], &config);
        assert_has(&doc, "server->on(\"/ui/index.html\", HTTP_GET");
        assert_has(&doc, "server->on(\"/ui\", HTTP_GET");
        assert_has(&doc, "{ \"/ui/index.html\", \"text/html\", WEBSKETCH_INDEX_HTML_LEN },");
        assert_lacks(&doc, "server->on(\"/\", HTTP_GET");
    }

    #[test]
    fn hook_reports_file_route_from_default_route_handler() {
        let doc = generate_with(vec![record("index.html", b"x")], &ToolConfig::default());
        // Both registrations invoke the hook with the file's own route.
        assert_eq!(
            doc.matches("WEBSKETCH_onFileServed(\"/index.html\", 200);").count(),
            2
        );
    }

    // =========================================================================
    // Symbol prefix substitution
    // =========================================================================

    #[test]
    fn custom_prefix_replaces_every_generated_name() {
        let config = ToolConfig {
            prefix: "MYAPP".to_string(),
            version: Some("1.0".to_string()),
            etag: "compiler".to_string(),
            gzip: "compiler".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(vec![gz_record("index.html", b"x", b"z")], &config);
        assert_has(&doc, "MYAPP_sendChunked");
        assert_has(&doc, "MYAPP_onFileServed");
        assert_has(&doc, "struct MYAPP_FileInfo");
        assert_has(&doc, "MYAPP_FILES[]");
        assert_has(&doc, "#define MYAPP_COUNT 1");
        assert_has(&doc, "#define MYAPP_VERSION \"1.0\"");
        assert_has(&doc, "#ifdef MYAPP_ENABLE_ETAG");
        assert_has(&doc, "#ifdef MYAPP_ENABLE_GZIP");
        assert_has(&doc, "#define MYAPP_INDEX_HTML_LEN 1");
        assert_lacks(&doc, "WEBSKETCH");
    }

    // =========================================================================
    // Data arrays
    // =========================================================================

    #[test]
    fn data_array_is_progmem_hex() {
        let doc = generate_with(vec![record("a.css", b"\x00\xff")], &ToolConfig::default());
        assert_has(&doc, "#define WEBSKETCH_A_CSS_LEN 2");
        assert_has(&doc, "const uint8_t data_a_css[WEBSKETCH_A_CSS_LEN] PROGMEM = {");
        assert_has(&doc, "0x00, 0xff,");
    }

    #[test]
    fn zero_byte_file_emits_empty_array() {
        let doc = generate_with(vec![record("empty.txt", b"")], &ToolConfig::default());
        assert_has(&doc, "#define WEBSKETCH_EMPTY_TXT_LEN 0");
        assert_has(&doc, "const uint8_t data_empty_txt[WEBSKETCH_EMPTY_TXT_LEN] PROGMEM = {};");
        assert_has(&doc, "server->setContentLength(WEBSKETCH_EMPTY_TXT_LEN);");
    }

    #[test]
    fn long_content_wraps_at_sixteen_bytes() {
        let doc = generate_with(vec![record("a.bin", &[0xaa; 20])], &ToolConfig::default());
        let full_line = "  ".to_string() + &vec!["0xaa"; 16].join(", ") + ",";
        let short_line = "  ".to_string() + &vec!["0xaa"; 4].join(", ") + ",";
        assert_has(&doc, &full_line);
        assert_has(&doc, &short_line);
    }

    #[test]
    fn content_length_declared_before_send() {
        let doc = generate_with(vec![record("a.css", b"x")], &ToolConfig::default());
        let set = doc.find("server->setContentLength(WEBSKETCH_A_CSS_LEN);").unwrap();
        let send = doc.find("server->send(200, \"text/css\", \"\");").unwrap();
        assert!(set < send, "length must be announced before the response opens");
    }

    // =========================================================================
    // Defect guards
    // =========================================================================

    #[test]
    fn symbol_collision_is_rejected() {
        let result = generate(
            &manifest_of(vec![record("a-b.css", b"x"), record("a_b.css", b"y")]),
            &ResolvedConfig::from_tool(&ToolConfig::default()),
        );
        match result {
            Err(GenerateError::SymbolCollision { ident, first, second }) => {
                assert_eq!(ident, "a_b_css");
                assert_eq!(first, "a-b.css");
                assert_eq!(second, "a_b.css");
            }
            other => panic!("expected SymbolCollision, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_index_is_rejected() {
        // Cannot arise from unique filenames, but the guard holds anyway.
        let result = generate(
            &manifest_of(vec![record("index.html", b"x"), record("index.html", b"y")]),
            &ResolvedConfig::from_tool(&ToolConfig::default()),
        );
        assert!(matches!(result, Err(GenerateError::SymbolCollision { .. })));
    }

    // =========================================================================
    // Representative sites
    // =========================================================================

    #[test]
    fn scenario_single_index_default_flags() {
        let doc = generate_with(
            vec![gz_record("index.html", b"<html></html>", b"gzbytes")],
            &ToolConfig::default(),
        );
        assert_has(&doc, "data_index_html");
        assert_has(&doc, "datagzip_index_html");
        assert_has(&doc, "if (server->header(\"If-None-Match\") == etag_index_html) {");
        assert_has(&doc, "max-age=86400");
        assert_has(&doc, "server->on(\"/index.html\", HTTP_GET");
        assert_has(&doc, "server->on(\"/\", HTTP_GET");
    }

    #[test]
    fn scenario_two_files_everything_off() {
        let config = ToolConfig {
            etag: "false".to_string(),
            gzip: "false".to_string(),
            ..ToolConfig::default()
        };
        let doc = generate_with(
            vec![record("a.html", b"a"), record("b.css", b"b")],
            &config,
        );
        assert_eq!(doc.matches("server->on(").count(), 2);
        assert_lacks(&doc, "etag_");
        assert_lacks(&doc, "datagzip_");
        assert_has(&doc, "#define WEBSKETCH_COUNT 2");
    }
}
