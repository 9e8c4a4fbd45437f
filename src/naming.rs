//! Symbol identifier and URL route derivation.
//!
//! Every generated name for a file is rooted in a single sanitized identifier
//! derived from its relative path: `index.html` → `index_html`, giving
//! `data_index_html`, `datagzip_index_html`, `etag_index_html` and the
//! macro-style `INDEX_HTML`. Derivation is a pure function of the filename,
//! which is what makes repeated generations byte-identical.
//!
//! Distinct filenames can sanitize to the same identifier (`a-b.css` and
//! `a_b.css` both become `a_b_css`). That collision is not resolved here;
//! the generator rejects it loudly, since silently overwriting one file's
//! symbols with another's would corrupt the output.

/// The one filename that additionally receives the default route.
pub const INDEX_FILENAME: &str = "index.html";

/// Sanitize a relative filename into a C identifier fragment.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`:
/// - `index.html` → `index_html`
/// - `assets/app.v2.js` → `assets_app_v2_js`
pub fn symbol_ident(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Uppercase variant of [`symbol_ident`], for macro-style names.
///
/// `assets/app.js` → `ASSETS_APP_JS`
pub fn macro_ident(filename: &str) -> String {
    symbol_ident(filename).to_ascii_uppercase()
}

/// The HTTP route for a file: `basePath + "/" + filename`, or
/// `"/" + filename` when the base path is empty.
pub fn route_path(base_path: &str, filename: &str) -> String {
    format!("{}/{}", base_path, filename)
}

/// The default route served by the index-equivalent file: the base path
/// itself, or `/` when the base path is empty.
pub fn default_route(base_path: &str) -> String {
    if base_path.is_empty() {
        "/".to_string()
    } else {
        base_path.to_string()
    }
}

/// Whether this file is the index-equivalent one (exact filename match, so a
/// nested `admin/index.html` does not qualify).
pub fn is_index(filename: &str) -> bool {
    filename == INDEX_FILENAME
}
