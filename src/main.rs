use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use websketch::{config, generate, output, scan, types};

/// CLI overrides for generation settings. Every field is optional; anything
/// not given falls back to `websketch.toml` in the asset root, then to the
/// stock defaults.
#[derive(Args, Clone)]
struct GenFlags {
    /// ETag generation: true, false, or compiler (defer to firmware build flags)
    #[arg(long)]
    etag: Option<String>,

    /// Gzip variants: true, false, or compiler
    #[arg(long)]
    gzip: Option<String>,

    /// Cache-Control max-age in seconds (0 emits no-cache)
    #[arg(long)]
    cachetime: Option<u32>,

    /// URL prefix for every route, e.g. /ui
    #[arg(long)]
    base_path: Option<String>,

    /// Prefix for every generated symbol and macro name
    #[arg(long)]
    prefix: Option<String>,

    /// Name of the generated initialization function
    #[arg(long)]
    entry: Option<String>,

    /// Embed a version macro (#define <PREFIX>_VERSION "...") in the output
    #[arg(long)]
    embed_version: Option<String>,
}

impl GenFlags {
    fn apply(&self, config: &mut config::ToolConfig) {
        if let Some(etag) = &self.etag {
            config.etag = etag.clone();
        }
        if let Some(gzip) = &self.gzip {
            config.gzip = gzip.clone();
        }
        if let Some(cachetime) = self.cachetime {
            config.cachetime = cachetime;
        }
        if let Some(base_path) = &self.base_path {
            config.base_path = base_path.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(entry) = &self.entry {
            config.entry = entry.clone();
        }
        if let Some(version) = &self.embed_version {
            config.version = Some(version.clone());
        }
    }
}

fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup, called exactly once
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "websketch")]
#[command(about = "Convert static web assets into an embeddable Arduino WebServer source unit")]
#[command(long_about = "\
Convert static web assets into an embeddable Arduino WebServer source unit

Point websketch at a built web app (the dist/ output of your bundler) and it
emits one C++ file that serves every asset from flash, no filesystem needed:

  websketch build --source dist --output websketch.h

Then in the firmware:

  #include \"websketch.h\"
  WebServer server(80);
  void setup() {
    initWebsketch(&server);
    server.begin();
  }

Each asset becomes a PROGMEM byte array behind a GET route; index.html also
serves the root route. ETag validation, gzip variants, cache headers, URL
base path, and the symbol prefix are all configurable - via websketch.toml
in the asset root or the flags below. Setting etag/gzip to 'compiler' defers
that feature to the firmware's own build flags (-D<PREFIX>_ENABLE_ETAG,
-D<PREFIX>_ENABLE_GZIP).

Run 'websketch gen-config' to print a documented websketch.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Asset directory to embed
    #[arg(long, default_value = "dist", global = true)]
    source: PathBuf,

    /// Output file (overrides the config file's `output`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan assets and write the generated C++ source unit
    Build(GenFlags),
    /// List what would be embedded, without generating
    Scan {
        /// Emit the scan report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate assets and preview routes without writing anything
    Check(GenFlags),
    /// Print a stock websketch.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(flags) => {
            let (tool, resolved) = resolve(&cli.source, cli.output.as_deref(), &flags)?;
            let manifest = scan::scan(&cli.source)?;
            let document = generate::generate(&manifest, &resolved)?;
            let out_path = PathBuf::from(&tool.output);
            std::fs::write(&out_path, &document)?;
            output::print_build_output(&manifest, &resolved, &out_path, document.len());
        }
        Command::Scan { json } => {
            let manifest = scan::scan(&cli.source)?;
            if json {
                let reports: Vec<types::FileReport> =
                    manifest.files.iter().map(Into::into).collect();
                let report = serde_json::json!({
                    "files": reports,
                    "stats": manifest.stats,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_scan_output(&manifest);
            }
        }
        Command::Check(flags) => {
            let (_, resolved) = resolve(&cli.source, cli.output.as_deref(), &flags)?;
            let manifest = scan::scan(&cli.source)?;
            // Run full generation to surface symbol collisions, then
            // discard the text.
            let document = generate::generate(&manifest, &resolved)?;
            output::print_check_output(&manifest, &resolved);
            println!("==> OK ({} bytes would be generated)", document.len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Layer configuration: stock defaults, then `websketch.toml` from the asset
/// root, then CLI flags; validate the final result.
fn resolve(
    source: &std::path::Path,
    output: Option<&std::path::Path>,
    flags: &GenFlags,
) -> Result<(config::ToolConfig, config::ResolvedConfig), config::ConfigError> {
    let mut tool = config::load_config(source)?;
    flags.apply(&mut tool);
    if let Some(out) = output {
        tool.output = out.display().to_string();
    }
    tool.validate()?;
    let resolved = config::ResolvedConfig::from_tool(&tool);
    Ok((tool, resolved))
}
