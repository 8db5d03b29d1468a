// crates/intersite-cli/src/main.rs
// ============================================================================
// Module: Intersite CLI Entry Point
// Description: Command dispatcher for topology validation and compilation.
// Purpose: Turn a connection config into per-site broker definition files.
// Dependencies: clap, intersite-config, intersite-core, serde, thiserror
// ============================================================================

//! ## Overview
//! The intersite CLI loads a TOML connection config, validates it and compiles
//! it into one broker definitions document per site. Output is canonical JSON
//! so repeated runs over the same config produce byte-identical files. All
//! user-facing strings are routed through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use intersite_cli::audit::JsonLineAuditSink;
use intersite_cli::t;
use intersite_config::IntersiteConfig;
use intersite_core::CompiledTopology;
use intersite_core::Connection;
use intersite_core::DefinitionsDigest;
use intersite_core::SiteId;
use intersite_core::TopologyCompiler;
use intersite_core::hashing::canonical_json_bytes;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the digest manifest written next to the site files.
const MANIFEST_FILE_NAME: &str = "manifest.json";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "intersite", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Compile the connection config into per-site broker definitions.
    Compile(CompileCommand),
    /// Print the shortest path between every pair of sites.
    Paths(ConfigArgs),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the config file and exit.
    Validate(ConfigArgs),
}

/// Config file selection shared by all commands.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to intersite.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `compile`.
#[derive(Args, Debug)]
struct CompileCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Only emit the definitions of this site.
    #[arg(long, value_name = "SITE")]
    site: Option<String>,
    /// Write one file per site plus a digest manifest into this directory.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Emit JSON-lines compile audit events on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    audit: bool,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Manifest describing a directory of compiled site files.
#[derive(Debug, Serialize)]
struct OutputManifest {
    /// Number of connections in the source config.
    connections: usize,
    /// Written files keyed by site id.
    sites: BTreeMap<SiteId, ManifestEntry>,
}

/// Manifest entry for one site file.
#[derive(Debug, Serialize)]
struct ManifestEntry {
    /// File name relative to the output directory.
    file: String,
    /// Canonical JSON digest of the site definitions.
    digest: DefinitionsDigest,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(args) => command_config_validate(&args),
        },
        Commands::Compile(command) => command_compile(&command),
        Commands::Paths(args) => command_paths(&args),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Loads and validates the selected config.
fn load_config(args: &ConfigArgs) -> CliResult<IntersiteConfig> {
    IntersiteConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Executes `config validate`.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let sites = distinct_sites(&config.connections).len();
    write_stdout_line(&t!(
        "config.validate.ok",
        sites = sites,
        connections = config.connections.len()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Compile Commands
// ============================================================================

/// Compiles the loaded config, optionally streaming audit events to stderr.
fn compile_config(config: &IntersiteConfig, audit: bool) -> CliResult<CompiledTopology> {
    let options = config.compile_options();
    let compiled = if audit {
        TopologyCompiler::with_audit(options, JsonLineAuditSink::stderr())
            .compile(&config.connections)
    } else {
        TopologyCompiler::new(options).compile(&config.connections)
    };
    compiled.map_err(|err| CliError::new(t!("compile.failed", error = err)))
}

/// Executes `compile`.
fn command_compile(command: &CompileCommand) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let compiled = compile_config(&config, command.audit)?;

    let selected = match command.site.as_deref() {
        Some(site) => {
            let site = SiteId::new(site);
            let Some(definitions) = compiled.site(&site) else {
                return Err(CliError::new(t!("compile.unknown_site", site = site)));
            };
            BTreeMap::from([(site, definitions.clone())])
        }
        None => compiled.into_definitions(),
    };

    match &command.out_dir {
        Some(out_dir) => {
            write_site_files(out_dir, &selected, config.connections.len())?;
            write_stdout_line(&t!(
                "compile.ok",
                sites = selected.len(),
                path = out_dir.display()
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        None if command.site.is_some() => {
            for definitions in selected.values() {
                write_canonical_json(definitions)?;
            }
        }
        None => write_canonical_json(&selected)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes one canonical JSON file per site and the digest manifest.
fn write_site_files<T: Serialize>(
    out_dir: &Path,
    sites: &BTreeMap<SiteId, T>,
    connections: usize,
) -> CliResult<()> {
    fs::create_dir_all(out_dir).map_err(|err| {
        CliError::new(t!("compile.output_dir_failed", path = out_dir.display(), error = err))
    })?;

    let mut manifest = OutputManifest {
        connections,
        sites: BTreeMap::new(),
    };
    for (site, definitions) in sites {
        let bytes = serialize_canonical(definitions)?;
        let file = site_file_name(site);
        write_file(&out_dir.join(&file), &bytes)?;
        manifest.sites.insert(
            site.clone(),
            ManifestEntry {
                file,
                digest: DefinitionsDigest::of_canonical_bytes(&bytes),
            },
        );
    }
    let bytes = serialize_canonical(&manifest)?;
    write_file(&out_dir.join(MANIFEST_FILE_NAME), &bytes)
}

/// Returns the file name holding `site`'s definitions.
fn site_file_name(site: &SiteId) -> String {
    format!("{site}.json")
}

/// Writes `bytes` plus a trailing newline to `path`.
fn write_file(path: &Path, bytes: &[u8]) -> CliResult<()> {
    let mut buffer = bytes.to_vec();
    buffer.push(b'\n');
    fs::write(path, buffer)
        .map_err(|err| CliError::new(t!("compile.write_failed", path = path.display(), error = err)))
}

// ============================================================================
// SECTION: Paths Command
// ============================================================================

/// Executes `paths`.
fn command_paths(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let compiled = compile_config(&config, false)?;

    for (tenant, paths) in compiled.paths() {
        write_stdout_line(&t!("paths.tenant", tenant = tenant, pairs = paths.len()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        if paths.is_empty() {
            write_stdout_line(&t!("paths.none"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        for ((start, end), path) in paths.iter() {
            write_stdout_line(&t!(
                "paths.entry",
                start = start,
                end = end,
                path = render_path(path)
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders a path as `a -> b -> c`.
fn render_path(path: &[SiteId]) -> String {
    path.iter().map(SiteId::as_str).collect::<Vec<_>>().join(" -> ")
}

/// Returns every site named by `connections`.
fn distinct_sites(connections: &[Connection]) -> BTreeSet<&SiteId> {
    connections
        .iter()
        .flat_map(|connection| [&connection.connecter.site_id, &connection.connectee.site_id])
        .collect()
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes `value` as canonical JSON.
fn serialize_canonical<T: Serialize + ?Sized>(value: &T) -> CliResult<Vec<u8>> {
    canonical_json_bytes(value)
        .map_err(|err| CliError::new(t!("compile.serialize_failed", error = err)))
}

/// Writes canonical JSON to stdout with a trailing newline.
fn write_canonical_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut bytes = serialize_canonical(value)?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
