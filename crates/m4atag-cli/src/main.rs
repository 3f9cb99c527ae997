use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use log::debug;
use m4atag_core::{Metadata, MetadataError, MetadataService, Service};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("M4ATAG_BUILD_COMMIT"),
    " ",
    env!("M4ATAG_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "m4atag")]
#[command(version = VERSION)]
#[command(
    about = "Read iTunes-style tags (title, artist, album, ...) from .m4a files.",
    long_about = None,
    after_help = "Examples:\n  m4atag tags song.m4a --stdout\n  m4atag tags song.m4a -o tags.json --pretty\n  m4atag read 'music/*.m4a' --stdout"
)]
struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    loglevel: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the tags of an .m4a file and write them as JSON.
    #[command(alias = "read")]
    Tags {
        /// Path (or glob matching one file) to an .m4a file
        input: PathBuf,

        /// Output path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write JSON to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors (default).
    Warn,
    /// Show info, warnings and errors.
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut env_builder = env_logger::Builder::new();
    env_builder
        .filter_level(cli.loglevel.to_level_filter())
        .parse_default_env()
        .format_timestamp_secs();
    if let Err(err) = env_builder.try_init() {
        eprintln!("warning: logging disabled: {}", err);
    }

    let result = match cli.command {
        Commands::Tags {
            input,
            output,
            stdout,
            pretty,
            compact,
            quiet,
        } => cmd_tags(input, output, stdout, pretty, compact, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

impl From<MetadataError> for CliError {
    fn from(err: MetadataError) -> Self {
        let hint = match &err {
            MetadataError::UnsupportedContainer { .. } => "expected a .m4a file".to_string(),
            MetadataError::Parse { source, .. } => {
                debug!("parse failure: {:?}", source);
                format!("cause: {}", source)
            }
        };
        CliError::new(err.to_string(), Some(hint))
    }
}

fn cmd_tags(
    input: PathBuf,
    output: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let output = if stdout {
        None
    } else {
        Some(output.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            )
        })?)
    };

    if let Some(output_path) = output.as_ref() {
        let output_abs = output_path
            .parent()
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    fs::canonicalize(".")
                } else {
                    fs::canonicalize(parent)
                }
            })
            .transpose();
        // A parent that does not exist yet cannot hold the input file.
        if let Ok(Some(output_dir)) = output_abs {
            let output_target = output_dir.join(
                output_path
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("Invalid output path"))?,
            );
            if output_target == input_abs {
                return Err(CliError::new(
                    format!(
                        "output path must differ from input: {}",
                        output_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let metadata = MetadataService.metadata(&resolved_input)?;
    let json = serialize_metadata(&metadata, pretty, compact)?;

    let Some(output) = output else {
        println!("{}", json);
        return Ok(());
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&output, json)
        .with_context(|| format!("Failed to write metadata: {}", output.display()))?;

    if !quiet {
        eprintln!("OK: metadata written -> {}", output.display());
    }
    Ok(())
}

fn serialize_metadata(
    metadata: &Metadata,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(metadata)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(metadata)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .m4a file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .m4a file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .m4a file".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single .m4a file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
