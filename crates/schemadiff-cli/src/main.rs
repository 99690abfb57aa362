use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemadiff_core::{load_schema, ComparisonResult, Config, DiffKind, FingerprintReport, IgnoreFilter, Schema};
use schemadiff_engine::{fingerprint, Comparer, FingerprintOptions};

mod render;

/// Exit code when schemas differ or fingerprints do not match
const EXIT_MISMATCH: i32 = 2;

/// schemadiff - Structural diff and fingerprinting for database schema snapshots
#[derive(Parser)]
#[command(name = "schemadiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemadiff.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two schema snapshots
    Compare {
        /// Source snapshot (.json, .yaml or .toml)
        source: PathBuf,

        /// Target snapshot (.json, .yaml or .toml)
        target: PathBuf,

        /// Ignore pattern, e.g. 'table:temp_*' (repeatable)
        #[arg(short, long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Compare tables only
        #[arg(long)]
        tables_only: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a snapshot against a golden snapshot
    Validate {
        /// Golden snapshot the current one must match
        #[arg(short, long)]
        golden: PathBuf,

        /// Current snapshot
        current: PathBuf,

        /// Ignore pattern (repeatable)
        #[arg(short, long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Compare tables only
        #[arg(long)]
        tables_only: bool,

        /// Pipeline mode: print nothing unless validation fails
        #[arg(long)]
        pipeline: bool,
    },

    /// Print the fingerprint of a snapshot
    Fingerprint {
        /// Snapshot to fingerprint
        snapshot: PathBuf,

        /// Include table and column comments
        #[arg(long)]
        include_comments: bool,

        /// Hash tables only
        #[arg(long)]
        tables_only: bool,

        /// Print a JSON report instead of the bare digest
        #[arg(long)]
        json: bool,
    },

    /// Compare the fingerprints of two snapshots or precomputed digests
    CompareFingerprints {
        /// Precomputed source fingerprint
        #[arg(long, conflicts_with = "source", required_unless_present = "source")]
        source_hash: Option<String>,

        /// Source snapshot
        #[arg(long)]
        source: Option<PathBuf>,

        /// Precomputed target fingerprint
        #[arg(long, conflicts_with = "target", required_unless_present = "target")]
        target_hash: Option<String>,

        /// Target snapshot
        #[arg(long)]
        target: Option<PathBuf>,

        /// Hash tables only
        #[arg(long)]
        tables_only: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let mismatch = match cli.command {
        Commands::Compare {
            source,
            target,
            ignore,
            tables_only,
            format,
            output,
        } => {
            let result = diff_snapshots(&config, &source, &target, &ignore, tables_only)?;
            compare_command(&result, format, output.as_deref())?
        }
        Commands::Validate {
            golden,
            current,
            ignore,
            tables_only,
            pipeline,
        } => {
            let result = diff_snapshots(&config, &golden, &current, &ignore, tables_only)
                .context("Failed to validate against golden snapshot")?;
            validate_command(&result, pipeline)
        }
        Commands::Fingerprint {
            snapshot,
            include_comments,
            tables_only,
            json,
        } => {
            let mut options = FingerprintOptions::from(config.fingerprint);
            options.include_comments |= include_comments;
            options.tables_only |= tables_only;
            fingerprint_command(&snapshot, &options, json)?
        }
        Commands::CompareFingerprints {
            source_hash,
            source,
            target_hash,
            target,
            tables_only,
            json,
        } => {
            let mut options = FingerprintOptions::from(config.fingerprint);
            options.tables_only |= tables_only;
            let source = HashInput::new("source", source_hash, source)?;
            let target = HashInput::new("target", target_hash, target)?;
            compare_fingerprints_command(source, target, &options, json)?
        }
    };

    if mismatch {
        std::process::exit(EXIT_MISMATCH);
    }

    Ok(())
}

/// Install the stderr fmt layer; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// `--config`, else ./schemadiff.toml, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = Path::new("schemadiff.toml");
    if default_path.exists() {
        return Config::from_file(default_path).context("Failed to load schemadiff.toml");
    }

    tracing::debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn load(path: &Path) -> Result<Schema> {
    let schema = load_schema(path).with_context(|| format!("Failed to load snapshot {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        schema = %schema.name,
        tables = schema.tables.len(),
        "loaded snapshot"
    );

    Ok(schema)
}

fn ignore_filter(config: &Config, extra: &[String]) -> Result<IgnoreFilter> {
    config
        .ignore_filter(extra)
        .context("Failed to compile ignore patterns")
}

/// Load, optionally narrow to tables, and diff two snapshots
fn diff_snapshots(
    config: &Config,
    source_path: &Path,
    target_path: &Path,
    ignore: &[String],
    tables_only: bool,
) -> Result<ComparisonResult> {
    let mut source = load(source_path)?;
    let mut target = load(target_path)?;
    if tables_only {
        source = source.tables_only();
        target = target.tables_only();
    }

    let comparer = Comparer::with_filter(ignore_filter(config, ignore)?);
    Ok(comparer.compare(&source, &target))
}

/// Compare command - full structural diff between two snapshots
fn compare_command(result: &ComparisonResult, format: OutputFormat, output: Option<&Path>) -> Result<bool> {
    // Reports written to files never carry color codes
    if output.is_some() {
        colored::control::set_override(false);
    }

    let rendered = match format {
        OutputFormat::Text => render::text_report(result),
        OutputFormat::Json => result.to_json().context("Failed to serialize comparison")?,
        OutputFormat::Markdown => render::markdown_report(result),
        OutputFormat::Summary => render::summary_report(result),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(result.has_differences())
}

/// Validate command - golden-file check for CI pipelines
fn validate_command(result: &ComparisonResult, pipeline: bool) -> bool {
    if pipeline {
        if result.has_differences() {
            eprintln!(
                "FAIL: Schema validation failed - {} differences found",
                result.differences.len()
            );
        }
        return result.has_differences();
    }

    if !result.has_differences() {
        println!("{}", "✓ Schema matches golden file".green().bold());
        return false;
    }

    println!(
        "{}",
        format!(
            "✗ Schema validation failed - {} differences found:",
            result.differences.len()
        )
        .red()
        .bold()
    );
    println!();

    let groups = [
        (DiffKind::Removed, "Missing from current schema:", "-"),
        (DiffKind::Added, "Extra in current schema:", "+"),
        (DiffKind::Modified, "Modified in current schema:", "~"),
    ];

    for (kind, heading, marker) in groups {
        let diffs: Vec<_> = result.of_kind(kind).collect();
        if diffs.is_empty() {
            continue;
        }

        println!("{}", heading.bold());
        for diff in diffs {
            println!("  {} {}: {}", render::colored_marker(kind, marker), diff.object_type(), diff.object_name);
        }
        println!();
    }

    true
}

/// Fingerprint command - print the digest of one snapshot
fn fingerprint_command(path: &Path, options: &FingerprintOptions, json: bool) -> Result<bool> {
    let schema = load(path)?;
    let digest = fingerprint(&schema, options).context("Failed to compute fingerprint")?;

    if json {
        let report = FingerprintReport::new(&schema, digest, options.include_comments, options.tables_only);
        println!("{}", report.to_json().context("Failed to serialize fingerprint report")?);
    } else {
        println!("{}", digest);
    }

    Ok(false)
}

/// A fingerprint given directly or computed from a snapshot
enum HashInput {
    Digest(String),
    Snapshot(PathBuf),
}

impl HashInput {
    fn new(side: &str, digest: Option<String>, snapshot: Option<PathBuf>) -> Result<Self> {
        match (digest, snapshot) {
            (Some(digest), _) => Ok(Self::Digest(digest.trim().to_ascii_lowercase())),
            (None, Some(path)) => Ok(Self::Snapshot(path)),
            (None, None) => Err(anyhow::anyhow!(
                "Either --{side}-hash or --{side} is required"
            )),
        }
    }

    /// Digest plus the snapshot reference, when there is one
    fn resolve(self, options: &FingerprintOptions) -> Result<(String, Option<String>)> {
        match self {
            Self::Digest(digest) => Ok((digest, None)),
            Self::Snapshot(path) => {
                let schema = load(&path)?;
                let digest = fingerprint(&schema, options)
                    .with_context(|| format!("Failed to fingerprint {}", path.display()))?;
                let reference = format!("{}://{}", schema.database_type, schema.name);
                Ok((digest, Some(reference)))
            }
        }
    }
}

#[derive(Serialize)]
struct FingerprintComparison {
    source_fingerprint: String,
    target_fingerprint: String,
    #[serde(rename = "match")]
    matches: bool,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_schema: Option<String>,
}

/// Compare-fingerprints command - cheap equality check
fn compare_fingerprints_command(
    source: HashInput,
    target: HashInput,
    options: &FingerprintOptions,
    json: bool,
) -> Result<bool> {
    let (source_fingerprint, source_schema) = source.resolve(options)?;
    let (target_fingerprint, target_schema) = target.resolve(options)?;
    let matches = source_fingerprint == target_fingerprint;

    if json {
        let comparison = FingerprintComparison {
            source_fingerprint,
            target_fingerprint,
            matches,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source_schema,
            target_schema,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&comparison).context("Failed to serialize comparison")?
        );
    } else {
        println!("Source Fingerprint: {}", source_fingerprint);
        println!("Target Fingerprint: {}", target_fingerprint);
        println!();
        if matches {
            println!("{}", "✓ Schemas match!".green().bold());
        } else {
            println!("{}", "✗ Schemas differ".red().bold());
            println!();
            println!("Run 'schemadiff compare' for detailed differences");
        }
    }

    Ok(!matches)
}
