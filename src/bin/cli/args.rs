//! CLI argument structures.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commentary_rs::core::config::ReportFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name, picked up automatically when present.
pub const DEFAULT_CONFIG_FILE: &str = ".commentary.yml";

/// Comment quality analyzer and normalizer
#[derive(Parser)]
#[command(name = "commentary")]
#[command(version = VERSION)]
#[command(about = "Commentary - comment quality analysis and cleanup")]
#[command(long_about = "
Classify source code comments by informational value, find comments that
drifted apart on near-duplicate code, and remove or flag low-value comments.

Common Usage:

  # Analyze the current directory and print a summary
  commentary analyze

  # Write a JSON report
  commentary analyze --format json --out report.json ./src

  # Delete filler and placeholder comments in place
  commentary analyze --delete-filler --delete-placeholder --apply ./src

  # Preview what --apply would change
  commentary analyze --aggressive --apply --dry-run ./src

  # Check recent commit messages
  commentary scan-commits --commits 50
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify comments, detect drift and plan rewrites
    Analyze(Box<AnalyzeArgs>),

    /// Scan recent git commit messages for narrative phrasing and emoji
    #[command(name = "scan-commits")]
    ScanCommits(ScanCommitsArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),

    /// List supported programming languages
    #[command(name = "list-languages")]
    ListLanguages,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// One or more directories or files to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Configuration file path (defaults to .commentary.yml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format [default: pretty on stdout, the configured format with --out]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write rewritten files back to disk
    #[arg(long)]
    pub apply: bool,

    /// Print a summary only; never write reports or files
    #[arg(long)]
    pub dry_run: bool,

    /// List kept comments in the report as well
    #[arg(long)]
    pub include_kept: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub analysis_control: AnalysisControlArgs,
}

/// Rewrite policy overrides
#[derive(Args, Default)]
pub struct PolicyArgs {
    /// Delete filler comments
    #[arg(long)]
    pub delete_filler: bool,

    /// Delete comments that restate the code
    #[arg(long)]
    pub delete_redundant: bool,

    /// Delete bare placeholder markers
    #[arg(long)]
    pub delete_placeholder: bool,

    /// Shorthand for all three delete options
    #[arg(long)]
    pub aggressive: bool,

    /// Rewrite kept comments to correct misspellings
    #[arg(long)]
    pub fix_typos: bool,

    /// Apply the policy to drifted comments instead of flagging them
    #[arg(long)]
    pub no_flag_drift: bool,
}

/// Analysis resource limits
#[derive(Args, Default)]
pub struct AnalysisControlArgs {
    /// Maximum files analyzed concurrently [default: available CPUs]
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Abandon remaining files after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Disable drift detection
    #[arg(long)]
    pub no_drift: bool,
}

#[derive(Args)]
pub struct ScanCommitsArgs {
    /// Repository path
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Number of commits to scan
    #[arg(short = 'n', long, default_value_t = 20)]
    pub commits: usize,

    /// Print warnings as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    #[arg(short, long, required = true)]
    pub config: PathBuf,

    /// Show detailed configuration breakdown
    #[arg(short, long)]
    pub detailed: bool,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// YAML report
    Yaml,
    /// Plain text, one line per action
    Text,
    /// Colored tables for the terminal
    Pretty,
}

impl OutputFormat {
    /// Library report format, `None` for terminal output.
    pub fn report_format(self) -> Option<ReportFormat> {
        match self {
            OutputFormat::Json => Some(ReportFormat::Json),
            OutputFormat::Yaml => Some(ReportFormat::Yaml),
            OutputFormat::Text => Some(ReportFormat::Text),
            OutputFormat::Pretty => None,
        }
    }
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Yaml => OutputFormat::Yaml,
            ReportFormat::Text => OutputFormat::Text,
        }
    }
}
