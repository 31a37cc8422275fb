use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to scan
    #[arg(required = true)]
    pub roots: Vec<String>,

    /// License template with a single @StartYear@ placeholder
    #[arg(short, long)]
    pub template: String,

    /// Start year for files without a parsable copyright notice
    #[arg(short, long)]
    pub start_year: Option<String>,

    /// Rewrite headers instead of only reporting violations
    #[arg(long)]
    pub modify: bool,

    /// With --modify, report changes without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Warn about unrecognized file types instead of stopping
    #[arg(long)]
    pub skip_unrecognized: bool,

    /// Exclude patterns (glob patterns like ".svn" or "*/build/*")
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Maximum recursion depth (0 means no recursion)
    #[arg(short, long, default_value = "50")]
    pub max_depth: usize,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Write a JSON report to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Log debug details
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Used when neither the command line nor the config file sets a start year.
pub const DEFAULT_START_YEAR: &str = "1997";
