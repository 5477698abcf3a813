use std::path::PathBuf;

use clap::Parser;

use scour_core::config::Config;

/// Examples plus the built-in protected directory and preserved patterns.
fn after_help() -> String {
    let defaults = Config::default();
    let preserved: Vec<&str> = defaults.preserved_patterns().collect();
    format!(
        "\
Examples:
    scour              Remove all build caches and artifacts
    scour --dry-run    Preview what would be deleted
    scour --all        Also remove the protected directory ({protected})

Preserved files (never deleted, built-in defaults):
    {preserved}

Defaults can be changed with `protected_dir`, `preserve` and
`extra_preserve` in the config file.",
        protected = defaults.protected_dir,
        preserved = preserved.join(", "),
    )
}

#[derive(Debug, Parser)]
#[command(
    name = "scour",
    about = "Remove build caches and artifacts from the project",
    version,
    after_help = after_help()
)]
pub struct Cli {
    /// Show what would be deleted without actually deleting
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Also remove the protected directory, .venv by default (use with caution!)
    #[arg(short, long)]
    pub all: bool,

    /// Project root to clean (skips discovery from the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Load cleanup and preservation patterns from a TOML file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
