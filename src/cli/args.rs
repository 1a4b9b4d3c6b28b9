use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

pub use crate::common::config::OutputFormat;

/// reclaim: safety-governed disk space reclamation
#[derive(Parser, Debug)]
#[command(
    name = "reclaim",
    version,
    about = "Find and remove reclaimable temp, cache and report files safely",
    long_about = "reclaim scans well-known temp, cache, crash-report and trash locations,\n\
                   then removes what you select. Every item is re-checked against the\n\
                   live filesystem right before it is touched.",
    after_help = "EXAMPLES:\n  \
        reclaim scan                              Scan enabled categories\n  \
        reclaim scan --detailed                   Show every finding\n  \
        reclaim scan --format json                Machine-readable results\n  \
        reclaim clean --all --dry-run             Preview a full cleanup\n  \
        reclaim clean --category temp.user        Clean user temp files\n  \
        reclaim clean --all --permanent --yes     Delete without trash or prompt\n  \
        reclaim categories                        List categories\n  \
        reclaim trash                             Show trash usage\n  \
        reclaim config init                       Write default configuration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (defaults to the configured one)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Also write a daily log file into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for reclaimable files
    Scan {
        /// Show individual findings in results
        #[arg(long)]
        detailed: bool,
    },

    /// Remove selected findings from a fresh scan
    #[command(group(
        ArgGroup::new("selection")
            .required(true)
            .args(["all", "category", "path"])
    ))]
    Clean {
        /// Clean every finding
        #[arg(long)]
        all: bool,

        /// Only clean these categories
        #[arg(long, value_delimiter = ',', value_name = "ID")]
        category: Vec<String>,

        /// Only clean findings with these paths
        #[arg(long, value_name = "PATH")]
        path: Vec<PathBuf>,

        /// Delete permanently instead of moving to trash
        #[arg(long)]
        permanent: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Show what would be cleaned without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List cleanup categories
    Categories,

    /// Show trash usage
    Trash,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Create data directories and default config
    Init,

    /// Print the config file location
    Path,
}
