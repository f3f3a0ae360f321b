//! Command-line interface definitions for finddup.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, config file) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate groups from two listings
//! finddup groups disk1.md5 disk2.md5
//!
//! # Listing with size before hash, exact matches only
//! find . -type f | xmd5 | finddup groups -f s5 -e
//!
//! # Plan deletions and export them as a shell script
//! finddup prune listing.md5 --output script > cleanup.sh
//!
//! # Verbose mode for debugging
//! finddup -v groups listing.md5
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::ScriptType;

/// Find duplicate files and directories in hash listings.
///
/// finddup reads listings of `<hash> <size> <path>` lines, merges them into one
/// tree and reports files and whole directories with identical content.
#[derive(Debug, Parser)]
#[command(name = "finddup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for finddup.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report groups of duplicate files and directories
    Groups(GroupsArgs),
    /// Choose one copy per group to keep and list what can be deleted
    Prune(PruneArgs),
    /// Print the effective configuration as TOML
    Config(InputArgs),
}

/// Options shared by every command that reads listings.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Listings to read, in order ("-" or none reads standard input)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Field layout: "5" hash, "s" size, "-" ignored, then the path
    #[arg(short, long, value_name = "FMT")]
    pub format: Option<String>,

    /// Only group directories whose contents match exactly
    #[arg(short, long)]
    pub equal_only: bool,

    /// Keep empty files instead of dropping them
    #[arg(short = 'z', long = "zero")]
    pub include_zero: bool,

    /// Normalize paths to Unicode NFC before merging
    #[arg(long)]
    pub normalize_unicode: bool,

    /// Print the grouped tree before the report
    #[arg(short = 't', long)]
    pub print_tree: bool,
}

/// Arguments for the groups subcommand.
#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also report groups implied by a reported parent group
    #[arg(short, long)]
    pub child_groups: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: GroupsFormat,
}

/// Arguments for the prune subcommand.
#[derive(Debug, Args)]
pub struct PruneArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: PruneFormat,

    /// Script flavour for --output script (defaults to the current platform)
    #[arg(long, value_enum)]
    pub script_type: Option<ScriptTypeArg>,
}

/// Output format for group listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupsFormat {
    /// Plain text listing
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

/// Output format for deletion listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PruneFormat {
    /// Plain text listing
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
    /// Shell script that performs the deletions
    Script,
}

/// Script flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptTypeArg {
    /// POSIX shell
    Posix,
    /// Windows PowerShell
    Powershell,
}

impl From<ScriptTypeArg> for ScriptType {
    fn from(arg: ScriptTypeArg) -> Self {
        match arg {
            ScriptTypeArg::Posix => Self::Posix,
            ScriptTypeArg::Powershell => Self::PowerShell,
        }
    }
}

impl Cli {
    /// Listing options of the selected command.
    #[must_use]
    pub fn input(&self) -> &InputArgs {
        match &self.command {
            Commands::Groups(args) => &args.input,
            Commands::Prune(args) => &args.input,
            Commands::Config(args) => args,
        }
    }

    /// Whether the selected command reports child groups.
    #[must_use]
    pub fn child_groups(&self) -> bool {
        matches!(&self.command, Commands::Groups(args) if args.child_groups)
    }
}
