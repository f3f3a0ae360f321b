//! finddup - duplicate file and directory finder for hash listings.
//!
//! finddup reads listings of `<md5> <size> <path>` lines produced by an
//! external hashing tool, merges them into one path tree and finds files and
//! whole directory trees with the same content, including directories whose
//! content is a subset of another's.
//!
//! # Example
//!
//! ```
//! use finddup::duplicates::{DuplicateFinder, FinderConfig};
//!
//! let listing = "\
//! aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa 100 a/x
//! bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb 50 a/y
//! aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa 100 b/x
//! bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb 50 b/y
//! ";
//! let analysis = DuplicateFinder::new(FinderConfig::default())
//!     .analyze_reader(listing.as_bytes(), "listing")
//!     .unwrap();
//!
//! // a and b hold the same files, so they are reported as one group
//! let group = &analysis.groups[0];
//! assert_eq!(group.members[0].path, "a");
//! assert_eq!(group.members[1].path, "b");
//! assert_eq!(group.reclaimable, 150);
//! ```

pub mod arena;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod index;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod tree;

use std::io::{self, BufWriter, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, GroupsFormat, PruneFormat};
use crate::config::Config;
use crate::duplicates::{Analysis, DuplicateFinder};
use crate::error::ExitCode;
use crate::output::{CsvOutput, ScriptOutput, ScriptType, TextOutput, TreeDump};
use crate::output::json::{JsonDeletionOutput, JsonOutput};
use crate::progress::Progress;

/// Run one invocation and return its exit code.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a listing cannot be
/// read, memory runs out, or writing the report fails.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let color = !cli.no_color && io::stdout().is_terminal();
    if !color {
        yansi::disable();
    }

    let config = Config::load(&cli)?;
    log::debug!("Effective configuration: {config:?}");

    if let Commands::Config(_) = &cli.command {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let finder_config = config
        .finder_config()
        .context("invalid listing format")?
        .with_progress_callback(Arc::new(Progress::new(cli.quiet)));
    let finder = DuplicateFinder::new(finder_config);
    let mut analysis = finder.analyze_paths(&cli.input().inputs)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if config.print_tree {
        TreeDump::new(&analysis.tree).write_to(&mut out)?;
    }

    let code = match &cli.command {
        Commands::Groups(args) => report_groups(&analysis, args.output, color, &mut out)?,
        Commands::Prune(args) => {
            let script_type = args.script_type.map_or_else(ScriptType::detect, ScriptType::from);
            report_deletions(&mut analysis, args.output, script_type, color, &mut out)?
        }
        Commands::Config(_) => ExitCode::Success,
    };
    out.flush()?;
    Ok(code)
}

fn report_groups<W: Write>(
    analysis: &Analysis,
    format: GroupsFormat,
    color: bool,
    out: &mut W,
) -> Result<ExitCode> {
    let summary = &analysis.summary;
    let code = ExitCode::for_outcome(analysis.has_duplicates(), summary.parse_errors);

    match format {
        GroupsFormat::Text => TextOutput::new(color).write_groups(out, &analysis.groups)?,
        GroupsFormat::Json => JsonOutput::new(&analysis.groups, summary, code).write_to(out, true)?,
        GroupsFormat::Csv => CsvOutput::new(&analysis.groups).write_to(out)?,
    }

    log::info!(
        "{} groups, {} reclaimable of {} listed",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.total_size_display()
    );
    Ok(code)
}

fn report_deletions<W: Write>(
    analysis: &mut Analysis,
    format: PruneFormat,
    script_type: ScriptType,
    color: bool,
    out: &mut W,
) -> Result<ExitCode> {
    let plan = analysis.plan_deletions();
    let summary = &analysis.summary;
    let code = ExitCode::for_outcome(!plan.is_empty(), summary.parse_errors);

    match format {
        PruneFormat::Text => TextOutput::new(color).write_deletions(out, &plan)?,
        PruneFormat::Json => JsonDeletionOutput::new(&plan, summary, code).write_to(out, true)?,
        PruneFormat::Csv => output::csv::write_deletions(&plan, &mut *out)?,
        PruneFormat::Script => ScriptOutput::new(&plan, script_type).write_to(out)?,
    }

    log::info!(
        "{} deletion candidates, {} reclaimable",
        plan.len(),
        bytesize::ByteSize::b(plan.total_bytes())
    );
    Ok(code)
}
