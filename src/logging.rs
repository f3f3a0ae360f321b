//! Logging setup.
//!
//! Diagnostics go through the `log` facade to an `env_logger` backend on
//! stderr, so reports on stdout stay clean for piping. The level comes from
//! `RUST_LOG` when it is set, otherwise from the command-line flags:
//!
//! | flags  | level |
//! |--------|-------|
//! | `-q`   | error |
//! | none   | info  |
//! | `-v`   | debug |
//! | `-vv`  | trace |
//!
//! Phase messages ("building tree", "grouping directories (equal)", ...)
//! are logged at info, fixpoint pass numbers and arena statistics at debug,
//! skipped listing lines at error so they show even with `-q`.
//!
//! ```rust,no_run
//! finddup::logging::init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initialize the logger. Call once, before any log output.
///
/// A second call is ignored with a debug message.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = std::env::var_os("RUST_LOG").is_some();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }
    log::debug!(
        "Logging at {} ({})",
        log::max_level(),
        if from_env { "RUST_LOG" } else { "flags" }
    );
}

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Debug builds add a timestamp, and the module path from `-v` on.
/// Release builds print level and message only.
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        let timestamp = buf.timestamp_seconds();
        if verbose > 0 {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} [{}] {}",
                record.level(),
                record.module_path().unwrap_or("?"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} {}",
                record.level(),
                record.args()
            )
        }
    });

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
        });
    }
}
