//! Diagnostic logging for Wipefinity.
//!
//! Diagnostics use the `log` facade with an `env_logger` backend and go to
//! stderr. This is separate from the operational log in [`crate::oplog`],
//! which records erasure outcomes to a file.
//!
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: warn, so the progress bar is not interleaved with info lines
//!
//! ```rust,no_run
//! use wipefinity::logging::init_logging;
//!
//! init_logging(1, false); // -v
//! log::debug!("Debug info here");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Returns `false` if a logger was already installed (the existing one stays
/// active), which makes repeated calls from tests harmless.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let use_env = env::var("RUST_LOG").is_ok();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }
    configure_format(&mut builder, verbose);

    let installed = builder.try_init().is_ok();
    if installed {
        if use_env {
            log::debug!(
                "Logging initialized from RUST_LOG: {:?}",
                env::var("RUST_LOG").ok()
            );
        } else {
            log::debug!("Logging initialized at level: {:?}", level);
        }
    }
    installed
}

/// Determine the log level from CLI flags.
///
/// # Priority
///
/// 1. `quiet`: Error level
/// 2. `verbose >= 2`: Trace level
/// 3. `verbose == 1`: Debug level
/// 4. Otherwise: Warn level
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Debug builds and `-vv` include timestamps and module paths.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let detailed = cfg!(debug_assertions) || verbose >= 2;

    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if detailed {
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                buf.timestamp_millis(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        }
    });
}
