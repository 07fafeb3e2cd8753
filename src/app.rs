//! The command-line caller of the deletion engine.
//!
//! Everything here happens around the engine, not inside it: validating the
//! selection, asking for confirmation, wiring Ctrl+C to cancellation, running
//! the erasure on a worker thread, and turning the outcome into an exit code.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::Level;
use thiserror::Error;

use crate::cli::{Cli, Commands, EraseArgs};
use crate::config::Config;
use crate::erase::{worker, DeletionEngine, ErasureEvent, ErasureRequest, Outcome, ProgressSink, Strategy};
use crate::error::{ExitCode, StructuredError};
use crate::logging::init_logging;
use crate::oplog::{FileLog, OperationLog};
use crate::progress::Progress;
use crate::signal::install_handler;

/// A selection that cannot be turned into an erasure request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No target path was given.
    #[error("No file selected.")]
    NoFileSelected,

    /// Neither deletion method was chosen.
    #[error("Please select a valid deletion method.")]
    NoMethodSelected,

    /// The target is a directory.
    #[error("{0} is a directory; only single files can be erased")]
    IsDirectory(PathBuf),
}

/// Validate the operator's selection.
///
/// Runs before anything touches the filesystem: a request is only built
/// when both a path and a strategy were chosen and the path is not a
/// directory.
///
/// # Errors
///
/// Returns the first [`RequestError`] that applies.
pub fn build_request(
    path: Option<PathBuf>,
    strategy: Option<Strategy>,
) -> Result<ErasureRequest, RequestError> {
    let path = path.ok_or(RequestError::NoFileSelected)?;
    let strategy = strategy.ok_or(RequestError::NoMethodSelected)?;
    if path.is_dir() {
        return Err(RequestError::IsDirectory(path));
    }
    Ok(ErasureRequest::new(path, strategy))
}

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid selections, configuration or log problems,
/// and worker start-up failures. Erasure failures are not errors here: they
/// are reported and mapped to [`ExitCode::ErasureFailed`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);

    let mut config = match cli.config {
        Some(ref path) => Config::load_from_path(path),
        None => Config::load(),
    };
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Erase(ref args) => run_erase(&cli, args, &config),
    }
}

fn run_erase(cli: &Cli, args: &EraseArgs, config: &Config) -> Result<ExitCode> {
    let strategy = args.method.or(config.default_method).map(Strategy::from);
    let request = build_request(args.path.clone(), strategy)?;

    let stdin = io::stdin();
    if config.confirm && !stdin.is_terminal() {
        bail!("Refusing to erase without confirmation in non-interactive mode; pass --yes");
    }
    erase_with_prompt(cli, config, request, &mut stdin.lock(), &mut io::stderr())
}

/// Confirm through `input`/`output` when required, then run the erasure.
fn erase_with_prompt<R: BufRead, W: Write>(
    cli: &Cli,
    config: &Config,
    request: ErasureRequest,
    input: &mut R,
    output: &mut W,
) -> Result<ExitCode> {
    let oplog = Arc::new(FileLog::open(&config.log_file).with_context(|| {
        format!(
            "Failed to open operational log {}",
            config.log_file.display()
        )
    })?);

    if config.confirm && !confirm(&request, input, output)? {
        oplog.append(
            Level::Info,
            &format!("User cancelled the deletion of {}", request.path.display()),
        );
        if !cli.quiet {
            println!("Deletion cancelled. The file was not deleted.");
        }
        return Ok(ExitCode::Success);
    }

    let shutdown = install_handler()?;
    let engine = Arc::new(
        DeletionEngine::new(oplog)
            .with_config(config.engine_config())
            .with_cancel_flag(shutdown.get_flag()),
    );

    let progress = Progress::with_accessible(cli.quiet, cli.no_color);
    progress.start(&request.path.display().to_string(), request.strategy.label());

    let handle = worker::spawn(engine, request).context("Failed to start erasure worker")?;
    let outcome = handle.wait_with(|event| match event {
        ErasureEvent::Progress(update) => progress.on_progress(*update),
        ErasureEvent::Finished(outcome) => progress.on_outcome(outcome),
    });

    let code = ExitCode::from_outcome(&outcome, shutdown.is_shutdown_requested());
    report(cli, &outcome, code);
    Ok(code)
}

/// Ask the operator to confirm. End of input counts as "no".
fn confirm<R: BufRead, W: Write>(
    request: &ErasureRequest,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(
        output,
        "Are you sure you want to delete {} ({})? [y/N] ",
        request.path.display(),
        request.strategy
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn report(cli: &Cli, outcome: &Outcome, code: ExitCode) {
    match outcome {
        Outcome::Success => {
            if !cli.quiet {
                println!("{outcome}");
            }
        }
        _ if cli.json_errors => {
            let structured = StructuredError::from_outcome(outcome, code);
            match serde_json::to_string_pretty(&structured) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("[{}] Error: {}", code.code_prefix(), outcome),
            }
        }
        _ => eprintln!("[{}] Error: {}", code.code_prefix(), outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    /// Cli and merged config for a prompted erase of `target` inside `dir`.
    fn prompted(dir: &TempDir, target: &std::path::Path, method: &str) -> (Cli, Config) {
        let log = dir.path().join("wipefinity.log");
        let config_file = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "wipefinity".to_string(),
            "--quiet".to_string(),
            "--config".to_string(),
            config_file.display().to_string(),
            "--log-file".to_string(),
            log.display().to_string(),
            "erase".to_string(),
            target.display().to_string(),
            "--method".to_string(),
            method.to_string(),
        ])
        .unwrap();
        let mut config = Config::load_from_path(&config_file);
        config.merge_cli(&cli);
        (cli, config)
    }

    #[test]
    fn test_build_request_requires_path() {
        let result = build_request(None, Some(Strategy::StandardDelete));
        assert_eq!(result, Err(RequestError::NoFileSelected));
    }

    #[test]
    fn test_build_request_requires_method() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keep.txt");
        std::fs::write(&path, b"data").unwrap();

        let result = build_request(Some(path.clone()), None);
        assert_eq!(result, Err(RequestError::NoMethodSelected));
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }

    #[test]
    fn test_build_request_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let result = build_request(Some(dir.path().to_path_buf()), Some(Strategy::SecureOverwrite));
        assert!(matches!(result, Err(RequestError::IsDirectory(_))));
    }

    #[test]
    fn test_build_request_accepts_missing_file() {
        // Existence is the engine's concern; it reports FileNotFound
        let request = build_request(
            Some(PathBuf::from("/nonexistent/file.txt")),
            Some(Strategy::StandardDelete),
        )
        .unwrap();
        assert_eq!(request.strategy, Strategy::StandardDelete);
    }

    #[test]
    fn test_declined_prompt_keeps_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("keep.txt");
        std::fs::write(&target, b"precious").unwrap();
        let (cli, config) = prompted(&dir, &target, "secure");
        assert!(config.confirm);

        let request = ErasureRequest::secure(&target);
        let mut prompt = Vec::new();
        let code =
            erase_with_prompt(&cli, &config, request, &mut "n\n".as_bytes(), &mut prompt).unwrap();

        assert_eq!(code, ExitCode::Success);
        assert_eq!(std::fs::read(&target).unwrap(), b"precious");
        assert!(String::from_utf8(prompt).unwrap().contains("[y/N]"));
        let log = std::fs::read_to_string(dir.path().join("wipefinity.log")).unwrap();
        assert!(log.contains(&format!(
            "INFO - User cancelled the deletion of {}",
            target.display()
        )));
    }

    #[test]
    fn test_empty_answer_declines() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("keep.txt");
        std::fs::write(&target, b"precious").unwrap();
        let (cli, config) = prompted(&dir, &target, "standard");

        let request = ErasureRequest::standard(&target);
        let code =
            erase_with_prompt(&cli, &config, request, &mut "".as_bytes(), &mut Vec::new()).unwrap();

        assert_eq!(code, ExitCode::Success);
        assert!(target.exists());
    }

    #[test]
    fn test_confirmed_prompt_erases_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("gone.txt");
        std::fs::write(&target, b"bye").unwrap();
        let (cli, config) = prompted(&dir, &target, "secure");

        let request = ErasureRequest::secure(&target);
        let code =
            erase_with_prompt(&cli, &config, request, &mut "y\n".as_bytes(), &mut Vec::new()).unwrap();

        assert_eq!(code, ExitCode::Success);
        assert!(!target.exists());
        let log = std::fs::read_to_string(dir.path().join("wipefinity.log")).unwrap();
        assert!(log.contains("Securely overwritten and deleted file:"));
        assert!(!log.contains("User cancelled"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }
}
