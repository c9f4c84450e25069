//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};
use std::time::Instant;

use console::style;
use treesnap::fs::{default_container_name, unique_output_path};
use treesnap::progress::{format_bytes_iec, format_duration};
use treesnap::{VerifyMode, WriteOptions, create_snapshot, restore_snapshot, verify_snapshot};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::progress::CliProgress;

/// Configuration for the create command
pub struct CreateConfig {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub no_compress: bool,
    pub force: bool,
    pub quiet: bool,
}

pub fn create(config: CreateConfig) -> ExitCode {
    let started = Instant::now();
    let compressed = !config.no_compress;
    let output = config
        .output
        .unwrap_or_else(|| default_container_name(&config.source, compressed));
    let output = if config.force {
        output
    } else {
        unique_output_path(&output)
    };

    let options = WriteOptions::new().compressed(compressed);
    let mut progress = CliProgress::new(config.quiet);
    let result = match create_snapshot(&config.source, &output, &options, &mut progress) {
        Ok(result) => result,
        Err(e) => {
            progress.clear();
            eprintln!("{} {}", style("error:").red().bold(), e);
            return error_to_exit_code(&e);
        }
    };
    progress.finish_with_message("done");

    if !config.quiet {
        println!(
            "{} {} ({} files, {} empty directories, {})",
            style("Created").green().bold(),
            output.display(),
            result.entries_written,
            result.directories_written,
            format_duration(started.elapsed())
        );
        if let Some(algorithm) = result.algorithm {
            println!(
                "  {} -> {} via {} ({:.1}% saved)",
                format_bytes_iec(result.total_size),
                format_bytes_iec(result.container_size),
                algorithm,
                result.space_savings() * 100.0
            );
        }
        for warning in &result.warnings {
            eprintln!("  {} {}", style("skipped:").yellow(), warning);
        }
    }

    if result.entries_written + result.directories_written == 0 && result.entries_skipped > 0 {
        eprintln!(
            "{} nothing could be captured",
            style("error:").red().bold()
        );
        return ExitCode::FatalError;
    }
    if result.entries_skipped > 0 {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

pub fn restore(container: &Path, output: &Path, quiet: bool) -> ExitCode {
    let mut progress = CliProgress::new(quiet);
    let report = match restore_snapshot(container, output, &mut progress) {
        Ok(report) => report,
        Err(e) => {
            progress.clear();
            eprintln!("{} {}", style("error:").red().bold(), e);
            return error_to_exit_code(&e);
        }
    };
    progress.finish_with_message("done");

    if !quiet {
        println!(
            "{} {} files, {} directories into {}",
            style("Restored").green().bold(),
            report.files_written,
            report.directories_created,
            output.display()
        );
        for (entry, reason) in &report.failures {
            eprintln!("  {} {}: {}", style("failed:").red(), entry, reason);
        }
    }

    if report.entries_restored() == 0 && report.entries_failed > 0 {
        ExitCode::BadContainer
    } else if report.entries_failed > 0 {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

pub fn verify(container: &Path, full: bool, quiet: bool) -> ExitCode {
    let mode = if full {
        VerifyMode::Full
    } else {
        VerifyMode::Quick
    };
    let report = match verify_snapshot(container, mode) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            return error_to_exit_code(&e);
        }
    };

    if report.ok {
        if !quiet {
            if full {
                println!(
                    "{} ({} entries checked)",
                    style("OK").green().bold(),
                    report.entries_checked
                );
            } else {
                println!("{}", style("OK").green().bold());
            }
        }
        ExitCode::Success
    } else {
        for problem in &report.problems {
            eprintln!("{} {}", style("problem:").red(), problem);
        }
        ExitCode::BadContainer
    }
}
