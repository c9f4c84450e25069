//! CLI tool for treesnap snapshot operations.

mod commands;
mod exit_codes;
mod progress;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::CreateConfig;

/// Directory tree snapshots as a single plain-text file
#[derive(Parser)]
#[command(name = "treesnap")]
#[command(author, version, about = "Directory tree snapshots as a single plain-text file", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a snapshot container from a directory (alias: c)
    #[command(alias = "c")]
    Create {
        /// Source directory to capture
        source: PathBuf,

        /// Output container path (default: snapshot_<name>.txt next to the source)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Store the body as readable records instead of compressing
        #[arg(long)]
        no_compress: bool,

        /// Overwrite the output path instead of picking a fresh name
        #[arg(long)]
        force: bool,
    },

    /// Restore a snapshot container into a directory (alias: r)
    #[command(alias = "r")]
    Restore {
        /// Container file to restore
        container: PathBuf,

        /// Directory to restore into
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,
    },

    /// Verify a snapshot container (alias: v)
    #[command(alias = "v")]
    Verify {
        /// Container file to verify
        container: PathBuf,

        /// Decode every entry instead of just the container layers
        #[arg(long)]
        full: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Create {
            source,
            output,
            no_compress,
            force,
        } => commands::create(CreateConfig {
            source,
            output,
            no_compress,
            force,
            quiet: cli.quiet,
        }),
        Commands::Restore { container, output } => {
            commands::restore(&container, &output, cli.quiet)
        }
        Commands::Verify { container, full } => commands::verify(&container, full, cli.quiet),
    };

    process::exit(exit_code.code());
}
