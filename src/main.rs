//! # Bookpack: The Main Entry Point
//!
//! This module handles Command Line Interface (CLI) parsing, logging
//! initialization, and dispatching commands to the appropriate sub-modules.
//!
//! Running the binary with no arguments at all performs a build with the
//! standard job — the tool replaces a double-clickable script, and that
//! zero-argument contract is preserved.

use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use simplelog::{Config, SimpleLogger};

mod discovery;
mod invariant_ppt;
mod invoker;
mod job;
mod system;

use invoker::BuildOptions;

/// The primary Command Line Interface (CLI) configuration.
///
/// Uses `clap` for sub-command parsing and help generation.
#[derive(Parser)]
#[command(name = "bookpack")]
#[command(about = "Packages the book dashboard into a standalone executable", long_about = None)]
struct Cli {
    /// The sub-command to execute (build, doctor, clean).
    #[command(subcommand)]
    command: Option<Commands>,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Available sub-commands for the bookpack utility.
#[derive(Subcommand)]
enum Commands {
    /// Run the packaging invocation (the default when no command is given).
    ///
    /// Invokes PyInstaller with:
    /// 1. Single-file output.
    /// 2. No console window at runtime.
    /// 3. The logo bundled into the output root.
    /// 4. The icon attached to the executable.
    Build {
        /// Dry run: print the exact command line, invoke nothing.
        ///
        /// Useful for auditing what bookpack *would* run without waiting
        /// for a full packaging pass.
        #[arg(long)]
        dry_run: bool,

        /// Omit the icon option.
        ///
        /// PyInstaller aborts when the icon file is missing; use this when
        /// there is no `logo.ico` next to the script.
        #[arg(long)]
        no_icon: bool,

        /// Skip the final "Press Enter to exit" pause.
        ///
        /// For running from scripts or CI rather than a double-click.
        #[arg(long)]
        no_pause: bool,
    },
    /// Check the working directory and report what a build would find.
    ///
    /// Checks for:
    /// - The entry point, icon, and asset files.
    /// - A resolvable PyInstaller executable.
    /// - Leftover artifacts from previous builds.
    Doctor,
    /// Remove the packager's intermediate artifacts.
    ///
    /// Deletes the `build/` directory and the generated `.spec` file.
    /// The `dist/` output is left in place.
    Clean,
}

fn main() {
    let cli = Cli::parse();

    // Determine log level based on verbosity flag
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // Initialize logger
    // We ignore the result here as logging failure shouldn't crash the startup
    let _ = SimpleLogger::init(log_level, Config::default());

    match &cli.command {
        Some(Commands::Build { dry_run, no_icon, no_pause }) => {
            let opts = BuildOptions {
                dry_run: *dry_run,
                no_icon: *no_icon,
                no_pause: *no_pause,
            };
            run_build_command(&opts);
        }
        Some(Commands::Doctor) => {
            if let Err(e) = invoker::doctor() {
                error!("Doctor check failed: {}", e);
            }
        }
        Some(Commands::Clean) => {
            if let Err(e) = invoker::clean() {
                error!("Clean failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            // No command: build with the standard job, like the original
            // double-clickable script did.
            run_build_command(&BuildOptions::default());
        }
    }
}

fn run_build_command(opts: &BuildOptions) {
    if let Err(e) = invoker::build(opts) {
        // The human-readable message was already printed before the pause;
        // this is the log-level record plus a failing exit code.
        error!("Build did not complete: {}", e);
        std::process::exit(1);
    }
}
