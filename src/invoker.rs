//! # Invoker Logic
//!
//! This module contains the core business logic for bookpack. It is responsible for:
//! 1. Orchestrating the packaging invocation (`build` / `run_build`).
//! 2. Reporting the outcome to the operator and recording it to disk.
//! 3. The `doctor` preflight report.
//! 4. Cleaning up the packager's intermediate artifacts (`clean`).
//!
//! The packager itself is reached only through the `SystemOps` seam, so the
//! whole flow is testable without PyInstaller installed.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;
use crate::discovery;
use crate::job::{self, PackagingJob};
use crate::system::{PackagerExit, RealSystem, SystemOps};

/// Switches accepted by the `build` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Print the exact command line, invoke nothing.
    pub dry_run: bool,
    /// Omit the icon option (for when `logo.ico` is not present).
    pub no_icon: bool,
    /// Skip the final wait-for-Enter (non-interactive use).
    pub no_pause: bool,
}

/// What one invocation looked like and how it ended. Written as JSON next to
/// the user's other local app data after every real build.
#[derive(Debug, Serialize)]
struct BuildReport {
    program: String,
    args: Vec<String>,
    exit_code: Option<i32>,
    success: bool,
}

/// The main entry point for the build logic.
///
/// Resolves the packager executable, composes the standard job, and runs it.
/// Returns an error if the packager could not be spawned or exited non-zero.
pub fn build(opts: &BuildOptions) -> Result<()> {
    let system = RealSystem;

    let mut packaging = PackagingJob::standard();
    if opts.no_icon {
        packaging.icon = None;
    }

    let program = discovery::find_packager(&system);
    let report_path = if opts.dry_run { None } else { report_path() };

    run_build(&packaging, &program, &system, opts, report_path.as_deref())
}

/// Core logic for one packaging invocation, decoupled from the concrete
/// System for testing.
///
/// Invocation order is fixed: spawn the packager, record the report, print a
/// success or failure message depending on the exit status, then pause for
/// the operator on *both* branches so a double-clicked console window never
/// vanishes before the output can be read.
pub fn run_build(
    packaging: &PackagingJob,
    program: &str,
    system: &impl SystemOps,
    opts: &BuildOptions,
    report_path: Option<&Path>,
) -> Result<()> {
    let args = packaging.args();

    if opts.dry_run {
        println!("--- DRY RUN: nothing will be invoked ---");
        println!("{} {}", program, args.join(" "));
        return Ok(());
    }

    info!("Packaging '{}' with {}", packaging.entry_point, program);
    let outcome = system.run_packager(program, &args);

    if let Some(path) = report_path {
        write_report(system, path, program, &args, &outcome);
    }

    let result = match &outcome {
        Ok(exit) if exit.success() => {
            println!();
            println!(
                "Build finished. Your executable is in the '{}' folder.",
                job::DIST_DIR
            );
            Ok(())
        }
        Ok(exit) => {
            println!();
            println!(
                "Build FAILED ({}). Scroll up for the packager's own error output.",
                describe_exit(exit)
            );
            Err(anyhow!("packager {}", describe_exit(exit)))
        }
        Err(e) => {
            println!();
            println!("Could not start the packager: {}", e);
            println!("Is PyInstaller installed? Try: pip install pyinstaller");
            Err(anyhow!("could not start the packager: {}", e))
        }
    };

    if !opts.no_pause {
        // The pause is courtesy, not contract: ignore stdin errors.
        let _ = system.wait_for_acknowledgment();
    }

    result
}

fn describe_exit(exit: &PackagerExit) -> String {
    match exit.code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Where the build report lives: `%LOCALAPPDATA%\bookpack\last-build.json`
/// (or the XDG equivalent). `None` if the directory cannot be prepared; a
/// missing report never blocks a build.
fn report_path() -> Option<PathBuf> {
    let base_dirs = directories::BaseDirs::new()?;
    let dir = base_dirs.data_local_dir().join("bookpack");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("Failed to create report directory at {:?}: {}", dir, e);
        return None;
    }
    Some(dir.join("last-build.json"))
}

fn write_report(
    system: &impl SystemOps,
    path: &Path,
    program: &str,
    args: &[String],
    outcome: &Result<PackagerExit>,
) {
    let report = BuildReport {
        program: program.to_string(),
        args: args.to_vec(),
        exit_code: outcome.as_ref().ok().and_then(|e| e.code),
        success: outcome.as_ref().map(|e| e.success()).unwrap_or(false),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            if let Err(e) = system.write_report_file(path, &json) {
                warn!("Failed to write build report to {:?}: {}", path, e);
            } else {
                info!("Recorded build report at {:?}", path);
            }
        }
        Err(e) => warn!("Failed to serialize build report: {}", e),
    }
}

/// Runs a preflight check and reports what a build would find.
///
/// This does not modify anything.
pub fn doctor() -> Result<()> {
    let system = RealSystem;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                  Packaging Preflight Report");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    // 1. Input files in the working directory
    println!("INPUT FILES (expected in the current directory):");
    let mut missing = 0;
    for (file, role, hint) in [
        (job::ENTRY_POINT, "entry point", None),
        (job::ICON_FILE, "icon", Some("use 'bookpack build --no-icon' to skip it")),
        (job::ASSET_FILE, "bundled asset", None),
    ] {
        if system.path_exists(Path::new(file)) {
            println!("  ✓ {} ({})", file, role);
        } else {
            missing += 1;
            match hint {
                Some(h) => println!("  ⚠ {} ({}) is missing — {}", file, role, h),
                None => println!("  ⚠ {} ({}) is missing", file, role),
            }
        }
    }

    // 2. Packager resolution
    println!();
    println!("PACKAGER:");
    let program = discovery::find_packager(&system);
    let resolved = program != "pyinstaller";
    if resolved {
        println!("  ✓ Found PyInstaller at {}", program);
    } else {
        println!("  ⚠ PyInstaller was not found on PATH or the usual install");
        println!("    locations. Install it with: pip install pyinstaller");
    }

    // 3. Leftovers from previous builds
    println!();
    println!("PREVIOUS BUILD ARTIFACTS:");
    for (dir, what) in [
        (job::DIST_DIR, "output from a previous build"),
        (job::WORK_DIR, "intermediates (run 'bookpack clean' to remove)"),
    ] {
        let path = Path::new(dir);
        if path.is_dir() {
            println!("  - '{}' exists: {} ({} KiB)", dir, what, dir_size(path) / 1024);
        } else {
            println!("  - '{}' not present", dir);
        }
    }

    // 4. Summary
    println!();
    println!("───────────────────────────────────────────────────────────────");
    println!();
    if missing == 0 && resolved {
        println!("✓ Ready to build. Run 'bookpack' to package the dashboard.");
    } else {
        println!("Fix the issues above, then run 'bookpack'.");
        println!("(A build will still be attempted as-is; the packager reports");
        println!("its own errors for anything missing.)");
    }
    println!();

    Ok(())
}

/// Deletes the packager's intermediate artifacts: the `build/` directory and
/// the generated `.spec` file. The `dist/` output is left alone.
pub fn clean() -> Result<()> {
    let mut reclaimed: u64 = 0;

    let work = Path::new(job::WORK_DIR);
    if work.is_dir() {
        reclaimed += dir_size(work);
        std::fs::remove_dir_all(work)
            .with_context(|| format!("failed to remove '{}'", job::WORK_DIR))?;
        info!("Removed '{}' intermediates", job::WORK_DIR);
    }

    let spec_file = generated_spec_file();
    let spec_path = Path::new(&spec_file);
    if spec_path.is_file() {
        if let Ok(meta) = spec_path.metadata() {
            reclaimed += meta.len();
        }
        std::fs::remove_file(spec_path)
            .with_context(|| format!("failed to remove '{}'", spec_file))?;
        info!("Removed generated '{}'", spec_file);
    }

    if reclaimed == 0 {
        println!("Nothing to clean.");
    } else {
        println!("Cleaned up {} KiB of intermediate artifacts.", reclaimed / 1024);
    }

    Ok(())
}

/// PyInstaller drops a build recipe named after the entry script.
fn generated_spec_file() -> String {
    let stem = Path::new(job::ENTRY_POINT)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| job::ENTRY_POINT.to_string());
    format!("{}.spec", stem)
}

/// Total size in bytes of every file under `dir`.
fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariant_ppt::{clear_invariant_log, contract_test};
    use crate::system::MockSystem;

    fn standard() -> PackagingJob {
        PackagingJob::standard()
    }

    #[test]
    fn successful_build_invokes_packager_and_pauses() {
        clear_invariant_log();
        let system = MockSystem::new();

        let result = run_build(
            &standard(),
            "pyinstaller",
            &system,
            &BuildOptions::default(),
            None,
        );

        assert!(result.is_ok());

        let calls = system.invocations.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "pyinstaller");
        assert_eq!(calls[0].1.last().map(String::as_str), Some(job::ENTRY_POINT));

        assert!(*system.acknowledged.lock().unwrap());

        contract_test("build", &["Packager arguments must end with the entry point"]);
    }

    #[test]
    fn failing_packager_surfaces_an_error_but_still_pauses() {
        let system = MockSystem::exiting_with(1);

        let result = run_build(
            &standard(),
            "pyinstaller",
            &system,
            &BuildOptions::default(),
            None,
        );

        assert!(result.is_err());
        assert!(*system.acknowledged.lock().unwrap());
    }

    #[test]
    fn missing_packager_surfaces_an_error_but_still_pauses() {
        let system = MockSystem::without_packager();

        let result = run_build(
            &standard(),
            "pyinstaller",
            &system,
            &BuildOptions::default(),
            None,
        );

        assert!(result.is_err());
        assert!(system.invocations.lock().unwrap().is_empty());
        assert!(*system.acknowledged.lock().unwrap());
    }

    #[test]
    fn dry_run_invokes_nothing() {
        let system = MockSystem::new();
        let opts = BuildOptions { dry_run: true, ..Default::default() };

        let result = run_build(&standard(), "pyinstaller", &system, &opts, None);

        assert!(result.is_ok());
        assert!(system.invocations.lock().unwrap().is_empty());
        assert!(system.reports.lock().unwrap().is_empty());
        assert!(!*system.acknowledged.lock().unwrap());
    }

    #[test]
    fn no_pause_skips_the_acknowledgment() {
        let system = MockSystem::new();
        let opts = BuildOptions { no_pause: true, ..Default::default() };

        let result = run_build(&standard(), "pyinstaller", &system, &opts, None);

        assert!(result.is_ok());
        assert!(!*system.acknowledged.lock().unwrap());
    }

    #[test]
    fn report_records_the_outcome() {
        let system = MockSystem::exiting_with(2);
        let report = PathBuf::from("mock/last-build.json");

        let _ = run_build(
            &standard(),
            "pyinstaller",
            &system,
            &BuildOptions::default(),
            Some(report.as_path()),
        );

        let reports = system.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, report);

        let parsed: serde_json::Value =
            serde_json::from_str(&reports[0].1).expect("report must be valid JSON");
        assert_eq!(parsed["success"], serde_json::Value::Bool(false));
        assert_eq!(parsed["exit_code"], serde_json::json!(2));
        assert_eq!(parsed["program"], serde_json::json!("pyinstaller"));
    }

    #[test]
    fn repeated_builds_send_identical_arguments() {
        let system = MockSystem::new();
        let opts = BuildOptions::default();

        let _ = run_build(&standard(), "pyinstaller", &system, &opts, None);
        let _ = run_build(&standard(), "pyinstaller", &system, &opts, None);

        let calls = system.invocations.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn generated_spec_file_is_named_after_the_entry_script() {
        assert_eq!(generated_spec_file(), "book_dashboard.spec");
    }
}
