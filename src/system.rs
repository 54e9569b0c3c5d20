use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::{Context, Result};

/// Abstraction for process and file-system interactions.
/// This allows us to mock the packager invocation (and the blocking
/// wait-for-Enter pause) for testing.
pub trait SystemOps {
    /// Spawn the packager with the given arguments and block until it exits.
    ///
    /// The packager's own stdout/stderr pass straight through to the console;
    /// its diagnostics are the only error reporting the operator gets.
    /// `Err` means the process could not be spawned at all.
    fn run_packager(&self, program: &str, args: &[String]) -> Result<PackagerExit>;

    /// Check if a path exists on the file system.
    fn path_exists(&self, path: &Path) -> bool;

    /// Write the build report to disk.
    fn write_report_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Block until the operator presses Enter.
    ///
    /// Keeps a double-clicked console window open long enough to read the
    /// packager output.
    fn wait_for_acknowledgment(&self) -> Result<()>;
}

/// How the packager process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackagerExit {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl PackagerExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The Real System implementation (Production).
pub struct RealSystem;

impl SystemOps for RealSystem {
    fn run_packager(&self, program: &str, args: &[String]) -> Result<PackagerExit> {
        let status = std::process::Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("failed to spawn '{}'", program))?;
        Ok(PackagerExit { code: status.code() })
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_report_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut f = std::fs::File::create(path)?;
        f.write_all(content.as_bytes())?;
        Ok(())
    }

    fn wait_for_acknowledgment(&self) -> Result<()> {
        print!("Press Enter to exit...");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(())
    }
}

/// A Mock System for Testing.
#[derive(Debug)]
pub struct MockSystem {
    /// Every `(program, args)` pair handed to `run_packager`, in order.
    pub invocations: Mutex<Vec<(String, Vec<String>)>>,
    /// Exit code the mocked packager reports.
    pub exit_code: Mutex<Option<i32>>,
    /// When set, `run_packager` errors as if the binary were not installed.
    pub spawn_fails: Mutex<bool>,
    /// Paths the mock considers present on disk.
    pub file_system: Mutex<Vec<PathBuf>>,
    /// Every report written, as `(path, content)`.
    pub reports: Mutex<Vec<(PathBuf, String)>>,
    /// Whether the operator pause was requested.
    pub acknowledged: Mutex<bool>,
}

impl Default for MockSystem {
    fn default() -> Self {
        MockSystem {
            invocations: Mutex::new(Vec::new()),
            exit_code: Mutex::new(Some(0)),
            spawn_fails: Mutex::new(false),
            file_system: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
            acknowledged: Mutex::new(false),
        }
    }
}

impl MockSystem {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose packager exits with the given code.
    #[allow(dead_code)]
    pub fn exiting_with(code: i32) -> Self {
        let mock = Self::default();
        *mock.exit_code.lock().unwrap() = Some(code);
        mock
    }

    /// A mock whose packager cannot be spawned at all.
    #[allow(dead_code)]
    pub fn without_packager() -> Self {
        let mock = Self::default();
        *mock.spawn_fails.lock().unwrap() = true;
        mock
    }
}

impl SystemOps for MockSystem {
    fn run_packager(&self, program: &str, args: &[String]) -> Result<PackagerExit> {
        if *self.spawn_fails.lock().unwrap() {
            anyhow::bail!("failed to spawn '{}'", program);
        }
        let mut calls = self.invocations.lock().unwrap();
        calls.push((program.to_string(), args.to_vec()));
        Ok(PackagerExit { code: *self.exit_code.lock().unwrap() })
    }

    fn path_exists(&self, path: &Path) -> bool {
        let fs = self.file_system.lock().unwrap();
        fs.contains(&path.to_path_buf())
    }

    fn write_report_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut reports = self.reports.lock().unwrap();
        reports.push((path.to_path_buf(), content.to_string()));
        Ok(())
    }

    fn wait_for_acknowledgment(&self) -> Result<()> {
        let mut acked = self.acknowledged.lock().unwrap();
        *acked = true;
        Ok(())
    }
}
