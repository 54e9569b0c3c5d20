//! # Discovery Module
//!
//! Locates the packager executable before the build runs. The original
//! workflow just typed `pyinstaller` and hoped the shell would find it;
//! pip user-installs routinely land in directories that never make it onto
//! PATH, so we probe the usual suspects ourselves.
//!
//! ## Probe order
//!
//! 1.  **Current PATH**: whatever the shell would have resolved anyway.
//! 2.  **Local user bin**: `~/.local/bin`, where `pip install --user` puts
//!     console scripts on Unix.
//! 3.  **Python Scripts dirs**: per-user `Python\PythonXY\Scripts` folders
//!     under the roaming data dir, the Windows equivalent.
//!
//! Discovery never fails a build: if every probe misses, the bare program
//! name is returned and the spawn error (if any) surfaces to the operator.

use std::path::PathBuf;
use log::debug;
use walkdir::WalkDir;
use crate::system::SystemOps;

/// Executable name for this platform.
fn packager_exe() -> &'static str {
    if cfg!(windows) { "pyinstaller.exe" } else { "pyinstaller" }
}

/// Resolves the program to spawn for the packaging invocation.
///
/// Returns the first probe hit as an absolute path string, or the bare
/// `pyinstaller` name when nothing was found.
pub fn find_packager(system: &impl SystemOps) -> String {
    let candidates = candidate_dirs();
    match first_hit(&candidates, system) {
        Some(path) => {
            debug!("Resolved packager at {:?}", path);
            path.to_string_lossy().to_string()
        }
        None => {
            debug!("No packager found by probing; falling back to bare name");
            "pyinstaller".to_string()
        }
    }
}

/// Checks each candidate directory for the packager executable, in order.
pub fn first_hit(candidates: &[PathBuf], system: &impl SystemOps) -> Option<PathBuf> {
    for dir in candidates {
        let exe = dir.join(packager_exe());
        if system.path_exists(&exe) {
            return Some(exe);
        }
    }
    None
}

/// Collects the directories worth probing, most authoritative first.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // 1. The shell's own search path
    if let Some(path_var) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path_var).filter(|p| !p.as_os_str().is_empty()));
    }

    if let Some(user_dirs) = directories::UserDirs::new() {
        // 2. pip --user console scripts (Unix convention)
        dirs.push(user_dirs.home_dir().join(".local").join("bin"));
    }

    // 3. Per-user Python Scripts folders (Windows convention).
    // Shallow walk: Python\Python311\Scripts is two levels down.
    if let Some(base_dirs) = directories::BaseDirs::new() {
        let python_root = base_dirs.data_dir().join("Python");
        if python_root.exists() {
            for entry in WalkDir::new(&python_root)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let scripts = entry.path().join("Scripts");
                if scripts.is_dir() {
                    dirs.push(scripts);
                }
            }
        }
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn first_hit_returns_earliest_candidate() {
        let mock = MockSystem::new();
        let a = PathBuf::from("/opt/tools");
        let b = PathBuf::from("/home/op/.local/bin");
        mock.file_system
            .lock()
            .unwrap()
            .push(b.join(packager_exe()));

        let hit = first_hit(&[a, b.clone()], &mock);
        assert_eq!(hit, Some(b.join(packager_exe())));
    }

    #[test]
    fn first_hit_prefers_path_order() {
        let mock = MockSystem::new();
        let a = PathBuf::from("/first");
        let b = PathBuf::from("/second");
        {
            let mut fs = mock.file_system.lock().unwrap();
            fs.push(a.join(packager_exe()));
            fs.push(b.join(packager_exe()));
        }

        let hit = first_hit(&[a.clone(), b], &mock);
        assert_eq!(hit, Some(a.join(packager_exe())));
    }

    #[test]
    fn no_hit_means_none() {
        let mock = MockSystem::new();
        assert_eq!(first_hit(&[PathBuf::from("/nowhere")], &mock), None);
    }
}
