//! # Packaging Job
//!
//! The fixed description of *what* gets packaged. The dashboard ships as one
//! entry-point script plus a logo that doubles as the bundled asset and (in
//! `.ico` form) as the executable's icon, so the whole job is a handful of
//! constants and the logic that turns them into a packager argument vector.
//!
//! Nothing here touches the file system or spawns anything; composing the
//! argument vector is pure, which is what makes it testable.

use crate::invariant_ppt::assert_invariant;

/// The application's main module, handed to the packager as the entry point.
pub const ENTRY_POINT: &str = "book_dashboard.py";

/// Icon associated with the produced executable.
///
/// PyInstaller fails hard if this file is missing; `build --no-icon` omits it.
pub const ICON_FILE: &str = "logo.ico";

/// Data asset copied into the bundle root so the dashboard can find its logo
/// next to the executable at runtime.
pub const ASSET_FILE: &str = "logo.png";

/// Conventional output directory created by the packager.
pub const DIST_DIR: &str = "dist";

/// Conventional intermediate directory created by the packager.
pub const WORK_DIR: &str = "build";

/// A single packaging invocation, fully described.
///
/// The standard job is hard-coded (the original tool took no configuration),
/// but the struct keeps the parameters explicit so tests can vary them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingJob {
    /// Script treated as the application's main module.
    pub entry_point: String,
    /// Optional icon resource for the produced executable.
    pub icon: Option<String>,
    /// Data files to bundle, as `(source, destination)` pairs.
    /// Destination `"."` means the bundle root.
    pub assets: Vec<(String, String)>,
    /// Produce one consolidated executable instead of a directory.
    pub one_file: bool,
    /// Suppress the console window at runtime (the dashboard is graphical).
    pub windowed: bool,
}

impl PackagingJob {
    /// The one job this tool exists to run: single-file, windowed, logo
    /// bundled at the root, icon attached, `book_dashboard.py` as the entry.
    pub fn standard() -> Self {
        PackagingJob {
            entry_point: ENTRY_POINT.to_string(),
            icon: Some(ICON_FILE.to_string()),
            assets: vec![(ASSET_FILE.to_string(), ".".to_string())],
            one_file: true,
            windowed: true,
        }
    }

    /// Composes the full argument vector for the packager.
    ///
    /// Flag order mirrors how the options were written by hand originally:
    /// output mode, window mode, data pairs, icon, and the entry point last.
    /// PyInstaller treats the first non-flag argument as the script, so the
    /// entry point going last is a hard requirement, not a style choice.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        if self.one_file {
            args.push("--onefile".to_string());
        }
        if self.windowed {
            args.push("--noconsole".to_string());
        }
        for (source, dest) in &self.assets {
            args.push("--add-data".to_string());
            args.push(format!("{}{}{}", source, data_separator(), dest));
        }
        if let Some(icon) = &self.icon {
            args.push("--icon".to_string());
            args.push(icon.clone());
        }
        args.push(self.entry_point.clone());

        assert_invariant(
            args.last() == Some(&self.entry_point),
            "Packager arguments must end with the entry point",
            Some("Job"),
        );

        args
    }
}

/// Separator between source and destination in an `--add-data` pair.
///
/// PyInstaller uses `;` on Windows and `:` everywhere else, matching the
/// platform's PATH separator.
pub fn data_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_job_args_enumerate_every_option() {
        let args = PackagingJob::standard().args();
        let expected = vec![
            "--onefile".to_string(),
            "--noconsole".to_string(),
            "--add-data".to_string(),
            format!("logo.png{}.", data_separator()),
            "--icon".to_string(),
            "logo.ico".to_string(),
            "book_dashboard.py".to_string(),
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn icon_flag_disappears_when_icon_is_none() {
        let mut job = PackagingJob::standard();
        job.icon = None;
        let args = job.args();
        assert!(!args.iter().any(|a| a == "--icon"));
        assert_eq!(args.last().map(String::as_str), Some(ENTRY_POINT));
    }

    #[test]
    fn data_separator_matches_platform() {
        if cfg!(windows) {
            assert_eq!(data_separator(), ';');
        } else {
            assert_eq!(data_separator(), ':');
        }
    }

    proptest! {
        #[test]
        fn entry_point_is_always_last(
            entry in "[a-z_]{3,12}\\.py",
            icon in prop::option::of("[a-z]{3,8}\\.ico"),
            assets in prop::collection::vec(("[a-z]{3,8}\\.png", "\\.|assets"), 0..4),
            one_file in any::<bool>(),
            windowed in any::<bool>(),
        ) {
            let job = PackagingJob {
                entry_point: entry.clone(),
                icon,
                assets: assets.clone(),
                one_file,
                windowed,
            };
            let args = job.args();

            prop_assert_eq!(args.last(), Some(&entry));

            // Every asset pair must appear, separator-joined, right after its flag.
            for (source, dest) in &assets {
                let pair = format!("{}{}{}", source, data_separator(), dest);
                let pos = args.iter().position(|a| a == &pair);
                prop_assert!(pos.is_some(), "missing add-data pair {}", pair);
                prop_assert_eq!(args[pos.unwrap() - 1].as_str(), "--add-data");
            }
        }

        #[test]
        fn args_are_deterministic(
            icon in prop::option::of("[a-z]{3,8}\\.ico"),
            windowed in any::<bool>(),
        ) {
            let mut job = PackagingJob::standard();
            job.icon = icon;
            job.windowed = windowed;

            // Re-running with unchanged inputs must produce the identical command.
            prop_assert_eq!(job.args(), job.args());
        }
    }
}
