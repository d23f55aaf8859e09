use crate::sweep::discovery::SpecialFolders;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

pub const REPORT_FILE_NAME: &str = "TraceSweepResults.txt";

/// Overrides the report location.
pub const REPORT_PATH_ENV: &str = "TRACESWEEP_REPORT";

/// Configuration-store roots checked on every run, in order.
pub const STORE_ROOTS: &[&str] = &[
    "HKEY_LOCAL_MACHINE\\Software",
    "HKEY_CURRENT_USER\\Software",
    "HKEY_LOCAL_MACHINE\\System\\CurrentControlSet\\Services",
    "HKEY_LOCAL_MACHINE\\System\\CurrentControlSet\\Control\\Session Manager\\Memory Management",
];

/// Resolved, fixed inputs for one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub store_roots: Vec<String>,
    pub directories: Vec<PathBuf>,
    /// Trash directory names, relative to each drive root.
    pub trash_containers: Vec<String>,
    pub execution_cache: Option<PathBuf>,
    pub execution_cache_extension: String,
    pub report_path: PathBuf,
}

impl SweepConfig {
    pub fn for_host(folders: &SpecialFolders) -> Self {
        let directories = [
            folders.app_data.clone(),
            folders.program_files.clone(),
            folders.program_files_x86.clone(),
            Some(folders.temp.clone()),
            folders.downloads.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        let report_dir = folders
            .desktop
            .clone()
            .or_else(|| folders.home.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            store_roots: STORE_ROOTS.iter().map(|r| r.to_string()).collect(),
            directories,
            trash_containers: trash_containers(),
            execution_cache: execution_cache(folders),
            execution_cache_extension: "pf".to_string(),
            report_path: report_dir.join(REPORT_FILE_NAME),
        }
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_report_override(std::env::var_os(REPORT_PATH_ENV))
    }

    pub fn with_report_override(mut self, value: Option<OsString>) -> Self {
        if let Some(path) = value.filter(|v| !v.is_empty()) {
            self.report_path = PathBuf::from(path);
        }
        self
    }

    /// YAML rendering for the debug log.
    pub fn summary(&self) -> String {
        serde_yaml::to_string(self).unwrap_or_else(|e| format!("<unrenderable config: {}>", e))
    }
}

#[cfg(windows)]
fn trash_containers() -> Vec<String> {
    vec!["$Recycle.Bin".to_string()]
}

#[cfg(unix)]
fn trash_containers() -> Vec<String> {
    // SAFETY: getuid has no preconditions and cannot fail.
    let uid = unsafe { libc::getuid() };
    vec![".Trash".to_string(), format!(".Trash-{}", uid)]
}

#[cfg(not(any(windows, unix)))]
fn trash_containers() -> Vec<String> {
    Vec::new()
}

fn execution_cache(folders: &SpecialFolders) -> Option<PathBuf> {
    if cfg!(windows) {
        folders.system_root.as_ref().map(|root| root.join("Prefetch"))
    } else {
        None
    }
}
