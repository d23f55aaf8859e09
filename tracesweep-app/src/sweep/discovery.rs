use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracesweep_core::ExclusionSet;

/// Platform special folders the sweep scans or trusts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialFolders {
    pub home: Option<PathBuf>,
    pub app_data: Option<PathBuf>,
    pub program_files: Option<PathBuf>,
    pub program_files_x86: Option<PathBuf>,
    /// OS install root (`C:\Windows`).
    pub system_root: Option<PathBuf>,
    /// System binaries (`C:\Windows\System32`).
    pub system: Option<PathBuf>,
    pub temp: PathBuf,
    pub downloads: Option<PathBuf>,
    pub desktop: Option<PathBuf>,
}

impl SpecialFolders {
    pub fn discover() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Resolves folders through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        resolve(&var)
    }

    /// Directory prefixes whose contents are never reported.
    pub fn trusted_dirs(&self) -> Vec<String> {
        [
            &self.system,
            &self.system_root,
            &self.program_files,
            &self.program_files_x86,
        ]
        .into_iter()
        .flatten()
        .map(|p| p.display().to_string())
        .collect()
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::with_default_names(self.trusted_dirs())
    }
}

#[cfg(windows)]
fn resolve(var: &dyn Fn(&str) -> Option<PathBuf>) -> SpecialFolders {
    let home = var("USERPROFILE");
    let system_root = var("SystemRoot").or_else(|| var("windir"));

    SpecialFolders {
        app_data: var("APPDATA"),
        program_files: var("ProgramFiles"),
        program_files_x86: var("ProgramFiles(x86)"),
        system: system_root.as_ref().map(|root| root.join("System32")),
        system_root,
        temp: env::temp_dir(),
        downloads: home.as_ref().map(|h| h.join("Downloads")),
        desktop: home.as_ref().map(|h| h.join("Desktop")),
        home,
    }
}

#[cfg(not(windows))]
fn resolve(var: &dyn Fn(&str) -> Option<PathBuf>) -> SpecialFolders {
    let home = var("HOME");
    let config = var("XDG_CONFIG_HOME").or_else(|| home.as_ref().map(|h| h.join(".config")));
    let user_dirs = match (&config, &home) {
        (Some(config), Some(home)) => read_user_dirs(&config.join("user-dirs.dirs"), home),
        _ => UserDirs::default(),
    };
    let under_home = |name: &str| home.as_ref().map(|h| h.join(name));

    SpecialFolders {
        app_data: config.clone(),
        program_files: Some(PathBuf::from("/opt")),
        program_files_x86: None,
        system_root: Some(PathBuf::from("/usr")),
        system: Some(PathBuf::from("/bin")),
        temp: env::temp_dir(),
        downloads: user_dirs.download.or_else(|| under_home("Downloads")),
        desktop: user_dirs.desktop.or_else(|| under_home("Desktop")),
        home,
    }
}

/// Download and desktop locations from an XDG `user-dirs.dirs` file. Only
/// entries pointing at an existing directory are kept.
#[cfg_attr(windows, allow(dead_code))]
#[derive(Debug, Default, PartialEq, Eq)]
struct UserDirs {
    download: Option<PathBuf>,
    desktop: Option<PathBuf>,
}

#[cfg_attr(windows, allow(dead_code))]
fn read_user_dirs(file: &Path, home: &Path) -> UserDirs {
    let Ok(content) = fs::read_to_string(file) else {
        return UserDirs::default();
    };

    let mut dirs = UserDirs::default();
    for line in content.lines().map(str::trim) {
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let slot = match key.trim() {
            "XDG_DOWNLOAD_DIR" => &mut dirs.download,
            "XDG_DESKTOP_DIR" => &mut dirs.desktop,
            _ => continue,
        };
        let raw = raw.trim().trim_matches('"');
        let target = match raw.strip_prefix("$HOME") {
            Some(rest) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        };
        if target.is_dir() {
            *slot = Some(target);
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_trusted_dirs_skip_unresolved_folders() {
        let folders = SpecialFolders {
            system: Some(PathBuf::from("/sys-bin")),
            program_files: Some(PathBuf::from("/apps")),
            ..SpecialFolders::default()
        };
        assert_eq!(folders.trusted_dirs(), vec!["/sys-bin", "/apps"]);

        let exclusions = folders.exclusions();
        assert!(exclusions.is_trusted("/apps/vendor/hack.exe"));
        assert!(!exclusions.is_trusted("/home/a/hack.exe"));
    }

    #[test]
    fn test_empty_variables_are_unresolved() {
        let folders = SpecialFolders::from_lookup(lookup_from(&[("HOME", ""), ("USERPROFILE", "")]));
        assert_eq!(folders.home, None);
        assert_eq!(folders.downloads, None);
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_folders() {
        let folders = SpecialFolders::from_lookup(lookup_from(&[
            ("USERPROFILE", "C:\\Users\\sam"),
            ("APPDATA", "C:\\Users\\sam\\AppData\\Roaming"),
            ("ProgramFiles", "C:\\Program Files"),
            ("ProgramFiles(x86)", "C:\\Program Files (x86)"),
            ("SystemRoot", "C:\\Windows"),
        ]));

        assert_eq!(folders.system, Some(PathBuf::from("C:\\Windows\\System32")));
        assert_eq!(folders.downloads, Some(PathBuf::from("C:\\Users\\sam\\Downloads")));
        assert_eq!(
            folders.trusted_dirs(),
            vec![
                "C:\\Windows\\System32",
                "C:\\Windows",
                "C:\\Program Files",
                "C:\\Program Files (x86)"
            ]
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unix_folders_fall_back_under_home() {
        let folders = SpecialFolders::from_lookup(lookup_from(&[("HOME", "/home/sam-test-nonexistent")]));

        assert_eq!(
            folders.app_data,
            Some(PathBuf::from("/home/sam-test-nonexistent/.config"))
        );
        assert_eq!(
            folders.downloads,
            Some(PathBuf::from("/home/sam-test-nonexistent/Downloads"))
        );
        assert_eq!(folders.trusted_dirs(), vec!["/bin", "/usr", "/opt"]);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_user_dirs_keep_existing_download_and_desktop_only() {
        let temp = tempfile::TempDir::new().unwrap();
        let home = temp.path();
        std::fs::create_dir_all(home.join("Fetched")).unwrap();
        let file = home.join("user-dirs.dirs");
        std::fs::write(
            &file,
            "# User dirs\nXDG_DOWNLOAD_DIR=\"$HOME/Fetched\"\nXDG_DESKTOP_DIR=\"$HOME/Missing\"\nXDG_MUSIC_DIR=\"$HOME/Fetched\"\n",
        )
        .unwrap();

        let dirs = read_user_dirs(&file, home);
        assert_eq!(
            dirs,
            UserDirs {
                download: Some(home.join("Fetched")),
                desktop: None,
            }
        );
    }
}
