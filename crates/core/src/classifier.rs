//! Keyword heuristic and trusted-location filter shared by every scanner.
//!
//! Both sets are fixed once built. Matching is a plain case-insensitive
//! substring test, so short keywords such as `red` hit ordinary names like
//! `credentials.exe`; that noise is accepted.

/// Substrings that mark a name or value as suspicious.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "cheat", "hack", "inject", "bypass", "debugger", "fivem", "eulen", "red", "trainer", "exploit",
];

/// Core OS process images that are never reported, wherever they live.
pub const DEFAULT_TRUSTED_NAMES: &[&str] = &[
    "explorer.exe",
    "svchost.exe",
    "lsass.exe",
    "taskmgr.exe",
    "msiexec.exe",
];

/// Ordered, lowercased keyword list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self {
            keywords: normalized,
        }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }

    /// First keyword contained in `text`, ignoring case.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Trusted directory prefixes and trusted file names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    trusted_dirs: Vec<String>,
    trusted_names: Vec<String>,
}

impl ExclusionSet {
    /// Empty directory entries are dropped: an empty prefix would trust every path.
    pub fn new<D, N, S, T>(trusted_dirs: D, trusted_names: N) -> Self
    where
        D: IntoIterator<Item = S>,
        N: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            trusted_dirs: trusted_dirs
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            trusted_names: trusted_names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn with_default_names<D, S>(trusted_dirs: D) -> Self
    where
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(trusted_dirs, DEFAULT_TRUSTED_NAMES)
    }

    /// Plain string prefix, not a path-component match: a trusted `C:\Windows`
    /// also covers `C:\WindowsApps`.
    pub fn is_trusted(&self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        if self
            .trusted_dirs
            .iter()
            .any(|dir| lowered.starts_with(dir.as_str()))
        {
            return true;
        }

        let name = base_name(&lowered);
        self.trusted_names.iter().any(|n| n == name)
    }

    pub fn trusted_dirs(&self) -> &[String] {
        &self.trusted_dirs
    }
}

/// Last component under either separator, so Windows-style paths split the
/// same way on every host.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    keywords: KeywordSet,
    exclusions: ExclusionSet,
}

impl Classifier {
    pub fn new(keywords: KeywordSet, exclusions: ExclusionSet) -> Self {
        Self {
            keywords,
            exclusions,
        }
    }

    /// True when any keyword occurs in `name` or `value`. Absent or empty
    /// arguments never match.
    pub fn is_suspicious(&self, name: Option<&str>, value: Option<&str>) -> bool {
        name.and_then(|n| self.keywords.first_match(n)).is_some()
            || value.and_then(|v| self.keywords.first_match(v)).is_some()
    }

    pub fn is_trusted_path(&self, path: &str) -> bool {
        self.exclusions.is_trusted(path)
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }
}
