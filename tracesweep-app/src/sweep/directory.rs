use super::fs::{FileEntry, FileSystem, WalkDepth, WalkError};
use chrono::{DateTime, Duration, Local};
use std::path::Path;
use tracesweep_core::{Classifier, Finding, ReportSink, SweepResult};
use tracing::{debug, warn};

/// A vanished file is only reported as deleted when it was created longer
/// ago than this.
pub const DELETED_MIN_AGE_HOURS: i64 = 24;

/// Recursive directory sweep. Every non-trusted file is checked for the
/// hidden attribute and keywords, then run through the deleted/renamed/
/// executed inferences.
pub struct DirectoryScanner<'a> {
    classifier: &'a Classifier,
    fs: &'a dyn FileSystem,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(classifier: &'a Classifier, fs: &'a dyn FileSystem) -> Self {
        Self { classifier, fs }
    }

    pub fn scan(&self, dir: &Path, sink: &mut dyn ReportSink) -> SweepResult<()> {
        if !self.fs.is_dir(dir) {
            debug!("Directory not present: {}", dir.display());
            return Ok(());
        }

        let mut files = 0usize;
        for item in self.fs.walk(dir, WalkDepth::Recursive) {
            match item {
                Ok(entry) => {
                    if self.is_trusted(&entry.path) {
                        continue;
                    }
                    files += 1;
                    for finding in self.inspect(&entry, Local::now()) {
                        sink.emit(&finding)?;
                    }
                }
                Err(WalkError::Denied { path }) => {
                    debug!("Access denied, skipping {}", path.display());
                }
                Err(WalkError::Entry { path, source }) => {
                    if self.is_trusted(&path) {
                        continue;
                    }
                    let finding = Finding::error(
                        "Could not check file",
                        path.display().to_string(),
                        source.to_string(),
                    );
                    warn!("{}", finding);
                    sink.emit(&finding)?;
                }
                Err(WalkError::Subtree { path, source }) => {
                    let finding = Finding::error(
                        "Failed to scan directory",
                        path.display().to_string(),
                        source.to_string(),
                    );
                    warn!("{}", finding);
                    sink.emit(&finding)?;
                }
            }
        }

        debug!("Checked {} files under {}", files, dir.display());
        Ok(())
    }

    /// Findings for one non-trusted file, in report order. A single file may
    /// yield HIDDEN, SUSPICIOUS, DELETED, RENAME and EXECUTED together.
    pub fn inspect(&self, entry: &FileEntry, now: DateTime<Local>) -> Vec<Finding> {
        let path = entry.display_path();
        let suspicious = self
            .classifier
            .is_suspicious(Some(entry.name.as_str()), Some(path.as_str()));
        let mut findings = Vec::new();

        if entry.hidden {
            findings.push(Finding::hidden(path.clone(), entry.times));
        }
        if suspicious {
            findings.push(Finding::suspicious_file(path.clone(), entry.times));
        }

        if !self.fs.exists(&entry.path) && created_before(entry, now) {
            findings.push(Finding::deleted(path.clone(), entry.times.created));
        }
        if suspicious {
            findings.push(Finding::renamed(path.clone()));
        }
        if entry.has_extension("exe") {
            findings.push(Finding::executed(path, entry.times.last_accessed));
        }

        findings
    }

    fn is_trusted(&self, path: &Path) -> bool {
        self.classifier.is_trusted_path(&path.to_string_lossy())
    }
}

fn created_before(entry: &FileEntry, now: DateTime<Local>) -> bool {
    entry
        .times
        .created
        .is_some_and(|created| created < now - Duration::hours(DELETED_MIN_AGE_HOURS))
}
