use super::fs::{FileSystem, WalkDepth, WalkError};
use std::path::Path;
use tracesweep_core::{contain, Classifier, Finding, ReportSink, SweepResult};
use tracing::debug;

/// Looks through the trash container of every mounted drive. Trash contents
/// are never trusted, so no exclusion filter applies.
pub struct TrashScanner<'a> {
    classifier: &'a Classifier,
    fs: &'a dyn FileSystem,
    containers: &'a [String],
}

impl<'a> TrashScanner<'a> {
    /// `containers` are directory names relative to each drive root.
    pub fn new(classifier: &'a Classifier, fs: &'a dyn FileSystem, containers: &'a [String]) -> Self {
        Self {
            classifier,
            fs,
            containers,
        }
    }

    pub fn scan(&self, sink: &mut dyn ReportSink) -> SweepResult<()> {
        let outcome = self.scan_drives(sink);
        contain(sink, outcome, |err| {
            Finding::error("Failed to scan", "the trash", err.to_string())
        })
    }

    fn scan_drives(&self, sink: &mut dyn ReportSink) -> SweepResult<()> {
        for drive in self.fs.drives() {
            for name in self.containers {
                let container = drive.join(name);
                if !self.fs.is_dir(&container) {
                    continue;
                }
                debug!("Scanning trash container {}", container.display());
                self.scan_container(&container, sink)?;
            }
        }
        Ok(())
    }

    fn scan_container(&self, container: &Path, sink: &mut dyn ReportSink) -> SweepResult<()> {
        for item in self.fs.walk(container, WalkDepth::Recursive) {
            match item {
                Ok(entry) => {
                    let path = entry.display_path();
                    if self
                        .classifier
                        .is_suspicious(Some(entry.name.as_str()), Some(path.as_str()))
                    {
                        sink.emit(&Finding::deleted(path, entry.times.created))?;
                    }
                }
                // Other users' folders inside the container are routinely locked.
                Err(WalkError::Denied { path }) if path != container => {
                    debug!("Access denied, skipping {}", path.display());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
