use super::fs::{FileSystem, WalkDepth};
use std::path::Path;
use tracesweep_core::{contain, Classifier, Finding, ReportSink, SweepResult};
use tracing::debug;

/// Reports execution-cache records whose name or path hits a keyword. Each
/// record stands for a program that was launched at some point.
pub struct ExecutionCacheScanner<'a> {
    classifier: &'a Classifier,
    fs: &'a dyn FileSystem,
    dir: &'a Path,
    extension: &'a str,
}

impl<'a> ExecutionCacheScanner<'a> {
    pub fn new(
        classifier: &'a Classifier,
        fs: &'a dyn FileSystem,
        dir: &'a Path,
        extension: &'a str,
    ) -> Self {
        Self {
            classifier,
            fs,
            dir,
            extension,
        }
    }

    pub fn scan(&self, sink: &mut dyn ReportSink) -> SweepResult<()> {
        if !self.fs.is_dir(self.dir) {
            debug!("Execution cache not present: {}", self.dir.display());
            return Ok(());
        }

        let outcome = self.scan_records(sink);
        contain(sink, outcome, |err| {
            Finding::error("Failed to scan", "the execution cache", err.to_string())
        })
    }

    fn scan_records(&self, sink: &mut dyn ReportSink) -> SweepResult<()> {
        for item in self.fs.walk(self.dir, WalkDepth::TopLevel) {
            let entry = item?;
            if !entry.has_extension(self.extension) {
                continue;
            }
            let path = entry.display_path();
            if self
                .classifier
                .is_suspicious(Some(entry.name.as_str()), Some(path.as_str()))
            {
                sink.emit(&Finding::prefetch(path, entry.times))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::fs::{FileEntry, LocalFileSystem, MemoryFileSystem};
    use std::fs;
    use tempfile::TempDir;
    use tracesweep_core::{ExclusionSet, KeywordSet, Tag, Timestamps};

    fn classifier() -> Classifier {
        Classifier::new(KeywordSet::builtin(), ExclusionSet::default())
    }

    #[test]
    fn test_only_matching_records_are_reported() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("Prefetch");
        fs::create_dir_all(cache.join("ReadyBoot")).unwrap();
        fs::write(cache.join("CHEATENGINE.EXE-1A2B3C4D.pf"), "x").unwrap();
        fs::write(cache.join("NOTEPAD.EXE-11223344.pf"), "x").unwrap();
        fs::write(cache.join("INJECTOR.EXE-55667788.tmp"), "x").unwrap();
        fs::write(cache.join("ReadyBoot/TRAINER.EXE-00000000.pf"), "x").unwrap();
        let classifier = classifier();

        let mut sink: Vec<Finding> = Vec::new();
        ExecutionCacheScanner::new(&classifier, &LocalFileSystem, &cache, "pf")
            .scan(&mut sink)
            .unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].tag(), Tag::Prefetch);
        assert!(sink[0].subject().ends_with("CHEATENGINE.EXE-1A2B3C4D.pf"));
        assert!(sink[0].to_string().contains("(Last Accessed: "));
    }

    #[test]
    fn test_missing_cache_is_a_no_op() {
        let classifier = classifier();
        let mut sink: Vec<Finding> = Vec::new();
        ExecutionCacheScanner::new(
            &classifier,
            &LocalFileSystem,
            Path::new("/definitely/not/a/prefetch/dir"),
            "pf",
        )
        .scan(&mut sink)
        .unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_failure_becomes_one_error() {
        let memory = MemoryFileSystem::new()
            .with_dir("C:/Windows/Prefetch")
            .with_file(FileEntry::new(
                "C:/Windows/Prefetch/HACK.EXE-1.pf",
                false,
                Timestamps::default(),
            ))
            .with_denied("C:/Windows/Prefetch")
            .with_file(FileEntry::new(
                "C:/Windows/Prefetch/EXPLOIT.EXE-2.pf",
                false,
                Timestamps::default(),
            ));
        let classifier = classifier();

        let mut sink: Vec<Finding> = Vec::new();
        ExecutionCacheScanner::new(&classifier, &memory, Path::new("C:/Windows/Prefetch"), "pf")
            .scan(&mut sink)
            .unwrap();

        let lines: Vec<String> = sink.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "[PREFETCH] C:/Windows/Prefetch/HACK.EXE-1.pf (Last Accessed: Unknown, Created: Unknown)",
                "[ERROR] Failed to scan the execution cache: Access denied: C:/Windows/Prefetch",
            ]
        );
    }
}
