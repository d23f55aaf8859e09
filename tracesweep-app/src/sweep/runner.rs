use super::config_tree::ConfigTreeScanner;
use super::directory::DirectoryScanner;
use super::fs::FileSystem;
use super::prefetch::ExecutionCacheScanner;
use super::store::ConfigStore;
use super::system_info::BootInfo;
use super::trash::TrashScanner;
use crate::config::SweepConfig;
use tracesweep_core::{Classifier, ReportSink, SweepResult};
use tracing::info;

pub const REPORT_TITLE: &str = "Trace Sweep Results";

/// One full sweep: configuration roots, then directories, then the trash,
/// then the execution cache, all written to one sink in that order.
pub struct Sweep<'a> {
    config: &'a SweepConfig,
    classifier: &'a Classifier,
    fs: &'a dyn FileSystem,
    store: &'a dyn ConfigStore,
}

impl<'a> Sweep<'a> {
    pub fn new(
        config: &'a SweepConfig,
        classifier: &'a Classifier,
        fs: &'a dyn FileSystem,
        store: &'a dyn ConfigStore,
    ) -> Self {
        Self {
            config,
            classifier,
            fs,
            store,
        }
    }

    /// Returns an error only when the sink itself fails.
    pub fn run(&self, boot: &BootInfo, sink: &mut dyn ReportSink) -> SweepResult<()> {
        sink.write_line(REPORT_TITLE)?;
        sink.write_line("")?;
        for line in boot.header_lines() {
            sink.write_line(&line)?;
        }
        sink.write_line("")?;

        self.scan_config_roots(sink)?;
        self.scan_directories(sink)?;

        sink.write_line("")?;
        sink.write_line("Scanning trash for deleted files...")?;
        info!("Scanning trash containers");
        TrashScanner::new(self.classifier, self.fs, &self.config.trash_containers).scan(sink)?;

        sink.write_line("")?;
        sink.write_line("Scanning execution cache for suspicious files...")?;
        if let Some(cache) = &self.config.execution_cache {
            info!("Scanning execution cache {}", cache.display());
            ExecutionCacheScanner::new(
                self.classifier,
                self.fs,
                cache,
                &self.config.execution_cache_extension,
            )
            .scan(sink)?;
        }

        Ok(())
    }

    fn scan_config_roots(&self, sink: &mut dyn ReportSink) -> SweepResult<()> {
        let scanner = ConfigTreeScanner::new(self.classifier, self.store);
        for root in &self.config.store_roots {
            info!("Scanning {}", root);
            sink.write_line(&format!("Scanning: {}", root))?;
            scanner.scan(root, sink)?;
        }
        Ok(())
    }

    fn scan_directories(&self, sink: &mut dyn ReportSink) -> SweepResult<()> {
        let scanner = DirectoryScanner::new(self.classifier, self.fs);
        for dir in &self.config.directories {
            info!("Scanning directory {}", dir.display());
            sink.write_line(&format!("Scanning directory: {}", dir.display()))?;
            scanner.scan(dir, sink)?;
        }
        Ok(())
    }
}
