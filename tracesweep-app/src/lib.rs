pub mod config;
pub mod sweep;

use config::SweepConfig;
use sweep::{host_store, BootInfo, LocalFileSystem, SpecialFolders, Sweep};
use tracesweep_core::{Classifier, KeywordSet, SweepResult, SweepStats, TextReport};

/// Runs every pass against the host and writes the report to
/// `config.report_path`. Fails only when the report cannot be written.
pub fn run_host_sweep(
    config: &SweepConfig,
    folders: &SpecialFolders,
    boot: &BootInfo,
) -> SweepResult<SweepStats> {
    let classifier = Classifier::new(KeywordSet::builtin(), folders.exclusions());
    let store = host_store();
    let fs = LocalFileSystem;

    let mut report = TextReport::create(&config.report_path)?;
    Sweep::new(config, &classifier, &fs, store.as_ref()).run(boot, &mut report)?;
    let (_, stats) = report.finish()?;
    Ok(stats)
}
