use super::store::{ConfigStore, Hive};
use tracesweep_core::{contain, Classifier, Finding, ReportSink, SweepResult};
use tracing::debug;

/// Reports suspicious values directly under one configuration-store key.
/// Subkeys are not descended into.
pub struct ConfigTreeScanner<'a> {
    classifier: &'a Classifier,
    store: &'a dyn ConfigStore,
}

impl<'a> ConfigTreeScanner<'a> {
    pub fn new(classifier: &'a Classifier, store: &'a dyn ConfigStore) -> Self {
        Self { classifier, store }
    }

    /// Any failure on `root` becomes one ERROR finding; only a report failure
    /// is returned.
    pub fn scan(&self, root: &str, sink: &mut dyn ReportSink) -> SweepResult<()> {
        let Some((hive, subkey)) = Hive::split(root) else {
            debug!("Unsupported root store, skipping {}", root);
            return Ok(());
        };

        let outcome = self.scan_key(root, hive, subkey, sink);
        contain(sink, outcome, |err| {
            Finding::error("Failed to scan", root, err.to_string())
        })
    }

    fn scan_key(
        &self,
        root: &str,
        hive: Hive,
        subkey: &str,
        sink: &mut dyn ReportSink,
    ) -> SweepResult<()> {
        let Some(key) = self.store.open_subkey(hive, subkey)? else {
            debug!("Key not present: {}", root);
            return Ok(());
        };

        let names = key.value_names()?;
        debug!("{} values under {}", names.len(), root);

        for name in names {
            let value = key.value(&name)?.map(|v| v.to_string());
            if self.classifier.is_suspicious(Some(name.as_str()), value.as_deref()) {
                sink.emit(&Finding::suspicious_value(
                    format!("{}\\{}", root, name),
                    value.unwrap_or_default(),
                ))?;
            }
        }

        Ok(())
    }
}
