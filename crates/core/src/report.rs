use crate::error::{SweepError, SweepResult};
use crate::types::{Finding, Tag};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Destination for report lines, written strictly in call order.
pub trait ReportSink {
    /// Free-form line (headers, section markers, system metadata).
    fn write_line(&mut self, line: &str) -> SweepResult<()>;

    fn emit(&mut self, finding: &Finding) -> SweepResult<()>;
}

/// Keeps findings in memory and drops plain lines.
impl ReportSink for Vec<Finding> {
    fn write_line(&mut self, _line: &str) -> SweepResult<()> {
        Ok(())
    }

    fn emit(&mut self, finding: &Finding) -> SweepResult<()> {
        self.push(finding.clone());
        Ok(())
    }
}

/// Turns a non-fatal failure into one ERROR finding on `sink`. Fatal errors
/// and successes pass through untouched.
pub fn contain(
    sink: &mut dyn ReportSink,
    outcome: SweepResult<()>,
    on_error: impl FnOnce(&SweepError) -> Finding,
) -> SweepResult<()> {
    match outcome {
        Err(err) if !err.is_fatal() => {
            let finding = on_error(&err);
            tracing::warn!("{}", finding);
            sink.emit(&finding)
        }
        other => other,
    }
}

/// Per-tag finding counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    counts: BTreeMap<Tag, usize>,
}

impl SweepStats {
    pub fn record(&mut self, tag: Tag) {
        *self.counts.entry(tag).or_insert(0) += 1;
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = Tag::ALL
            .iter()
            .map(|tag| format!("{}={}", tag.label(), self.count(*tag)))
            .collect();
        format!("Findings: {} ({})", self.total(), parts.join(", "))
    }
}

/// Plain-text report: one finding or note per line.
pub struct TextReport<W: Write> {
    out: W,
    stats: SweepStats,
}

impl TextReport<BufWriter<File>> {
    /// Truncates any previous report at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> SweepResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(SweepError::Report)?;
            }
        }

        let file = File::create(path).map_err(SweepError::Report)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stats: SweepStats::default(),
        }
    }

    /// Writes the closing lines, flushes, and hands back the writer.
    pub fn finish(mut self) -> SweepResult<(W, SweepStats)> {
        self.write_line("")?;
        self.write_line("Scan completed.")?;
        let summary = self.stats.summary_line();
        self.write_line(&summary)?;
        self.out.flush().map_err(SweepError::Report)?;
        Ok((self.out, self.stats))
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn write_line(&mut self, line: &str) -> SweepResult<()> {
        writeln!(self.out, "{}", line).map_err(SweepError::Report)
    }

    fn emit(&mut self, finding: &Finding) -> SweepResult<()> {
        writeln!(self.out, "{}", finding).map_err(SweepError::Report)?;
        self.stats.record(finding.tag());
        Ok(())
    }
}
