use chrono::{DateTime, Local};
use std::fmt;

/// Format used for every timestamp written to the report.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rendered in place of a value the host could not provide.
pub const UNKNOWN: &str = "Unknown";

/// Category label carried by every report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Suspicious,
    Hidden,
    Deleted,
    Rename,
    Executed,
    Prefetch,
    Error,
}

impl Tag {
    pub const ALL: [Tag; 7] = [
        Tag::Suspicious,
        Tag::Hidden,
        Tag::Deleted,
        Tag::Rename,
        Tag::Executed,
        Tag::Prefetch,
        Tag::Error,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tag::Suspicious => "SUSPICIOUS",
            Tag::Hidden => "HIDDEN",
            Tag::Deleted => "DELETED",
            Tag::Rename => "RENAME",
            Tag::Executed => "EXECUTED",
            Tag::Prefetch => "PREFETCH",
            Tag::Error => "ERROR",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamps {
    pub last_accessed: Option<DateTime<Local>>,
    pub created: Option<DateTime<Local>>,
}

impl Timestamps {
    pub fn new(last_accessed: Option<DateTime<Local>>, created: Option<DateTime<Local>>) -> Self {
        Self {
            last_accessed,
            created,
        }
    }
}

pub fn format_timestamp(time: Option<&DateTime<Local>>) -> String {
    time.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// What a finding says about its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Value(String),
    Times(Timestamps),
    DeletedOn(Option<DateTime<Local>>),
    Renamed,
    ExecutedOn(Option<DateTime<Local>>),
    Failure { context: String, message: String },
}

/// One classified observation. Built by a scanner and handed straight to a
/// [`ReportSink`](crate::report::ReportSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    tag: Tag,
    subject: String,
    detail: Detail,
}

impl Finding {
    /// Suspicious configuration value; `subject` is `root\valueName`.
    pub fn suspicious_value(subject: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Tag::Suspicious, subject, Detail::Value(value.into()))
    }

    pub fn suspicious_file(path: impl Into<String>, times: Timestamps) -> Self {
        Self::new(Tag::Suspicious, path, Detail::Times(times))
    }

    pub fn hidden(path: impl Into<String>, times: Timestamps) -> Self {
        Self::new(Tag::Hidden, path, Detail::Times(times))
    }

    pub fn deleted(path: impl Into<String>, created: Option<DateTime<Local>>) -> Self {
        Self::new(Tag::Deleted, path, Detail::DeletedOn(created))
    }

    pub fn renamed(path: impl Into<String>) -> Self {
        Self::new(Tag::Rename, path, Detail::Renamed)
    }

    pub fn executed(path: impl Into<String>, last_accessed: Option<DateTime<Local>>) -> Self {
        Self::new(Tag::Executed, path, Detail::ExecutedOn(last_accessed))
    }

    pub fn prefetch(path: impl Into<String>, times: Timestamps) -> Self {
        Self::new(Tag::Prefetch, path, Detail::Times(times))
    }

    /// `context` reads as a verb phrase, e.g. "Failed to scan".
    pub fn error(
        context: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            Tag::Error,
            subject,
            Detail::Failure {
                context: context.into(),
                message: message.into(),
            },
        )
    }

    fn new(tag: Tag, subject: impl Into<String>, detail: Detail) -> Self {
        Self {
            tag,
            subject: subject.into(),
            detail,
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn detail(&self) -> &Detail {
        &self.detail
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Detail::Value(value) => write!(f, "{} {} : {}", self.tag, self.subject, value),
            Detail::Times(times) => write!(
                f,
                "{} {} (Last Accessed: {}, Created: {})",
                self.tag,
                self.subject,
                format_timestamp(times.last_accessed.as_ref()),
                format_timestamp(times.created.as_ref())
            ),
            Detail::DeletedOn(created) => write!(
                f,
                "{} {} (Deleted on: {})",
                self.tag,
                self.subject,
                format_timestamp(created.as_ref())
            ),
            Detail::Renamed => write!(
                f,
                "{} {} (Renamed or suspiciously modified)",
                self.tag, self.subject
            ),
            Detail::ExecutedOn(accessed) => write!(
                f,
                "{} {} (Executed on: {})",
                self.tag,
                self.subject,
                format_timestamp(accessed.as_ref())
            ),
            Detail::Failure { context, message } => {
                write!(f, "{} {} {}: {}", self.tag, context, self.subject, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_value_line() {
        let finding = Finding::suspicious_value(
            "HKEY_CURRENT_USER\\Software\\Run",
            "C:\\tools\\injector.exe",
        );
        assert_eq!(
            finding.to_string(),
            "[SUSPICIOUS] HKEY_CURRENT_USER\\Software\\Run : C:\\tools\\injector.exe"
        );
        assert_eq!(finding.tag(), Tag::Suspicious);
    }

    #[test]
    fn test_timestamp_lines() {
        let times = Timestamps::new(Some(at(2024, 3, 1, 9, 5, 7)), Some(at(2024, 2, 28, 23, 0, 0)));

        assert_eq!(
            Finding::hidden("/tmp/.x", times).to_string(),
            "[HIDDEN] /tmp/.x (Last Accessed: 2024-03-01 09:05:07, Created: 2024-02-28 23:00:00)"
        );
        assert_eq!(
            Finding::prefetch("C:\\Windows\\Prefetch\\CHEAT.EXE-1A2B.pf", times).to_string(),
            "[PREFETCH] C:\\Windows\\Prefetch\\CHEAT.EXE-1A2B.pf (Last Accessed: 2024-03-01 09:05:07, Created: 2024-02-28 23:00:00)"
        );
        assert_eq!(
            Finding::deleted("/tmp/a", times.created).to_string(),
            "[DELETED] /tmp/a (Deleted on: 2024-02-28 23:00:00)"
        );
        assert_eq!(
            Finding::executed("/tmp/a.exe", times.last_accessed).to_string(),
            "[EXECUTED] /tmp/a.exe (Executed on: 2024-03-01 09:05:07)"
        );
    }

    #[test]
    fn test_missing_timestamps_render_unknown() {
        let finding = Finding::suspicious_file("/tmp/hack.txt", Timestamps::default());
        assert_eq!(
            finding.to_string(),
            "[SUSPICIOUS] /tmp/hack.txt (Last Accessed: Unknown, Created: Unknown)"
        );
    }

    #[test]
    fn test_rename_and_error_lines() {
        assert_eq!(
            Finding::renamed("/tmp/trainer.bin").to_string(),
            "[RENAME] /tmp/trainer.bin (Renamed or suspiciously modified)"
        );
        assert_eq!(
            Finding::error("Failed to scan", "HKEY_LOCAL_MACHINE\\Software", "Access is denied.")
                .to_string(),
            "[ERROR] Failed to scan HKEY_LOCAL_MACHINE\\Software: Access is denied."
        );
    }

    #[test]
    fn test_tag_labels() {
        let labels: Vec<_> = Tag::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "[SUSPICIOUS]",
                "[HIDDEN]",
                "[DELETED]",
                "[RENAME]",
                "[EXECUTED]",
                "[PREFETCH]",
                "[ERROR]"
            ]
        );
    }
}
