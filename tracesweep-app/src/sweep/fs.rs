//! Read-only filesystem access used by the directory, trash and
//! execution-cache scanners.
//!
//! Enumeration is lazy: [`FileSystem::walk`] hands back an iterator that reads
//! directories as it is advanced, so a caller can stop at any point.

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracesweep_core::{SweepError, Timestamps};

/// A file as seen during enumeration. Metadata is captured when the entry is
/// listed and is not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub extension: Option<String>,
    pub hidden: bool,
    pub times: Timestamps,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, hidden: bool, times: Timestamps) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        Self {
            path,
            name,
            extension,
            hidden,
            times,
        }
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Case-insensitive extension test, without the leading dot.
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext.trim_start_matches('.')))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDepth {
    TopLevel,
    Recursive,
}

#[derive(Error, Debug)]
pub enum WalkError {
    /// Access to a directory was refused.
    #[error("Access denied: {}", path.display())]
    Denied { path: PathBuf },

    /// A single entry could not be described.
    #[error("{source}")]
    Entry { path: PathBuf, source: io::Error },

    /// A directory could not be read for a reason other than access.
    #[error("{source}")]
    Subtree { path: PathBuf, source: io::Error },
}

impl WalkError {
    pub fn path(&self) -> &Path {
        match self {
            WalkError::Denied { path }
            | WalkError::Entry { path, .. }
            | WalkError::Subtree { path, .. } => path,
        }
    }
}

impl From<WalkError> for SweepError {
    fn from(err: WalkError) -> Self {
        SweepError::Walk {
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub type Walk<'a> = Box<dyn Iterator<Item = Result<FileEntry, WalkError>> + 'a>;

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Files under `root` (directories themselves are not yielded).
    fn walk<'a>(&'a self, root: &Path, depth: WalkDepth) -> Walk<'a>;

    /// Roots of every mounted drive.
    fn drives(&self) -> Vec<PathBuf>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    /// Does not follow symlinks: a dangling link is still on disk.
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk<'a>(&'a self, root: &Path, depth: WalkDepth) -> Walk<'a> {
        let max_depth = match depth {
            WalkDepth::TopLevel => 1,
            WalkDepth::Recursive => usize::MAX,
        };

        let iter = walkdir::WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_map(|item| match item {
                Ok(entry) if entry.file_type().is_dir() => None,
                Ok(entry) => Some(describe(&entry)),
                Err(err) => Some(Err(classify_walk_error(err))),
            });

        Box::new(iter)
    }

    fn drives(&self) -> Vec<PathBuf> {
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let mut roots: Vec<PathBuf> = disks
            .list()
            .iter()
            .map(|disk| disk.mount_point().to_path_buf())
            .collect();
        roots.sort();
        roots.dedup();
        roots
    }
}

fn describe(entry: &walkdir::DirEntry) -> Result<FileEntry, WalkError> {
    let metadata = entry.metadata().map_err(|err| WalkError::Entry {
        path: entry.path().to_path_buf(),
        source: err.into(),
    })?;

    let name = entry.file_name().to_string_lossy();
    let times = Timestamps::new(
        metadata.accessed().ok().map(DateTime::<Local>::from),
        metadata.created().ok().map(DateTime::<Local>::from),
    );

    Ok(FileEntry::new(
        entry.path(),
        is_hidden(&name, &metadata),
        times,
    ))
}

fn classify_walk_error(err: walkdir::Error) -> WalkError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let source: io::Error = err.into();
    if source.kind() == io::ErrorKind::PermissionDenied {
        WalkError::Denied { path }
    } else {
        WalkError::Subtree { path, source }
    }
}

#[cfg(windows)]
fn is_hidden(_name: &str, metadata: &std::fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _metadata: &std::fs::Metadata) -> bool {
    name.starts_with('.')
}

#[derive(Debug, Clone)]
enum Node {
    File { entry: FileEntry, present: bool },
    Denied(PathBuf),
    Broken { path: PathBuf, message: String },
    Unreadable { path: PathBuf, message: String },
}

impl Node {
    fn path(&self) -> &Path {
        match self {
            Node::File { entry, .. } => &entry.path,
            Node::Denied(path) => path,
            Node::Broken { path, .. } | Node::Unreadable { path, .. } => path,
        }
    }
}

/// In-memory filesystem for exercising scanners against races and failures
/// that are hard to stage on a real disk. Walks yield nodes in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    dirs: Vec<PathBuf>,
    nodes: Vec<Node>,
    drives: Vec<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.push(path.into());
        self
    }

    pub fn with_drive(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.dirs.push(path.clone());
        self.drives.push(path);
        self
    }

    pub fn with_file(mut self, entry: FileEntry) -> Self {
        self.nodes.push(Node::File {
            entry,
            present: true,
        });
        self
    }

    /// Listed by the walk but gone by the time anyone checks for it.
    pub fn with_vanished_file(mut self, entry: FileEntry) -> Self {
        self.nodes.push(Node::File {
            entry,
            present: false,
        });
        self
    }

    pub fn with_denied(mut self, path: impl Into<PathBuf>) -> Self {
        self.nodes.push(Node::Denied(path.into()));
        self
    }

    /// An entry whose metadata cannot be read.
    pub fn with_broken_entry(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.nodes.push(Node::Broken {
            path: path.into(),
            message: message.to_string(),
        });
        self
    }

    /// A directory that fails to enumerate for a reason other than access.
    pub fn with_unreadable_dir(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.nodes.push(Node::Unreadable {
            path: path.into(),
            message: message.to_string(),
        });
        self
    }

    fn in_scope(root: &Path, path: &Path, depth: WalkDepth) -> bool {
        match depth {
            WalkDepth::TopLevel => path.parent() == Some(root),
            WalkDepth::Recursive => path != root && path.starts_with(root),
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_dir(path)
            || self.nodes.iter().any(|node| {
                matches!(node, Node::File { entry, present: true } if entry.path == path)
            })
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| d == path)
            || self
                .nodes
                .iter()
                .any(|node| node.path() != path && node.path().starts_with(path))
    }

    fn walk<'a>(&'a self, root: &Path, depth: WalkDepth) -> Walk<'a> {
        let root = root.to_path_buf();
        let iter = self
            .nodes
            .iter()
            .filter(move |node| {
                // Denials may be reported for the root itself.
                node.path() == root || Self::in_scope(&root, node.path(), depth)
            })
            .filter_map(|node| match node {
                Node::File { entry, .. } => Some(Ok(entry.clone())),
                Node::Denied(path) => Some(Err(WalkError::Denied { path: path.clone() })),
                Node::Broken { path, message } => Some(Err(WalkError::Entry {
                    path: path.clone(),
                    source: io::Error::new(io::ErrorKind::Other, message.clone()),
                })),
                Node::Unreadable { path, message } => Some(Err(WalkError::Subtree {
                    path: path.clone(),
                    source: io::Error::new(io::ErrorKind::Other, message.clone()),
                })),
            });
        Box::new(iter)
    }

    fn drives(&self) -> Vec<PathBuf> {
        self.drives.clone()
    }
}
