// Sweep module - artifact scanners and the pass orchestrator

pub mod config_tree;
pub mod directory;
pub mod discovery;
pub mod fs;
pub mod prefetch;
#[cfg(windows)]
pub mod registry;
pub mod runner;
pub mod store;
pub mod system_info;
pub mod trash;

pub use config_tree::ConfigTreeScanner;
pub use directory::DirectoryScanner;
pub use discovery::SpecialFolders;
pub use fs::{FileEntry, FileSystem, LocalFileSystem, MemoryFileSystem, WalkDepth, WalkError};
pub use prefetch::ExecutionCacheScanner;
pub use runner::Sweep;
pub use store::{host_store, ConfigKey, ConfigStore, ConfigValue, EmptyStore, Hive, MemoryStore};
pub use system_info::BootInfo;
pub use trash::TrashScanner;
