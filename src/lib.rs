//! dirsort - sort files into category folders
//!
//! This library scans a source tree, decides a category for every file either
//! from its extension or from a delimited segment of its name, and copies (or
//! moves) each file into a matching subdirectory of a target folder. Runs
//! execute on a worker thread and report progress and a per-file result.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod scanner;

pub use classifier::{Classifier, ClassifierError, DelimiterClassifier, DelimiterSpec, ExtensionClassifier};
pub use config::{AppConfig, ConfigError, DelimiterPreset, DelimiterPresets, ExtensionProfiles};
pub use file_category::{ExtensionMap, ExtensionMapError};
pub use file_organizer::{FileMover, OrganizeError};
pub use orchestrator::{ClassificationMode, Orchestrator, RunError, RunRequest, RunState};
pub use report::{BatchResult, FailureKind, RunEvent};
pub use scanner::{FileDescriptor, ScanError, ScanPolicy, scan_files};

pub use cli::{Cli, run_cli};
