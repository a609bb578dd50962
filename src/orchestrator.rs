//! Drives one scan → classify → place run, optionally on a worker thread.
//!
//! [`run_classification`] is the synchronous pipeline. [`Orchestrator`] wraps
//! it in a background thread and streams [`RunEvent`]s over a channel so the
//! caller stays responsive. An orchestrator runs at most one job at a time.

use crate::classifier::{
    Classifier, ClassifierError, DelimiterClassifier, DelimiterSpec, ExtensionClassifier,
};
use crate::file_category::{ExtensionMap, ExtensionMapError, split_extension};
use crate::report::{BatchResult, RunEvent};
use crate::scanner::{ScanError, ScanPolicy, scan_files};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{error, info};

/// Percentage reported while scanning.
pub const SCAN_PERCENT: u8 = 10;
/// Percentage reported once the file list is known; classification fills the rest.
pub const FOUND_PERCENT: u8 = 20;
/// Longest file name shown in progress messages.
pub const DISPLAY_NAME_LIMIT: usize = 40;

/// Which classifier a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    #[default]
    Extension,
    Delimiter,
}

/// Extension map as handed over by the caller.
#[derive(Debug, Clone)]
pub enum ExtensionInput {
    Parsed(ExtensionMap),
    /// A JSON object of `"ext": "Category"` pairs, parsed when the run starts.
    Serialized(String),
}

impl ExtensionInput {
    fn parse(&self) -> Result<ExtensionMap, ExtensionMapError> {
        match self {
            ExtensionInput::Parsed(map) => Ok(map.clone()),
            ExtensionInput::Serialized(text) => ExtensionMap::from_json(text),
        }
    }
}

impl Default for ExtensionInput {
    fn default() -> Self {
        ExtensionInput::Parsed(ExtensionMap::default())
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub mode: ClassificationMode,
    pub scan: ScanPolicy,
    pub delete_source: bool,
    pub extensions: ExtensionInput,
    pub delimiter: DelimiterSpec,
}

impl RunRequest {
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            mode: ClassificationMode::default(),
            scan: ScanPolicy::default(),
            delete_source: false,
            extensions: ExtensionInput::default(),
            delimiter: DelimiterSpec::default(),
        }
    }

    /// Cheap checks done before any work is scheduled.
    ///
    /// # Errors
    ///
    /// `InvalidSource` when the source is missing, `InvalidTarget` when the
    /// target is empty, and the parse or spec error of the selected mode.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.source_dir.as_os_str().is_empty() || !self.source_dir.exists() {
            return Err(RunError::InvalidSource(self.source_dir.clone()));
        }
        if self.target_dir.as_os_str().is_empty() {
            return Err(RunError::InvalidTarget);
        }
        match self.mode {
            ClassificationMode::Extension => {
                self.extensions.parse()?;
            }
            ClassificationMode::Delimiter => self.delimiter.validate()?,
        }
        Ok(())
    }

    fn build_classifier(&self) -> Result<Classifier, RunError> {
        let classifier: Classifier = match self.mode {
            ClassificationMode::Extension => ExtensionClassifier::new(
                self.extensions.parse()?,
                &self.target_dir,
                self.delete_source,
            )?
            .into(),
            ClassificationMode::Delimiter => DelimiterClassifier::new(
                self.delimiter.clone(),
                &self.target_dir,
                self.delete_source,
            )?
            .into(),
        };
        Ok(classifier)
    }
}

/// Run-level failures. Any of these aborts the run without a result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("please choose a valid source folder: {}", .0.display())]
    InvalidSource(PathBuf),
    #[error("please choose a target folder")]
    InvalidTarget,
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    ExtensionMap(#[from] ExtensionMapError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("could not start worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Lifecycle of an orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Scanning,
    Classifying,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Scanning | RunState::Classifying)
    }
}

/// Receives notifications from a run.
pub trait ProgressSink {
    /// A progress checkpoint; `percent` never decreases within a run.
    fn progress(&mut self, percent: u8, message: &str);

    /// The run moved to a new stage.
    fn stage(&mut self, _state: RunState) {}
}

/// Runs the whole pipeline on the current thread.
///
/// The classifier is built before scanning so bad input fails before any
/// file is read. An empty scan short-circuits with an all-zero result.
///
/// # Errors
///
/// Any [`RunError`]; per-file problems are reported inside the result instead.
pub fn run_classification<S: ProgressSink>(
    request: &RunRequest,
    sink: &mut S,
) -> Result<BatchResult, RunError> {
    let classifier = request.build_classifier()?;

    sink.stage(RunState::Scanning);
    sink.progress(SCAN_PERCENT, "Scanning files...");
    let files = scan_files(&request.source_dir, request.scan)?;
    let total = files.len();

    if total == 0 {
        let mut result = BatchResult::new();
        result.finish();
        sink.progress(100, "No files found");
        return Ok(result);
    }

    info!(
        source = %request.source_dir.display(),
        target = %request.target_dir.display(),
        mode = ?request.mode,
        files = total,
        "classification started"
    );
    sink.stage(RunState::Classifying);
    sink.progress(
        FOUND_PERCENT,
        &format!("Found {} files, classifying...", total),
    );

    let mut result = classifier.classify(&files, |processed, file_name| {
        sink.progress(
            classification_percent(processed, total),
            &format!("Processing: {}", truncate_file_name(file_name, DISPLAY_NAME_LIMIT)),
        );
    });
    result.total_files = total;
    result.finish();

    info!(
        succeeded = result.success_count,
        failed = result.failed_count,
        skipped = result.skipped_count(),
        "classification complete"
    );
    sink.progress(100, "Classification complete");
    Ok(result)
}

/// Maps per-file progress into the 20..=100 band.
pub fn classification_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return FOUND_PERCENT;
    }
    let span = (100 - FOUND_PERCENT) as usize;
    let percent = FOUND_PERCENT as usize + processed.min(total) * span / total;
    percent as u8
}

/// Shortens long names for display, keeping the extension when there is room.
///
/// With the default limit, a 50 character stem ending in `.jpeg` is shown as
/// its first 32 characters, then `...`, then `.jpeg`.
pub fn truncate_file_name(file_name: &str, max_len: usize) -> String {
    if file_name.chars().count() <= max_len {
        return file_name.to_string();
    }

    let (stem, ext) = split_extension(file_name);
    let ext_len = ext.chars().count();
    let available = max_len.saturating_sub(ext_len + 3);
    if available < 5 {
        let head: String = file_name.chars().take(max_len.saturating_sub(3)).collect();
        return format!("{}...", head);
    }

    let head: String = stem.chars().take(available).collect();
    format!("{}...{}", head, ext)
}

/// Forwards progress and stage changes from the worker thread.
struct ChannelSink {
    events: Sender<RunEvent>,
    state: Arc<Mutex<RunState>>,
}

impl ProgressSink for ChannelSink {
    fn progress(&mut self, percent: u8, message: &str) {
        let _ = self.events.send(RunEvent::Progress {
            percent,
            message: message.to_string(),
        });
    }

    fn stage(&mut self, state: RunState) {
        *self.state.lock() = state;
    }
}

/// A started run. Drain `events` until a terminal event arrives.
pub struct RunHandle {
    pub events: Receiver<RunEvent>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunHandle {
    /// Blocks until the run ends and returns its terminal event.
    ///
    /// Progress events are handed to `on_progress` in the order they were sent.
    pub fn wait<F: FnMut(u8, &str)>(mut self, mut on_progress: F) -> RunEvent {
        let mut last = RunEvent::Failed("run ended without a result".to_string());
        for event in self.events.iter() {
            match event {
                RunEvent::Progress { percent, ref message } => on_progress(percent, message),
                terminal => {
                    last = terminal;
                    break;
                }
            }
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        last
    }
}

/// Owns the single-run-at-a-time rule and the worker thread.
#[derive(Debug, Default)]
pub struct Orchestrator {
    state: Arc<Mutex<RunState>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    /// Starts a run on a background thread.
    ///
    /// Returns `None` and does nothing if a run is already active. Input that
    /// fails [`RunRequest::validate`] yields a handle whose only event is
    /// [`RunEvent::Failed`]; no thread is spawned for it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::orchestrator::{Orchestrator, RunRequest};
    /// use dirsort::report::RunEvent;
    ///
    /// let orchestrator = Orchestrator::new();
    /// let handle = orchestrator
    ///     .start(RunRequest::new("/path/to/source", "/path/to/target"))
    ///     .expect("no other run active");
    /// match handle.wait(|percent, message| println!("{percent:>3}% {message}")) {
    ///     RunEvent::Completed(result) => println!("{} files sorted", result.success_count),
    ///     RunEvent::Failed(message) => eprintln!("{message}"),
    ///     RunEvent::Progress { .. } => unreachable!(),
    /// }
    /// ```
    pub fn start(&self, request: RunRequest) -> Option<RunHandle> {
        {
            let mut state = self.state.lock();
            if state.is_active() {
                info!("run already active, start request ignored");
                return None;
            }
            *state = RunState::Scanning;
        }

        let (tx, rx) = crossbeam_channel::unbounded::<RunEvent>();

        if let Err(e) = request.validate() {
            self.fail(&tx, &e);
            return Some(RunHandle {
                events: rx,
                thread: None,
            });
        }

        let state = Arc::clone(&self.state);
        let worker_tx = tx.clone();
        let spawned = thread::Builder::new()
            .name("dirsort-worker".into())
            .spawn(move || {
                let mut sink = ChannelSink {
                    events: worker_tx,
                    state,
                };
                match run_classification(&request, &mut sink) {
                    Ok(result) => {
                        *sink.state.lock() = RunState::Completed;
                        let _ = sink.events.send(RunEvent::Completed(result));
                    }
                    Err(e) => {
                        error!(error = %e, "classification failed");
                        *sink.state.lock() = RunState::Failed;
                        let _ = sink.events.send(RunEvent::Failed(failure_message(&e)));
                    }
                }
            });

        match spawned {
            Ok(thread) => Some(RunHandle {
                events: rx,
                thread: Some(thread),
            }),
            Err(e) => {
                self.fail(&tx, &RunError::Spawn(e));
                Some(RunHandle {
                    events: rx,
                    thread: None,
                })
            }
        }
    }

    fn fail(&self, tx: &Sender<RunEvent>, e: &RunError) {
        error!(error = %e, "run rejected");
        *self.state.lock() = RunState::Failed;
        let _ = tx.send(RunEvent::Failed(failure_message(e)));
    }
}

fn failure_message(e: &RunError) -> String {
    format!("Classification failed: {}", e)
}
