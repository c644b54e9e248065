//! Walk listeners.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::analyser::ClassDependencyAnalyser;
use crate::error::{ClassFileError, WalkError};
use crate::extract::{ClassSink, ExtractionMode, extract_class};

/// Callbacks fired by a walk, in this order: `walk_started`, then for each
/// file `file_opened`, `process_class`*, `file_closed`, then `walk_finished`.
///
/// `progress` is a percentage: of files for `file_opened`, of entries within
/// the current file for `process_class`.
pub trait ClassWalkListener {
    fn walk_started(&mut self, _base: &Path) {}

    fn file_opened(&mut self, _progress: u8, _file: &Path) {}

    fn process_class(&mut self, progress: u8, bytes: &[u8]) -> Result<(), ClassFileError>;

    fn file_closed(&mut self) {}

    fn walk_finished(&mut self) {}

    fn error(&mut self, _file: &Path, _cause: &WalkError) {}

    /// Only fired when the walker runs in debug mode.
    fn debug(&mut self, _message: &str) {}
}

#[derive(Debug, Default)]
pub struct FileTracker {
    current: Option<PathBuf>,
    classes: usize,
}

impl FileTracker {
    pub fn open(&mut self, file: &Path) {
        self.current = Some(file.to_path_buf());
        self.classes = 0;
    }

    pub fn record_class(&mut self) {
        self.classes += 1;
    }

    pub fn close(&mut self) -> Option<(PathBuf, usize)> {
        let file = self.current.take()?;
        Some((file, std::mem::take(&mut self.classes)))
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn class_count(&self) -> usize {
        self.classes
    }
}

/// Feeds the classes of a walk into an analyser.
pub struct AnalysisListener<'a> {
    analyser: &'a mut ClassDependencyAnalyser,
    mode: ExtractionMode,
    tracker: FileTracker,
    containers: BTreeSet<PathBuf>,
    conflicts: usize,
    errors: usize,
}

impl<'a> AnalysisListener<'a> {
    pub fn new(analyser: &'a mut ClassDependencyAnalyser, mode: ExtractionMode) -> Self {
        Self {
            analyser,
            mode,
            tracker: FileTracker::default(),
            containers: BTreeSet::new(),
            conflicts: 0,
            errors: 0,
        }
    }

    pub fn containers(&self) -> &BTreeSet<PathBuf> {
        &self.containers
    }

    /// Classes that were already registered from another container.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl ClassWalkListener for AnalysisListener<'_> {
    fn walk_started(&mut self, base: &Path) {
        match self.mode {
            ExtractionMode::Dependencies => {
                info!("Analysing dependencies in classes from {}", base.display())
            }
            ExtractionMode::Inventory => info!("Listing classes from {}", base.display()),
        }
    }

    fn file_opened(&mut self, progress: u8, file: &Path) {
        debug!(progress, file = %file.display(), "Opened container");
        self.tracker.open(file);
    }

    fn process_class(&mut self, _progress: u8, bytes: &[u8]) -> Result<(), ClassFileError> {
        let container = self.tracker.current().map(Path::to_path_buf).unwrap_or_default();
        let mut sink = ConflictAwareSink {
            analyser: &mut *self.analyser,
            conflicts: &mut self.conflicts,
        };
        let class_name = extract_class(bytes, &container, self.mode, &mut sink)?;
        debug!(class = %class_name, "Processed class");
        self.tracker.record_class();
        self.containers.insert(container);
        Ok(())
    }

    fn file_closed(&mut self) {
        let Some((file, count)) = self.tracker.close() else {
            return;
        };
        match self.mode {
            ExtractionMode::Dependencies => {
                info!("Analysed {count} classes in file {}", file.display())
            }
            ExtractionMode::Inventory => info!("Found {count} classes in file {}", file.display()),
        }
    }

    fn walk_finished(&mut self) {
        match self.mode {
            ExtractionMode::Dependencies => info!("Dependency analysis done."),
            ExtractionMode::Inventory => info!("Listing done."),
        }
    }

    fn error(&mut self, file: &Path, cause: &WalkError) {
        self.errors += 1;
        error!(file = %file.display(), "{cause}");
    }

    fn debug(&mut self, message: &str) {
        debug!("{message}");
    }
}

struct ConflictAwareSink<'s> {
    analyser: &'s mut ClassDependencyAnalyser,
    conflicts: &'s mut usize,
}

impl ClassSink for ConflictAwareSink<'_> {
    fn add_class(&mut self, container: &Path, class_name: &str) -> bool {
        let previous = self.analyser.container_of(class_name).map(Path::to_path_buf);
        if let Some(previous) = previous
            && previous != container
        {
            *self.conflicts += 1;
            warn!(
                class = class_name,
                previous = %previous.display(),
                container = %container.display(),
                "Class found in more than one container"
            );
        }
        self.analyser.add_class(container, class_name)
    }

    fn add_dependency(&mut self, from: &str, to: Option<&str>) -> bool {
        self.analyser.add_dependency(from, to)
    }
}
