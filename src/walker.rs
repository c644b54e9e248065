//! Enumeration of the classes held by a set of containers.
//!
//! A [`ClassWalker`] visits loose class files and jar-like archives, one
//! container at a time, and hands the bytes of every class to each attached
//! [`ClassWalkListener`] in attachment order. The walker owns each class buffer;
//! listeners only borrow it for the duration of the callback.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::error::{PatternError, WalkError};
use crate::listener::ClassWalkListener;
use crate::scan::{ContainerKind, PathFilter, container_kind, scan_files};

/// What to do when a container cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Abort the walk with the first [`WalkError`].
    #[default]
    Strict,
    /// Report the failure through `error` and go on with the next file.
    Lenient,
}

#[derive(Debug, Clone)]
pub enum WalkSource {
    /// Every container under `root` accepted by `filter`.
    Directory { root: PathBuf, filter: PathFilter },
    /// An explicit list of containers; `base` is only reported to listeners.
    Files { base: PathBuf, files: Vec<PathBuf> },
}

impl WalkSource {
    pub fn base(&self) -> &Path {
        match self {
            WalkSource::Directory { root, .. } => root,
            WalkSource::Files { base, .. } => base,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Containers walked to the end.
    pub files: usize,
    pub classes: usize,
    /// Containers reported through `error` under the lenient policy.
    pub failed: Vec<PathBuf>,
}

pub struct ClassWalker<'l> {
    source: WalkSource,
    policy: ErrorPolicy,
    debug: bool,
    listeners: Vec<&'l mut dyn ClassWalkListener>,
}

impl<'l> ClassWalker<'l> {
    pub fn new(source: WalkSource) -> Self {
        Self {
            source,
            policy: ErrorPolicy::default(),
            debug: false,
            listeners: Vec::new(),
        }
    }

    pub fn directory(
        root: impl Into<PathBuf>,
        includes: &[String],
        excludes: &[String],
    ) -> Result<Self, PatternError> {
        Ok(Self::new(WalkSource::Directory {
            root: root.into(),
            filter: PathFilter::new(includes, excludes)?,
        }))
    }

    pub fn files(base: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self::new(WalkSource::Files {
            base: base.into(),
            files,
        })
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn debug_mode(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn add_listener(&mut self, listener: &'l mut dyn ClassWalkListener) {
        self.listeners.push(listener);
    }

    /// Walks every container once.
    ///
    /// Under [`ErrorPolicy::Strict`] the first failure ends the walk and is
    /// returned; `walk_finished` is not fired in that case.
    pub fn scan(&mut self) -> Result<WalkSummary, WalkError> {
        let base = self.source.base().to_path_buf();
        self.each(|l| l.walk_started(&base));

        let mut summary = WalkSummary::default();
        let (files, scan_errors) = match &self.source {
            WalkSource::Directory { root, filter } => {
                let outcome = scan_files(root, filter);
                (outcome.files, outcome.errors)
            }
            WalkSource::Files { files, .. } => (files.clone(), Vec::new()),
        };
        for err in scan_errors {
            self.fail(err, &mut summary)?;
        }

        let containers: Vec<(PathBuf, ContainerKind)> = files
            .into_iter()
            .filter_map(|file| match container_kind(&file) {
                ContainerKind::Other => {
                    self.debug(|| format!("Skipping {}", file.display()));
                    None
                }
                kind => Some((file, kind)),
            })
            .collect();

        let total = containers.len();
        for (index, (file, kind)) in containers.iter().enumerate() {
            let progress = percent(index + 1, total);
            let mut opened = false;
            let result = match kind {
                ContainerKind::Archive => self.walk_archive(file, progress, &mut opened),
                _ => self.walk_class_file(file, progress, &mut opened),
            };
            if opened {
                self.each(|l| l.file_closed());
            }
            match result {
                Ok(classes) => {
                    summary.files += 1;
                    summary.classes += classes;
                }
                Err(err) => self.fail(err, &mut summary)?,
            }
        }

        self.each(|l| l.walk_finished());
        Ok(summary)
    }

    fn walk_class_file(
        &mut self,
        file: &Path,
        progress: u8,
        opened: &mut bool,
    ) -> Result<usize, WalkError> {
        let bytes = std::fs::read(file).map_err(|source| WalkError::Io {
            file: file.to_path_buf(),
            source,
        })?;
        self.each(|l| l.file_opened(progress, file));
        *opened = true;
        self.process(file, 100, &bytes)?;
        Ok(1)
    }

    fn walk_archive(
        &mut self,
        file: &Path,
        progress: u8,
        opened: &mut bool,
    ) -> Result<usize, WalkError> {
        let io_error = |source| WalkError::Io {
            file: file.to_path_buf(),
            source,
        };
        let archive_error = |source| WalkError::Archive {
            file: file.to_path_buf(),
            source,
        };

        let handle = File::open(file).map_err(io_error)?;
        // SAFETY: The file is opened read-only and outlives the mapping, which is
        // dropped at the end of this function.
        let mmap = unsafe { Mmap::map(&handle) }.map_err(io_error)?;
        let mut archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(archive_error)?;

        self.each(|l| l.file_opened(progress, file));
        *opened = true;

        let total = archive.len();
        let mut classes = 0;
        let mut buf = Vec::new();
        for index in 0..total {
            let mut entry = archive.by_index(index).map_err(archive_error)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            match container_kind(Path::new(&name)) {
                ContainerKind::ClassFile => {}
                ContainerKind::Archive => {
                    self.debug(|| format!("Not expanding nested archive {name} in {}", file.display()));
                    continue;
                }
                ContainerKind::Other => continue,
            }

            buf.clear();
            entry.read_to_end(&mut buf).map_err(io_error)?;
            drop(entry);
            self.debug(|| format!("Processing {name} from {}", file.display()));
            self.process(file, percent(index + 1, total), &buf)?;
            classes += 1;
        }
        Ok(classes)
    }

    fn process(&mut self, file: &Path, progress: u8, bytes: &[u8]) -> Result<(), WalkError> {
        for listener in &mut self.listeners {
            listener
                .process_class(progress, bytes)
                .map_err(|source| WalkError::Class {
                    file: file.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }

    fn fail(&mut self, err: WalkError, summary: &mut WalkSummary) -> Result<(), WalkError> {
        match self.policy {
            ErrorPolicy::Strict => Err(err),
            ErrorPolicy::Lenient => {
                let file = err.file().to_path_buf();
                self.each(|l| l.error(&file, &err));
                summary.failed.push(file);
                Ok(())
            }
        }
    }

    fn debug(&mut self, message: impl FnOnce() -> String) {
        if !self.debug {
            return;
        }
        let message = message();
        self.each(|l| l.debug(&message));
    }

    fn each(&mut self, mut event: impl FnMut(&mut dyn ClassWalkListener)) {
        for listener in &mut self.listeners {
            event(&mut **listener);
        }
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done * 100 / total).min(100) as u8
}
