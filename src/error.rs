use std::path::{Path, PathBuf};

use thiserror::Error;

/// Decoding failures for a single class file.
#[derive(Debug, Error)]
pub enum ClassFileError {
    #[error("unexpected end of class data")]
    UnexpectedEof,
    #[error("invalid class file magic: 0x{0:08x}")]
    InvalidMagic(u32),
    #[error("invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("invalid constant pool tag: {0}")]
    InvalidConstantPoolTag(u8),
    #[error("constant pool type mismatch at index {index}: expected {expected}, found {found}")]
    ConstantPoolTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid annotation element tag: {0}")]
    InvalidElementValueTag(u8),
    #[error("invalid modified UTF-8 constant")]
    InvalidModifiedUtf8,
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("trailing bytes after class data")]
    TrailingBytes,
}

/// A failure while walking containers, always tied to the offending file.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("failed to read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read archive {}: {source}", file.display())]
    Archive {
        file: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to decode class in {}: {source}", file.display())]
    Class {
        file: PathBuf,
        #[source]
        source: ClassFileError,
    },
    #[error("failed to enumerate {}: {source}", file.display())]
    Scan {
        file: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl WalkError {
    pub fn file(&self) -> &Path {
        match self {
            WalkError::Io { file, .. }
            | WalkError::Archive { file, .. }
            | WalkError::Class { file, .. }
            | WalkError::Scan { file, .. } => file,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid provided class pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: globset::Error,
}

#[derive(Debug, Error)]
pub enum MavenError {
    #[error("coordinates of {} are incomplete or invalid: {reason}", file.display())]
    InvalidCoordinates { file: PathBuf, reason: String },
    #[error("duplicate artifact information for {}", name.as_deref().unwrap_or("default values"))]
    DuplicateInfo { name: Option<String> },
    #[error("requested coordinates mismatch the existing record for {}", file.display())]
    Mismatch { file: PathBuf },
    #[error("failed to identify {}: {source}", file.display())]
    Identify {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to identify {}: {source}", file.display())]
    IdentifyArchive {
        file: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}
