//! # mavenizer
//!
//! Bytecode dependency analysis of pre-built, non-Maven binaries, and their
//! description as Maven artifacts.
//!
//! ## Architecture
//!
//! - **depset**: Ordered dependency pair sets, with a builder and a frozen form
//! - **classfile**: Class file decoding and the structural `ClassVisitor`
//! - **descriptor**: Class names inside descriptors and generic signatures
//! - **extract**: Reports a class and its references to a `ClassSink`
//! - **pattern**: Provided-class globs and the platform baseline
//! - **analyser**: Class, file and unresolved dependency aggregation
//! - **scan**: Container discovery with include/exclude filters
//! - **walker**: Container traversal with listener fan-out
//! - **listener**: Walk listeners feeding the analyser
//! - **maven**: Artifact coordinates, jar identification and the run registry
//! - **serialize**: XML analysis result and all-or-nothing writes
//! - **incremental**: Skips analysis when the result is newer than the binaries
//! - **config**: Analysis settings from JSON and the command line
//! - **pipeline**: One analysis run end to end

pub mod analyser;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod depset;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod incremental;
pub mod listener;
pub mod maven;
pub mod pattern;
pub mod pipeline;
pub mod scan;
pub mod serialize;
pub mod walker;
