use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::maven::FileMavenInfo;

#[derive(Debug, Clone, Parser)]
#[command(name = "mavenizer")]
#[command(about = "Analyse class dependencies between pre-built binaries and describe them as Maven artifacts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file; flags override its values.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Analyse the binaries and write the artifact description.
    Analyze(AnalyzeArgs),
    /// Analyse the binaries and only list unresolved classes.
    Unresolved(AnalyzeArgs),
    /// Delete the analysis result.
    Clean {
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeArgs {
    #[arg(value_name = "DIR")]
    pub binaries_dir: Option<PathBuf>,

    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub local_repository: Option<PathBuf>,

    /// Containers to analyse, relative to DIR.
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Containers that are only listed as available.
    #[arg(long, value_name = "GLOB")]
    pub deps_include: Vec<String>,

    #[arg(long, value_name = "GLOB")]
    pub deps_exclude: Vec<String>,

    #[arg(long, value_name = "FILE")]
    pub dependency_file: Vec<PathBuf>,

    /// Replaces the built-in JVM provided classes.
    #[arg(long, value_name = "PATTERN")]
    pub jvm_provided: Vec<String>,

    #[arg(long, value_name = "PATTERN")]
    pub provided: Vec<String>,

    /// `[name=]groupId:artifactId:version[:classifier]`
    #[arg(long, value_name = "HINT")]
    pub artifact: Vec<FileMavenInfo>,

    /// Report unreadable containers and go on.
    #[arg(long)]
    pub lenient: bool,

    /// Analyse even when the result is newer than the binaries.
    #[arg(long)]
    pub force: bool,
}
