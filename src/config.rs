use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cli::{AnalyzeArgs, Cli};
use crate::maven::FileMavenInfo;
use crate::pattern::{DEFAULT_JVM_PROVIDED_CLASSES, ProvidedClasses};
use crate::scan::{PathFilter, default_m2_repository};
use crate::walker::ErrorPolicy;

pub const DEFAULT_OUTPUT: &str = "target/mavenizer/mavenizer.xml";

/// Settings of one analysis run, read from an optional JSON file and then
/// overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub binaries_dir: PathBuf,
    pub output: PathBuf,
    pub local_repository: Option<PathBuf>,
    pub libs_includes: Vec<String>,
    pub libs_excludes: Vec<String>,
    pub deps_includes: Vec<String>,
    pub deps_excludes: Vec<String>,
    /// Containers that are only listed, never analysed.
    pub dependency_files: Vec<PathBuf>,
    /// Replaces the built-in JVM list when set.
    pub jvm_provided_classes: Option<Vec<String>>,
    pub provided_classes: Vec<String>,
    pub artifacts: Vec<FileMavenInfo>,
    pub error_policy: ErrorPolicy,
    pub debug: bool,
    pub force: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            binaries_dir: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            local_repository: None,
            libs_includes: Vec::new(),
            libs_excludes: Vec::new(),
            deps_includes: Vec::new(),
            deps_excludes: Vec::new(),
            dependency_files: Vec::new(),
            jvm_provided_classes: None,
            provided_classes: Vec::new(),
            artifacts: Vec::new(),
            error_policy: ErrorPolicy::Strict,
            debug: false,
            force: false,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Patterns handed to the analyser, JVM ones first.
    pub fn all_provided_classes(&self) -> Vec<String> {
        let jvm: Vec<String> = match &self.jvm_provided_classes {
            Some(list) => list.clone(),
            None => DEFAULT_JVM_PROVIDED_CLASSES.iter().map(|s| s.to_string()).collect(),
        };
        jvm.into_iter().chain(self.provided_classes.iter().cloned()).collect()
    }

    pub fn has_deps_walk(&self) -> bool {
        !self.deps_includes.is_empty() || !self.deps_excludes.is_empty()
    }

    /// Rejects what would only fail later, and makes paths absolute.
    pub fn validate(&mut self) -> Result<()> {
        self.binaries_dir = self.binaries_dir.canonicalize().with_context(|| {
            format!("Binaries directory not found: {}", self.binaries_dir.display())
        })?;
        if !self.binaries_dir.is_dir() {
            anyhow::bail!("Binaries path is not a directory: {}", self.binaries_dir.display());
        }
        self.output = std::path::absolute(&self.output)
            .with_context(|| format!("Invalid output path: {}", self.output.display()))?;
        if self.local_repository.is_none() {
            self.local_repository = default_m2_repository().ok();
        }

        let mut provided = ProvidedClasses::new();
        for pattern in self.all_provided_classes() {
            provided.add(&pattern)?;
        }
        PathFilter::new(&self.libs_includes, &self.libs_excludes)?;
        PathFilter::new(&self.deps_includes, &self.deps_excludes)?;

        let mut names = HashSet::new();
        for info in &self.artifacts {
            if !names.insert(info.name.as_deref()) {
                anyhow::bail!(
                    "Duplicate artifact information for {}",
                    info.name.as_deref().unwrap_or("default values")
                );
            }
        }
        Ok(())
    }
}

/// Config file (if any) overridden by the `analyze` flags.
pub fn resolve_config(cli: &Cli, args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(dir) = &args.binaries_dir {
        config.binaries_dir = dir.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(repo) = &args.local_repository {
        config.local_repository = Some(repo.clone());
    }
    config.libs_includes.extend(args.include.iter().cloned());
    config.libs_excludes.extend(args.exclude.iter().cloned());
    config.deps_includes.extend(args.deps_include.iter().cloned());
    config.deps_excludes.extend(args.deps_exclude.iter().cloned());
    config.dependency_files.extend(args.dependency_file.iter().cloned());
    if !args.jvm_provided.is_empty() {
        config.jvm_provided_classes = Some(args.jvm_provided.clone());
    }
    config.provided_classes.extend(args.provided.iter().cloned());
    config.artifacts.extend(args.artifact.iter().cloned());
    if args.lenient {
        config.error_policy = ErrorPolicy::Lenient;
    }
    config.debug |= cli.debug;
    config.force |= args.force;

    config.validate()?;
    Ok(config)
}

/// Output path for `clean`: the flag, the config file, or the default.
pub fn resolve_output(cli: &Cli, output: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = output {
        return Ok(p.to_path_buf());
    }
    match &cli.config {
        Some(path) => Ok(AnalysisConfig::load(path)?.output),
        None => Ok(PathBuf::from(DEFAULT_OUTPUT)),
    }
}

pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove analysis result: {}", path.display()))?;
    Ok(true)
}
