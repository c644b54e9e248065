//! One analysis run: walks, artifact description and reports.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::analyser::{AnalysisResult, ClassDependencyAnalyser};
use crate::config::AnalysisConfig;
use crate::extract::ExtractionMode;
use crate::incremental::is_up_to_date;
use crate::listener::AnalysisListener;
use crate::maven::{MavenFileRegistry, MavenFileSet};
use crate::scan::PathFilter;
use crate::serialize::{ArtifactXml, write_atomically};
use crate::walker::{ClassWalker, WalkSource, WalkSummary};

#[derive(Debug)]
pub struct Analysis {
    pub result: AnalysisResult,
    /// Containers of the analysed classes.
    pub containers: BTreeSet<PathBuf>,
    pub libs: WalkSummary,
    /// Inventory walks, when configured.
    pub deps: Vec<WalkSummary>,
}

/// Walks the binaries, then the dependency-only containers.
pub fn analyse(config: &AnalysisConfig) -> Result<Analysis> {
    let mut analyser = ClassDependencyAnalyser::new();
    for pattern in config.all_provided_classes() {
        analyser.add_provided_classes(&pattern)?;
    }

    let libs_source = WalkSource::Directory {
        root: config.binaries_dir.clone(),
        filter: PathFilter::new(&config.libs_includes, &config.libs_excludes)?,
    };
    let (libs, containers) = walk(&mut analyser, libs_source, ExtractionMode::Dependencies, config)
        .context("Dependency analysis failed")?;

    let mut deps = Vec::new();
    if config.has_deps_walk() {
        let source = WalkSource::Directory {
            root: config.binaries_dir.clone(),
            filter: PathFilter::new(&config.deps_includes, &config.deps_excludes)?,
        };
        let (summary, _) = walk(&mut analyser, source, ExtractionMode::Inventory, config)
            .context("Listing dependency classes failed")?;
        deps.push(summary);
    }
    if !config.dependency_files.is_empty() {
        let source = WalkSource::Files {
            base: config.binaries_dir.clone(),
            files: config.dependency_files.clone(),
        };
        let (summary, _) = walk(&mut analyser, source, ExtractionMode::Inventory, config)
            .context("Listing dependency files failed")?;
        deps.push(summary);
    }

    let result = analyser.into_result();
    for (from, to) in result.file_dependencies_relative_to(&config.binaries_dir).edges() {
        debug!(from = %from.display(), to = %to.display(), "File dependency");
    }

    Ok(Analysis {
        result,
        containers,
        libs,
        deps,
    })
}

fn walk(
    analyser: &mut ClassDependencyAnalyser,
    source: WalkSource,
    mode: ExtractionMode,
    config: &AnalysisConfig,
) -> Result<(WalkSummary, BTreeSet<PathBuf>)> {
    let mut listener = AnalysisListener::new(analyser, mode);
    let mut walker = ClassWalker::new(source)
        .error_policy(config.error_policy)
        .debug_mode(config.debug);
    walker.add_listener(&mut listener);
    let summary = walker.scan()?;
    drop(walker);

    if listener.conflicts() > 0 {
        warn!(conflicts = listener.conflicts(), "Some classes were found in several containers");
    }
    Ok((summary, listener.containers().clone()))
}

/// Coordinates of every analysed container and of what it depends on.
pub fn describe(config: &AnalysisConfig, analysis: &Analysis) -> Result<MavenFileSet> {
    let mut registry = MavenFileRegistry::new();
    if let Some(repo) = &config.local_repository {
        registry = registry.with_local_repository(repo);
    }
    for info in &config.artifacts {
        registry.add_maven_info(info.clone())?;
    }
    let set = registry.maven_file_set(
        &analysis.result.file_dependencies,
        analysis.containers.iter().map(PathBuf::as_path),
    )?;
    Ok(set)
}

pub fn render(config: &AnalysisConfig, set: &MavenFileSet) -> String {
    ArtifactXml::new(Some(config.binaries_dir.as_path()), config.local_repository.as_deref()).render(set)
}

/// `referenced.Class (referenced by referencing.Class)` lines, sorted.
pub fn unresolved_report(result: &AnalysisResult) -> Vec<String> {
    result
        .unresolved_dependencies
        .iter()
        .filter_map(|pair| {
            let referencing = pair.to()?;
            Some(format!(
                "{} (referenced by {})",
                pair.from().replace('/', "."),
                referencing.replace('/', ".")
            ))
        })
        .collect()
}

/// Full `analyze` run. Returns `None` when the result was already up to date.
pub fn run(config: &AnalysisConfig) -> Result<Option<Analysis>> {
    if !config.force && is_up_to_date(&config.binaries_dir, &config.output)? {
        info!("No changes in binaries detected, skipping dependency analysis.");
        return Ok(None);
    }

    let analysis = analyse(config)?;
    let xml = describe(config, &analysis)
        .map(|set| render(config, &set))
        .context("Error while describing the analysed artifacts");
    let xml = match xml {
        Ok(xml) => xml,
        Err(err) => {
            let _ = crate::config::remove_file_if_exists(&config.output);
            return Err(err);
        }
    };
    write_atomically(&config.output, &xml)?;
    info!(output = %config.output.display(), "Wrote analysis result");
    Ok(Some(analysis))
}
