//! Aggregation of class observations into class, file and unresolved
//! dependency sets.
//!
//! The analyser is fed by the extractor through [`ClassSink`] and queried once
//! the walk is over. File-level and unresolved sets are derived data: they are
//! recomputed from `classes`, the class dependency set and the provided-class
//! patterns whenever one of those changed since the last resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::depset::{
    ClassDependencySet, DependencyPair, DependencySetBuilder, FileDependencySet,
};
use crate::error::PatternError;
use crate::extract::ClassSink;
use crate::pattern::{ProvidedClasses, is_platform_class};

#[derive(Debug)]
pub struct ClassDependencyAnalyser {
    classes: BTreeMap<String, PathBuf>,
    provided: ProvidedClasses,
    class_deps: DependencySetBuilder<String>,
    file_deps: DependencySetBuilder<PathBuf>,
    unresolved_deps: DependencySetBuilder<String>,
    resolved: bool,
}

impl Default for ClassDependencyAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassDependencyAnalyser {
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            provided: ProvidedClasses::new(),
            class_deps: DependencySetBuilder::new(),
            file_deps: DependencySetBuilder::new(),
            unresolved_deps: DependencySetBuilder::new(),
            resolved: true,
        }
    }

    /// Records `container` as the home of `class_name`.
    ///
    /// Returns `true` when the mapping is new or moved to another container;
    /// re-adding the same pair is a no-op.
    pub fn add_class(&mut self, container: &Path, class_name: &str) -> bool {
        if self.classes.get(class_name).map(PathBuf::as_path) == Some(container) {
            return false;
        }
        self.classes
            .insert(class_name.to_string(), container.to_path_buf());
        self.resolved = false;
        true
    }

    /// Records `from -> to`, or the "observed" marker for `from` when `to` is
    /// `None`. Edges to provided classes are dropped.
    pub fn add_dependency(&mut self, from: &str, to: Option<&str>) -> bool {
        let pair = match to {
            Some(to) if self.provided.matches(to) => return false,
            Some(to) => DependencyPair::new(from.to_string(), to.to_string()),
            None => DependencyPair::observed(from.to_string()),
        };
        if self.class_deps.add(pair) {
            self.resolved = false;
            true
        } else {
            false
        }
    }

    /// Appends a provided-class pattern (slash or dotted form).
    ///
    /// Edges already recorded are kept; the pattern applies to later
    /// `add_dependency` calls and to the next resolution.
    pub fn add_provided_classes(&mut self, pattern: &str) -> Result<(), PatternError> {
        self.provided.add(pattern)?;
        self.resolved = false;
        Ok(())
    }

    /// Recomputes the derived sets if anything changed since the last call.
    pub fn resolve_file_dependency(&mut self) {
        if self.resolved {
            return;
        }
        self.file_deps.clear();
        self.unresolved_deps.clear();

        for pair in self.class_deps.iter() {
            let Some(to_name) = pair.to() else {
                continue;
            };
            let from_file = self.classes.get(pair.from());
            match self.classes.get(to_name) {
                Some(to_file) => {
                    if let Some(from_file) = from_file {
                        if from_file != to_file {
                            self.file_deps
                                .add(DependencyPair::new(from_file.clone(), to_file.clone()));
                        }
                    }
                }
                None => {
                    if !is_platform_class(to_name) && !self.provided.matches(to_name) {
                        self.unresolved_deps
                            .add(DependencyPair::new(to_name.clone(), pair.from().clone()));
                    }
                }
            }
        }
        self.resolved = true;
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn container_of(&self, class_name: &str) -> Option<&Path> {
        self.classes.get(class_name).map(PathBuf::as_path)
    }

    pub fn processed_classes(&self) -> &BTreeMap<String, PathBuf> {
        &self.classes
    }

    pub fn class_dependencies(&self) -> &ClassDependencySet {
        &self.class_deps
    }

    pub fn file_dependencies(&mut self) -> &FileDependencySet {
        self.resolve_file_dependency();
        &self.file_deps
    }

    /// Pairs of `(unresolved class, referencing class)`.
    pub fn unresolved_dependencies(&mut self) -> &ClassDependencySet {
        self.resolve_file_dependency();
        &self.unresolved_deps
    }

    /// Resolves and freezes everything into an owned result.
    pub fn into_result(mut self) -> AnalysisResult {
        self.resolve_file_dependency();
        AnalysisResult {
            classes: self.classes,
            class_dependencies: self.class_deps.build(),
            file_dependencies: self.file_deps.build(),
            unresolved_dependencies: self.unresolved_deps.build(),
        }
    }
}

impl ClassSink for ClassDependencyAnalyser {
    fn add_class(&mut self, container: &Path, class_name: &str) -> bool {
        ClassDependencyAnalyser::add_class(self, container, class_name)
    }

    fn add_dependency(&mut self, from: &str, to: Option<&str>) -> bool {
        ClassDependencyAnalyser::add_dependency(self, from, to)
    }
}

/// Frozen output of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub classes: BTreeMap<String, PathBuf>,
    pub class_dependencies: ClassDependencySet,
    pub file_dependencies: FileDependencySet,
    pub unresolved_dependencies: ClassDependencySet,
}

impl AnalysisResult {
    /// File dependencies with paths made relative to `base` where possible.
    pub fn file_dependencies_relative_to(&self, base: &Path) -> FileDependencySet {
        self.file_dependencies
            .edges()
            .map(|(from, to)| DependencyPair::new(relative_to(from, base), relative_to(to, base)))
            .collect()
    }
}

pub fn relative_to(file: &Path, base: &Path) -> PathBuf {
    file.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| file.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> PathBuf {
        PathBuf::from("/libs").join(name)
    }

    fn pair<K>(from: K, to: K) -> DependencyPair<K> {
        DependencyPair::new(from, to)
    }

    #[test]
    fn add_class_reports_changes() {
        let mut analyser = ClassDependencyAnalyser::new();
        assert!(analyser.is_resolved());
        assert!(analyser.add_class(&file("a.jar"), "com/x/A"));
        assert!(!analyser.is_resolved());
        analyser.resolve_file_dependency();

        assert!(!analyser.add_class(&file("a.jar"), "com/x/A"));
        assert!(analyser.is_resolved());

        // Same class from another container: a conflict, reported as a change.
        assert!(analyser.add_class(&file("b.jar"), "com/x/A"));
        assert!(!analyser.is_resolved());
        assert_eq!(analyser.container_of("com/x/A"), Some(file("b.jar").as_path()));
        assert_eq!(analyser.processed_classes().len(), 1);
    }

    #[test]
    fn inter_file_dependency() {
        let mut analyser = ClassDependencyAnalyser::new();
        analyser.add_class(&file("a.jar"), "com/x/A");
        analyser.add_class(&file("b.jar"), "com/x/B");
        assert!(analyser.add_dependency("com/x/A", Some("com/x/B")));
        assert!(!analyser.add_dependency("com/x/A", Some("com/x/B")));

        let deps: Vec<_> = analyser.file_dependencies().iter().cloned().collect();
        assert_eq!(deps, vec![pair(file("a.jar"), file("b.jar"))]);
        assert!(analyser.unresolved_dependencies().is_empty());
    }

    #[test]
    fn provided_classes_are_dropped() {
        let mut analyser = ClassDependencyAnalyser::new();
        analyser.add_provided_classes("com/x/*").unwrap();
        analyser.add_class(&file("a.jar"), "com/x/A");
        analyser.add_class(&file("b.jar"), "com/x/B");
        assert!(!analyser.add_dependency("com/x/A", Some("com/x/B")));

        assert!(analyser.class_dependencies().is_empty());
        assert!(analyser.file_dependencies().is_empty());
        assert!(analyser.unresolved_dependencies().is_empty());
    }

    #[test]
    fn platform_classes_are_never_unresolved() {
        let mut analyser = ClassDependencyAnalyser::new();
        analyser.add_dependency("com/x/A", Some("java/lang/Object"));
        analyser.add_dependency("com/x/A", Some("org/w3c/dom/Node"));

        assert!(analyser.unresolved_dependencies().is_empty());
        assert!(analyser.file_dependencies().is_empty());
        assert_eq!(analyser.class_dependencies().len(), 2);
    }

    #[test]
    fn intra_file_edges_are_dropped_and_missing_classes_reported() {
        let mut analyser = ClassDependencyAnalyser::new();
        let jar = file("lib.jar");
        for class in ["com/x/One", "com/x/Two", "com/x/Three"] {
            analyser.add_class(&jar, class);
            analyser.add_dependency(class, None);
        }
        analyser.add_dependency("com/x/One", Some("com/x/Two"));
        analyser.add_dependency("com/x/Two", Some("com/missing/X"));

        assert!(analyser.file_dependencies().is_empty());
        let unresolved: Vec<_> = analyser.unresolved_dependencies().iter().cloned().collect();
        assert_eq!(
            unresolved,
            vec![pair("com/missing/X".to_string(), "com/x/Two".to_string())]
        );
    }

    #[test]
    fn resolution_is_idempotent_and_order_independent() {
        let edges = [
            ("com/x/C", "com/x/A"),
            ("com/x/A", "com/x/B"),
            ("com/x/B", "com/y/Missing"),
            ("com/x/A", "com/x/C"),
        ];
        let classes = [("a.jar", "com/x/A"), ("b.jar", "com/x/B"), ("c.jar", "com/x/C")];

        let mut forward = ClassDependencyAnalyser::new();
        for (f, c) in classes {
            forward.add_class(&file(f), c);
        }
        for (from, to) in edges {
            forward.add_dependency(from, Some(to));
        }

        let mut backward = ClassDependencyAnalyser::new();
        for (from, to) in edges.iter().rev() {
            backward.add_dependency(from, Some(*to));
        }
        for (f, c) in classes.iter().rev() {
            backward.add_class(&file(f), c);
        }

        let first = forward.file_dependencies().clone();
        let again = forward.file_dependencies().clone();
        assert_eq!(first, again);

        let a: Vec<_> = first.iter().collect();
        let backward_files = backward.file_dependencies().clone();
        let b: Vec<_> = backward_files.iter().collect();
        assert_eq!(a, b);
        assert_eq!(
            forward.unresolved_dependencies().clone(),
            backward.unresolved_dependencies().clone()
        );
    }

    #[test]
    fn provided_pattern_applies_to_next_resolution() {
        let mut analyser = ClassDependencyAnalyser::new();
        analyser.add_dependency("com/x/A", Some("org/lib/Thing"));
        assert_eq!(analyser.unresolved_dependencies().len(), 1);

        analyser.add_provided_classes("org.lib.*").unwrap();
        assert!(analyser.unresolved_dependencies().is_empty());
        // The recorded class edge itself is kept.
        assert_eq!(analyser.class_dependencies().len(), 1);
    }

    #[test]
    fn into_result_relativizes_files() {
        let mut analyser = ClassDependencyAnalyser::new();
        analyser.add_class(&file("a.jar"), "com/x/A");
        analyser.add_class(&file("sub/b.jar"), "com/x/B");
        analyser.add_dependency("com/x/A", Some("com/x/B"));

        let result = analyser.into_result();
        let relative: Vec<_> = result
            .file_dependencies_relative_to(Path::new("/libs"))
            .into_iter()
            .collect();
        assert_eq!(
            relative,
            vec![pair(PathBuf::from("a.jar"), PathBuf::from("sub/b.jar"))]
        );
    }
}
