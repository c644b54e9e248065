//! Classes assumed to be supplied by the runtime.

use globset::{Glob, GlobBuilder, GlobMatcher};

use crate::error::PatternError;

/// Namespaces of the platform itself. References into them are never
/// reported as unresolved, whatever the provided-class patterns say.
pub const PLATFORM_PACKAGES: &[&str] = &[
    "java/",
    "javax/",
    "com/sun/",
    "org/xml/sax/",
    "org/omg/",
    "org/w3c/dom/",
];

/// Provided-class patterns used when the configuration does not list its own.
pub const DEFAULT_JVM_PROVIDED_CLASSES: &[&str] = &[
    "java/**/*",
    "javax/**/*",
    "com/sun/**/*",
    "org/xml/sax/**/*",
    "org/w3c/dom/**/*",
    "org/ietf/jgss/*",
    "sunw/io/*",
    "sunw/util/*",
];

pub fn is_platform_class(name: &str) -> bool {
    PLATFORM_PACKAGES.iter().any(|p| name.starts_with(p))
}

/// Rewrites a dotted pattern (`com.x.*`) to the slash form used by internal
/// class names. A trailing separator stands for everything below it.
pub fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern.trim().replace('.', "/");
    if normalized.ends_with('/') {
        normalized.push_str("**");
    }
    normalized
}

/// Compiles one slash-separated glob: `*` stays within a package, `**`
/// spans packages.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher, PatternError> {
    let normalized = normalize_pattern(pattern);
    let glob: Result<Glob, _> = GlobBuilder::new(&normalized)
        .literal_separator(true)
        .backslash_escape(false)
        .build();
    glob.map(|g| g.compile_matcher()).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

/// Ordered list of provided-class patterns.
#[derive(Debug, Clone, Default)]
pub struct ProvidedClasses {
    patterns: Vec<String>,
    matchers: Vec<GlobMatcher>,
}

impl ProvidedClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: &str) -> Result<(), PatternError> {
        let matcher = compile_pattern(pattern)?;
        self.patterns.push(normalize_pattern(pattern));
        self.matchers.push(matcher);
        Ok(())
    }

    pub fn matches(&self, class_name: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(class_name))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
