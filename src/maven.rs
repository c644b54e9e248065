//! Maven coordinates of the analysed containers.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::depset::FileDependencySet;
use crate::error::MavenError;
use crate::pattern::is_platform_class;
use crate::scan::{ContainerKind, container_kind};

/// Coordinates supplied by the user for one file (or for every file when
/// `name` is absent). Unset fields fall back to what is discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileMavenInfo {
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub classifier: Option<String>,
}

impl FromStr for FileMavenInfo {
    type Err = String;

    /// Parses `[name=]groupId:artifactId:version[:classifier]`; empty fields
    /// stay unset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, coords) = match s.split_once('=') {
            Some((name, coords)) => (non_empty(name), coords),
            None => (None, s),
        };
        let parts: Vec<&str> = coords.split(':').collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(format!(
                "expected [name=]groupId:artifactId:version[:classifier], got {s:?}"
            ));
        }
        Ok(Self {
            name,
            group_id: non_empty(parts[0]),
            artifact_id: non_empty(parts[1]),
            version: non_empty(parts[2]),
            classifier: parts.get(3).and_then(|c| non_empty(c)),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl Coordinates {
    pub fn new(
        file: &Path,
        group_id: Option<String>,
        artifact_id: Option<String>,
        version: Option<String>,
        classifier: Option<String>,
    ) -> Result<Self, MavenError> {
        let invalid = |reason: String| MavenError::InvalidCoordinates {
            file: file.to_path_buf(),
            reason,
        };
        let group_id = group_id.ok_or_else(|| invalid("missing groupId".into()))?;
        let artifact_id = artifact_id.ok_or_else(|| invalid("missing artifactId".into()))?;
        let version = version.ok_or_else(|| invalid("missing version".into()))?;

        if !is_valid_id(&group_id) {
            return Err(invalid(format!("groupId {group_id:?} has invalid characters")));
        }
        if !is_valid_id(&artifact_id) {
            return Err(invalid(format!("artifactId {artifact_id:?} has invalid characters")));
        }
        if version.is_empty() || version.chars().any(char::is_whitespace) {
            return Err(invalid(format!("version {version:?} is not valid")));
        }
        if let Some(classifier) = &classifier
            && (classifier.is_empty() || classifier.chars().any(char::is_whitespace))
        {
            return Err(invalid(format!("classifier {classifier:?} is not valid")));
        }
        Ok(Self {
            group_id,
            artifact_id,
            version,
            classifier,
        })
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarIdentification {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packages: Vec<String>,
}

/// Reads `pom.properties`, the manifest and the class list of a jar.
///
/// Precedence: `pom.properties`, then the file name for the artifactId, then
/// the manifest.
pub fn identify_jar(path: &Path) -> Result<JarIdentification, MavenError> {
    let io_error = |source| MavenError::Identify {
        file: path.to_path_buf(),
        source,
    };
    let archive_error = |source| MavenError::IdentifyArchive {
        file: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_error)?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(archive_error)?;

    let (file_artifact, file_version) = split_file_name(path);
    let mut poms = Vec::new();
    let mut manifest = None;
    let mut packages = BTreeSet::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_error)?;
        let name = entry.name().to_string();
        if name.eq_ignore_ascii_case("META-INF/MANIFEST.MF") {
            let mut text = String::new();
            entry.read_to_string(&mut text).map_err(io_error)?;
            manifest = Some(parse_manifest(&text));
        } else if name.starts_with("META-INF/maven/") && name.ends_with("/pom.properties") {
            let mut text = String::new();
            entry.read_to_string(&mut text).map_err(io_error)?;
            poms.push(parse_properties(&text));
        } else if let Some(class_path) = name.strip_suffix(".class") {
            if let Some((package, _)) = class_path.rsplit_once('/') {
                packages.insert(package.replace('/', "."));
            }
        }
    }

    let pom = match poms.len() {
        0 => None,
        1 => poms.pop(),
        _ => poms
            .into_iter()
            .find(|p| p.get("artifactId").is_some_and(|a| Some(a) == file_artifact.as_ref())),
    };
    let manifest = manifest.unwrap_or_default();
    let from_pom = |key: &str| pom.as_ref().and_then(|p| p.get(key)).cloned();
    let from_manifest = |keys: &[&str]| keys.iter().find_map(|k| manifest.get(*k)).cloned();

    Ok(JarIdentification {
        group_id: from_pom("groupId").or_else(|| from_manifest(&["Implementation-Vendor-Id"])),
        artifact_id: from_pom("artifactId")
            .or(file_artifact)
            .or_else(|| from_manifest(&["Implementation-Title", "Bundle-SymbolicName"])),
        version: from_pom("version")
            .or_else(|| from_manifest(&["Implementation-Version", "Bundle-Version"]))
            .or(file_version),
        packages: packages.into_iter().collect(),
    })
}

/// `commons-lang-2.6.jar` gives `("commons-lang", "2.6")`.
fn split_file_name(path: &Path) -> (Option<String>, Option<String>) {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return (None, None);
    };
    let split = stem
        .char_indices()
        .find(|&(i, c)| c == '-' && stem[i + 1..].starts_with(|n: char| n.is_ascii_digit()));
    match split {
        Some((i, _)) => (non_empty(&stem[..i]), non_empty(&stem[i + 1..])),
        None => (non_empty(stem), None),
    }
}

fn parse_manifest(text: &str) -> HashMap<String, String> {
    let mut attributes: HashMap<String, String> = HashMap::new();
    let mut last: Option<String> = None;
    for line in text.lines() {
        if let Some(continued) = line.strip_prefix(' ') {
            if let Some(value) = last.as_ref().and_then(|k| attributes.get_mut(k)) {
                value.push_str(continued);
            }
            continue;
        }
        match line.split_once(": ") {
            Some((key, value)) => {
                attributes
                    .entry(key.to_string())
                    .or_insert_with(|| value.trim().to_string());
                last = Some(key.to_string());
            }
            None => last = None,
        }
    }
    attributes
}

fn parse_properties(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('!'))
        .filter_map(|l| l.split_once(['=', ':']))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn is_ignored_package(package: &str) -> bool {
    package.is_empty() || package.contains("log4j") || is_platform_class(&format!("{}/", package.replace('.', "/")))
}

/// Narrows `initial` (or the first usable package) to the longest dotted
/// prefix shared with every package of the jar.
pub fn common_package_prefix(initial: Option<&str>, packages: &[String]) -> Option<String> {
    let initial_ignored = initial.is_none_or(is_ignored_package);
    let mut candidates = packages
        .iter()
        .map(String::as_str)
        .filter(|p| !is_ignored_package(p));
    let mut prefix = if initial_ignored { candidates.next() } else { initial };

    for candidate in candidates {
        let Some(current) = prefix.filter(|p| !p.is_empty()) else {
            break;
        };
        let shared = shared_prefix_len(current, candidate);
        if shared >= current.len() {
            continue;
        }
        let dot = if current.as_bytes()[shared] == b'.' {
            Some(shared)
        } else {
            current[..shared].rfind('.')
        };
        match dot {
            Some(dot) => prefix = Some(&current[..dot]),
            None if initial_ignored => return Some(current.to_string()),
            None => return initial.map(str::to_string),
        }
    }

    match prefix {
        Some(p) if !p.is_empty() => Some(p.to_string()),
        _ => initial.map(str::to_string),
    }
}

fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Coordinates of a file stored in a Maven repository layout:
/// `group/path/artifact/version/artifact-version[-classifier].ext`.
pub fn coordinates_from_repository(file: &Path, repository: &Path) -> Option<Coordinates> {
    let relative = file.strip_prefix(repository).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    if parts.len() < 4 {
        return None;
    }
    let n = parts.len();
    let (file_name, version, artifact_id) = (parts[n - 1], parts[n - 2], parts[n - 3]);
    let group_id = parts[..n - 3].join(".");

    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let rest = stem.strip_prefix(&format!("{artifact_id}-{version}"))?;
    let classifier = match rest.strip_prefix('-') {
        Some(c) => non_empty(c),
        None if rest.is_empty() => None,
        None => return None,
    };
    Coordinates::new(
        file,
        Some(group_id),
        Some(artifact_id.to_string()),
        Some(version.to_string()),
        classifier,
    )
    .ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenFile {
    file: PathBuf,
    coordinates: Coordinates,
    dependencies: BTreeSet<PathBuf>,
}

impl MavenFile {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.dependencies
    }
}

#[derive(Debug, Clone, Default)]
pub struct MavenFileSet {
    artifacts: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, MavenFile>,
}

impl MavenFileSet {
    pub fn iter(&self) -> impl Iterator<Item = &MavenFile> {
        self.artifacts.iter().filter_map(|f| self.files.get(f))
    }

    pub fn get(&self, file: &Path) -> Option<&MavenFile> {
        self.files.get(file)
    }

    pub fn dependencies_of<'s>(&'s self, artifact: &'s MavenFile) -> impl Iterator<Item = &'s MavenFile> {
        artifact.dependencies.iter().filter_map(|f| self.files.get(f))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct MavenFileRegistry {
    hints: HashMap<Option<String>, FileMavenInfo>,
    files: BTreeMap<PathBuf, MavenFile>,
    local_repository: Option<PathBuf>,
}

impl MavenFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_repository(mut self, repository: impl Into<PathBuf>) -> Self {
        self.local_repository = Some(repository.into());
        self
    }

    pub fn add_maven_info(&mut self, info: FileMavenInfo) -> Result<(), MavenError> {
        if self.hints.contains_key(&info.name) {
            return Err(MavenError::DuplicateInfo { name: info.name });
        }
        self.hints.insert(info.name.clone(), info);
        Ok(())
    }

    pub fn maven_info(&self, name: Option<&str>) -> Option<&FileMavenInfo> {
        self.hints.get(&name.map(str::to_string))
    }

    /// Hint for `file`: by file name, then by artifactId, then the default one.
    pub fn file_maven_info(&self, file: &Path, artifact_id: Option<&str>) -> FileMavenInfo {
        let file_name = file.file_name().and_then(|n| n.to_str());
        file_name
            .and_then(|n| self.maven_info(Some(n)))
            .or_else(|| artifact_id.and_then(|a| self.maven_info(Some(a))))
            .or_else(|| self.maven_info(None))
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, file: &Path) -> Option<&MavenFile> {
        self.files.get(file)
    }

    pub fn maven_file(&mut self, file: &Path) -> Result<&MavenFile, MavenError> {
        if self.files.contains_key(file) {
            return self.lookup(file);
        }

        let in_repository = self
            .local_repository
            .as_deref()
            .and_then(|repo| coordinates_from_repository(file, repo));
        let coordinates = match in_repository {
            Some(coordinates) => coordinates,
            None => {
                let id = identify_jar(file)?;
                let info = self.file_maven_info(file, id.artifact_id.as_deref());
                let group_id = info
                    .group_id
                    .or_else(|| common_package_prefix(id.group_id.as_deref(), &id.packages));
                Coordinates::new(
                    file,
                    group_id,
                    info.artifact_id.or(id.artifact_id),
                    info.version.or(id.version),
                    info.classifier,
                )?
            }
        };
        debug!(file = %file.display(), %coordinates, "Identified artifact");
        self.register(file, coordinates, None)
    }

    pub fn register(
        &mut self,
        file: &Path,
        coordinates: Coordinates,
        dependencies: Option<BTreeSet<PathBuf>>,
    ) -> Result<&MavenFile, MavenError> {
        if let Some(existing) = self.files.get_mut(file) {
            let deps_conflict = dependencies.as_ref().is_some_and(|deps| {
                !existing.dependencies.is_empty() && *deps != existing.dependencies
            });
            if existing.coordinates != coordinates || deps_conflict {
                return Err(MavenError::Mismatch {
                    file: file.to_path_buf(),
                });
            }
            if let Some(deps) = dependencies
                && existing.dependencies.is_empty()
            {
                existing.dependencies = deps;
            }
        } else {
            self.files.insert(
                file.to_path_buf(),
                MavenFile {
                    file: file.to_path_buf(),
                    coordinates,
                    dependencies: dependencies.unwrap_or_default(),
                },
            );
        }
        self.lookup(file)
    }

    fn lookup(&self, file: &Path) -> Result<&MavenFile, MavenError> {
        self.files.get(file).ok_or_else(|| MavenError::Mismatch {
            file: file.to_path_buf(),
        })
    }

    /// Builds the artifacts for `roots` and for every file with an outgoing
    /// edge in `deps`.
    pub fn maven_file_set<'p>(
        &mut self,
        deps: &FileDependencySet,
        roots: impl IntoIterator<Item = &'p Path>,
    ) -> Result<MavenFileSet, MavenError> {
        let mut set = MavenFileSet::default();

        for root in roots {
            if self.describable(root) {
                self.maven_file(root)?;
                set.artifacts.insert(root.to_path_buf());
            }
        }
        for (from, to) in deps.edges() {
            if !self.describable(from) || !self.describable(to) {
                continue;
            }
            self.maven_file(to)?;
            self.maven_file(from)?;
            if let Some(file) = self.files.get_mut(from.as_path()) {
                file.dependencies.insert(to.clone());
            }
            set.artifacts.insert(from.clone());
        }

        for artifact in &set.artifacts {
            let Some(file) = self.files.get(artifact) else {
                continue;
            };
            for dep in file.dependencies.iter().chain(std::iter::once(artifact)) {
                if let Some(described) = self.files.get(dep) {
                    set.files.insert(dep.clone(), described.clone());
                }
            }
        }
        Ok(set)
    }

    fn describable(&self, file: &Path) -> bool {
        if container_kind(file) == ContainerKind::Archive {
            return true;
        }
        warn!(file = %file.display(), "Not an archive, no artifact described for it");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depset::DependencyPair;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn packages(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_hint_strings() {
        let info: FileMavenInfo = "legacy.jar=com.acme:legacy:1.0:jdk5".parse().unwrap();
        assert_eq!(info.name.as_deref(), Some("legacy.jar"));
        assert_eq!(info.classifier.as_deref(), Some("jdk5"));

        let default: FileMavenInfo = "com.acme::".parse().unwrap();
        assert_eq!(default.name, None);
        assert_eq!(default.group_id.as_deref(), Some("com.acme"));
        assert_eq!(default.artifact_id, None);

        assert!("com.acme".parse::<FileMavenInfo>().is_err());
    }

    #[test]
    fn coordinates_are_validated() {
        let file = Path::new("a.jar");
        let some = |s: &str| Some(s.to_string());
        assert!(Coordinates::new(file, some("com.acme"), some("a-b_c"), some("1.0"), None).is_ok());
        assert!(Coordinates::new(file, None, some("a"), some("1.0"), None).is_err());
        assert!(Coordinates::new(file, some("com acme"), some("a"), some("1.0"), None).is_err());
        assert!(Coordinates::new(file, some("com.acme"), some("a"), some("1 0"), None).is_err());
        let c = Coordinates::new(file, some("g"), some("a"), some("1"), some("x")).unwrap();
        assert_eq!(c.to_string(), "g:a:1:x");
    }

    #[test]
    fn common_prefix_narrows_to_shared_segments() {
        let pkgs = packages(&[
            "org.acme.core",
            "org.acme.core.io",
            "org.acme.util",
            "org.apache.log4j",
            "java.lang.invoke",
        ]);
        assert_eq!(common_package_prefix(None, &pkgs).as_deref(), Some("org.acme"));
        assert_eq!(
            common_package_prefix(Some("org.acme.core"), &pkgs).as_deref(),
            Some("org.acme")
        );
    }

    #[test]
    fn unrelated_initial_group_is_kept() {
        let pkgs = packages(&["org.acme.core", "org.acme.util"]);
        assert_eq!(
            common_package_prefix(Some("acme-legacy"), &pkgs).as_deref(),
            Some("acme-legacy")
        );
        assert_eq!(common_package_prefix(None, &[]), None);
        assert_eq!(
            common_package_prefix(None, &packages(&["alpha.one", "beta.two"])).as_deref(),
            Some("alpha.one")
        );
    }

    #[test]
    fn repository_layout_gives_coordinates() {
        let repo = Path::new("/home/u/.m2/repository");
        let jar = repo.join("org/acme/lib/1.2/lib-1.2-tests.jar");
        let c = coordinates_from_repository(&jar, repo).unwrap();
        assert_eq!(c.to_string(), "org.acme:lib:1.2:tests");
        assert!(coordinates_from_repository(Path::new("/elsewhere/lib-1.2.jar"), repo).is_none());
        assert!(coordinates_from_repository(&repo.join("org/acme/lib/1.2/other.jar"), repo).is_none());
    }

    #[test]
    fn identify_reads_pom_properties_and_packages() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("thing-3.1.jar");
        write_jar(
            &jar,
            &[
                (
                    "META-INF/maven/org.acme/thing/pom.properties",
                    b"#generated\ngroupId=org.acme\nartifactId=thing\nversion=3.1.0\n",
                ),
                ("org/acme/thing/A.class", b""),
                ("org/acme/thing/impl/B.class", b""),
                ("Root.class", b""),
            ],
        );
        let id = identify_jar(&jar).unwrap();
        assert_eq!(id.group_id.as_deref(), Some("org.acme"));
        assert_eq!(id.artifact_id.as_deref(), Some("thing"));
        assert_eq!(id.version.as_deref(), Some("3.1.0"));
        assert_eq!(id.packages, packages(&["org.acme.thing", "org.acme.thing.impl"]));
    }

    #[test]
    fn identify_falls_back_to_manifest_and_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("widgets-2.0.jar");
        write_jar(
            &jar,
            &[(
                "META-INF/MANIFEST.MF",
                b"Manifest-Version: 1.0\r\nImplementation-Vendor-Id: com.widg\r\n ets\r\nImplementation-Version: 2.0.1\r\n",
            )],
        );
        let id = identify_jar(&jar).unwrap();
        assert_eq!(id.group_id.as_deref(), Some("com.widgets"));
        assert_eq!(id.artifact_id.as_deref(), Some("widgets"));
        assert_eq!(id.version.as_deref(), Some("2.0.1"));
    }

    #[test]
    fn manifest_attributes_join_continuation_lines() {
        let attributes = parse_manifest(
            "Manifest-Version: 1.0\nBundle-SymbolicName: org.acme.very.long\n .name\n\nName: org/acme/\nBundle-SymbolicName: ignored\n",
        );
        assert_eq!(attributes.get("Manifest-Version").map(String::as_str), Some("1.0"));
        assert_eq!(
            attributes.get("Bundle-SymbolicName").map(String::as_str),
            Some("org.acme.very.long.name")
        );
        assert_eq!(attributes.get("Name").map(String::as_str), Some("org/acme/"));
    }

    #[test]
    fn hints_are_looked_up_by_file_then_artifact_then_default() {
        let mut registry = MavenFileRegistry::new();
        registry
            .add_maven_info("lib.jar=by.file:lib:1".parse().unwrap())
            .unwrap();
        registry
            .add_maven_info("core=by.artifact:core:1".parse().unwrap())
            .unwrap();
        registry.add_maven_info("by.default::".parse().unwrap()).unwrap();

        let group = |file: &str, artifact: Option<&str>| {
            registry.file_maven_info(Path::new(file), artifact).group_id
        };
        assert_eq!(group("/x/lib.jar", Some("core")).as_deref(), Some("by.file"));
        assert_eq!(group("/x/core-1.jar", Some("core")).as_deref(), Some("by.artifact"));
        assert_eq!(group("/x/other.jar", None).as_deref(), Some("by.default"));

        let err = registry.add_maven_info("by.default.again::".parse().unwrap()).unwrap_err();
        assert!(matches!(err, MavenError::DuplicateInfo { name: None }));
    }

    #[test]
    fn registry_rejects_conflicting_requests() {
        let mut registry = MavenFileRegistry::new();
        let file = Path::new("/libs/a.jar");
        let coords = |v: &str| {
            Coordinates::new(file, Some("g".into()), Some("a".into()), Some(v.into()), None).unwrap()
        };
        registry.register(file, coords("1"), None).unwrap();
        registry.register(file, coords("1"), None).unwrap();
        let err = registry.register(file, coords("2"), None).unwrap_err();
        assert!(matches!(err, MavenError::Mismatch { .. }));
    }

    #[test]
    fn file_set_links_artifacts_to_their_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app-1.0.jar");
        let lib = dir.path().join("lib-2.0.jar");
        let standalone = dir.path().join("solo-0.1.jar");
        for jar in [&app, &lib, &standalone] {
            write_jar(jar, &[("com/acme/X.class", b"")]);
        }

        let deps: FileDependencySet = [DependencyPair::new(app.clone(), lib.clone())]
            .into_iter()
            .collect();
        let mut registry = MavenFileRegistry::new();
        registry.add_maven_info("com.acme::".parse().unwrap()).unwrap();
        let set = registry
            .maven_file_set(&deps, [standalone.as_path()])
            .unwrap();

        let listed: Vec<_> = set.iter().map(|f| f.coordinates().artifact_id.as_str()).collect();
        assert_eq!(listed, vec!["app", "solo"]);
        let app_file = set.get(&app).unwrap();
        let app_deps: Vec<_> = set
            .dependencies_of(app_file)
            .map(|f| f.coordinates().to_string())
            .collect();
        assert_eq!(app_deps, vec!["com.acme:lib:2.0"]);
    }
}
