//! XML form of the analysis result.
//!
//! ```xml
//! <artifacts>
//!   <artifact name="lib/app-1.0.jar">
//!     <groupid>com.acme</groupid>
//!     <artifactid>app</artifactid>
//!     <version>1.0</version>
//!     <dependencies>
//!       <dependency name="lib/util-2.0.jar">...</dependency>
//!     </dependencies>
//!   </artifact>
//! </artifacts>
//! ```

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::maven::{MavenFile, MavenFileSet};
use crate::scan::relative_slash_path;

const INDENT: &str = "  ";

pub struct ArtifactXml<'a> {
    base_dir: Option<&'a Path>,
    local_repository: Option<&'a Path>,
}

impl<'a> ArtifactXml<'a> {
    pub fn new(base_dir: Option<&'a Path>, local_repository: Option<&'a Path>) -> Self {
        Self {
            base_dir,
            local_repository,
        }
    }

    pub fn render(&self, set: &MavenFileSet) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        if set.is_empty() {
            out.push_str("<artifacts/>\n");
            return out;
        }
        out.push_str("<artifacts>\n");
        for artifact in set.iter() {
            self.open_tag(&mut out, 1, "artifact", artifact);
            self.coordinates(&mut out, 2, artifact);
            let mut deps = set.dependencies_of(artifact).peekable();
            if deps.peek().is_some() {
                line(&mut out, 2, "<dependencies>");
                for dep in deps {
                    self.open_tag(&mut out, 3, "dependency", dep);
                    self.coordinates(&mut out, 4, dep);
                    line(&mut out, 3, "</dependency>");
                }
                line(&mut out, 2, "</dependencies>");
            }
            line(&mut out, 1, "</artifact>");
        }
        out.push_str("</artifacts>\n");
        out
    }

    pub fn name_of(&self, file: &Path) -> Option<String> {
        if self.local_repository.is_some_and(|repo| file.starts_with(repo)) {
            return None;
        }
        match self.base_dir {
            Some(base) if file.starts_with(base) => Some(relative_slash_path(file, base)),
            _ => Some(file.display().to_string()),
        }
    }

    fn open_tag(&self, out: &mut String, depth: usize, tag: &str, file: &MavenFile) {
        match self.name_of(file.file()) {
            Some(name) => line(out, depth, &format!("<{tag} name=\"{}\">", escape(&name))),
            None => line(out, depth, &format!("<{tag}>")),
        }
    }

    fn coordinates(&self, out: &mut String, depth: usize, file: &MavenFile) {
        let c = file.coordinates();
        element(out, depth, "groupid", &c.group_id);
        element(out, depth, "artifactid", &c.artifact_id);
        element(out, depth, "version", &c.version);
        if let Some(classifier) = &c.classifier {
            element(out, depth, "classifier", classifier);
        }
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn element(out: &mut String, depth: usize, tag: &str, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    let _ = writeln!(out, "<{tag}>{}</{tag}>", escape(text));
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Writes `contents` to `path` completely or not at all.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path(path);
    let result = publish(path, &tmp, contents);
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
        let _ = std::fs::remove_file(path);
    }
    result
}

fn publish(path: &Path, tmp: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    std::fs::write(tmp, contents)
        .with_context(|| format!("Failed to write analysis result: {}", tmp.display()))?;
    std::fs::rename(tmp, path).with_context(|| {
        format!("Failed to atomically replace analysis result: {}", path.display())
    })?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}
