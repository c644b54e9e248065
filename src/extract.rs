//! Static extraction of class references.
//!
//! [`extract_class`] decodes one class and reports what it finds to a
//! [`ClassSink`]: the class itself (always), and in
//! [`ExtractionMode::Dependencies`] every distinct class it references.
//! Referenced classes are never loaded.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classfile::{ClassFile, ClassHeader, ClassMember, ClassVisitor, Result};
use crate::descriptor::{descriptor_class_names, internal_class_name, signature_class_names};

/// Receiver of extraction results.
pub trait ClassSink {
    fn add_class(&mut self, container: &Path, class_name: &str) -> bool;

    fn add_dependency(&mut self, from: &str, to: Option<&str>) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Register the class and every class it references.
    #[default]
    Dependencies,
    /// Register the class only; used for containers that are merely available.
    Inventory,
}

/// Extracts one class held in `bytes`, found in `container`.
///
/// Returns the class name.
pub fn extract_class(
    bytes: &[u8],
    container: &Path,
    mode: ExtractionMode,
    sink: &mut dyn ClassSink,
) -> Result<String> {
    match mode {
        ExtractionMode::Inventory => {
            let header = ClassHeader::parse(bytes)?;
            sink.add_class(container, &header.this_class);
            Ok(header.this_class)
        }
        ExtractionMode::Dependencies => {
            let class = ClassFile::parse(bytes)?;
            let mut visitor = DependencyVisitor {
                container,
                sink,
                current: String::new(),
                seen: HashSet::new(),
            };
            class.accept(&mut visitor)?;
            Ok(visitor.current)
        }
    }
}

struct DependencyVisitor<'a> {
    container: &'a Path,
    sink: &'a mut dyn ClassSink,
    current: String,
    seen: HashSet<String>,
}

impl DependencyVisitor<'_> {
    fn reference(&mut self, name: &str) {
        if name == self.current || self.seen.contains(name) {
            return;
        }
        self.seen.insert(name.to_string());
        self.sink.add_dependency(&self.current, Some(name));
    }

    fn reference_class(&mut self, raw: &str) {
        if let Some(name) = internal_class_name(raw) {
            self.reference(name);
        }
    }

    fn reference_descriptor(&mut self, descriptor: &str) {
        for name in descriptor_class_names(descriptor) {
            self.reference(name);
        }
    }

    /// Broken signatures are common in obfuscated jars; those are scanned
    /// like a descriptor instead of failing the class.
    fn reference_signature(&mut self, signature: &str) {
        match signature_class_names(signature) {
            Ok(names) => {
                for name in names {
                    self.reference(&name);
                }
            }
            Err(err) => {
                debug!(class = %self.current, %err, "Unparsable signature, scanning it as a descriptor");
                self.reference_descriptor(signature);
            }
        }
    }

    fn reference_member(&mut self, member: &ClassMember) {
        self.reference_descriptor(&member.descriptor);
        if let Some(signature) = &member.signature {
            self.reference_signature(signature);
        }
        for exception in &member.exceptions {
            self.reference_class(exception);
        }
        for annotation in &member.annotation_types {
            self.reference_descriptor(annotation);
        }
    }
}

impl ClassVisitor for DependencyVisitor<'_> {
    fn visit_class(&mut self, name: &str) -> Result<()> {
        self.current = name.to_string();
        self.sink.add_class(self.container, name);
        self.sink.add_dependency(name, None);
        Ok(())
    }

    fn visit_super_class(&mut self, name: &str) -> Result<()> {
        self.reference_class(name);
        Ok(())
    }

    fn visit_interface(&mut self, name: &str) -> Result<()> {
        self.reference_class(name);
        Ok(())
    }

    fn visit_class_signature(&mut self, signature: &str) -> Result<()> {
        self.reference_signature(signature);
        Ok(())
    }

    fn visit_annotation(&mut self, descriptor: &str) -> Result<()> {
        self.reference_descriptor(descriptor);
        Ok(())
    }

    fn visit_field(&mut self, field: &ClassMember) -> Result<()> {
        self.reference_member(field);
        Ok(())
    }

    fn visit_method(&mut self, method: &ClassMember) -> Result<()> {
        self.reference_member(method);
        Ok(())
    }

    fn visit_inner_class(&mut self, name: &str) -> Result<()> {
        self.reference_class(name);
        Ok(())
    }

    fn visit_pooled_class(&mut self, name: &str) -> Result<()> {
        self.reference_class(name);
        Ok(())
    }

    fn visit_pooled_descriptor(&mut self, descriptor: &str) -> Result<()> {
        self.reference_descriptor(descriptor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::test_support::TestClass;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recording {
        classes: Vec<(PathBuf, String)>,
        deps: Vec<(String, Option<String>)>,
    }

    impl ClassSink for Recording {
        fn add_class(&mut self, container: &Path, class_name: &str) -> bool {
            self.classes.push((container.to_path_buf(), class_name.to_string()));
            true
        }

        fn add_dependency(&mut self, from: &str, to: Option<&str>) -> bool {
            self.deps.push((from.to_string(), to.map(str::to_string)));
            true
        }
    }

    fn targets(sink: &Recording) -> Vec<&str> {
        let mut names: Vec<&str> = sink.deps.iter().filter_map(|(_, to)| to.as_deref()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn dependency_mode_reports_every_distinct_reference() {
        let bytes = TestClass::new("com/x/A")
            .extends("com/x/Base")
            .implements("com/x/Api")
            .field("items", "[Lcom/x/Item;")
            .field("again", "Lcom/x/Item;")
            .method("run", "(Lcom/x/Input;)Lcom/x/Output;", &["com/x/Failure"])
            .references("[Lcom/x/Pooled;")
            .signature("Lcom/x/Base<Lcom/x/Generic;>;Lcom/x/Api;")
            .annotated("Lcom/x/Marker;")
            .build();

        let mut sink = Recording::default();
        let name = extract_class(
            &bytes,
            Path::new("/libs/a.jar"),
            ExtractionMode::Dependencies,
            &mut sink,
        )
        .unwrap();

        assert_eq!(name, "com/x/A");
        assert_eq!(
            sink.classes,
            vec![(PathBuf::from("/libs/a.jar"), "com/x/A".to_string())]
        );
        assert_eq!(sink.deps[0], ("com/x/A".to_string(), None));
        assert_eq!(
            targets(&sink),
            vec![
                "com/x/Api",
                "com/x/Base",
                "com/x/Failure",
                "com/x/Generic",
                "com/x/Input",
                "com/x/Item",
                "com/x/Marker",
                "com/x/Output",
                "com/x/Pooled",
            ]
        );
        assert!(sink.deps.iter().all(|(from, _)| from == "com/x/A"));
    }

    #[test]
    fn self_reference_is_not_a_dependency() {
        let bytes = TestClass::new("com/x/A").field("next", "Lcom/x/A;").build();
        let mut sink = Recording::default();
        extract_class(&bytes, Path::new("a.jar"), ExtractionMode::Dependencies, &mut sink).unwrap();
        assert_eq!(targets(&sink), vec!["java/lang/Object"]);
    }

    #[test]
    fn inventory_mode_reports_only_the_class() {
        let bytes = TestClass::new("com/x/A").extends("com/x/Base").build();
        let mut sink = Recording::default();
        extract_class(&bytes, Path::new("a.jar"), ExtractionMode::Inventory, &mut sink).unwrap();
        assert_eq!(sink.classes.len(), 1);
        assert!(sink.deps.is_empty());
    }

    #[test]
    fn broken_signature_falls_back_to_a_descriptor_scan() {
        let bytes = TestClass::new("com/x/A")
            .signature("Lcom/x/Broken")
            .method("run", "()V", &[])
            .build();
        let mut sink = Recording::default();
        let name = extract_class(&bytes, Path::new("a.jar"), ExtractionMode::Dependencies, &mut sink).unwrap();
        assert_eq!(name, "com/x/A");
        assert_eq!(targets(&sink), vec!["com/x/Broken", "java/lang/Object"]);
    }

    #[test]
    fn malformed_class_is_an_error() {
        let mut sink = Recording::default();
        let result = extract_class(b"not a class", Path::new("a.jar"), ExtractionMode::Dependencies, &mut sink);
        assert!(result.is_err());
        assert!(sink.classes.is_empty());
    }
}
