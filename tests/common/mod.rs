#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;

/// Minimal valid class file: a name, a super class, and any number of
/// referenced classes in the constant pool.
pub fn class_bytes(name: &str, super_name: &str, references: &[&str]) -> Vec<u8> {
    let mut pool = Pool::default();
    let this = pool.class(name);
    let sup = pool.class(super_name);
    for r in references {
        pool.class(r);
    }

    let mut out = Vec::new();
    out.extend(0xCAFE_BABE_u32.to_be_bytes());
    out.extend(0_u16.to_be_bytes());
    out.extend(52_u16.to_be_bytes());
    out.extend((pool.count + 1).to_be_bytes());
    out.extend(&pool.bytes);
    out.extend(0x0021_u16.to_be_bytes());
    out.extend(this.to_be_bytes());
    out.extend(sup.to_be_bytes());
    // interfaces, fields, methods, attributes
    for _ in 0..4 {
        out.extend(0_u16.to_be_bytes());
    }
    out
}

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
    classes: HashMap<String, u16>,
}

impl Pool {
    fn class(&mut self, name: &str) -> u16 {
        if let Some(idx) = self.classes.get(name) {
            return *idx;
        }
        self.bytes.push(1);
        self.bytes.extend((name.len() as u16).to_be_bytes());
        self.bytes.extend(name.as_bytes());
        self.count += 1;
        let utf8 = self.count;
        self.bytes.push(7);
        self.bytes.extend(utf8.to_be_bytes());
        self.count += 1;
        self.classes.insert(name.to_string(), self.count);
        self.count
    }
}

pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

pub fn pom_properties(group: &str, artifact: &str, version: &str) -> Vec<u8> {
    format!("groupId={group}\nartifactId={artifact}\nversion={version}\n").into_bytes()
}

/// `bin/app.jar` extends a class of `bin/lib/lib-1.2.jar` and references
/// `org/missing/Gone`, which `bin/ext/ext.jar` provides.
pub fn write_layout(root: &Path) -> anyhow::Result<()> {
    let main = class_bytes(
        "org/acme/app/Main",
        "org/acme/lib/Base",
        &["org/missing/Gone", "java/util/List"],
    );
    let pom = pom_properties("org.acme", "app", "3.0");
    write_jar(
        &root.join("app.jar"),
        &[
            ("META-INF/maven/org.acme/app/pom.properties", &pom),
            ("org/acme/app/Main.class", &main),
        ],
    )?;

    let base = class_bytes("org/acme/lib/Base", "java/lang/Object", &[]);
    write_jar(&root.join("lib/lib-1.2.jar"), &[("org/acme/lib/Base.class", &base)])?;

    let gone = class_bytes("org/missing/Gone", "java/lang/Object", &[]);
    let pom = pom_properties("org.missing", "ext", "0.9");
    write_jar(
        &root.join("ext/ext.jar"),
        &[
            ("META-INF/maven/org.missing/ext/pom.properties", &pom),
            ("org/missing/Gone.class", &gone),
        ],
    )?;
    Ok(())
}
