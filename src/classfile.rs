//! Class file decoding.
//!
//! [`ClassFile::parse`] decodes the parts of a class file that can name other
//! classes: the header, fields, methods, their signatures and annotations, and
//! the constant pool. Nothing is resolved or loaded. Consumers walk the decoded
//! structure through [`ClassVisitor`], one callback per structural element.

use crate::error::ClassFileError;

pub type Result<T> = std::result::Result<T, ClassFileError>;

const MAGIC: u32 = 0xCAFE_BABE;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::UnexpectedEof)?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u1(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u4(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    fn ensure_empty(&self) -> Result<()> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(ClassFileError::TrailingBytes)
        }
    }
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class(u16),
    NameAndType { descriptor: u16 },
    MethodType(u16),
    /// Second slot of a long/double, or an entry nothing here needs.
    Other(&'static str),
}

impl Constant {
    fn kind(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Class(_) => "Class",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::MethodType(_) => "MethodType",
            Constant::Other(kind) => *kind,
        }
    }
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        // Index 0 is unused.
        entries.push(Constant::Other("unused"));
        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = reader.read_u2()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                TAG_INTEGER | TAG_FLOAT => {
                    reader.skip(4)?;
                    Constant::Other("Number")
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.skip(8)?;
                    entries.push(Constant::Other("Wide"));
                    Constant::Other("Wide")
                }
                TAG_CLASS => Constant::Class(reader.read_u2()?),
                TAG_STRING | TAG_MODULE | TAG_PACKAGE => {
                    reader.skip(2)?;
                    Constant::Other("Named")
                }
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF => {
                    reader.skip(4)?;
                    Constant::Other("MemberRef")
                }
                TAG_NAME_AND_TYPE => {
                    let _name = reader.read_u2()?;
                    Constant::NameAndType {
                        descriptor: reader.read_u2()?,
                    }
                }
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    Constant::Other("MethodHandle")
                }
                TAG_METHOD_TYPE => Constant::MethodType(reader.read_u2()?),
                TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    reader.skip(4)?;
                    Constant::Other("Dynamic")
                }
                other => return Err(ClassFileError::InvalidConstantPoolTag(other)),
            };
            entries.push(entry);
        }
        if entries.len() > count.max(1) {
            // A trailing long/double claimed a slot past the declared count.
            return Err(ClassFileError::InvalidConstantPoolIndex(count as u16));
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant> {
        if index == 0 {
            return Err(ClassFileError::InvalidConstantPoolIndex(index));
        }
        self.entries
            .get(index as usize)
            .ok_or(ClassFileError::InvalidConstantPoolIndex(index))
    }

    fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            other => Err(ClassFileError::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            other => Err(ClassFileError::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }

    fn optional_class_name(&self, index: u16) -> Result<Option<String>> {
        if index == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(|s| Some(s.to_string()))
        }
    }

    /// Class names and type descriptors held by the pool, in pool order.
    fn references(&self) -> Result<Vec<PoolReference>> {
        let mut refs = Vec::new();
        for entry in &self.entries {
            match entry {
                Constant::Class(name) => refs.push(PoolReference::Class(self.utf8(*name)?.to_string())),
                Constant::NameAndType { descriptor } | Constant::MethodType(descriptor) => {
                    refs.push(PoolReference::Descriptor(self.utf8(*descriptor)?.to_string()))
                }
                Constant::Utf8(_) | Constant::Other(_) => {}
            }
        }
        Ok(refs)
    }
}

fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if !bytes.iter().any(|b| *b == 0 || *b >= 0x80) {
        return std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| ClassFileError::InvalidModifiedUtf8);
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            if b == 0 {
                return Err(ClassFileError::InvalidModifiedUtf8);
            }
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1).ok_or(ClassFileError::InvalidModifiedUtf8)?;
            if b2 & 0xC0 != 0x80 {
                return Err(ClassFileError::InvalidModifiedUtf8);
            }
            units.push((((b & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1).ok_or(ClassFileError::InvalidModifiedUtf8)?;
            let b3 = *bytes.get(i + 2).ok_or(ClassFileError::InvalidModifiedUtf8)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return Err(ClassFileError::InvalidModifiedUtf8);
            }
            units.push(
                (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16,
            );
            i += 3;
        } else {
            return Err(ClassFileError::InvalidModifiedUtf8);
        }
    }
    // Lone surrogates are legal in string constants; class names never hold them.
    Ok(String::from_utf16_lossy(&units))
}

/// A symbolic reference held by the constant pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolReference {
    /// A `CONSTANT_Class` name: an internal name or an array descriptor.
    Class(String),
    /// A field or method descriptor from a `NameAndType` or `MethodType`.
    Descriptor(String),
}

/// The identity part of a class file: enough to catalogue it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
}

impl ClassHeader {
    /// Decode only the header; fields, methods and attributes are not read.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let (header, _) = read_header(&mut reader)?;
        Ok(header)
    }
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
    /// Type descriptors named by the member's annotations.
    pub annotation_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub header: ClassHeader,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    /// Type descriptors named by the class annotations.
    pub annotation_types: Vec<String>,
    pub inner_classes: Vec<String>,
    pub pool: Vec<PoolReference>,
}

fn read_header(reader: &mut Reader<'_>) -> Result<(ClassHeader, ConstantPool)> {
    let magic = reader.read_u4()?;
    if magic != MAGIC {
        return Err(ClassFileError::InvalidMagic(magic));
    }
    let minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    let cp = ConstantPool::parse(reader)?;

    let access_flags = reader.read_u2()?;
    let this_class = cp.class_name(reader.read_u2()?)?.to_string();
    let super_class = cp.optional_class_name(reader.read_u2()?)?;

    let interfaces_count = reader.read_u2()? as usize;
    let mut interfaces = Vec::with_capacity(interfaces_count);
    for _ in 0..interfaces_count {
        interfaces.push(cp.class_name(reader.read_u2()?)?.to_string());
    }

    Ok((
        ClassHeader {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
        },
        cp,
    ))
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let (header, cp) = read_header(&mut reader)?;

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut reader, &cp)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut reader, &cp)?);
        }

        let attrs = parse_attributes(&mut reader, &cp)?;
        reader.ensure_empty()?;

        Ok(Self {
            header,
            fields,
            methods,
            signature: attrs.signature,
            annotation_types: attrs.annotation_types,
            inner_classes: attrs.inner_classes,
            pool: cp.references()?,
        })
    }

    pub fn name(&self) -> &str {
        &self.header.this_class
    }

    /// Walk every structural element, in class file order.
    pub fn accept<V: ClassVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        let header = &self.header;
        visitor.visit_class(&header.this_class)?;
        if let Some(super_class) = &header.super_class {
            visitor.visit_super_class(super_class)?;
        }
        for interface in &header.interfaces {
            visitor.visit_interface(interface)?;
        }
        if let Some(signature) = &self.signature {
            visitor.visit_class_signature(signature)?;
        }
        for descriptor in &self.annotation_types {
            visitor.visit_annotation(descriptor)?;
        }
        for field in &self.fields {
            visitor.visit_field(field)?;
        }
        for method in &self.methods {
            visitor.visit_method(method)?;
        }
        for inner in &self.inner_classes {
            visitor.visit_inner_class(inner)?;
        }
        for reference in &self.pool {
            match reference {
                PoolReference::Class(name) => visitor.visit_pooled_class(name)?,
                PoolReference::Descriptor(desc) => visitor.visit_pooled_descriptor(desc)?,
            }
        }
        visitor.visit_end()
    }
}

/// Callbacks over a decoded [`ClassFile`]. Every method defaults to a no-op.
pub trait ClassVisitor {
    fn visit_class(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn visit_super_class(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn visit_interface(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn visit_class_signature(&mut self, _signature: &str) -> Result<()> {
        Ok(())
    }

    /// A type descriptor named by an annotation: its type, an enum constant
    /// type, or a class literal.
    fn visit_annotation(&mut self, _descriptor: &str) -> Result<()> {
        Ok(())
    }

    fn visit_field(&mut self, _field: &ClassMember) -> Result<()> {
        Ok(())
    }

    fn visit_method(&mut self, _method: &ClassMember) -> Result<()> {
        Ok(())
    }

    fn visit_inner_class(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn visit_pooled_class(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn visit_pooled_descriptor(&mut self, _descriptor: &str) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

fn parse_member(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<ClassMember> {
    let access_flags = reader.read_u2()?;
    let name = cp.utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.utf8(reader.read_u2()?)?.to_string();
    let attrs = parse_attributes(reader, cp)?;
    Ok(ClassMember {
        access_flags,
        name,
        descriptor,
        signature: attrs.signature,
        exceptions: attrs.exceptions,
        annotation_types: attrs.annotation_types,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    exceptions: Vec<String>,
    annotation_types: Vec<String>,
    inner_classes: Vec<String>,
}

fn parse_attributes(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<ParsedAttributes> {
    let count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..count {
        let name = cp.utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut sub = Reader::new(reader.read_bytes(length)?);
        match name {
            "Signature" => {
                parsed.signature = Some(cp.utf8(sub.read_u2()?)?.to_string());
            }
            "Exceptions" => {
                let num = sub.read_u2()?;
                for _ in 0..num {
                    parsed.exceptions.push(cp.class_name(sub.read_u2()?)?.to_string());
                }
            }
            "InnerClasses" => {
                let num = sub.read_u2()?;
                for _ in 0..num {
                    let inner = sub.read_u2()?;
                    let outer = sub.read_u2()?;
                    sub.skip(4)?;
                    parsed.inner_classes.push(cp.class_name(inner)?.to_string());
                    if let Some(outer) = cp.optional_class_name(outer)? {
                        parsed.inner_classes.push(outer);
                    }
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                let num = sub.read_u2()?;
                for _ in 0..num {
                    read_annotation(&mut sub, cp, &mut parsed.annotation_types)?;
                }
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let params = sub.read_u1()?;
                for _ in 0..params {
                    let num = sub.read_u2()?;
                    for _ in 0..num {
                        read_annotation(&mut sub, cp, &mut parsed.annotation_types)?;
                    }
                }
            }
            "AnnotationDefault" => {
                read_element_value(&mut sub, cp, &mut parsed.annotation_types)?;
            }
            // Code and debug attributes only reach classes through the pool.
            _ => {}
        }
    }
    Ok(parsed)
}

fn read_annotation(reader: &mut Reader<'_>, cp: &ConstantPool, out: &mut Vec<String>) -> Result<()> {
    out.push(cp.utf8(reader.read_u2()?)?.to_string());
    let pairs = reader.read_u2()?;
    for _ in 0..pairs {
        let _name = reader.read_u2()?;
        read_element_value(reader, cp, out)?;
    }
    Ok(())
}

fn read_element_value(reader: &mut Reader<'_>, cp: &ConstantPool, out: &mut Vec<String>) -> Result<()> {
    match reader.read_u1()? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => reader.skip(2)?,
        b'e' => {
            out.push(cp.utf8(reader.read_u2()?)?.to_string());
            reader.skip(2)?;
        }
        b'c' => out.push(cp.utf8(reader.read_u2()?)?.to_string()),
        b'@' => read_annotation(reader, cp, out)?,
        b'[' => {
            let num = reader.read_u2()?;
            for _ in 0..num {
                read_element_value(reader, cp, out)?;
            }
        }
        other => return Err(ClassFileError::InvalidElementValueTag(other)),
    }
    Ok(())
}
