//! Class names embedded in descriptors and generic signatures.

use crate::error::ClassFileError;

/// Normalizes a `CONSTANT_Class` style name to an internal class name.
///
/// Array descriptors resolve to their element class (`None` for primitive
/// arrays). Some compilers emit a class constant wrapped as a descriptor
/// (`Lcom/x/A;`); the wrapper is stripped.
pub fn internal_class_name(raw: &str) -> Option<&str> {
    let element = raw.trim_start_matches('[');
    if element.len() != raw.len() {
        return match element.strip_prefix('L') {
            Some(rest) => non_empty(rest.strip_suffix(';').unwrap_or(rest)),
            None => None,
        };
    }
    match raw.strip_prefix('L').and_then(|rest| rest.strip_suffix(';')) {
        Some(inner) => non_empty(inner),
        None => non_empty(raw),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// Every class named by a field or method descriptor, in order.
///
/// Tolerant by construction: anything that is not an object type is skipped,
/// and an unterminated object type runs to the end of the input.
pub fn descriptor_class_names(descriptor: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = descriptor;
    while let Some(pos) = rest.find('L') {
        // Only treat `L` as an object marker where a type may start.
        let before = &rest[..pos];
        if !before
            .bytes()
            .all(|b| matches!(b, b'(' | b')' | b'[' | b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V'))
        {
            break;
        }
        let after = &rest[pos + 1..];
        match after.find(';') {
            Some(end) => {
                if end > 0 {
                    names.push(&after[..end]);
                }
                rest = &after[end + 1..];
            }
            None => {
                if !after.is_empty() {
                    names.push(after);
                }
                break;
            }
        }
    }
    names
}

/// Every class named by a class, field or method signature.
///
/// Inner class suffixes (`Lp/Outer<TT;>.Inner;`) yield both `p/Outer` and
/// `p/Outer$Inner`. Type variables are not classes and are skipped.
pub fn signature_class_names(signature: &str) -> Result<Vec<String>, ClassFileError> {
    let mut scanner = SignatureScanner {
        signature,
        pos: 0,
        names: Vec::new(),
    };
    scanner.signature()?;
    Ok(scanner.names)
}

struct SignatureScanner<'a> {
    signature: &'a str,
    pos: usize,
    names: Vec<String>,
}

impl SignatureScanner<'_> {
    fn error(&self) -> ClassFileError {
        ClassFileError::InvalidSignature(self.signature.to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.signature.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<u8, ClassFileError> {
        let b = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, expected: u8) -> Result<(), ClassFileError> {
        if self.bump()? == expected {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Covers class, field and method signatures in one grammar.
    fn signature(&mut self) -> Result<(), ClassFileError> {
        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }
        if self.peek() == Some(b'(') {
            self.bump()?;
            while self.peek() != Some(b')') {
                self.type_signature()?;
            }
            self.bump()?;
            if self.peek() == Some(b'V') {
                self.bump()?;
            } else {
                self.type_signature()?;
            }
            while self.peek() == Some(b'^') {
                self.bump()?;
                self.reference_type()?;
            }
        } else {
            if self.peek().is_none() {
                return Err(self.error());
            }
            while self.peek().is_some() {
                self.reference_type()?;
            }
        }
        if self.peek().is_some() {
            return Err(self.error());
        }
        Ok(())
    }

    fn type_parameters(&mut self) -> Result<(), ClassFileError> {
        self.expect(b'<')?;
        while self.peek() != Some(b'>') {
            // Identifier up to the class bound.
            while self.bump()? != b':' {}
            if matches!(self.peek(), Some(b'L' | b'[' | b'T')) {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.bump()?;
                self.reference_type()?;
            }
        }
        self.expect(b'>')
    }

    fn type_signature(&mut self) -> Result<(), ClassFileError> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.bump()?;
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<(), ClassFileError> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => {
                while self.bump()? != b';' {}
                Ok(())
            }
            Some(b'[') => {
                self.bump()?;
                self.type_signature()
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<(), ClassFileError> {
        self.expect(b'L')?;
        let mut name = self.identifier()?.to_string();
        self.names.push(name.clone());
        loop {
            match self.bump()? {
                b';' => return Ok(()),
                b'<' => {
                    self.pos -= 1;
                    self.type_arguments()?;
                }
                b'.' => {
                    let inner = self.identifier()?;
                    name = format!("{name}${inner}");
                    self.names.push(name.clone());
                }
                _ => return Err(self.error()),
            }
        }
    }

    fn identifier(&mut self) -> Result<&str, ClassFileError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b';' | b'<' | b'.' | b'>') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.signature[start..self.pos])
    }

    fn type_arguments(&mut self) -> Result<(), ClassFileError> {
        self.expect(b'<')?;
        while self.peek() != Some(b'>') {
            match self.peek() {
                Some(b'*') => {
                    self.bump()?;
                }
                Some(b'+' | b'-') => {
                    self.bump()?;
                    self.reference_type()?;
                }
                _ => self.reference_type()?,
            }
        }
        self.expect(b'>')
    }
}
