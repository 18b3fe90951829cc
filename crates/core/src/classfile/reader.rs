use crate::error::{BugexError, Result};
use ristretto_classfile::ClassFile;
use ristretto_classfile::attributes::Attribute;
use std::io::Cursor;

/// A parsed class image.
///
/// Parsing checks structural well-formedness only (magic, version, table
/// lengths). Constant-pool references of a method are resolved lazily by
/// [`ClassImage::methods`].
pub struct ClassImage {
    class_file: ClassFile,
}

/// A line-number entry of a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    pub offset: u32,
    pub line: u32,
}

/// One entry of the method table.
#[derive(Debug, Clone)]
pub struct MethodView<'a> {
    name: &'a str,
    descriptor: &'a str,
    markers: Vec<LineMarker>,
}

impl<'a> MethodView<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn descriptor(&self) -> &'a str {
        self.descriptor
    }

    /// Markers in encounter order: ascending code offset, table order for ties.
    pub fn markers(&self) -> &[LineMarker] {
        &self.markers
    }

    pub fn line_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.markers.iter().map(|marker| marker.line)
    }
}

impl ClassImage {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let class_file = ClassFile::from_bytes(&mut Cursor::new(bytes.to_vec()))
            .map_err(|e| BugexError::MalformedInput(format!("{e:?}")))?;
        Ok(Self { class_file })
    }

    /// Fully-qualified, dot-separated name declared by the image.
    pub fn class_name(&self) -> Result<String> {
        let internal: &str = self
            .class_file
            .class_name()
            .map_err(|e| BugexError::MalformedInput(format!("unresolvable this_class: {e:?}")))?;
        Ok(internal.replace('/', "."))
    }

    pub fn method_count(&self) -> usize {
        self.class_file.methods.len()
    }

    /// Walks the method table in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = Result<MethodView<'_>>> + '_ {
        let pool = &self.class_file.constant_pool;
        self.class_file.methods.iter().map(move |method| {
            let name: &str = pool.try_get_utf8(method.name_index).map_err(|e| {
                BugexError::MalformedInput(format!("unresolvable method name: {e:?}"))
            })?;
            let descriptor: &str = pool.try_get_utf8(method.descriptor_index).map_err(|e| {
                BugexError::MalformedInput(format!("unresolvable method descriptor: {e:?}"))
            })?;

            let mut markers = Vec::new();
            for attribute in &method.attributes {
                if let Attribute::Code { attributes, .. } = attribute {
                    for nested in attributes {
                        if let Attribute::LineNumberTable { line_numbers, .. } = nested {
                            markers.extend(line_numbers.iter().map(|entry| LineMarker {
                                offset: u32::from(entry.start_pc),
                                line: u32::from(entry.line_number),
                            }));
                        }
                    }
                }
            }
            markers.sort_by_key(|marker| marker.offset);

            Ok(MethodView {
                name,
                descriptor,
                markers,
            })
        })
    }

    pub(crate) fn class_file(&self) -> &ClassFile {
        &self.class_file
    }
}
