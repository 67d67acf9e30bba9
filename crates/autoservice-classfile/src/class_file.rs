//! Class file structure: header, supertypes and class-level annotations.
//!
//! Fields and methods are skipped wholesale. Only the two runtime annotation
//! attributes are decoded; every other attribute is skipped by its length.

use autoservice_core::{ClassFileError, ClassId};
use num_enum::TryFromPrimitive;

use crate::access::AccessFlags;
use crate::annotation::{Annotation, ElementValue};
use crate::constant_pool::ConstantPool;
use crate::reader::ClassReader;

pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

/// Descriptor of the annotation the Kotlin compiler attaches to every class.
pub const KOTLIN_METADATA: &str = "Lkotlin/Metadata;";

/// The `k` element of `kotlin.Metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(i32)]
pub enum KotlinClassKind {
    Class = 1,
    FileFacade = 2,
    SyntheticClass = 3,
    MultifileClassFacade = 4,
    MultifileClassPart = 5,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub access: AccessFlags,
    /// Internal name of this class (`com/example/Outer$Inner`).
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub visible_annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = ClassReader::new(bytes);
        reader.expect_magic()?;
        reader.skip(4)?; // minor and major version

        let pool = ConstantPool::parse(&mut reader)?;
        let access = AccessFlags::from_bits_retain(reader.read_u2()?);
        let this_class = pool.class_name(reader.read_u2()?)?.to_string();

        let super_index = reader.read_u2()?;
        let super_class = match super_index {
            0 => None,
            index => Some(pool.class_name(index)?.to_string()),
        };

        let interface_count = reader.read_u2()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(reader.read_u2()?)?.to_string());
        }

        skip_members(&mut reader)?; // fields
        skip_members(&mut reader)?; // methods

        let mut visible_annotations = Vec::new();
        let mut invisible_annotations = Vec::new();
        let attribute_count = reader.read_u2()?;
        for _ in 0..attribute_count {
            let name = pool.utf8(reader.read_u2()?)?;
            let length = reader.read_u4()? as usize;
            let mut body = ClassReader::new(reader.read_slice(length)?);
            match name {
                RUNTIME_VISIBLE_ANNOTATIONS => {
                    visible_annotations.extend(Annotation::parse_all(&mut body, &pool)?)
                }
                RUNTIME_INVISIBLE_ANNOTATIONS => {
                    invisible_annotations.extend(Annotation::parse_all(&mut body, &pool)?)
                }
                _ => {}
            }
        }

        Ok(Self {
            access,
            this_class,
            super_class,
            interfaces,
            visible_annotations,
            invisible_annotations,
        })
    }

    /// Identity of this class, or `None` for anonymous and local classes.
    pub fn class_id(&self) -> Option<ClassId> {
        ClassId::from_internal_name(&self.this_class)
    }

    /// Internal names of the superclass followed by the interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.super_class
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.visible_annotations
            .iter()
            .chain(self.invisible_annotations.iter())
    }

    pub fn find_annotation(&self, descriptor: &str) -> Option<&Annotation> {
        self.annotations()
            .find(|annotation| annotation.type_descriptor == descriptor)
    }

    pub fn is_interface(&self) -> bool {
        self.access.contains(AccessFlags::INTERFACE)
    }

    pub fn is_annotation(&self) -> bool {
        self.access.contains(AccessFlags::ANNOTATION)
    }

    pub fn is_module(&self) -> bool {
        self.access.contains(AccessFlags::MODULE)
    }

    /// Kind recorded in `kotlin.Metadata`, or `None` for non-Kotlin classes.
    ///
    /// A metadata annotation without a `k` element means [`KotlinClassKind::Class`].
    pub fn kotlin_metadata_kind(&self) -> Option<KotlinClassKind> {
        let metadata = self.find_annotation(KOTLIN_METADATA)?;
        let kind = metadata
            .element("k")
            .and_then(ElementValue::as_int)
            .unwrap_or(KotlinClassKind::Class as i32);
        KotlinClassKind::try_from(kind).ok()
    }
}

fn skip_members(reader: &mut ClassReader<'_>) -> Result<(), ClassFileError> {
    let count = reader.read_u2()?;
    for _ in 0..count {
        reader.skip(6)?; // access, name, descriptor
        skip_attributes(reader)?;
    }
    Ok(())
}

fn skip_attributes(reader: &mut ClassReader<'_>) -> Result<(), ClassFileError> {
    let count = reader.read_u2()?;
    for _ in 0..count {
        reader.skip(2)?;
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassFileBuilder;
    use crate::annotation::ConstValue;

    const AUTO_SERVICE: &str = "Lcom/google/auto/service/AutoService;";

    #[test]
    fn header_and_supertypes() {
        let bytes = ClassFileBuilder::new("com/example/Impl")
            .super_class("com/example/Base")
            .interface("com/example/Service")
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.this_class, "com/example/Impl");
        assert_eq!(
            class.supertypes().collect::<Vec<_>>(),
            ["com/example/Base", "com/example/Service"]
        );
        assert_eq!(
            class.class_id().unwrap().binary_name(),
            "com.example.Impl"
        );
        assert!(!class.is_interface());
    }

    #[test]
    fn class_literal_array_annotation() {
        let bytes = ClassFileBuilder::new("com/example/Outer$Impl")
            .annotation(
                AUTO_SERVICE,
                vec![(
                    "value",
                    ElementValue::Array(vec![
                        ElementValue::Class("Lcom/example/First;".into()),
                        ElementValue::Class("Lcom/example/Second;".into()),
                    ]),
                )],
            )
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        let annotation = class.find_annotation(AUTO_SERVICE).unwrap();
        let values = annotation.element("value").and_then(ElementValue::as_array).unwrap();
        let classes: Vec<_> = values.iter().filter_map(ElementValue::as_class).collect();
        assert_eq!(classes, ["Lcom/example/First;", "Lcom/example/Second;"]);
        assert_eq!(
            class.class_id().unwrap().binary_name(),
            "com.example.Outer$Impl"
        );
    }

    #[test]
    fn invisible_annotations_are_read() {
        let bytes = ClassFileBuilder::new("Impl")
            .invisible_annotation(AUTO_SERVICE, vec![])
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        assert!(class.visible_annotations.is_empty());
        assert!(class.find_annotation(AUTO_SERVICE).is_some());
    }

    #[test]
    fn kotlin_metadata_kind() {
        let facade = ClassFileBuilder::new("com/example/UtilsKt")
            .kotlin_metadata(KotlinClassKind::FileFacade)
            .build();
        assert_eq!(
            ClassFile::parse(&facade).unwrap().kotlin_metadata_kind(),
            Some(KotlinClassKind::FileFacade)
        );

        let implicit = ClassFileBuilder::new("com/example/Impl")
            .annotation(KOTLIN_METADATA, vec![("mv", ElementValue::Array(vec![]))])
            .build();
        assert_eq!(
            ClassFile::parse(&implicit).unwrap().kotlin_metadata_kind(),
            Some(KotlinClassKind::Class)
        );

        let java = ClassFileBuilder::new("com/example/Plain").build();
        assert_eq!(ClassFile::parse(&java).unwrap().kotlin_metadata_kind(), None);
    }

    #[test]
    fn constant_elements() {
        let bytes = ClassFileBuilder::new("Impl")
            .annotation(
                "Lcom/example/Config;",
                vec![
                    ("name", ElementValue::Const(ConstValue::String("svc".into()))),
                    ("priority", ElementValue::Const(ConstValue::Int(-3))),
                    ("weight", ElementValue::Const(ConstValue::Long(1 << 40))),
                ],
            )
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        let annotation = class.find_annotation("Lcom/example/Config;").unwrap();
        assert_eq!(annotation.element("priority").and_then(ElementValue::as_int), Some(-3));
        assert_eq!(
            annotation.element("weight"),
            Some(&ElementValue::Const(ConstValue::Long(1 << 40)))
        );
    }

    #[test]
    fn interface_flags() {
        let bytes = ClassFileBuilder::new("com/example/Service")
            .access(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        assert!(class.is_interface());
        assert!(!class.is_annotation());
    }

    #[test]
    fn truncated_and_foreign_input() {
        let bytes = ClassFileBuilder::new("Impl").build();
        assert_eq!(
            ClassFile::parse(&bytes[..bytes.len() - 1]),
            Err(ClassFileError::UnexpectedEof)
        );
        assert!(matches!(
            ClassFile::parse(b"PK\x03\x04"),
            Err(ClassFileError::InvalidMagic { .. })
        ));
    }
}
