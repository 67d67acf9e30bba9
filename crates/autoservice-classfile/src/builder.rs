//! Assembles minimal class files: header, supertypes and class annotations.
//!
//! Fixtures and benchmarks use this to produce binary inputs without a JVM
//! toolchain. The output is accepted by [`ClassFile::parse`](crate::ClassFile::parse).

use crate::access::AccessFlags;
use crate::annotation::{Annotation, ConstValue, ElementValue};
use crate::class_file::{
    KOTLIN_METADATA, KotlinClassKind, RUNTIME_INVISIBLE_ANNOTATIONS, RUNTIME_VISIBLE_ANNOTATIONS,
};

const MAJOR_VERSION: u16 = 52;

#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    next_index: u16,
    utf8: Vec<(String, u16)>,
    access: AccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    visible: Vec<Vec<u8>>,
    invisible: Vec<Vec<u8>>,
}

impl ClassFileBuilder {
    /// A public class extending `java/lang/Object`.
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            next_index: 1,
            utf8: Vec::new(),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            visible: Vec::new(),
            invisible: Vec::new(),
        };
        builder.this_class = builder.class_entry(internal_name);
        builder.super_class = builder.class_entry("java/lang/Object");
        builder
    }

    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = self.class_entry(internal_name);
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        let index = self.class_entry(internal_name);
        self.interfaces.push(index);
        self
    }

    pub fn annotation(mut self, descriptor: &str, elements: Vec<(&str, ElementValue)>) -> Self {
        let bytes = self.encode_annotation(&to_annotation(descriptor, elements));
        self.visible.push(bytes);
        self
    }

    pub fn invisible_annotation(
        mut self,
        descriptor: &str,
        elements: Vec<(&str, ElementValue)>,
    ) -> Self {
        let bytes = self.encode_annotation(&to_annotation(descriptor, elements));
        self.invisible.push(bytes);
        self
    }

    pub fn kotlin_metadata(self, kind: KotlinClassKind) -> Self {
        self.annotation(
            KOTLIN_METADATA,
            vec![("k", ElementValue::Const(ConstValue::Int(kind as i32)))],
        )
    }

    pub fn build(mut self) -> Vec<u8> {
        let visible_name = (!self.visible.is_empty()).then(|| self.utf8_entry(RUNTIME_VISIBLE_ANNOTATIONS));
        let invisible_name =
            (!self.invisible.is_empty()).then(|| self.utf8_entry(RUNTIME_INVISIBLE_ANNOTATIONS));

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&MAJOR_VERSION.to_be_bytes());
        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&self.access.bits().to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }
        out.extend_from_slice(&0u16.to_be_bytes()); // fields
        out.extend_from_slice(&0u16.to_be_bytes()); // methods

        let attributes = [(visible_name, &self.visible), (invisible_name, &self.invisible)];
        let count = attributes.iter().filter(|(name, _)| name.is_some()).count() as u16;
        out.extend_from_slice(&count.to_be_bytes());
        for (name, annotations) in attributes {
            let Some(name) = name else { continue };
            let mut body = (annotations.len() as u16).to_be_bytes().to_vec();
            for annotation in annotations {
                body.extend_from_slice(annotation);
            }
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            out.extend_from_slice(&body);
        }
        out
    }

    fn utf8_entry(&mut self, value: &str) -> u16 {
        if let Some((_, index)) = self.utf8.iter().find(|(s, _)| s == value) {
            return *index;
        }
        let index = self.next_index;
        self.pool.push(1);
        self.pool.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(value.as_bytes());
        self.next_index += 1;
        self.utf8.push((value.to_string(), index));
        index
    }

    fn class_entry(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8_entry(internal_name);
        self.push_entry(7, &name.to_be_bytes(), 1)
    }

    fn push_entry(&mut self, tag: u8, payload: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.push(tag);
        self.pool.extend_from_slice(payload);
        self.next_index += slots;
        index
    }

    fn encode_annotation(&mut self, annotation: &Annotation) -> Vec<u8> {
        let mut out = Vec::new();
        let type_index = self.utf8_entry(&annotation.type_descriptor);
        out.extend_from_slice(&type_index.to_be_bytes());
        out.extend_from_slice(&(annotation.elements.len() as u16).to_be_bytes());
        for (name, value) in &annotation.elements {
            let name_index = self.utf8_entry(name);
            out.extend_from_slice(&name_index.to_be_bytes());
            self.encode_element(value, &mut out);
        }
        out
    }

    fn encode_element(&mut self, value: &ElementValue, out: &mut Vec<u8>) {
        match value {
            ElementValue::Const(constant) => {
                let (tag, index) = match constant {
                    ConstValue::Int(v) => (b'I', self.push_entry(3, &v.to_be_bytes(), 1)),
                    ConstValue::Float(v) => (b'F', self.push_entry(4, &v.to_bits().to_be_bytes(), 1)),
                    ConstValue::Long(v) => (b'J', self.push_entry(5, &v.to_be_bytes(), 2)),
                    ConstValue::Double(v) => {
                        (b'D', self.push_entry(6, &v.to_bits().to_be_bytes(), 2))
                    }
                    ConstValue::String(v) => (b's', self.utf8_entry(v)),
                };
                out.push(tag);
                out.extend_from_slice(&index.to_be_bytes());
            }
            ElementValue::Enum {
                type_descriptor,
                name,
            } => {
                out.push(b'e');
                let type_index = self.utf8_entry(type_descriptor);
                let name_index = self.utf8_entry(name);
                out.extend_from_slice(&type_index.to_be_bytes());
                out.extend_from_slice(&name_index.to_be_bytes());
            }
            ElementValue::Class(descriptor) => {
                out.push(b'c');
                let index = self.utf8_entry(descriptor);
                out.extend_from_slice(&index.to_be_bytes());
            }
            ElementValue::Annotation(nested) => {
                out.push(b'@');
                let bytes = self.encode_annotation(nested);
                out.extend_from_slice(&bytes);
            }
            ElementValue::Array(values) => {
                out.push(b'[');
                out.extend_from_slice(&(values.len() as u16).to_be_bytes());
                for value in values {
                    self.encode_element(value, out);
                }
            }
        }
    }
}

fn to_annotation(descriptor: &str, elements: Vec<(&str, ElementValue)>) -> Annotation {
    Annotation {
        type_descriptor: descriptor.to_string(),
        elements: elements
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    }
}
