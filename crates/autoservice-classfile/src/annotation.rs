//! `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations` payloads.

use autoservice_core::ClassFileError;
use num_enum::TryFromPrimitive;

use crate::constant_pool::{Constant, ConstantPool};
use crate::reader::ClassReader;

/// `element_value` tags, by their ASCII code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ElementTag {
    Byte = b'B',
    Char = b'C',
    Double = b'D',
    Float = b'F',
    Int = b'I',
    Long = b'J',
    Short = b'S',
    Boolean = b'Z',
    String = b's',
    Enum = b'e',
    Class = b'c',
    Annotation = b'@',
    Array = b'[',
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum { type_descriptor: String, name: String },
    /// Return descriptor of a class literal (`Lcom/example/Foo;`).
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn as_array(&self) -> Option<&[ElementValue]> {
        match self {
            ElementValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            ElementValue::Class(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            ElementValue::Const(ConstValue::Int(value)) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type.
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn parse_all(
        reader: &mut ClassReader<'_>,
        pool: &ConstantPool,
    ) -> Result<Vec<Annotation>, ClassFileError> {
        let count = reader.read_u2()?;
        (0..count).map(|_| Self::parse(reader, pool)).collect()
    }

    fn parse(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Self, ClassFileError> {
        let type_descriptor = pool.utf8(reader.read_u2()?)?.to_string();
        let pairs = reader.read_u2()?;
        let mut elements = Vec::with_capacity(pairs as usize);
        for _ in 0..pairs {
            let name = pool.utf8(reader.read_u2()?)?.to_string();
            let value = parse_element_value(reader, pool)?;
            elements.push((name, value));
        }
        Ok(Self {
            type_descriptor,
            elements,
        })
    }
}

fn parse_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, ClassFileError> {
    let raw = reader.read_u1()?;
    let tag = ElementTag::try_from(raw).map_err(|_| ClassFileError::UnsupportedElementTag {
        tag: raw as char,
    })?;

    let value = match tag {
        ElementTag::Byte
        | ElementTag::Char
        | ElementTag::Int
        | ElementTag::Short
        | ElementTag::Boolean => ElementValue::Const(ConstValue::Int(pool.integer(reader.read_u2()?)?)),
        ElementTag::Long | ElementTag::Float | ElementTag::Double => {
            let index = reader.read_u2()?;
            let value = match pool.get(index)? {
                Constant::Long(v) => ConstValue::Long(*v),
                Constant::Float(v) => ConstValue::Float(*v),
                Constant::Double(v) => ConstValue::Double(*v),
                _ => return Err(ClassFileError::InvalidConstantIndex { index }),
            };
            ElementValue::Const(value)
        }
        ElementTag::String => {
            ElementValue::Const(ConstValue::String(pool.utf8(reader.read_u2()?)?.to_string()))
        }
        ElementTag::Enum => {
            let type_descriptor = pool.utf8(reader.read_u2()?)?.to_string();
            let name = pool.utf8(reader.read_u2()?)?.to_string();
            ElementValue::Enum {
                type_descriptor,
                name,
            }
        }
        ElementTag::Class => ElementValue::Class(pool.utf8(reader.read_u2()?)?.to_string()),
        ElementTag::Annotation => ElementValue::Annotation(Annotation::parse(reader, pool)?),
        ElementTag::Array => {
            let count = reader.read_u2()?;
            let values = (0..count)
                .map(|_| parse_element_value(reader, pool))
                .collect::<Result<Vec<_>, _>>()?;
            ElementValue::Array(values)
        }
    };

    Ok(value)
}
