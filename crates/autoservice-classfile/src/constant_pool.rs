//! Constant pool decoding.
//!
//! Only the entries the annotation reader needs keep their payload; every
//! other tag is skipped by its fixed size.

use autoservice_core::ClassFileError;
use num_enum::TryFromPrimitive;

use crate::reader::ClassReader;

/// Constant pool entry tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantTag {
    /// Long and double entries occupy two pool slots.
    pub fn is_wide(self) -> bool {
        matches!(self, ConstantTag::Long | ConstantTag::Double)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Other(ConstantTag),
    /// Index 0 and the second slot of wide entries.
    Unusable,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassFileError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let index = entries.len() as u16;
            let raw = reader.read_u1()?;
            let tag = ConstantTag::try_from(raw)
                .map_err(|_| ClassFileError::UnsupportedConstant { tag: raw })?;

            let entry = match tag {
                ConstantTag::Utf8 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    let value = decode_modified_utf8(bytes)
                        .ok_or(ClassFileError::InvalidUtf8 { index })?;
                    Constant::Utf8(value)
                }
                ConstantTag::Integer => Constant::Integer(reader.read_u4()? as i32),
                ConstantTag::Float => Constant::Float(f32::from_bits(reader.read_u4()?)),
                ConstantTag::Long => Constant::Long(reader.read_u8()? as i64),
                ConstantTag::Double => Constant::Double(f64::from_bits(reader.read_u8()?)),
                ConstantTag::Class => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                ConstantTag::String => Constant::String {
                    string_index: reader.read_u2()?,
                },
                ConstantTag::FieldRef
                | ConstantTag::MethodRef
                | ConstantTag::InterfaceMethodRef
                | ConstantTag::NameAndType
                | ConstantTag::Dynamic
                | ConstantTag::InvokeDynamic => {
                    reader.skip(4)?;
                    Constant::Other(tag)
                }
                ConstantTag::MethodHandle => {
                    reader.skip(3)?;
                    Constant::Other(tag)
                }
                ConstantTag::MethodType | ConstantTag::Module | ConstantTag::Package => {
                    reader.skip(2)?;
                    Constant::Other(tag)
                }
            };

            entries.push(entry);
            if tag.is_wide() {
                entries.push(Constant::Unusable);
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn get(&self, index: u16) -> Result<&Constant, ClassFileError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassFileError::InvalidConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }

    /// Internal name of a `CONSTANT_Class` entry (`com/example/Foo`).
    pub fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }

    pub fn integer(&self, index: u16) -> Result<i32, ClassFileError> {
        match self.get(index)? {
            Constant::Integer(value) => Ok(*value),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }
}

/// Decode the JVM's modified UTF-8 (`0xC0 0x80` for NUL, surrogate pairs
/// encoded as two three-byte sequences).
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some(s.to_string());
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();
    while let Some(b) = iter.next() {
        let unit = if b & 0x80 == 0 {
            b as u16
        } else if b & 0xE0 == 0xC0 {
            let b2 = continuation(iter.next())?;
            ((b as u16 & 0x1F) << 6) | b2
        } else if b & 0xF0 == 0xE0 {
            let b2 = continuation(iter.next())?;
            let b3 = continuation(iter.next())?;
            ((b as u16 & 0x0F) << 12) | (b2 << 6) | b3
        } else {
            return None;
        };
        units.push(unit);
    }

    String::from_utf16(&units).ok()
}

fn continuation(byte: Option<u8>) -> Option<u16> {
    byte.filter(|b| b & 0xC0 == 0x80).map(|b| (b & 0x3F) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_entry(s: &str) -> Vec<u8> {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(s.len() as u16).to_be_bytes());
        bytes.extend_from_slice(s.as_bytes());
        bytes
    }

    #[test]
    fn parses_class_and_utf8() {
        let mut data = vec![0, 3];
        data.extend(utf8_entry("com/example/Foo"));
        data.extend([7, 0, 1]);

        let pool = ConstantPool::parse(&mut ClassReader::new(&data)).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.class_name(2).unwrap(), "com/example/Foo");
        assert_eq!(
            pool.class_name(1),
            Err(ClassFileError::InvalidConstantIndex { index: 1 })
        );
    }

    #[test]
    fn wide_entries_take_two_slots() {
        let mut data = vec![0, 5];
        data.extend([5, 0, 0, 0, 0, 0, 0, 0, 7]);
        data.extend([3, 0, 0, 0, 42]);
        data.extend(utf8_entry("k"));

        let pool = ConstantPool::parse(&mut ClassReader::new(&data)).unwrap();
        assert_eq!(pool.get(1).unwrap(), &Constant::Long(7));
        assert!(pool.get(2).is_err());
        assert_eq!(pool.integer(3).unwrap(), 42);
        assert_eq!(pool.utf8(4).unwrap(), "k");
    }

    #[test]
    fn index_zero_is_unusable() {
        let pool = ConstantPool::parse(&mut ClassReader::new(&[0, 1])).unwrap();
        assert!(pool.is_empty());
        assert!(pool.get(0).is_err());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = ConstantPool::parse(&mut ClassReader::new(&[0, 2, 2])).unwrap_err();
        assert_eq!(err, ClassFileError::UnsupportedConstant { tag: 2 });
    }

    #[test]
    fn modified_utf8() {
        assert_eq!(decode_modified_utf8(b"plain").as_deref(), Some("plain"));
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']).as_deref(), Some("a\0b"));
        // U+1F600 as a surrogate pair
        let emoji = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&emoji).as_deref(), Some("\u{1F600}"));
        assert!(decode_modified_utf8(&[0xC0]).is_none());
    }
}
