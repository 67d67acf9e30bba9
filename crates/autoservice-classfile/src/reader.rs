//! Big-endian byte reader over class file data.

use autoservice_core::ClassFileError;

const MAGIC: u32 = 0xCAFE_BABE;

pub struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn expect_magic(&mut self) -> Result<(), ClassFileError> {
        let found = self.read_u4()?;
        if found != MAGIC {
            return Err(ClassFileError::InvalidMagic { found });
        }
        Ok(())
    }

    pub fn read_u1(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.read_slice(1)?[0])
    }

    pub fn read_u2(&mut self) -> Result<u16, ClassFileError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u4(&mut self) -> Result<u32, ClassFileError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u8(&mut self) -> Result<u64, ClassFileError> {
        let high = self.read_u4()? as u64;
        let low = self.read_u4()? as u64;
        Ok((high << 32) | low)
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassFileError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ClassFileError> {
        self.read_slice(len).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let mut reader = ClassReader::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
        assert_eq!(reader.read_u1().unwrap(), 0x01);
        assert_eq!(reader.read_u2().unwrap(), 0x0203);
        assert_eq!(reader.read_u4().unwrap(), 0x0405_0607);
        assert!(reader.is_empty());
    }

    #[test]
    fn eof_is_an_error() {
        let mut reader = ClassReader::new(&[0x01]);
        assert_eq!(reader.read_u2(), Err(ClassFileError::UnexpectedEof));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.skip(2), Err(ClassFileError::UnexpectedEof));
    }

    #[test]
    fn magic() {
        assert!(ClassReader::new(&[0xCA, 0xFE, 0xBA, 0xBE]).expect_magic().is_ok());
        assert_eq!(
            ClassReader::new(&[0, 0, 0, 1]).expect_magic(),
            Err(ClassFileError::InvalidMagic { found: 1 })
        );
    }

    #[test]
    fn long_values() {
        let mut reader = ClassReader::new(&[0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(reader.read_u8().unwrap(), (1u64 << 32) | 2);
    }
}
