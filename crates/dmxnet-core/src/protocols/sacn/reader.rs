use std::ops::Range;

use uuid::Uuid;

use super::error::SacnError;
use super::layout;
use crate::protocols::common::reader::until_nul;

pub struct SacnReader<'a> {
    payload: &'a [u8],
}

impl<'a> SacnReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), SacnError> {
        if self.payload.len() < needed {
            return Err(SacnError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, SacnError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(SacnError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, SacnError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u32_be(&self, range: Range<usize>) -> Result<u32, SacnError> {
        let bytes = self.read_array::<4>(range)?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], SacnError> {
        self.payload.get(range.clone()).ok_or(SacnError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    /// NUL-terminated UTF-8 text inside a fixed-width field. Invalid
    /// sequences are replaced rather than rejected.
    pub fn read_nul_terminated_string(&self, range: Range<usize>) -> Result<String, SacnError> {
        let bytes = self.read_slice(range)?;
        Ok(String::from_utf8_lossy(until_nul(bytes)).into_owned())
    }

    pub fn read_cid(&self) -> Result<Uuid, SacnError> {
        let bytes = self.read_array::<16>(layout::CID_RANGE)?;
        Ok(Uuid::from_bytes(bytes))
    }

    fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], SacnError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| SacnError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SacnReader;

    #[test]
    fn source_name_stops_at_nul() {
        let mut field = [0u8; 8];
        field[..3].copy_from_slice(b"abc");
        field[4] = b'x';
        let reader = SacnReader::new(&field);
        assert_eq!(reader.read_nul_terminated_string(0..8).unwrap(), "abc");
    }

    #[test]
    fn reads_big_endian_words() {
        let reader = SacnReader::new(&[0, 0, 0, 4, 0x12, 0x34]);
        assert_eq!(reader.read_u32_be(0..4).unwrap(), 4);
        assert_eq!(reader.read_u16_be(4..6).unwrap(), 0x1234);
    }
}
