//! Sequential byte reader over an immutable buffer.
//!
//! Every read consumes a fixed number of bytes and advances the position.
//! A read that would run past the end fails with
//! [`CursorError::OutOfBounds`] and leaves the position where it was.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::utils::errors::CursorError;

type Result<T> = std::result::Result<T, CursorError>;

#[derive(Debug, Clone)]
pub struct BinaryCursor<'a> {
    data: &'a [u8],
    position: usize,
}

macro_rules! impl_read_int {
    ($($name:ident => $t:ty, $from:ident;)+) => { $(
        #[inline]
        pub fn $name(&mut self) -> Result<$t> {
            Ok(<$t>::$from(self.take_array()?))
        }
    )+ }
}

impl<'a> BinaryCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(CursorError::OutOfBounds {
                position: self.position,
                requested: n,
                len: self.data.len(),
            })?;

        let bytes = &self.data[self.position..end];
        self.position = end;

        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_u8()
    }

    impl_read_int! {
        read_u8 => u8, from_le_bytes;
        read_i8 => i8, from_le_bytes;
        read_u16_le => u16, from_le_bytes;
        read_u16_be => u16, from_be_bytes;
        read_i16_le => i16, from_le_bytes;
        read_i16_be => i16, from_be_bytes;
        read_u32_le => u32, from_le_bytes;
        read_u32_be => u32, from_be_bytes;
        read_i32_le => i32, from_le_bytes;
        read_i32_be => i32, from_be_bytes;
    }

    /// Borrows the next `n` bytes from the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Reads `n` bytes as single-byte characters.
    pub fn read_ascii(&mut self, n: usize) -> Result<String> {
        Ok(self.take(n)?.iter().map(|&b| b as char).collect())
    }

    pub fn read_fourcc(&mut self) -> Result<[u8; 4]> {
        self.take_array()
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Reads an ID3 tag size weighted `0x200000, 0x400, 0x80, 1`, the top bit
    /// of every byte ignored.
    pub fn read_id3_size_u32(&mut self) -> Result<u32> {
        let [b0, b1, b2, b3]: [u8; 4] = self.take_array()?;

        Ok((b0 & 0x7F) as u32 * 0x20_0000
            + (b1 & 0x7F) as u32 * 0x400
            + (b2 & 0x7F) as u32 * 0x80
            + (b3 & 0x7F) as u32)
    }

    /// Reads a 32-bit syncsafe integer: four big-endian bytes carrying 7 bits
    /// each, the top bit of every byte ignored.
    pub fn read_syncsafe_u32(&mut self) -> Result<u32> {
        let position = self.position;
        let bytes: [u8; 4] = self.take_array()?;

        let decode = || -> io::Result<u32> {
            let mut bs: BitReader<_, BigEndian> = BitReader::new(io::Cursor::new(bytes));
            let mut value = 0u32;
            for _ in 0..4 {
                bs.skip(1)?;
                let group: u32 = bs.read_unsigned_var(7)?;
                value = (value << 7) | group;
            }
            Ok(value)
        };

        decode().map_err(|_| CursorError::OutOfBounds {
            position,
            requested: 4,
            len: self.data.len(),
        })
    }
}
