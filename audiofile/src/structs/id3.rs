//! ID3v2 tag header structures
//!
//! Only the tag header and the first frame are modelled. The frame content
//! is kept as raw bytes; text frames can be viewed through
//! [`Id3Frame::text`].

use std::fmt::{Display, Formatter};

use log::trace;

use crate::utils::cursor::BinaryCursor;
use crate::utils::errors::CursorError;

pub const ID3_MARKER: &[u8; 3] = b"ID3";

/// Length of the tag header that precedes the first frame, marker included.
pub const ID3_HEADER_LEN: usize = 10;

/// Length of a frame header: id, content size and flags.
pub const ID3_FRAME_HEADER_LEN: usize = 10;

/// How the four tag size bytes are weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Id3SizeEncoding {
    /// `b0 * 0x200000 + b1 * 0x400 + b2 * 0x80 + b3`, as older readers
    /// compute it.
    #[default]
    Legacy,
    /// Four 7-bit groups, `b1` worth `0x4000`.
    Syncsafe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3Header {
    pub version: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag size from the header field, excluding the 10-byte header.
    pub tag_size: u32,
    pub first_frame: Id3Frame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3Frame {
    pub id: [u8; 4],
    pub flags: u16,
    pub content: Vec<u8>,
}

impl Id3Header {
    /// Reads everything after the `ID3` marker.
    pub fn read(
        reader: &mut BinaryCursor,
        size_encoding: Id3SizeEncoding,
    ) -> Result<Self, CursorError> {
        let version = reader.read_byte()?;
        let revision = reader.read_byte()?;
        let flags = reader.read_byte()?;
        let tag_size = match size_encoding {
            Id3SizeEncoding::Legacy => reader.read_id3_size_u32()?,
            Id3SizeEncoding::Syncsafe => reader.read_syncsafe_u32()?,
        };

        trace!("ID3v2.{version}.{revision}: flags = {flags:#04X}, size = {tag_size}");

        let first_frame = Id3Frame::read(reader)?;

        Ok(Self {
            version,
            revision,
            flags,
            tag_size,
            first_frame,
        })
    }
}

impl Id3Frame {
    pub fn read(reader: &mut BinaryCursor) -> Result<Self, CursorError> {
        let id = reader.read_fourcc()?;
        let content_size = reader.read_u32_be()?;
        let flags = reader.read_u16_be()?;
        let content = reader.read_bytes(content_size as usize)?.to_vec();

        let frame = Self { id, flags, content };
        trace!(
            "ID3 frame '{}': {content_size} bytes, flags = {flags:#06X}",
            frame.id_str()
        );

        Ok(frame)
    }

    pub fn id_str(&self) -> String {
        self.id.iter().map(|&b| b as char).collect()
    }

    pub fn is_text_frame(&self) -> bool {
        self.id[0] == b'T'
    }

    /// Content as text. Text frames lose their leading encoding byte and any
    /// trailing terminators.
    pub fn text(&self) -> String {
        let body = match self.content.split_first() {
            Some((_, rest)) if self.is_text_frame() => rest,
            _ => &self.content[..],
        };

        String::from_utf8_lossy(body)
            .trim_end_matches('\0')
            .to_string()
    }
}

impl Display for Id3Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID3v2.{}.{} ({} bytes), first frame {}: {}",
            self.version,
            self.revision,
            self.tag_size,
            self.first_frame.id_str(),
            self.first_frame.text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_frame_drops_encoding_byte() {
        let frame = Id3Frame {
            id: *b"TIT2",
            flags: 0,
            content: b"\x03Song\0".to_vec(),
        };
        assert_eq!(frame.text(), "Song");

        let frame = Id3Frame {
            id: *b"APIC",
            flags: 0,
            content: b"abc".to_vec(),
        };
        assert_eq!(frame.text(), "abc");
    }
}
