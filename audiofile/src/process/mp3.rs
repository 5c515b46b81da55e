use log::debug;

use crate::structs::id3::{
    ID3_FRAME_HEADER_LEN, ID3_HEADER_LEN, ID3_MARKER, Id3Header, Id3SizeEncoding,
};
use crate::utils::cursor::BinaryCursor;
use crate::utils::errors::AudioError;

/// Reads the ID3v2 tag at the start of an MP3 file.
///
/// Only the tag header and its first frame are read. MPEG audio frames are
/// left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp3HeaderParser {
    size_encoding: Id3SizeEncoding,
}

impl Mp3HeaderParser {
    /// Tag header plus first frame header.
    pub const TAG_PREFIX_LEN: usize = ID3_HEADER_LEN + ID3_FRAME_HEADER_LEN;

    pub fn new(size_encoding: Id3SizeEncoding) -> Self {
        Self { size_encoding }
    }

    pub fn set_size_encoding(&mut self, size_encoding: Id3SizeEncoding) {
        self.size_encoding = size_encoding;
    }

    /// Bytes needed from the start of the file to read the tag header and
    /// its first frame, given at least the first
    /// [`TAG_PREFIX_LEN`](Self::TAG_PREFIX_LEN) bytes.
    ///
    /// `None` when `prefix` does not start with an ID3v2 tag or is too short
    /// to hold the first frame header.
    pub fn required_len(prefix: &[u8]) -> Option<usize> {
        if !prefix.starts_with(ID3_MARKER) {
            return None;
        }

        let size_at = ID3_HEADER_LEN + 4;
        let size = prefix.get(size_at..size_at + 4)?;
        let content_size = u32::from_be_bytes([size[0], size[1], size[2], size[3]]);

        Some(Self::TAG_PREFIX_LEN.saturating_add(content_size as usize))
    }

    /// Returns `Ok(None)` when the input does not start with an ID3v2 tag.
    pub fn parse(&self, bytes: &[u8]) -> Result<Option<Id3Header>, AudioError> {
        let reader = &mut BinaryCursor::new(bytes);

        match reader.read_bytes(ID3_MARKER.len()) {
            Ok(marker) if marker == ID3_MARKER => {}
            _ => {
                debug!("No ID3v2 tag");
                return Ok(None);
            }
        }

        let header = Id3Header::read(reader, self.size_encoding).map_err(|e| AudioError::truncated("ID3 tag", e))?;
        debug!("{header}");

        Ok(Some(header))
    }
}
