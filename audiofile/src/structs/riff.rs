//! RIFF/WAVE header and chunk structures

use log::trace;

use crate::structs::descriptor::{FORMAT_TAG_EXTENSIBLE, FORMAT_TAG_PCM};
use crate::utils::cursor::BinaryCursor;
use crate::utils::errors::{AudioError, CursorError};

pub const RIFF_MARKER: &[u8; 4] = b"RIFF";
pub const WAVE_MARKER: &[u8; 4] = b"WAVE";
pub const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";
pub const DATA_CHUNK_ID: &[u8; 4] = b"data";

/// Size of the fields every `fmt ` chunk carries before any extension.
pub const FMT_CHUNK_MIN_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffHeader {
    /// Informational only: many writers leave it stale.
    pub riff_size: u32,
}

impl RiffHeader {
    pub fn read(reader: &mut BinaryCursor) -> Result<Self, AudioError> {
        let not_wave =
            |what: &str| AudioError::UnsupportedFormat(format!("not a RIFF/WAVE file ({what})"));

        let riff = reader.read_fourcc().map_err(|_| not_wave("shorter than header"))?;
        if &riff != RIFF_MARKER {
            return Err(not_wave("missing RIFF marker"));
        }

        let riff_size = reader.read_u32_le().map_err(|_| not_wave("shorter than header"))?;

        let wave = reader.read_fourcc().map_err(|_| not_wave("shorter than header"))?;
        if &wave != WAVE_MARKER {
            return Err(not_wave("missing WAVE marker"));
        }

        trace!("RIFF header: size = {riff_size}");

        Ok(Self { riff_size })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    pub fn read(reader: &mut BinaryCursor) -> Result<Self, AudioError> {
        let position = reader.position();
        let id = reader
            .read_fourcc()
            .map_err(|e| AudioError::truncated("chunk id", e))?;
        let size = reader
            .read_u32_le()
            .map_err(|e| AudioError::truncated("chunk size", e))?;

        let header = Self { id, size };
        trace!("Chunk '{}' at {position}: {size} bytes", header.id_str());

        Ok(header)
    }

    pub fn id_str(&self) -> String {
        self.id.iter().map(|&b| b as char).collect()
    }

    /// Declared size plus the pad byte RIFF requires after odd-sized chunks.
    pub fn padded_size(&self) -> usize {
        self.size as usize + (self.size & 1) as usize
    }
}

/// Contents of a `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtChunk {
    pub format_tag: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_second: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub extension_size: u32,
}

impl FmtChunk {
    /// Reads the body of a `fmt ` chunk whose header declared `size` bytes.
    pub fn read(reader: &mut BinaryCursor, size: u32) -> Result<Self, AudioError> {
        if size < FMT_CHUNK_MIN_SIZE {
            return Err(AudioError::MalformedContainer(format!(
                "fmt chunk is {size} bytes, expected at least {FMT_CHUNK_MIN_SIZE}"
            )));
        }

        let truncated = |e: CursorError| AudioError::truncated("fmt chunk", e);

        let fmt = Self {
            format_tag: reader.read_u16_le().map_err(truncated)?,
            channel_count: reader.read_u16_le().map_err(truncated)?,
            sample_rate: reader.read_u32_le().map_err(truncated)?,
            avg_bytes_per_second: reader.read_u32_le().map_err(truncated)?,
            block_align: reader.read_u16_le().map_err(truncated)?,
            bits_per_sample: reader.read_u16_le().map_err(truncated)?,
            extension_size: size - FMT_CHUNK_MIN_SIZE,
        };

        trace!(
            "fmt: tag = {:#06X}, channels = {}, sample rate = {}, avg bytes/s = {}, block align = {}, bits = {}",
            fmt.format_tag,
            fmt.channel_count,
            fmt.sample_rate,
            fmt.avg_bytes_per_second,
            fmt.block_align,
            fmt.bits_per_sample
        );

        let extension = fmt.extension_size as usize + (size & 1) as usize;
        if extension > 0 {
            trace!("fmt: skipping {} extension bytes", fmt.extension_size);
            reader.skip(extension).map_err(truncated)?;
        }

        if fmt.channel_count == 0 {
            return Err(AudioError::MalformedContainer(
                "fmt chunk declares zero channels".to_string(),
            ));
        }
        if fmt.sample_rate == 0 {
            return Err(AudioError::MalformedContainer(
                "fmt chunk declares a zero sample rate".to_string(),
            ));
        }
        if fmt.block_align == 0 {
            return Err(AudioError::MalformedContainer(
                "fmt chunk declares a zero block align".to_string(),
            ));
        }

        Ok(fmt)
    }

    pub fn is_linear_pcm(&self) -> bool {
        matches!(self.format_tag, FORMAT_TAG_PCM | FORMAT_TAG_EXTENSIBLE)
    }

    /// Block align implied by bit depth and channel count.
    pub fn expected_block_align(&self) -> u32 {
        (self.bits_per_sample as u32).div_ceil(8) * self.channel_count as u32
    }
}
