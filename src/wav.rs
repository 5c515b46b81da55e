use std::io::{self, BufWriter, Seek, SeekFrom, Write};

use crate::byteorder::WriteBytesLe;
use audiofiled_macros::{ToBytes, riff_chunk_id};

pub trait RiffChunk {
    fn chunk_id(&self) -> &[u8; 4];
    fn chunk_data(&self) -> Vec<u8>;

    fn write_all<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let data = self.chunk_data();
        let size = u32::try_from(data.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "RIFF chunk too large"))?;

        writer.write_all(self.chunk_id())?;
        writer.write_all(&size.to_le_bytes())?;
        writer.write_all(&data)?;
        if size % 2 == 1 {
            writer.write_all(&[0])?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, ToBytes)]
#[riff_chunk_id(b"fmt ")]
pub struct FormatChunk {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FormatChunk {
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        let block_align = channels * 2;
        Self {
            format_tag: 1,
            channels,
            sample_rate,
            byte_rate: sample_rate * block_align as u32,
            block_align,
            bits_per_sample: 16,
        }
    }
}

/// RIFF/WAVE writer for 16-bit little-endian PCM.
///
/// Sizes are written as placeholders by [`write_header`](Self::write_header)
/// and patched by [`finish`](Self::finish).
pub struct WavWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    format: FormatChunk,
    riff_size_position: u64,
    data_size_position: Option<u64>,
    data_written: u64,
    finished: bool,
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(writer: W, sample_rate: u32, channels: u16) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format: FormatChunk::pcm16(sample_rate, channels),
            riff_size_position: 0,
            data_size_position: None,
            data_written: 0,
            finished: false,
        }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(b"RIFF")?;
        self.riff_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?;
        self.writer.write_all(b"WAVE")?;

        self.format.write_all(&mut self.writer)?;

        self.writer.write_all(b"data")?;
        self.data_size_position = Some(self.writer.stream_position()?);
        self.writer.write_all(&0u32.to_le_bytes())?;

        Ok(())
    }

    pub fn write_samples(&mut self, samples: &[i16]) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        samples.write_le(&mut bytes);
        self.write_data(&bytes)
    }

    pub fn write_data(&mut self, data: &[u8]) -> io::Result<()> {
        if self.data_size_position.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Must call write_header() before write_data()",
            ));
        }
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Writer already finished",
            ));
        }

        self.writer.write_all(data)?;
        self.data_written += data.len() as u64;
        Ok(())
    }

    /// Pads the data chunk and patches the RIFF and data sizes.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }

        let data_size_position = self.data_size_position.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "Must call write_header() before finish()",
            )
        })?;

        let data_size = u32::try_from(self.data_written).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "PCM data exceeds the 4 GiB RIFF limit",
            )
        })?;

        if data_size % 2 == 1 {
            self.writer.write_all(&[0])?;
        }

        let end = self.writer.stream_position()?;
        let riff_size = u32::try_from(end - self.riff_size_position - 4).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "RIFF size exceeds 4 GiB")
        })?;

        self.writer.seek(SeekFrom::Start(data_size_position))?;
        self.writer.write_all(&data_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        self.finished = true;
        Ok(())
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.finish()?;
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    pub fn stats(&self) -> WavWriterStats {
        WavWriterStats {
            data_written: self.data_written,
            sample_rate: self.format.sample_rate,
            channels: self.format.channels,
            finished: self.finished,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WavWriterStats {
    pub data_written: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub finished: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiofile::process::wav::WavParser;
    use std::io::Cursor;

    #[test]
    fn fmt_chunk_layout() -> io::Result<()> {
        let mut out = Vec::new();
        FormatChunk::pcm16(48_000, 2).write_all(&mut out)?;

        assert_eq!(&out[0..4], b"fmt ");
        assert_eq!(&out[4..8], &16u32.to_le_bytes());
        assert_eq!(&out[8..10], &1u16.to_le_bytes());
        assert_eq!(&out[10..12], &2u16.to_le_bytes());
        assert_eq!(&out[12..16], &48_000u32.to_le_bytes());
        assert_eq!(&out[16..20], &192_000u32.to_le_bytes());
        assert_eq!(&out[20..22], &4u16.to_le_bytes());
        assert_eq!(&out[22..24], &16u16.to_le_bytes());
        Ok(())
    }

    #[test]
    fn written_file_parses_back() -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = WavWriter::new(Cursor::new(Vec::new()), 22_050, 2);
        writer.write_header()?;
        writer.write_samples(&[1, -1, 300, -300, i16::MAX, i16::MIN])?;

        let stats = writer.stats();
        assert_eq!(stats.data_written, 12);

        let bytes = writer.into_inner()?.into_inner();
        assert_eq!(bytes.len(), 44 + 12);
        assert_eq!(&bytes[4..8], &(bytes.len() as u32 - 8).to_le_bytes());

        let stream = WavParser::default().parse(&bytes)?;
        assert_eq!(stream.descriptor.sample_rate, 22_050);
        assert_eq!(stream.descriptor.channel_count, 2);
        assert_eq!(stream.descriptor.bits_per_sample, 16);
        assert_eq!(stream.descriptor.frame_count(), 3);
        assert_eq!(stream.data.as_bytes(), &bytes[44..]);
        Ok(())
    }

    #[test]
    fn odd_payload_is_padded() -> io::Result<()> {
        let mut writer = WavWriter::new(Cursor::new(Vec::new()), 8_000, 1);
        writer.write_header()?;
        writer.write_data(&[1, 2, 3])?;

        let bytes = writer.into_inner()?.into_inner();
        assert_eq!(bytes.len(), 44 + 4);
        assert_eq!(&bytes[40..44], &3u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &40u32.to_le_bytes());
        Ok(())
    }

    #[test]
    fn data_before_header_is_rejected() {
        let mut writer = WavWriter::new(Cursor::new(Vec::new()), 8_000, 1);
        assert!(writer.write_samples(&[0]).is_err());
        assert!(writer.finish().is_err());
    }
}
