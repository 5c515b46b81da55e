use log::{debug, trace, warn};

use crate::log_or_err;
use crate::process::FrameAligner;
use crate::structs::buffer::RawAudioBuffer;
use crate::structs::descriptor::AudioStreamDescriptor;
use crate::structs::riff::{ChunkHeader, DATA_CHUNK_ID, FMT_CHUNK_ID, FmtChunk, RiffHeader};
use crate::utils::cursor::BinaryCursor;
use crate::utils::errors::AudioError;

/// A parsed WAV file: container headers, stream parameters and PCM payload.
#[derive(Debug, Clone)]
pub struct WavStream {
    pub header: RiffHeader,
    pub fmt: FmtChunk,
    pub descriptor: AudioStreamDescriptor,
    pub data: RawAudioBuffer,
}

/// Walks the chunks of a RIFF/WAVE buffer up to the first `data` chunk.
///
/// Chunks other than `fmt ` and `data` are skipped. Chunks after `data` are
/// never inspected.
#[derive(Debug, Clone, Copy)]
pub struct WavParser {
    fail_level: log::Level,
}

impl Default for WavParser {
    fn default() -> Self {
        Self {
            fail_level: log::Level::Error,
        }
    }
}

impl WavParser {
    pub fn parse(&self, bytes: &[u8]) -> Result<WavStream, AudioError> {
        let reader = &mut BinaryCursor::new(bytes);
        let header = RiffHeader::read(reader)?;

        let mut fmt = None;

        loop {
            if reader.remaining() == 0 {
                return Err(AudioError::MalformedContainer(
                    "reached end of input before a data chunk".to_string(),
                ));
            }

            let chunk = ChunkHeader::read(reader)?;

            match &chunk.id {
                FMT_CHUNK_ID => {
                    if fmt.is_some() {
                        warn!("Duplicate fmt chunk, using the last one");
                    }
                    fmt = Some(FmtChunk::read(reader, chunk.size)?);
                }
                DATA_CHUNK_ID => {
                    let Some(fmt) = fmt else {
                        return Err(AudioError::MalformedContainer(
                            "data chunk precedes fmt chunk".to_string(),
                        ));
                    };

                    let payload = reader
                        .read_bytes(chunk.size as usize)
                        .map_err(|e| AudioError::truncated("data chunk", e))?;

                    return self.finish(header, fmt, payload);
                }
                _ => {
                    debug!(
                        "Skipping chunk '{}' ({} bytes)",
                        chunk.id_str(),
                        chunk.size
                    );
                    reader
                        .skip(chunk.padded_size())
                        .map_err(|e| AudioError::truncated("chunk body", e))?;
                }
            }
        }
    }

    fn finish(
        &self,
        header: RiffHeader,
        fmt: FmtChunk,
        payload: &[u8],
    ) -> Result<WavStream, AudioError> {
        if !fmt.is_linear_pcm() {
            warn!(
                "Format tag {:#06X} is not linear PCM, reading the payload as PCM",
                fmt.format_tag
            );
        }

        let expected = fmt.expected_block_align();
        let bytes_per_frame = u16::try_from(expected).map_err(|_| {
            AudioError::MalformedContainer(format!(
                "frame size {expected} for {} channels at {} bits is out of range",
                fmt.channel_count, fmt.bits_per_sample
            ))
        })?;

        if fmt.block_align != bytes_per_frame {
            log_or_err!(
                self,
                log::Level::Warn,
                AudioError::MalformedContainer(format!(
                    "block align {} does not match {} channels at {} bits, using {bytes_per_frame}",
                    fmt.block_align, fmt.channel_count, fmt.bits_per_sample
                ))
            );
        }

        let len = FrameAligner::new(self.fail_level).aligned_len(
            payload.len(),
            bytes_per_frame as usize,
            "data chunk",
        )?;

        let avg_bytes_per_second = fmt.sample_rate.saturating_mul(bytes_per_frame as u32);
        if avg_bytes_per_second != fmt.avg_bytes_per_second {
            trace!(
                "Header average byte rate {} differs from derived {avg_bytes_per_second}",
                fmt.avg_bytes_per_second
            );
        }

        let descriptor = AudioStreamDescriptor {
            format_tag: fmt.format_tag,
            channel_count: fmt.channel_count,
            sample_rate: fmt.sample_rate,
            avg_bytes_per_second,
            bytes_per_frame,
            bits_per_sample: fmt.bits_per_sample,
            data_length: len as u64,
        };

        debug!(
            "WAV: {} Hz, {} ch, {} bits, {} bytes of PCM",
            descriptor.sample_rate,
            descriptor.channel_count,
            descriptor.bits_per_sample,
            descriptor.data_length
        );

        Ok(WavStream {
            header,
            fmt,
            descriptor,
            data: RawAudioBuffer::new(payload[..len].to_vec()),
        })
    }

    /// Sets the failure level for validation errors.
    ///
    /// - `log::Level::Error`: Only fail on Error level messages (default)
    /// - `log::Level::Warn`: Fail on Warning level and above (strict mode)
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        if body.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn fmt_body(channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        let block_align = bits / 8 * channels;
        let mut out = Vec::new();
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn parses_stereo_16_bit() -> Result<(), AudioError> {
        let data = [1u8, 0, 2, 0, 3, 0, 4, 0];
        let bytes = riff(&[chunk(b"fmt ", &fmt_body(2, 44_100, 16)), chunk(b"data", &data)]);

        let stream = WavParser::default().parse(&bytes)?;
        let desc = stream.descriptor;

        assert_eq!(desc.channel_count, 2);
        assert_eq!(desc.sample_rate, 44_100);
        assert_eq!(desc.bits_per_sample, 16);
        assert_eq!(desc.bytes_per_frame, 4);
        assert_eq!(desc.avg_bytes_per_second, 176_400);
        assert_eq!(desc.data_length, 8);
        assert_eq!(desc.frame_count(), 2);
        assert_eq!(stream.data.as_bytes(), &data);
        Ok(())
    }

    #[test]
    fn data_length_is_whole_frames() -> Result<(), AudioError> {
        for (channels, bits, frames) in [(1u16, 8u16, 7usize), (2, 16, 5), (2, 24, 3), (1, 24, 10)] {
            let bpf = (bits / 8 * channels) as usize;
            let data = vec![0x11u8; frames * bpf];
            let bytes = riff(&[
                chunk(b"fmt ", &fmt_body(channels, 8_000, bits)),
                chunk(b"data", &data),
            ]);

            let desc = WavParser::default().parse(&bytes)?.descriptor;
            assert_eq!(desc.data_length, (frames * bpf) as u64);
            assert_eq!(desc.frame_count(), frames as u64);
        }
        Ok(())
    }

    #[test]
    fn skips_unknown_chunks_with_padding() -> Result<(), AudioError> {
        let bytes = riff(&[
            chunk(b"LIST", b"odd"),
            chunk(b"fmt ", &fmt_body(1, 22_050, 16)),
            chunk(b"fact", &[0, 0, 0, 0]),
            chunk(b"data", &[0xFF, 0x7F]),
            chunk(b"junk", &[0; 6]),
        ]);

        let stream = WavParser::default().parse(&bytes)?;
        assert_eq!(stream.descriptor.sample_rate, 22_050);
        assert_eq!(stream.data.as_bytes(), &[0xFF, 0x7F]);
        Ok(())
    }

    #[test]
    fn skips_fmt_extension() -> Result<(), AudioError> {
        let mut fmt = fmt_body(2, 48_000, 24);
        fmt.extend_from_slice(&[0, 0]);
        let bytes = riff(&[chunk(b"fmt ", &fmt), chunk(b"data", &[0; 6])]);

        let stream = WavParser::default().parse(&bytes)?;
        assert_eq!(stream.fmt.extension_size, 2);
        assert_eq!(stream.descriptor.bytes_per_frame, 6);
        assert_eq!(stream.descriptor.data_length, 6);
        Ok(())
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let mut bytes = riff(&[
            chunk(b"fmt ", &fmt_body(2, 44_100, 16)),
            chunk(b"data", &[0; 16]),
        ]);
        bytes.truncate(bytes.len() - 5);

        assert!(matches!(
            WavParser::default().parse(&bytes),
            Err(AudioError::MalformedContainer(_))
        ));
    }

    #[test]
    fn truncated_walk_is_malformed() {
        let full = riff(&[chunk(b"fmt ", &fmt_body(2, 44_100, 16)), chunk(b"data", &[0; 4])]);

        // Cut inside the fmt body, inside the data header, and right after fmt.
        for cut in [20, 40, 36] {
            assert!(
                matches!(
                    WavParser::default().parse(&full[..cut]),
                    Err(AudioError::MalformedContainer(_))
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn rejects_non_wave_input() {
        let inputs: [&[u8]; 3] = [b"RIFF\0\0", b"RIFX\x04\0\0\0WAVE", b"RIFF\x04\0\0\0AVI "];
        for bytes in inputs {
            assert!(matches!(
                WavParser::default().parse(bytes),
                Err(AudioError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn data_before_fmt_is_malformed() {
        let bytes = riff(&[chunk(b"data", &[0; 4]), chunk(b"fmt ", &fmt_body(2, 44_100, 16))]);

        assert!(matches!(
            WavParser::default().parse(&bytes),
            Err(AudioError::MalformedContainer(_))
        ));
    }

    #[test]
    fn zero_channels_is_malformed() {
        let bytes = riff(&[chunk(b"fmt ", &fmt_body(0, 44_100, 16)), chunk(b"data", &[0; 4])]);

        assert!(matches!(
            WavParser::default().parse(&bytes),
            Err(AudioError::MalformedContainer(_))
        ));
    }

    #[test]
    fn partial_frame_truncated_or_rejected() -> Result<(), AudioError> {
        let bytes = riff(&[
            chunk(b"fmt ", &fmt_body(2, 44_100, 16)),
            chunk(b"data", &[1, 0, 2, 0, 3, 0, 4]),
        ]);

        let stream = WavParser::default().parse(&bytes)?;
        assert_eq!(stream.descriptor.data_length, 4);
        assert_eq!(stream.data.as_bytes(), &[1, 0, 2, 0]);

        let mut strict = WavParser::default();
        strict.set_fail_level(log::Level::Warn);
        assert!(matches!(
            strict.parse(&bytes),
            Err(AudioError::MalformedContainer(_))
        ));
        Ok(())
    }

    #[test]
    fn mismatched_block_align_uses_derived_frame_size() -> Result<(), AudioError> {
        let mut fmt = fmt_body(2, 44_100, 16);
        fmt[12..14].copy_from_slice(&6u16.to_le_bytes());
        let bytes = riff(&[chunk(b"fmt ", &fmt), chunk(b"data", &[0; 12])]);

        let stream = WavParser::default().parse(&bytes)?;
        assert_eq!(stream.fmt.block_align, 6);
        assert_eq!(stream.descriptor.bytes_per_frame, 4);
        assert_eq!(stream.descriptor.avg_bytes_per_second, 176_400);
        assert_eq!(stream.descriptor.data_length, 12);
        assert_eq!(stream.descriptor.frame_count(), 3);

        let mut strict = WavParser::default();
        strict.set_fail_level(log::Level::Warn);
        assert!(matches!(
            strict.parse(&bytes),
            Err(AudioError::MalformedContainer(_))
        ));
        Ok(())
    }
}
