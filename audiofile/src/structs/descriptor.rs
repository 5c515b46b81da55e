//! Stream parameters shared by every decode path.

use crate::utils::frame_time::FrameTimeConverter;

pub const FORMAT_TAG_PCM: u16 = 0x0001;
pub const FORMAT_TAG_EXTENSIBLE: u16 = 0xFFFE;

/// Describes an interleaved PCM payload.
///
/// `bytes_per_frame` is taken from the container when one is present (WAV
/// block align) and derived as `bits_per_sample / 8 * channel_count`
/// otherwise. `data_length` is always a whole number of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioStreamDescriptor {
    pub format_tag: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_second: u32,
    pub bytes_per_frame: u16,
    pub bits_per_sample: u16,
    pub data_length: u64,
}

impl AudioStreamDescriptor {
    /// Signed 16-bit little-endian PCM with no payload yet.
    pub fn pcm16(sample_rate: u32, channel_count: u16) -> Self {
        let bytes_per_frame = channel_count.saturating_mul(2);
        Self {
            format_tag: FORMAT_TAG_PCM,
            channel_count,
            sample_rate,
            avg_bytes_per_second: sample_rate.saturating_mul(bytes_per_frame as u32),
            bytes_per_frame,
            bits_per_sample: 16,
            data_length: 0,
        }
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    pub fn frame_count(&self) -> u64 {
        self.converter().bytes_to_frame(self.data_length)
    }

    pub fn converter(&self) -> FrameTimeConverter {
        FrameTimeConverter::new(self.sample_rate, self.bytes_per_frame as u32)
    }

    pub fn duration_millis(&self) -> u64 {
        self.converter().frame_to_millis(self.frame_count())
    }

    pub fn duration_micros(&self) -> u64 {
        self.converter().frame_to_micros(self.frame_count())
    }

    /// Largest magnitude representable at this bit depth.
    pub fn max_value(&self) -> u32 {
        1u32.checked_shl(self.bits_per_sample as u32)
            .map_or(u32::MAX, |full| full / 2)
    }
}

impl Default for AudioStreamDescriptor {
    fn default() -> Self {
        Self::pcm16(44_100, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_derived_fields() {
        let desc = AudioStreamDescriptor {
            data_length: 176_400,
            ..AudioStreamDescriptor::pcm16(44_100, 2)
        };

        assert_eq!(desc.bytes_per_frame, 4);
        assert_eq!(desc.avg_bytes_per_second, 176_400);
        assert_eq!(desc.frame_count(), 44_100);
        assert_eq!(desc.duration_millis(), 1000);
        assert_eq!(desc.duration_micros(), 1_000_000);
        assert_eq!(desc.max_value(), 32_768);
    }
}
