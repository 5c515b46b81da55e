//! PCM payload normalization to signed 16-bit samples.

use crate::structs::buffer::SampleBuffer;
use crate::utils::errors::AudioError;

const MAX_24: f64 = 8_388_608.0;
const MAX_16: f64 = 32_768.0;

/// How unsigned 8-bit samples are mapped onto the 16-bit sample model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EightBitScaling {
    /// `v - 128`: centred but left at 8-bit magnitude.
    #[default]
    Narrow,
    /// `(v - 128) << 8`: centred and spread over the full 16-bit range.
    FullScale,
}

/// Byte order used to compose a 24-bit sample from its three bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TwentyFourBitOrder {
    /// First byte most significant: `b0 << 16 | b1 << 8 | b2`.
    #[default]
    MsbFirst,
    /// First byte least significant, as RIFF stores it.
    LittleEndian,
}

/// Converts PCM bytes at 8, 16 or 24 bits into 16-bit samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleConverter {
    eight_bit: EightBitScaling,
    twenty_four_bit: TwentyFourBitOrder,
}

impl SampleConverter {
    pub fn new(eight_bit: EightBitScaling) -> Self {
        Self {
            eight_bit,
            twenty_four_bit: TwentyFourBitOrder::default(),
        }
    }

    pub fn with_twenty_four_bit_order(mut self, order: TwentyFourBitOrder) -> Self {
        self.twenty_four_bit = order;
        self
    }

    pub fn eight_bit_scaling(&self) -> EightBitScaling {
        self.eight_bit
    }

    pub fn twenty_four_bit_order(&self) -> TwentyFourBitOrder {
        self.twenty_four_bit
    }

    /// Returns `bytes.len() / (bits_per_sample / 8)` samples; a trailing
    /// partial sample is ignored.
    pub fn convert(&self, bytes: &[u8], bits_per_sample: u16) -> Result<SampleBuffer, AudioError> {
        let samples = match bits_per_sample {
            8 => bytes.iter().map(|&v| self.convert_u8(v)).collect(),
            16 => bytes
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]))
                .collect(),
            24 => bytes
                .chunks_exact(3)
                .map(|b| rescale_24(self.compose_24([b[0], b[1], b[2]])))
                .collect(),
            other => return Err(AudioError::UnsupportedBitDepth(other)),
        };

        Ok(SampleBuffer::new(samples))
    }

    #[inline]
    fn convert_u8(&self, v: u8) -> i16 {
        let centred = v as i16 - 128;
        match self.eight_bit {
            EightBitScaling::Narrow => centred,
            EightBitScaling::FullScale => centred << 8,
        }
    }

    /// Sign-extended from bit 23.
    #[inline]
    fn compose_24(&self, b: [u8; 3]) -> i32 {
        match self.twenty_four_bit {
            TwentyFourBitOrder::MsbFirst => i32::from_be_bytes([b[0], b[1], b[2], 0]) >> 8,
            TwentyFourBitOrder::LittleEndian => i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8,
        }
    }
}

#[inline]
fn rescale_24(value: i32) -> i16 {
    (value as f64 / MAX_24 * MAX_16)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_bit_narrow_and_full_scale() -> Result<(), AudioError> {
        let raw = [0u8, 128, 255];

        let narrow = SampleConverter::default().convert(&raw, 8)?;
        assert_eq!(narrow.as_slice(), &[-128, 0, 127]);

        let full = SampleConverter::new(EightBitScaling::FullScale).convert(&raw, 8)?;
        assert_eq!(full.as_slice(), &[i16::MIN, 0, 127 << 8]);

        Ok(())
    }

    #[test]
    fn sixteen_bit_passes_through() -> Result<(), AudioError> {
        let raw = [0x01, 0x00, 0xFF, 0xFF, 0x00, 0x80, 0xFF, 0x7F, 0xAA];
        let samples = SampleConverter::default().convert(&raw, 16)?;

        assert_eq!(samples.as_slice(), &[1, -1, i16::MIN, i16::MAX]);
        Ok(())
    }

    #[test]
    fn twenty_four_bit_defaults_to_msb_first() -> Result<(), AudioError> {
        let raw = [
            0x01, 0x00, 0x00, // 65536
            0x80, 0x00, 0x00, // -8388608
            0x7F, 0xFF, 0xFF, // 8388607
            0x00, 0x01, 0x00, // 256
            0xFF, 0xFF, 0x00, // -256
        ];
        let conv = SampleConverter::default();

        assert_eq!(conv.twenty_four_bit_order(), TwentyFourBitOrder::MsbFirst);
        assert_eq!(
            conv.convert(&raw, 24)?.as_slice(),
            &[256, i16::MIN, i16::MAX, 1, -1]
        );
        Ok(())
    }

    #[test]
    fn twenty_four_bit_little_endian_rescales() -> Result<(), AudioError> {
        let raw = [
            0x00, 0x00, 0x80, // -8388608
            0xFF, 0xFF, 0x7F, // 8388607
            0x00, 0x01, 0x00, // 256
            0x80, 0x00, 0x00, // 128
            0x7F, 0x00, 0x00, // 127
            0xFF, 0xFF, 0xFF, // -1
            0x00, 0xFF, 0xFF, // -256
        ];
        let samples = SampleConverter::default()
            .with_twenty_four_bit_order(TwentyFourBitOrder::LittleEndian)
            .convert(&raw, 24)?;

        assert_eq!(samples.as_slice(), &[i16::MIN, i16::MAX, 1, 1, 0, 0, -1]);
        Ok(())
    }

    #[test]
    fn output_length_follows_bit_depth() -> Result<(), AudioError> {
        let raw = vec![0u8; 12];
        let conv = SampleConverter::default();

        assert_eq!(conv.convert(&raw, 8)?.len(), 12);
        assert_eq!(conv.convert(&raw, 16)?.len(), 6);
        assert_eq!(conv.convert(&raw, 24)?.len(), 4);
        Ok(())
    }

    #[test]
    fn rejects_other_bit_depths() {
        for bits in [0, 4, 12, 20, 32, 64] {
            assert!(matches!(
                SampleConverter::default().convert(&[0; 8], bits),
                Err(AudioError::UnsupportedBitDepth(b)) if b == bits
            ));
        }
    }
}
