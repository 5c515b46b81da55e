//! Decoded audio model handed to playback and rendering code.

use crate::process::channels::{self, duplicate_mono_to_stereo, samples_to_bytes};
use crate::process::FrameAligner;
use crate::process::convert::SampleConverter;
use crate::structs::buffer::{ChannelBuffers, RawAudioBuffer, SampleBuffer};
use crate::structs::descriptor::AudioStreamDescriptor;
use crate::utils::errors::AudioError;
use crate::utils::frame_time::FrameTimeConverter;

/// A fully decoded file: stream parameters, PCM bytes, interleaved 16-bit
/// samples and the left/right split.
///
/// Samples and channels are derived from the raw bytes when the model is
/// built and are replaced together whenever new samples are set.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub filename: Option<String>,
    descriptor: AudioStreamDescriptor,
    data: Option<RawAudioBuffer>,
    samples: SampleBuffer,
    channels: ChannelBuffers,
}

impl Default for AudioData {
    fn default() -> Self {
        Self::with_format(44_100, 2)
    }
}

impl AudioData {
    /// An empty 16-bit model with the given rate and channel count.
    pub fn with_format(sample_rate: u32, channel_count: u16) -> Self {
        Self {
            filename: None,
            descriptor: AudioStreamDescriptor::pcm16(sample_rate, channel_count),
            data: None,
            samples: SampleBuffer::default(),
            channels: ChannelBuffers::default(),
        }
    }

    /// Builds the model from a parsed payload. `descriptor.data_length` must
    /// match the payload.
    pub fn from_raw(
        descriptor: AudioStreamDescriptor,
        data: RawAudioBuffer,
        converter: &SampleConverter,
    ) -> Result<Self, AudioError> {
        let samples = converter.convert(&data, descriptor.bits_per_sample)?;
        let channels = channels::deinterleave(&samples, descriptor.channel_count)?;

        Ok(Self {
            filename: None,
            descriptor: AudioStreamDescriptor {
                data_length: data.len() as u64,
                ..descriptor
            },
            data: Some(data),
            samples,
            channels,
        })
    }

    /// Wraps signed 16-bit little-endian PCM, as produced by a transcoder.
    pub fn from_pcm_bytes(
        bytes: Vec<u8>,
        filename: Option<String>,
        sample_rate: u32,
        channel_count: u16,
    ) -> Result<Self, AudioError> {
        let descriptor = AudioStreamDescriptor::pcm16(sample_rate, channel_count);
        let mut audio = Self::from_raw(
            descriptor,
            RawAudioBuffer::new(bytes),
            &SampleConverter::default(),
        )?;
        audio.filename = filename;

        Ok(audio)
    }

    /// Replaces the audio with samples supplied directly.
    ///
    /// With `duplicate_mono_to_stereo` the samples are treated as mono and
    /// doubled into interleaved stereo; the channel count is not changed, so
    /// this is meant for models already declared as two channels. The PCM
    /// bytes are resynthesized from the samples and the descriptor becomes
    /// 16-bit.
    ///
    /// Samples past the last whole frame are dropped with a warning.
    pub fn set_samples(
        &mut self,
        samples: Vec<i16>,
        duplicate_mono_to_stereo_samples: bool,
    ) -> Result<(), AudioError> {
        let mut samples = if duplicate_mono_to_stereo_samples {
            duplicate_mono_to_stereo(&samples)
        } else {
            samples
        };

        let whole = FrameAligner::default().aligned_len(
            samples.len(),
            self.descriptor.channel_count as usize,
            "supplied samples",
        )?;
        samples.truncate(whole);

        let channel_buffers = channels::deinterleave(&samples, self.descriptor.channel_count)?;
        let bytes = samples_to_bytes(&samples);

        self.descriptor = AudioStreamDescriptor {
            data_length: bytes.len() as u64,
            ..AudioStreamDescriptor::pcm16(self.descriptor.sample_rate, self.descriptor.channel_count)
        };
        self.data = Some(RawAudioBuffer::new(bytes));
        self.samples = SampleBuffer::new(samples);
        self.channels = channel_buffers;

        Ok(())
    }

    /// Drops all audio, keeping the stream parameters.
    pub fn clear_data(&mut self) {
        self.descriptor.data_length = 0;
        self.data = None;
        self.samples = SampleBuffer::default();
        self.channels = ChannelBuffers::default();
    }

    pub fn descriptor(&self) -> &AudioStreamDescriptor {
        &self.descriptor
    }

    pub fn channel_count(&self) -> u16 {
        self.descriptor.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.descriptor.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.descriptor.bits_per_sample
    }

    pub fn bytes_per_frame(&self) -> u16 {
        self.descriptor.bytes_per_frame
    }

    pub fn data_length(&self) -> u64 {
        self.descriptor.data_length
    }

    pub fn data_bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn channels(&self) -> &ChannelBuffers {
        &self.channels
    }

    pub fn samples_left(&self) -> &[i16] {
        self.channels.left()
    }

    pub fn samples_right(&self) -> &[i16] {
        self.channels.right()
    }

    /// `length` frames of one side starting at `start_frame`, zero padded
    /// past the end of the audio.
    pub fn samples_by_channel(&self, left: bool, start_frame: usize, length: usize) -> Vec<i16> {
        channels::window(
            &self.samples,
            self.descriptor.channel_count.max(1),
            left,
            start_frame,
            length,
        )
        .unwrap_or_default()
    }

    pub fn converter(&self) -> FrameTimeConverter {
        self.descriptor.converter()
    }

    pub fn frame_count(&self) -> u64 {
        self.descriptor.frame_count()
    }

    pub fn duration_millis(&self) -> u64 {
        self.descriptor.duration_millis()
    }

    pub fn duration_micros(&self) -> u64 {
        self.descriptor.duration_micros()
    }

    pub fn max_value(&self) -> u32 {
        self.descriptor.max_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::channels::interleave;

    #[test]
    fn pcm_bytes_split_into_channels() -> Result<(), AudioError> {
        let bytes = samples_to_bytes(&[1, 2, 3, 4, 5, 6]);
        let audio = AudioData::from_pcm_bytes(bytes, Some("x.mp3".into()), 48_000, 2)?;

        assert_eq!(audio.filename.as_deref(), Some("x.mp3"));
        assert_eq!(audio.data_length(), 12);
        assert_eq!(audio.frame_count(), 3);
        assert_eq!(audio.samples(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(audio.samples_left(), &[1, 3, 5]);
        assert_eq!(audio.samples_right(), &[2, 4, 6]);
        assert_eq!(audio.samples_by_channel(true, 0, 3), vec![1, 3, 5]);
        assert_eq!(audio.samples_by_channel(false, 1, 4), vec![4, 6, 0, 0]);
        Ok(())
    }

    #[test]
    fn set_samples_duplicates_and_resynthesizes() -> Result<(), AudioError> {
        let mut audio = AudioData::default();
        audio.set_samples(vec![7, -8], true)?;

        assert_eq!(audio.samples(), &[7, 7, -8, -8]);
        assert_eq!(audio.samples_left(), &[7, -8]);
        assert_eq!(audio.samples_right(), &[7, -8]);
        assert_eq!(audio.data_bytes(), &[7, 0, 7, 0, 0xF8, 0xFF, 0xF8, 0xFF]);
        assert_eq!(audio.data_length(), 8);
        assert_eq!(audio.frame_count(), 2);
        Ok(())
    }

    #[test]
    fn set_samples_keeps_whole_frames() -> Result<(), AudioError> {
        let mut audio = AudioData::default();
        audio.set_samples(vec![1, 2, 3], false)?;

        assert_eq!(audio.samples(), &[1, 2]);
        assert_eq!(audio.data_length(), 4);
        assert_eq!(audio.data_length() % audio.bytes_per_frame() as u64, 0);
        assert_eq!(audio.frame_count(), 1);
        assert_eq!(audio.samples_left(), &[1]);
        assert_eq!(audio.samples_right(), &[2]);
        Ok(())
    }

    #[test]
    fn set_samples_switches_descriptor_to_16_bit() -> Result<(), AudioError> {
        let descriptor = AudioStreamDescriptor {
            bits_per_sample: 8,
            bytes_per_frame: 1,
            avg_bytes_per_second: 8_000,
            ..AudioStreamDescriptor::pcm16(8_000, 1)
        };
        let mut audio = AudioData::from_raw(
            descriptor,
            RawAudioBuffer::new(vec![128, 129]),
            &SampleConverter::default(),
        )?;
        assert_eq!(audio.samples(), &[0, 1]);

        audio.set_samples(vec![100, 200, 300], false)?;
        assert_eq!(audio.bits_per_sample(), 16);
        assert_eq!(audio.bytes_per_frame(), 2);
        assert_eq!(audio.data_length(), 6);
        assert_eq!(audio.frame_count(), 3);
        Ok(())
    }

    #[test]
    fn channel_round_trip_keeps_frame_count() -> Result<(), AudioError> {
        for (bits, channels) in [(8u16, 1u16), (8, 2), (16, 1), (16, 2), (24, 2)] {
            let frames = 101usize;
            let bytes_per_frame = bits / 8 * channels;
            let payload: Vec<u8> = (0..frames * bytes_per_frame as usize)
                .map(|i| (i * 31 % 251) as u8)
                .collect();
            let descriptor = AudioStreamDescriptor {
                bits_per_sample: bits,
                bytes_per_frame,
                ..AudioStreamDescriptor::pcm16(44_100, channels)
            };

            let audio = AudioData::from_raw(
                descriptor,
                RawAudioBuffer::new(payload),
                &SampleConverter::default(),
            )?;
            assert_eq!(audio.frame_count(), frames as u64);
            assert!(audio.samples_left().len().abs_diff(frames) <= 1);
            assert!(audio.samples_right().len().abs_diff(frames) <= 1);

            let rebuilt = if channels == 1 {
                audio.samples_left().to_vec()
            } else {
                interleave(&[audio.samples_left(), audio.samples_right()])
            };
            assert_eq!(rebuilt, audio.samples());
        }
        Ok(())
    }

    #[test]
    fn clear_keeps_format() -> Result<(), AudioError> {
        let mut audio = AudioData::with_format(22_050, 1);
        audio.set_samples(vec![1, 2, 3], false)?;
        audio.clear_data();

        assert_eq!(audio.data_length(), 0);
        assert!(audio.samples().is_empty());
        assert!(audio.data_bytes().is_empty());
        assert_eq!(audio.sample_rate(), 22_050);
        assert_eq!(audio.max_value(), 32_768);
        Ok(())
    }
}
