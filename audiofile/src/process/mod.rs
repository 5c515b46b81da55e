use crate::log_or_err;
use crate::utils::errors::AudioError;

/// WAV container validation and chunk walk.
///
/// Provides the [`WavParser`](wav::WavParser), which turns a RIFF/WAVE byte
/// buffer into a [`WavStream`](wav::WavStream) holding the stream descriptor
/// and the raw PCM payload.
pub mod wav;

/// ID3v2 tag header reader for MP3 input.
///
/// Provides the [`Mp3HeaderParser`](mp3::Mp3HeaderParser). It never produces
/// audio; MP3 payloads are decoded through [`fallback`].
pub mod mp3;

/// Normalization of 8, 16 and 24-bit PCM to signed 16-bit samples.
pub mod convert;

/// Deinterleaving, interleaving and mono duplication of sample buffers.
pub mod channels;

/// External transcoder pipeline used when no native reader applies.
pub mod fallback;

/// Entry point tying file kind resolution, native parsing and the fallback
/// together into an [`AudioData`](crate::structs::audio_data::AudioData).
pub mod reader;

/// Enforces the whole-frame invariant on PCM payloads.
///
/// A payload whose length is not a multiple of the frame size has its trailing
/// partial frame cut off with a warning. When `fail_level` is `Warn` or
/// stricter the payload is rejected instead.
#[derive(Debug, Clone, Copy)]
pub struct FrameAligner {
    pub fail_level: log::Level,
}

impl Default for FrameAligner {
    fn default() -> Self {
        Self {
            fail_level: log::Level::Error,
        }
    }
}

impl FrameAligner {
    pub fn new(fail_level: log::Level) -> Self {
        Self { fail_level }
    }

    /// Largest whole-frame length not exceeding `len`.
    pub fn aligned_len(
        &self,
        len: usize,
        bytes_per_frame: usize,
        source: &str,
    ) -> Result<usize, AudioError> {
        if bytes_per_frame == 0 {
            return Err(AudioError::MalformedContainer(format!(
                "{source}: frame size is zero"
            )));
        }

        let partial = len % bytes_per_frame;
        if partial != 0 {
            log_or_err!(
                self,
                log::Level::Warn,
                AudioError::MalformedContainer(format!(
                    "{source}: dropping {partial} trailing bytes that do not fill a {bytes_per_frame}-byte frame"
                ))
            );
        }

        Ok(len - partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_partial_frame() -> Result<(), AudioError> {
        let aligner = FrameAligner::default();

        assert_eq!(aligner.aligned_len(16, 4, "test")?, 16);
        assert_eq!(aligner.aligned_len(19, 4, "test")?, 16);
        assert_eq!(aligner.aligned_len(3, 4, "test")?, 0);
        Ok(())
    }

    #[test]
    fn strict_rejects_partial_frame() {
        let aligner = FrameAligner::new(log::Level::Warn);

        assert!(aligner.aligned_len(8, 4, "test").is_ok());
        assert!(matches!(
            aligner.aligned_len(9, 4, "test"),
            Err(AudioError::MalformedContainer(_))
        ));
    }
}
