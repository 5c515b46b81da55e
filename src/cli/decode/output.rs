use crate::wav::WavWriter;
use anyhow::{Result, anyhow, bail};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::super::command::AudioFormat;
use crate::byteorder::WriteBytesLe;

pub fn create_path_with_extension(base_path: &Path, expected_ext: &str) -> Result<PathBuf> {
    if base_path.extension().is_some_and(|ext| ext == expected_ext) {
        return Ok(base_path.to_path_buf());
    }

    let file_name = base_path
        .file_name()
        .ok_or_else(|| anyhow!("Output path has no file name: {}", base_path.display()))?;

    let mut path = base_path.to_path_buf();
    if base_path.extension().is_some() {
        path.set_file_name(format!("{}.{expected_ext}", file_name.to_string_lossy()));
    } else {
        path.set_extension(expected_ext);
    }
    Ok(path)
}

pub fn output_extension(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Wav => "wav",
        AudioFormat::Pcm => "pcm",
    }
}

/// Output path for a decode: the explicit path if given, otherwise the input
/// path with the format's extension. Stdin input writes `stdin.<ext>`.
///
/// A derived path that would overwrite the input becomes
/// `<stem>.decoded.<ext>`; an explicit one is refused.
pub fn resolve_output_path(
    input: &Path,
    output: Option<&Path>,
    format: AudioFormat,
) -> Result<PathBuf> {
    let ext = output_extension(format);
    match output {
        Some(path) => {
            let path = create_path_with_extension(path, ext)?;
            if path == input {
                bail!("Output path {} would overwrite the input", path.display());
            }
            Ok(path)
        }
        None if crate::input::is_pipe_path(input) => Ok(PathBuf::from(format!("stdin.{ext}"))),
        None => {
            let path = create_path_with_extension(input, ext)?;
            if path == input {
                let mut decoded = input.to_path_buf();
                decoded.set_extension(format!("decoded.{ext}"));
                return Ok(decoded);
            }
            Ok(path)
        }
    }
}

pub enum AudioWriter {
    Pcm(BufWriter<File>),
    Wav(WavWriter<File>),
}

impl AudioWriter {
    pub fn create(path: &Path, format: AudioFormat, sample_rate: u32, channels: u16) -> Result<Self> {
        match format {
            AudioFormat::Pcm => Self::create_pcm(path),
            AudioFormat::Wav => Self::create_wav(path, sample_rate, channels),
        }
    }

    pub fn create_pcm(path: &Path) -> Result<Self> {
        Ok(AudioWriter::Pcm(BufWriter::new(File::create(path)?)))
    }

    pub fn create_wav(path: &Path, sample_rate: u32, channels: u16) -> Result<Self> {
        let mut wav_writer = WavWriter::new(File::create(path)?, sample_rate, channels);
        wav_writer.write_header()?;
        Ok(AudioWriter::Wav(wav_writer))
    }

    pub fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        match self {
            AudioWriter::Pcm(pcm_writer) => {
                let mut bytes = Vec::with_capacity(samples.len() * 2);
                samples.write_le(&mut bytes);
                pcm_writer.write_all(&bytes)?;
            }
            AudioWriter::Wav(wav_writer) => {
                wav_writer.write_samples(samples)?;
            }
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        match self {
            AudioWriter::Pcm(pcm_writer) => {
                pcm_writer.flush()?;
            }
            AudioWriter::Wav(wav_writer) => {
                wav_writer.finish()?;
                log::debug!("WAV writer: {:?}", wav_writer.stats());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_appended_or_replaced() -> Result<()> {
        assert_eq!(
            create_path_with_extension(Path::new("song"), "wav")?,
            PathBuf::from("song.wav")
        );
        assert_eq!(
            create_path_with_extension(Path::new("song.wav"), "wav")?,
            PathBuf::from("song.wav")
        );
        assert_eq!(
            create_path_with_extension(Path::new("dir/song.mp3"), "pcm")?,
            PathBuf::from("dir/song.mp3.pcm")
        );
        Ok(())
    }

    #[test]
    fn stdin_gets_a_fixed_name() -> Result<()> {
        assert_eq!(
            resolve_output_path(Path::new("-"), None, AudioFormat::Wav)?,
            PathBuf::from("stdin.wav")
        );
        assert_eq!(
            resolve_output_path(Path::new("a.mp3"), Some(Path::new("out")), AudioFormat::Pcm)?,
            PathBuf::from("out.pcm")
        );
        Ok(())
    }

    #[test]
    fn derived_path_never_overwrites_input() -> Result<()> {
        assert_eq!(
            resolve_output_path(Path::new("dir/song.wav"), None, AudioFormat::Wav)?,
            PathBuf::from("dir/song.decoded.wav")
        );
        assert_eq!(
            resolve_output_path(Path::new("take.pcm"), None, AudioFormat::Pcm)?,
            PathBuf::from("take.decoded.pcm")
        );
        assert_eq!(
            resolve_output_path(Path::new("song.mp3"), None, AudioFormat::Wav)?,
            PathBuf::from("song.mp3.wav")
        );
        assert!(
            resolve_output_path(Path::new("song.wav"), Some(Path::new("song")), AudioFormat::Wav)
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn pcm_writer_emits_little_endian_samples() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("audiofiled-out-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("raw.pcm");

        let mut writer = AudioWriter::create(&path, AudioFormat::Pcm, 44_100, 2)?;
        writer.write_samples(&[1, -2])?;
        writer.finish()?;
        drop(writer);

        assert_eq!(std::fs::read(&path)?, vec![0x01, 0x00, 0xFE, 0xFF]);
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
