use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::process::convert::{EightBitScaling, SampleConverter, TwentyFourBitOrder};
use crate::process::fallback::progress::{CancelToken, ProgressHandle};
use crate::process::fallback::runner::{ProcessRunner, SystemProcessRunner};
use crate::process::fallback::{FallbackConfig, FallbackDecoder};
use crate::process::mp3::Mp3HeaderParser;
use crate::process::wav::WavParser;
use crate::structs::audio_data::AudioData;
use crate::structs::descriptor::AudioStreamDescriptor;
use crate::structs::id3::{Id3Header, Id3SizeEncoding};
use crate::structs::kind::AudioFileKind;
use crate::utils::errors::AudioError;

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub fail_level: log::Level,
    pub eight_bit: EightBitScaling,
    pub twenty_four_bit: TwentyFourBitOrder,
    pub id3_size: Id3SizeEncoding,
    /// Hand files to the external transcoder when native decoding fails.
    pub fallback_enabled: bool,
    pub fallback: FallbackConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_level: log::Level::Error,
            eight_bit: EightBitScaling::default(),
            twenty_four_bit: TwentyFourBitOrder::default(),
            id3_size: Id3SizeEncoding::default(),
            fallback_enabled: true,
            fallback: FallbackConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Sets the failure level for validation errors.
    ///
    /// - `log::Level::Error`: Only fail on Error level messages (default)
    /// - `log::Level::Warn`: Fail on Warning level and above (strict mode)
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }

    pub fn set_eight_bit_scaling(&mut self, scaling: EightBitScaling) {
        self.eight_bit = scaling;
    }

    pub fn set_twenty_four_bit_order(&mut self, order: TwentyFourBitOrder) {
        self.twenty_four_bit = order;
    }

    pub fn set_id3_size_encoding(&mut self, encoding: Id3SizeEncoding) {
        self.id3_size = encoding;
    }

    pub fn set_fallback_enabled(&mut self, enabled: bool) {
        self.fallback_enabled = enabled;
    }
}

/// What can be learned about a file without decoding its audio.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub kind: AudioFileKind,
    pub file_size: u64,
    /// Present for WAV input.
    pub descriptor: Option<AudioStreamDescriptor>,
    /// Present for MP3 input carrying an ID3v2 tag.
    pub id3: Option<Id3Header>,
}

/// Loads audio files into [`AudioData`].
///
/// WAV files are parsed natively. Everything else, and WAV files the native
/// parser rejects, goes through the [`FallbackDecoder`] when it is enabled.
pub struct AudioFileReader {
    config: ReaderConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl Default for AudioFileReader {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

impl AudioFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemProcessRunner))
    }

    pub fn with_runner(config: ReaderConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Decodes `path` with the native readers only.
    pub fn read(&self, path: &Path) -> Result<AudioData, AudioError> {
        self.read_native(&AudioFileKind::from_path(path), path)
    }

    /// Decodes an in-memory file with the native readers only.
    ///
    /// The kind comes from `filename` when it has a known extension and from
    /// the leading bytes otherwise.
    pub fn read_bytes(
        &self,
        bytes: &[u8],
        filename: Option<String>,
    ) -> Result<AudioData, AudioError> {
        match self.resolve_kind(bytes, filename.as_deref()) {
            AudioFileKind::Wav => self.decode_wav(bytes, filename),
            AudioFileKind::Mp3 => {
                self.log_id3(bytes);
                Err(no_native_reader(&AudioFileKind::Mp3))
            }
            other => Err(no_native_reader(&other)),
        }
    }

    /// Decodes `path`, falling back to the external transcoder when the
    /// native path cannot handle it.
    ///
    /// I/O errors on the file itself are returned as is.
    pub fn load(
        &self,
        path: &Path,
        progress: &ProgressHandle,
        cancel: &CancelToken,
    ) -> Result<AudioData, AudioError> {
        let kind = AudioFileKind::from_path(path);
        info!("Loading {} ({kind})", path.display());

        match self.read_native(&kind, path) {
            Ok(audio) => Ok(audio),
            Err(err @ AudioError::Io(_)) => Err(err),
            Err(err) if !self.config.fallback_enabled => Err(err),
            Err(err) => {
                if kind.has_native_reader() {
                    warn!("Native decode failed: {err}");
                } else {
                    info!("{err}");
                }
                info!("Falling back to {}", self.config.fallback.ffmpeg);

                self.fallback().decode(path, progress, cancel)
            }
        }
    }

    pub fn inspect(&self, path: &Path) -> Result<FileInfo, AudioError> {
        let kind = AudioFileKind::from_path(path);
        let file_size = std::fs::metadata(path)?.len();

        let (descriptor, id3) = match kind {
            AudioFileKind::Wav => {
                let bytes = std::fs::read(path)?;
                (Some(self.wav_parser().parse(&bytes)?.descriptor), None)
            }
            AudioFileKind::Mp3 => (None, self.mp3_parser().parse(&read_id3_region(path)?)?),
            _ => (None, None),
        };

        Ok(FileInfo {
            kind,
            file_size,
            descriptor,
            id3,
        })
    }

    /// [`inspect`](Self::inspect) for an in-memory file.
    pub fn inspect_bytes(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> Result<FileInfo, AudioError> {
        let kind = self.resolve_kind(bytes, filename);

        let (descriptor, id3) = match kind {
            AudioFileKind::Wav => (Some(self.wav_parser().parse(bytes)?.descriptor), None),
            AudioFileKind::Mp3 => (None, self.mp3_parser().parse(bytes)?),
            _ => (None, None),
        };

        Ok(FileInfo {
            kind,
            file_size: bytes.len() as u64,
            descriptor,
            id3,
        })
    }

    fn read_native(&self, kind: &AudioFileKind, path: &Path) -> Result<AudioData, AudioError> {
        let filename = Some(path.to_string_lossy().into_owned());

        match kind {
            AudioFileKind::Wav => self.decode_wav(&std::fs::read(path)?, filename),
            AudioFileKind::Mp3 => {
                self.log_id3(&read_id3_region(path)?);
                Err(no_native_reader(kind))
            }
            other => Err(no_native_reader(other)),
        }
    }

    fn decode_wav(&self, bytes: &[u8], filename: Option<String>) -> Result<AudioData, AudioError> {
        let stream = self.wav_parser().parse(bytes)?;
        let converter = SampleConverter::new(self.config.eight_bit)
            .with_twenty_four_bit_order(self.config.twenty_four_bit);

        let mut audio = AudioData::from_raw(stream.descriptor, stream.data, &converter)?;
        audio.filename = filename;

        Ok(audio)
    }

    fn log_id3(&self, bytes: &[u8]) {
        match self.mp3_parser().parse(bytes) {
            Ok(Some(header)) => info!("{header}"),
            Ok(None) => {}
            Err(e) => warn!("Ignoring ID3 tag: {e}"),
        }
    }

    fn resolve_kind(&self, bytes: &[u8], filename: Option<&str>) -> AudioFileKind {
        match filename.map(AudioFileKind::from_path) {
            Some(AudioFileKind::Unknown) | None => AudioFileKind::sniff(bytes),
            Some(kind) => kind,
        }
    }

    fn wav_parser(&self) -> WavParser {
        let mut parser = WavParser::default();
        parser.set_fail_level(self.config.fail_level);
        parser
    }

    fn mp3_parser(&self) -> Mp3HeaderParser {
        Mp3HeaderParser::new(self.config.id3_size)
    }

    fn fallback(&self) -> FallbackDecoder {
        let mut decoder = FallbackDecoder::new(self.runner.clone(), self.config.fallback.clone());
        decoder.set_fail_level(self.config.fail_level);
        decoder
    }
}

fn no_native_reader(kind: &AudioFileKind) -> AudioError {
    AudioError::UnsupportedFormat(format!("no native reader for {kind} input"))
}

/// Reads the leading ID3 tag header and first frame of `path`, however large
/// that frame is. Files without a tag yield only the first few bytes.
fn read_id3_region(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut region = Vec::new();
    file.by_ref()
        .take(Mp3HeaderParser::TAG_PREFIX_LEN as u64)
        .read_to_end(&mut region)?;

    if let Some(needed) = Mp3HeaderParser::required_len(&region) {
        let rest = needed.saturating_sub(region.len()) as u64;
        file.take(rest).read_to_end(&mut region)?;
    }

    Ok(region)
}
