//! File kind resolution

use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::structs::id3::ID3_MARKER;
use crate::structs::riff::{RIFF_MARKER, WAVE_MARKER};

/// The decode path a file takes, resolved once per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioFileKind {
    Wav,
    Mp3,
    /// Has an extension with no native reader.
    Other(String),
    /// Has no extension at all.
    Unknown,
}

impl AudioFileKind {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension() {
            Some(ext) => Self::from_extension(&ext.to_string_lossy()),
            None => Self::Unknown,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Self::Wav,
            "mp3" => Self::Mp3,
            other => Self::Other(other.to_string()),
        }
    }

    /// Guesses the kind from leading bytes, for input without a file name.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.len() >= 12 && &bytes[0..4] == RIFF_MARKER && &bytes[8..12] == WAVE_MARKER {
            Self::Wav
        } else if bytes.starts_with(ID3_MARKER)
            || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
        {
            Self::Mp3
        } else {
            Self::Unknown
        }
    }

    pub fn has_native_reader(&self) -> bool {
        matches!(self, Self::Wav)
    }
}

impl Display for AudioFileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFileKind::Wav => write!(f, "WAV"),
            AudioFileKind::Mp3 => write!(f, "MP3"),
            AudioFileKind::Other(ext) => write!(f, "unsupported (.{ext})"),
            AudioFileKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_extension_case_insensitively() {
        assert_eq!(AudioFileKind::from_path("a/b/Track.WAV"), AudioFileKind::Wav);
        assert_eq!(AudioFileKind::from_path("song.mp3"), AudioFileKind::Mp3);
        assert_eq!(
            AudioFileKind::from_path("clip.Flac"),
            AudioFileKind::Other("flac".to_string())
        );
        assert_eq!(AudioFileKind::from_path("noext"), AudioFileKind::Unknown);
    }

    #[test]
    fn sniffs_signatures() {
        assert_eq!(
            AudioFileKind::sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "),
            AudioFileKind::Wav
        );
        assert_eq!(AudioFileKind::sniff(b"ID3\x04\x00"), AudioFileKind::Mp3);
        assert_eq!(AudioFileKind::sniff(&[0xFF, 0xFB, 0x90]), AudioFileKind::Mp3);
        assert_eq!(AudioFileKind::sniff(b"RIFF"), AudioFileKind::Unknown);
    }
}
