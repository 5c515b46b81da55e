#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Reader for uncompressed RIFF/WAVE files, with every stream normalized to
//! interleaved signed 16-bit samples.
//!
//! ### Supported Input
//!
//! - WAV, linear PCM at 8, 16 or 24 bits per sample, any channel count
//! - MP3, ID3v2 tag header only; audio is decoded externally
//! - Anything else an ffmpeg-compatible transcoder understands
//!
//! ### Sample Normalization
//!
//! 8-bit samples are unsigned and centred on 128. 16-bit samples pass through.
//! 24-bit samples are rescaled to the 16-bit range with rounding and clamping.
//!
//! ### Channel Layout
//!
//! Decoded audio keeps the interleaved buffer alongside left/right views. Mono
//! streams expose the same samples on both sides.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use audiofile::process::fallback::progress::{CancelToken, ProgressHandle};
//! use audiofile::process::reader::AudioFileReader;
//!
//! let reader = AudioFileReader::default();
//! let progress = ProgressHandle::new();
//! let cancel = CancelToken::new();
//!
//! let audio = reader.load(Path::new("song.wav"), &progress, &cancel)?;
//!
//! println!(
//!     "{} frames at {} Hz ({} ms)",
//!     audio.frame_count(),
//!     audio.sample_rate(),
//!     audio.duration_millis()
//! );
//!
//! // First 1024 frames of the left channel
//! let window = audio.samples_by_channel(true, 0, 1024);
//! # let _ = window;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Processing functionality for audio files.
///
/// 1. **WAV Parsing** ([`process::wav`]): Validates the RIFF container and
///    walks its chunks to the PCM payload.
///
/// 2. **Conversion** ([`process::convert`], [`process::channels`]): Normalizes
///    samples to 16 bits and splits channels.
///
/// 3. **Fallback** ([`process::fallback`]): Decodes through an external
///    transcoder with progress and cancellation.
pub mod process;

/// Data structures representing audio file components.
///
/// - **RIFF Headers** ([`structs::riff`]): Container and chunk headers
/// - **ID3 Headers** ([`structs::id3`]): Tag header and first frame
/// - **Descriptors** ([`structs::descriptor`]): Stream format facts
/// - **Audio Data** ([`structs::audio_data`]): Decoded, channel-split audio
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Cursor** ([`utils::cursor`]): Bounds-checked little-endian reads
/// - **Error Handling** ([`utils::errors`]): Error types
/// - **Timing** ([`utils::frame_time`]): Frame/time conversion
pub mod utils;
