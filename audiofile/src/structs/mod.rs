//! Data structures representing audio file components.
//!
//! Contains the RIFF and ID3 header layouts read from disk, the stream
//! descriptor shared by every decode path, and the owned sample buffers
//! handed back to callers.

pub mod audio_data;
pub mod buffer;
pub mod descriptor;
pub mod id3;
pub mod kind;
pub mod riff;
