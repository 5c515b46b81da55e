//! Owned sample and byte buffers.

use std::ops::Deref;

/// PCM payload bytes exactly as produced by a parser or decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAudioBuffer(Vec<u8>);

impl RawAudioBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for RawAudioBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawAudioBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Interleaved signed 16-bit samples, one per (channel, frame) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffer(Vec<i16>);

impl SampleBuffer {
    pub fn new(samples: Vec<i16>) -> Self {
        Self(samples)
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<i16> {
        self.0
    }
}

impl Deref for SampleBuffer {
    type Target = [i16];

    fn deref(&self) -> &[i16] {
        &self.0
    }
}

impl From<Vec<i16>> for SampleBuffer {
    fn from(samples: Vec<i16>) -> Self {
        Self(samples)
    }
}

/// Left and right sequences split out of a [`SampleBuffer`].
///
/// For mono sources `right` is empty and [`ChannelBuffers::right`] falls back
/// to the left channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelBuffers {
    pub left: Vec<i16>,
    pub right: Vec<i16>,
    pub mono: bool,
}

impl ChannelBuffers {
    pub fn left(&self) -> &[i16] {
        &self.left
    }

    pub fn right(&self) -> &[i16] {
        if self.mono { &self.left } else { &self.right }
    }
}
