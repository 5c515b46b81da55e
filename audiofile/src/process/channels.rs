//! Channel separation and re-interleaving of 16-bit sample buffers.

use crate::structs::buffer::ChannelBuffers;
use crate::utils::errors::AudioError;

fn check_channels(channel_count: u16) -> Result<usize, AudioError> {
    if channel_count == 0 {
        return Err(AudioError::MalformedContainer(
            "channel count must be at least 1".to_string(),
        ));
    }
    Ok(channel_count as usize)
}

/// Samples of channel `index` out of an interleaved buffer, in order.
///
/// The result holds `ceil(samples.len() / channel_count)` samples for the
/// channels that received a sample in the last (possibly partial) frame.
pub fn extract_channel(
    samples: &[i16],
    channel_count: u16,
    index: usize,
) -> Result<Vec<i16>, AudioError> {
    let channels = check_channels(channel_count)?;
    Ok(samples.iter().skip(index).step_by(channels).copied().collect())
}

/// Splits an interleaved buffer into left (channel 0) and right (channel 1).
///
/// Mono buffers report the left channel on both sides. Channels past the
/// second are not kept.
pub fn deinterleave(samples: &[i16], channel_count: u16) -> Result<ChannelBuffers, AudioError> {
    let left = extract_channel(samples, channel_count, 0)?;

    if channel_count == 1 {
        return Ok(ChannelBuffers {
            left,
            right: Vec::new(),
            mono: true,
        });
    }

    // Both sides share the left channel's length so a trailing partial frame
    // still pairs up.
    let mut right = extract_channel(samples, channel_count, 1)?;
    right.resize(left.len(), 0);

    Ok(ChannelBuffers {
        left,
        right,
        mono: false,
    })
}

/// Inverse of [`extract_channel`] over all channels. Shorter channels are
/// padded with silence up to the longest one.
pub fn interleave(channels: &[&[i16]]) -> Vec<i16> {
    let frames = channels.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * channels.len());

    for frame in 0..frames {
        out.extend(channels.iter().map(|c| c.get(frame).copied().unwrap_or(0)));
    }

    out
}

/// `[s0, s1, ..]` becomes `[s0, s0, s1, s1, ..]`.
pub fn duplicate_mono_to_stereo(samples: &[i16]) -> Vec<i16> {
    samples.iter().flat_map(|&s| [s, s]).collect()
}

/// Encodes samples as 16-bit little-endian PCM bytes.
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Copies `length` frames of one side starting at `start_frame`.
///
/// Frames past the end of the buffer are returned as silence. The right side
/// of a mono buffer is the left side.
pub fn window(
    samples: &[i16],
    channel_count: u16,
    left: bool,
    start_frame: usize,
    length: usize,
) -> Result<Vec<i16>, AudioError> {
    let channels = check_channels(channel_count)?;
    let offset = if !left && channels >= 2 { 1 } else { 0 };

    let mut out = vec![0; length];
    let start = start_frame.saturating_mul(channels).saturating_add(offset);

    for (slot, &sample) in out
        .iter_mut()
        .zip(samples.iter().skip(start).step_by(channels))
    {
        *slot = sample;
    }

    Ok(out)
}
