//! Byte, frame and time conversions for interleaved PCM streams.
//!
//! Byte to frame conversions truncate toward zero. Frame to time and time to
//! frame conversions go through `f64` and truncate when converted back to an
//! integer, so seeking lands on the frame at or before the requested time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTimeConverter {
    sample_rate: u32,
    bytes_per_frame: u32,
}

impl FrameTimeConverter {
    pub fn new(sample_rate: u32, bytes_per_frame: u32) -> Self {
        Self {
            sample_rate,
            bytes_per_frame,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bytes_per_frame(&self) -> u32 {
        self.bytes_per_frame
    }

    #[inline]
    pub fn bytes_to_frame(&self, bytes: u64) -> u64 {
        bytes
            .checked_div(self.bytes_per_frame as u64)
            .unwrap_or_default()
    }

    /// Saturates at `u64::MAX` for frames past `u64::MAX / bytes_per_frame`.
    #[inline]
    pub fn frame_to_byte(&self, frame: u64) -> u64 {
        frame.saturating_mul(self.bytes_per_frame as u64)
    }

    #[inline]
    pub fn frame_to_micros(&self, frame: u64) -> u64 {
        self.frame_to_units(frame, 1e6)
    }

    #[inline]
    pub fn frame_to_millis(&self, frame: u64) -> u64 {
        self.frame_to_units(frame, 1000.0)
    }

    #[inline]
    pub fn micros_to_frame(&self, micros: u64) -> u64 {
        (self.sample_rate as f64 * micros as f64 / 1e6) as u64
    }

    #[inline]
    pub fn millis_to_frame(&self, millis: u64) -> u64 {
        (self.sample_rate as f64 * millis as f64 / 1000.0) as u64
    }

    pub fn bytes_to_micros(&self, bytes: u64) -> u64 {
        self.frame_to_micros(self.bytes_to_frame(bytes))
    }

    pub fn bytes_to_seconds(&self, bytes: u64) -> u64 {
        (self.bytes_to_micros(bytes) as f64 / 1e6) as u64
    }

    pub fn micros_to_byte(&self, micros: u64) -> u64 {
        self.frame_to_byte(self.micros_to_frame(micros))
    }

    pub fn millis_to_byte(&self, millis: u64) -> u64 {
        self.frame_to_byte(self.millis_to_frame(millis))
    }

    pub fn seconds_to_byte(&self, seconds: u64) -> u64 {
        self.micros_to_byte(seconds.saturating_mul(1_000_000))
    }

    fn frame_to_units(&self, frame: u64, units_per_second: f64) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (frame as f64 / self.sample_rate as f64 * units_per_second) as u64
    }
}
