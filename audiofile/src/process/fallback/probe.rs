use std::path::Path;
use std::time::Duration;

use log::{debug, warn};

use crate::process::fallback::runner::ProcessRunner;
use crate::utils::errors::AudioError;

const SAMPLE_RATE_ARGS: &[&str] = &[
    "-v",
    "error",
    "-select_streams",
    "a:0",
    "-of",
    "default=noprint_wrappers=1:nokey=1",
    "-show_entries",
    "stream=sample_rate",
];

const DURATION_ARGS: &[&str] = &[
    "-v",
    "error",
    "-show_entries",
    "format=duration",
    "-of",
    "default=noprint_wrappers=1:nokey=1",
];

/// Stream facts gathered before transcoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub sample_rate: u32,
    /// `None` when the duration could not be determined; progress is then
    /// not reported.
    pub duration: Option<Duration>,
}

/// Queries sample rate and duration through an ffprobe-compatible program.
pub struct Prober<'a> {
    runner: &'a dyn ProcessRunner,
    program: &'a str,
}

impl<'a> Prober<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, program: &'a str) -> Self {
        Self { runner, program }
    }

    /// Probes both values. Each failure is logged and replaced: the sample
    /// rate by `default_sample_rate`, the duration by `None`.
    pub fn probe(&self, path: &Path, default_sample_rate: u32) -> ProbeResult {
        let sample_rate = self.sample_rate(path).unwrap_or_else(|e| {
            warn!("{e}, assuming {default_sample_rate} Hz");
            default_sample_rate
        });

        let duration = self
            .duration(path)
            .inspect_err(|e| warn!("{e}, progress will not be reported"))
            .ok();

        debug!("Probe: {sample_rate} Hz, duration {duration:?}");

        ProbeResult {
            sample_rate,
            duration,
        }
    }

    pub fn sample_rate(&self, path: &Path) -> Result<u32, AudioError> {
        let out = self.query(SAMPLE_RATE_ARGS, path)?;

        match out.trim().parse::<u32>() {
            Ok(rate) if rate > 0 => Ok(rate),
            _ => Err(AudioError::ProbeFailure(format!(
                "unusable sample rate {:?}",
                out.trim()
            ))),
        }
    }

    pub fn duration(&self, path: &Path) -> Result<Duration, AudioError> {
        let out = self.query(DURATION_ARGS, path)?;

        out.trim()
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or_else(|| {
                AudioError::ProbeFailure(format!("unusable duration {:?}", out.trim()))
            })
    }

    fn query(&self, args: &[&str], path: &Path) -> Result<String, AudioError> {
        let mut args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        args.push(path.to_string_lossy().into_owned());

        self.runner
            .output(self.program, &args)
            .map_err(|e| AudioError::ProbeFailure(format!("{} failed: {e}", self.program)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fallback::runner::MockProcessRunner;
    use std::io;

    #[test]
    fn reads_rate_and_fractional_duration() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_output()
            .withf(|program, args| {
                program == "ffprobe" && args.iter().any(|a| a == "stream=sample_rate")
            })
            .returning(|_, _| Ok("48000\n".to_string()));
        runner
            .expect_output()
            .withf(|_, args| args.iter().any(|a| a == "format=duration"))
            .returning(|_, _| Ok("12.345000\n".to_string()));

        let result = Prober::new(&runner, "ffprobe").probe(Path::new("song.mp3"), 44_100);

        assert_eq!(result.sample_rate, 48_000);
        assert_eq!(result.duration, Some(Duration::from_secs_f64(12.345)));
    }

    #[test]
    fn path_is_last_argument() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_output()
            .withf(|program, args| {
                program == "probe" && args.last().map(String::as_str) == Some("dir/a b.ogg")
            })
            .times(2)
            .returning(|_, _| Ok("N/A".to_string()));

        let result = Prober::new(&runner, "probe").probe(Path::new("dir/a b.ogg"), 44_100);
        assert_eq!(result.sample_rate, 44_100);
        assert_eq!(result.duration, None);
    }

    #[test]
    fn failures_fall_back_independently() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_output()
            .withf(|_, args| args.iter().any(|a| a == "stream=sample_rate"))
            .returning(|_, _| Err(io::Error::other("exit status 1")));
        runner
            .expect_output()
            .withf(|_, args| args.iter().any(|a| a == "format=duration"))
            .returning(|_, _| Ok("3.5".to_string()));

        let prober = Prober::new(&runner, "ffprobe");
        assert!(matches!(
            prober.sample_rate(Path::new("x")),
            Err(AudioError::ProbeFailure(_))
        ));

        let result = prober.probe(Path::new("x"), 22_050);
        assert_eq!(result.sample_rate, 22_050);
        assert_eq!(result.duration, Some(Duration::from_millis(3_500)));
    }
}
