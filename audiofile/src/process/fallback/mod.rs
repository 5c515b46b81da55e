//! Decoding through an external transcoder.
//!
//! Files without a native reader (or whose native parse failed) are handed to
//! an ffmpeg-compatible program that writes signed 16-bit little-endian PCM to
//! its standard output. Stream facts are probed first with an
//! ffprobe-compatible program so progress can be reported from the
//! transcoder's `time=` status lines.
//!
//! Standard output and standard error are drained on two threads while the
//! calling thread supervises the child for exit, cancellation and timeout.

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdout, ExitStatus};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::process::FrameAligner;
use crate::structs::audio_data::AudioData;
use crate::utils::errors::AudioError;

pub mod probe;
pub mod progress;
pub mod runner;

use probe::{ProbeResult, Prober};
use progress::{CancelToken, ProgressHandle, progress_percent};
use runner::ProcessRunner;

const BYTES_PER_SAMPLE: usize = 2;

/// Programs and limits used by [`FallbackDecoder`].
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Files larger than this many MiB are decoded to mono.
    pub mono_threshold_mib: u64,
    /// Used when the sample rate cannot be probed.
    pub default_sample_rate: u32,
    /// How often the supervising loop checks the child.
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            mono_threshold_mib: 100,
            default_sample_rate: 44_100,
            poll_interval: Duration::from_millis(20),
            timeout: None,
        }
    }
}

impl FallbackConfig {
    pub fn set_ffmpeg(&mut self, program: impl Into<String>) {
        self.ffmpeg = program.into();
    }

    pub fn set_ffprobe(&mut self, program: impl Into<String>) {
        self.ffprobe = program.into();
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Two channels, or one for files past the mono threshold.
    pub fn channel_count_for(&self, file_len: u64) -> u16 {
        if file_len / 1024 / 1024 > self.mono_threshold_mib {
            1
        } else {
            2
        }
    }
}

/// Drives the probe and transcode steps for one file at a time.
pub struct FallbackDecoder {
    runner: Arc<dyn ProcessRunner>,
    config: FallbackConfig,
    fail_level: log::Level,
}

struct Drain {
    stdout: JoinHandle<io::Result<Vec<u8>>>,
    stderr: JoinHandle<io::Result<()>>,
}

impl Drain {
    fn start(
        stdout: ChildStdout,
        stderr: ChildStderr,
        program: String,
        total: Option<Duration>,
        progress: ProgressHandle,
    ) -> Self {
        let stdout = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut data = Vec::new();
            BufReader::new(stdout).read_to_end(&mut data)?;
            Ok(data)
        });

        let stderr = thread::spawn(move || -> io::Result<()> {
            // Status lines are rewritten in place with '\r'.
            for segment in BufReader::new(stderr).split(b'\r') {
                let segment = segment?;
                for line in String::from_utf8_lossy(&segment).lines() {
                    trace!("{program}: {line}");
                    if let Some(percent) = progress_percent(line, total) {
                        progress.publish(percent.min(100.0));
                    }
                }
            }
            Ok(())
        });

        Self { stdout, stderr }
    }

    fn join(self) -> Result<Vec<u8>, AudioError> {
        let data = self
            .stdout
            .join()
            .map_err(|_| AudioError::DecodeProcessFailure("stdout reader panicked".to_string()))?
            .map_err(|e| AudioError::DecodeProcessFailure(format!("reading stdout: {e}")))?;

        self.stderr
            .join()
            .map_err(|_| AudioError::DecodeProcessFailure("stderr reader panicked".to_string()))?
            .map_err(|e| AudioError::DecodeProcessFailure(format!("reading stderr: {e}")))?;

        Ok(data)
    }
}

impl FallbackDecoder {
    pub fn new(runner: Arc<dyn ProcessRunner>, config: FallbackConfig) -> Self {
        Self {
            runner,
            config,
            fail_level: log::Level::Error,
        }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Sets the failure level for a transcoder output that ends in a partial
    /// frame.
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }

    /// Transcodes `path` to 16-bit PCM and builds the audio model from it.
    ///
    /// Blocks until the transcoder exits, `cancel` is triggered or the
    /// configured timeout passes. Progress is published to `progress` when
    /// the duration could be probed.
    pub fn decode(
        &self,
        path: &Path,
        progress: &ProgressHandle,
        cancel: &CancelToken,
    ) -> Result<AudioData, AudioError> {
        let ffmpeg = self.config.ffmpeg.as_str();
        if !self.runner.program_exists(ffmpeg) {
            return Err(AudioError::DecodeToolMissing(ffmpeg.to_string()));
        }

        let file_len = std::fs::metadata(path)?.len();
        let channel_count = self.config.channel_count_for(file_len);

        let probe = self.probe(path);

        info!(
            "Decoding {} with {ffmpeg}: {} Hz, {channel_count} ch",
            path.display(),
            probe.sample_rate
        );

        let args = vec![
            "-i".to_string(),
            path.to_string_lossy().into_owned(),
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
            "-ac".to_string(),
            channel_count.to_string(),
            "-f".to_string(),
            "s16le".to_string(),
            "pipe:1".to_string(),
        ];

        let mut child = self
            .runner
            .spawn(ffmpeg, &args)
            .map_err(|e| AudioError::DecodeProcessFailure(format!("starting {ffmpeg}: {e}")))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            kill(&mut child);
            return Err(AudioError::DecodeProcessFailure(
                "transcoder pipes were not captured".to_string(),
            ));
        };

        let drain = Drain::start(
            stdout,
            stderr,
            ffmpeg.to_string(),
            probe.duration,
            progress.clone(),
        );

        let status = match self.supervise(&mut child, cancel) {
            Ok(status) => status,
            Err(err) => {
                kill(&mut child);
                // Readers finish once the pipes close.
                let _ = drain.join();
                return Err(err);
            }
        };

        let mut data = drain.join()?;

        if !status.success() {
            return Err(AudioError::DecodeProcessFailure(format!(
                "{ffmpeg} exited with {status}"
            )));
        }

        let len = FrameAligner::new(self.fail_level).aligned_len(
            data.len(),
            channel_count as usize * BYTES_PER_SAMPLE,
            "transcoder output",
        )?;
        data.truncate(len);

        debug!("{ffmpeg} produced {len} bytes of PCM");

        AudioData::from_pcm_bytes(
            data,
            Some(path.to_string_lossy().into_owned()),
            probe.sample_rate,
            channel_count,
        )
    }

    fn probe(&self, path: &Path) -> ProbeResult {
        Prober::new(self.runner.as_ref(), &self.config.ffprobe)
            .probe(path, self.config.default_sample_rate)
    }

    fn supervise(&self, child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus, AudioError> {
        let started = Instant::now();

        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|e| AudioError::DecodeProcessFailure(format!("waiting for child: {e}")))?
            {
                return Ok(status);
            }

            if cancel.is_cancelled() {
                info!("Decode cancelled");
                return Err(AudioError::Cancelled);
            }

            if let Some(limit) = self.config.timeout {
                if started.elapsed() >= limit {
                    return Err(AudioError::TimedOut(limit));
                }
            }

            thread::sleep(self.config.poll_interval);
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill: {e}");
    }
    let _ = child.wait();
}
