use anyhow::Result;
use audiofile::process::fallback::progress::{CancelToken, ProgressHandle};
use audiofile::process::reader::AudioFileReader;
use audiofile::structs::audio_data::AudioData;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

pub struct DecoderThreadConfig {
    pub input_path: PathBuf,
    pub reader: AudioFileReader,
    pub tx: mpsc::Sender<f64>,
    pub cancel: CancelToken,
}

/// Runs the whole load on a worker thread.
///
/// Progress percentages arrive on the config's channel; it closes when the
/// load returns, so the receiving loop ends on its own.
pub fn spawn_decoder_thread(config: DecoderThreadConfig) -> thread::JoinHandle<Result<AudioData>> {
    thread::spawn(move || -> Result<AudioData> {
        let DecoderThreadConfig {
            input_path,
            reader,
            tx,
            cancel,
        } = config;

        let progress = ProgressHandle::with_sender(tx);
        let audio = reader.load(&input_path, &progress, &cancel)?;

        log::info!(
            "Loading complete: {} frames, {} Hz, {} channel(s)",
            audio.frame_count(),
            audio.sample_rate(),
            audio.channel_count()
        );
        Ok(audio)
    })
}
