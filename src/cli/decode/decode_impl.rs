use super::decoder_thread::{DecoderThreadConfig, spawn_decoder_thread};
use super::output::{AudioWriter, resolve_output_path};
use super::progress::{create_progress_bar, percent_to_position};
use crate::cli::command::{Cli, DecodeArgs};
use crate::input::InputReader;
use crate::timestamp::time_str_millis;
use anyhow::{Result, bail};
use audiofile::process::convert::{EightBitScaling, TwentyFourBitOrder};
use audiofile::process::fallback::progress::CancelToken;
use audiofile::process::reader::{AudioFileReader, ReaderConfig};
use audiofile::structs::audio_data::AudioData;
use audiofile::structs::id3::Id3SizeEncoding;
use indicatif::{MultiProgress, ProgressBar};
use std::sync::mpsc;
use std::time::{Duration, Instant};

pub fn cmd_decode(
    args: &DecodeArgs,
    cli: &Cli,
    multi: Option<&MultiProgress>,
    cancel: &CancelToken,
) -> Result<()> {
    log::info!(
        "Decoding audio file: {} (strict mode: {}, format: {:?})",
        args.input.display(),
        cli.strict,
        args.format
    );

    let output_path = resolve_output_path(&args.input, args.output_path.as_deref(), args.format)?;
    log::info!("Output path: {}", output_path.display());

    let reader = AudioFileReader::new(reader_config(args, cli));
    let start_time = Instant::now();

    let pb = if let Some(multi) = multi {
        Some(create_progress_bar(multi)?)
    } else {
        None
    };

    let audio = if crate::input::is_pipe_path(&args.input) {
        log::debug!("Reading stdin; the external transcoder is not used for pipe input");
        let mut input = InputReader::new(&args.input)?;
        let bytes = input.read_all()?;
        reader.read_bytes(&bytes, input.file_name())?
    } else {
        load_with_progress(args, reader, &pb, cancel)?
    };

    if cancel.is_cancelled() {
        if let Some(pb) = &pb {
            pb.abandon_with_message("cancelled");
        }
        bail!("Decode cancelled before writing {}", output_path.display());
    }

    let mut writer = AudioWriter::create(
        &output_path,
        args.format,
        audio.sample_rate(),
        audio.channel_count(),
    )?;
    writer.write_samples(audio.samples())?;
    writer.finish()?;

    finalize_progress_bar(&pb, &audio, start_time);
    log::info!(
        "Wrote {} samples ({} channel(s), {} Hz) to {}",
        audio.samples().len(),
        audio.channel_count(),
        audio.sample_rate(),
        output_path.display()
    );

    Ok(())
}

fn reader_config(args: &DecodeArgs, cli: &Cli) -> ReaderConfig {
    let mut config = ReaderConfig::default();
    config.set_fail_level(cli.fail_level());
    config.set_fallback_enabled(!args.no_fallback);
    if args.full_scale_8bit {
        config.set_eight_bit_scaling(EightBitScaling::FullScale);
    }
    if args.le_24bit {
        config.set_twenty_four_bit_order(TwentyFourBitOrder::LittleEndian);
    }
    if args.syncsafe_id3 {
        config.set_id3_size_encoding(Id3SizeEncoding::Syncsafe);
    }
    config.fallback.set_ffmpeg(&args.ffmpeg);
    config.fallback.set_ffprobe(&args.ffprobe);
    config
        .fallback
        .set_timeout(args.timeout.map(Duration::from_secs));
    config
}

fn load_with_progress(
    args: &DecodeArgs,
    reader: AudioFileReader,
    pb: &Option<ProgressBar>,
    cancel: &CancelToken,
) -> Result<AudioData> {
    let (tx, rx) = mpsc::channel();

    let decode_thread = spawn_decoder_thread(DecoderThreadConfig {
        input_path: args.input.clone(),
        reader,
        tx,
        cancel: cancel.clone(),
    });

    while let Ok(percent) = rx.recv() {
        if let Some(pb) = pb {
            pb.set_position(percent_to_position(percent));
            pb.set_message("transcoding");
        }
    }

    match decode_thread.join() {
        Ok(Ok(audio)) => Ok(audio),
        Ok(Err(e)) => {
            if let Some(pb) = pb {
                pb.finish_with_message("decode failed");
            }
            Err(e)
        }
        Err(_) => {
            if let Some(pb) = pb {
                pb.finish_with_message("decode thread panicked");
            }
            Err(anyhow::anyhow!("Decode thread panicked"))
        }
    }
}

fn finalize_progress_bar(pb: &Option<ProgressBar>, audio: &AudioData, start_time: Instant) {
    if let Some(pb) = pb {
        let elapsed = start_time.elapsed();
        let audio_secs = audio.duration_millis() as f64 / 1000.0;
        let realtime_multiplier = if elapsed.as_secs_f64() > 0.0 {
            audio_secs / elapsed.as_secs_f64()
        } else {
            0.0
        };

        pb.finish_with_message(format!(
            "speed: {realtime_multiplier:.1}x | duration: {}",
            time_str_millis(audio.duration_millis())
        ));
    }
}
