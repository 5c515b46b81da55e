use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::command::{Cli, InfoArgs};
use crate::input::InputReader;
use crate::report::{FileReport, Id3Report, StreamReport};
use audiofile::process::reader::{AudioFileReader, FileInfo, ReaderConfig};
use audiofile::structs::id3::Id3SizeEncoding;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Inspecting: {}", args.input.display());

    let pb = if let Some(multi) = multi {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message("Reading headers...");
        Some(pb)
    } else {
        None
    };

    let mut config = ReaderConfig::default();
    config.set_fail_level(cli.fail_level());
    if args.syncsafe_id3 {
        config.set_id3_size_encoding(Id3SizeEncoding::Syncsafe);
    }
    let reader = AudioFileReader::new(config);

    let info = inspect(&reader, args)?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let report = FileReport::new(args.input.to_string_lossy().into_owned(), &info);

    if args.yaml {
        print!("{}", report.to_yaml()?);
    } else {
        display_report(&report);
    }

    Ok(())
}

fn inspect(reader: &AudioFileReader, args: &InfoArgs) -> Result<FileInfo> {
    let mut input = InputReader::new(&args.input)?;

    if input.is_pipe() {
        let bytes = input.read_all()?;
        Ok(reader.inspect_bytes(&bytes, None)?)
    } else {
        Ok(reader.inspect(&args.input)?)
    }
}

fn display_report(report: &FileReport) {
    println!();
    println!("File Information");
    println!("  Input                     {}", report.input);
    println!("  Kind                      {}", report.kind);

    let size_mb = report.size_bytes as f64 / 1_000_000.0;
    println!(
        "  Size                      {size_mb:.2} MB ({} bytes)",
        report.size_bytes
    );
    println!();

    if let Some(stream) = &report.stream {
        display_stream(stream);
    }

    if let Some(id3) = &report.id3 {
        display_id3(id3);
    }

    if report.stream.is_none() && report.id3.is_none() {
        println!("No stream details available without decoding.");
        println!();
    }
}

fn display_stream(stream: &StreamReport) {
    println!("Stream Information");
    println!("  Format tag                {:#06X}", stream.format_tag);
    println!("  Channels                  {}", stream.channels);
    println!("  Sampling rate             {} Hz", stream.sample_rate);
    println!("  Bits per sample           {}", stream.bits_per_sample);
    println!("  Bytes per frame           {}", stream.bytes_per_frame);
    println!(
        "  Average byte rate         {} B/s",
        stream.avg_bytes_per_second
    );
    println!("  PCM payload               {} bytes", stream.data_length);
    println!("  Frames                    {}", stream.frame_count);
    println!("  Duration                  {}", stream.duration);
    println!();
}

fn display_id3(id3: &Id3Report) {
    println!("ID3 Tag");
    println!("  Version                   ID3v{}", id3.version);
    println!("  Flags                     {:#04X}", id3.flags);
    println!("  Tag size                  {} bytes", id3.tag_size);
    if id3.first_frame_text.is_empty() {
        println!("  First frame               {}", id3.first_frame);
    } else {
        println!(
            "  First frame               {}: {}",
            id3.first_frame, id3.first_frame_text
        );
    }
    println!();
}
