use anyhow::Result;
use audiofile::process::fallback::progress::CancelToken;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat};
use cli::decode::cmd_decode;
use cli::info::cmd_info;

mod byteorder;
mod cli;
mod input;
mod report;
pub(crate) mod timestamp;
mod wav;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let multi = MultiProgress::new();
    let pb = init_logging(&cli, &multi)?;

    log::debug!(
        "audiofiled {} (audiofile {}), strict: {}",
        env!("CARGO_PKG_VERSION"),
        env!("AUDIOFILE_VERSION"),
        cli.strict
    );

    match cli.command {
        Commands::Decode(ref args) => {
            let cancel = CancelToken::new();
            install_interrupt_handler(&cancel);
            cmd_decode(args, &cli, pb, &cancel)?
        }
        Commands::Info(ref args) => cmd_info(args, &cli, pb)?,
    }

    Ok(())
}

/// Routes log records through the progress bars when they are enabled.
fn init_logging<'a>(cli: &Cli, multi: &'a MultiProgress) -> Result<Option<&'a MultiProgress>> {
    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(cli.loglevel.to_level_filter());
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                writeln!(
                    buf,
                    "{{\"ts\":{},\"lvl\":\"{}\",\"msg\":\"{}\"}}",
                    buf.timestamp(),
                    record.level(),
                    record.args()
                )
            });
        }
    }

    if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Ok(Some(multi))
    } else {
        env_builder.try_init()?;
        Ok(None)
    }
}

/// First Ctrl-C stops the transcoder and lets the decode unwind; a second one exits.
fn install_interrupt_handler(cancel: &CancelToken) {
    let cancel = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            std::process::exit(130);
        }
        log::warn!("Interrupted, stopping decode (press Ctrl-C again to exit now)");
        cancel.cancel();
    });

    if let Err(e) = installed {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }
}
