use std::time::Duration;

#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Read of {requested} bytes at position {position} exceeds buffer length {len}")]
    OutOfBounds {
        position: usize,
        requested: usize,
        len: usize,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    #[error("Unsupported bit depth: {0} (expected 8, 16 or 24)")]
    UnsupportedBitDepth(u16),

    #[error("Decode tool `{0}` is not available")]
    DecodeToolMissing(String),

    #[error("Probe failed: {0}")]
    ProbeFailure(String),

    #[error("Decode process failed: {0}")]
    DecodeProcessFailure(String),

    #[error(transparent)]
    OutOfBounds(#[from] CursorError),

    #[error("Decode cancelled")]
    Cancelled,

    #[error("Decode timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Reports a cursor overrun during a container walk as a malformed container.
    pub(crate) fn truncated(what: &str, err: CursorError) -> Self {
        AudioError::MalformedContainer(format!("truncated {what}: {err}"))
    }
}
