//! Transcoder progress parsing, publication and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

const TIME_TOKEN: &str = "time=";

/// Elapsed media time from a transcoder status line such as
/// `size=  512kB time=00:01:02.50 bitrate= 67.1kbits/s`.
///
/// Lines without a `time=` token, or with `time=N/A`, yield `None`.
pub fn parse_progress_time(line: &str) -> Option<Duration> {
    let start = line.find(TIME_TOKEN)? + TIME_TOKEN.len();
    let value = line[start..].split_whitespace().next()?;

    let mut fields = value.splitn(3, ':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: f64 = fields.next()?.parse().ok()?;

    let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    let fraction = Duration::try_from_secs_f64(seconds).ok()?;

    Duration::from_secs(whole).checked_add(fraction)
}

/// `elapsed / total * 100` for a status line, when the total is known.
pub fn progress_percent(line: &str, total: Option<Duration>) -> Option<f64> {
    let total = total.filter(|t| !t.is_zero())?;
    let elapsed = parse_progress_time(line)?;

    Some(elapsed.as_secs_f64() / total.as_secs_f64() * 100.0)
}

#[derive(Debug, Default)]
struct ProgressState {
    percent_bits: AtomicU64,
    known: AtomicBool,
}

/// Latest decode progress in percent.
///
/// Written by the pipeline and read from any thread. An optional channel
/// receives every published value as well.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    state: Arc<ProgressState>,
    sender: Option<Sender<f64>>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that also forwards each update to `sender`.
    pub fn with_sender(sender: Sender<f64>) -> Self {
        Self {
            state: Arc::default(),
            sender: Some(sender),
        }
    }

    /// `None` until the first update.
    pub fn percent(&self) -> Option<f64> {
        if self.state.known.load(Ordering::Acquire) {
            Some(f64::from_bits(self.state.percent_bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    pub fn publish(&self, percent: f64) {
        self.state
            .percent_bits
            .store(percent.to_bits(), Ordering::Relaxed);
        self.state.known.store(true, Ordering::Release);

        if let Some(sender) = &self.sender {
            // Receiver may be gone; the stored value is still readable.
            let _ = sender.send(percent);
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a running decode.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn out_of_range_times_are_ignored() {
        for line in [
            "time=00:00:1e300",
            "time=00:00:-1.0",
            "time=00:00:NaN",
            "time=18446744073709551615:00:00.00",
            "time=00:18446744073709551615:00.00",
        ] {
            assert_eq!(parse_progress_time(line), None, "{line}");
            assert_eq!(progress_percent(line, Some(Duration::from_secs(10))), None);
        }
    }

    #[test]
    fn half_way_line() {
        let line = "size=100kB time=00:00:05.00 bitrate=128k";

        assert_eq!(parse_progress_time(line), Some(Duration::from_secs(5)));
        assert_eq!(progress_percent(line, Some(Duration::from_secs(10))), Some(50.0));
    }

    #[test]
    fn parses_hours_and_fractions() {
        let line = "frame=  0 size=    2048kB time=01:02:03.25 bitrate= 4.5kbits/s speed=12x";
        assert_eq!(
            parse_progress_time(line),
            Some(Duration::from_millis(3_723_250))
        );
    }

    #[test]
    fn ignores_lines_without_time() {
        let total = Some(Duration::from_secs(10));

        assert_eq!(progress_percent("Input #0, mp3, from 'a.mp3':", total), None);
        assert_eq!(progress_percent("size=N/A time=N/A bitrate=N/A", total), None);
        assert_eq!(progress_percent("time=00:00:05.00", None), None);
        assert_eq!(progress_percent("time=00:00:05.00", Some(Duration::ZERO)), None);
    }

    #[test]
    fn handle_stores_and_forwards() {
        let (tx, rx) = mpsc::channel();
        let handle = ProgressHandle::with_sender(tx);
        let reader = handle.clone();

        assert_eq!(reader.percent(), None);
        handle.publish(12.5);
        handle.publish(40.0);

        assert_eq!(reader.percent(), Some(40.0));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![12.5, 40.0]);
    }

    #[test]
    fn cancel_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();

        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
