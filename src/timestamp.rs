use std::time::Duration;

/// `mm:ss.mmm`, or `h:mm:ss.mmm` once the duration reaches an hour.
pub fn time_str(duration: Duration) -> String {
    let ms = duration.as_millis();
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let milliseconds = ms % 1000;

    if hours == 0 {
        format!("{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    }
}

pub fn time_str_millis(millis: u64) -> String {
    time_str(Duration::from_millis(millis))
}
