use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Resolution of the bar; percentages are scaled onto this many steps.
pub const PROGRESS_STEPS: u64 = 1000;

pub fn create_progress_bar(multi: &MultiProgress) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new(PROGRESS_STEPS));
    pb.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {percent}%\n{msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}",
    )?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("loading");
    Ok(pb)
}

pub fn percent_to_position(percent: f64) -> u64 {
    let clamped = percent.clamp(0.0, 100.0);
    (clamped / 100.0 * PROGRESS_STEPS as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_and_clamps() {
        assert_eq!(percent_to_position(0.0), 0);
        assert_eq!(percent_to_position(50.0), 500);
        assert_eq!(percent_to_position(100.0), PROGRESS_STEPS);
        assert_eq!(percent_to_position(140.0), PROGRESS_STEPS);
        assert_eq!(percent_to_position(-3.0), 0);
    }
}
