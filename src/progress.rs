use crate::dates;
use crate::ephemeris;
use crate::positions;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} dates ({eta})";

/// Creates a progress bar counting computed dates.
///
/// # Arguments
/// * `len` - Total number of dates.
///
/// # Returns
/// * `anyhow::Result<indicatif::ProgressBar>` - The styled bar, or an error if the template is invalid.
pub fn date_progress_bar(len: u64) -> anyhow::Result<indicatif::ProgressBar> {
    let style = indicatif::ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Invalid progress template: {}", e))?
        .progress_chars("#>-");
    anyhow::Ok(indicatif::ProgressBar::new(len).with_style(style))
}

/// Computes the position document for `range` while drawing a progress bar.
///
/// Runs on whichever rayon pool is current, so callers can wrap it in
/// `ThreadPool::install` to pin the thread count.
pub fn compute_with_progress<E: ephemeris::Ephemeris + ?Sized>(
    ephemeris: &E,
    range: &dates::DateRange,
) -> anyhow::Result<positions::PositionDocument> {
    let bar = date_progress_bar(range.len() as u64)?;
    let result = positions::compute_positions(ephemeris, range, &bar);
    match &result {
        Ok(_) => bar.finish(),
        Err(_) => bar.abandon(),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::mock::CircularOrbits;

    #[test]
    fn test_progress_template_is_valid() {
        let bar = date_progress_bar(10).unwrap();
        assert_eq!(bar.length(), Some(10));
    }

    #[test]
    fn test_compute_with_progress() {
        let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
        let range = dates::DateRange::new(start, end);

        let document = compute_with_progress(&CircularOrbits, &range).unwrap();
        assert_eq!(document.len(), 10);
    }
}
