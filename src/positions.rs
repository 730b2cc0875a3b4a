use crate::bodies;
use crate::dates;
use crate::ephemeris;
use crate::timescale;
use crate::utils;

use anyhow::Context;
use rayon::prelude::*;

/// Ecliptic longitudes in degrees of every tracked body on one date.
///
/// Field order is the serialization order of the output document.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionRecord {
    pub mercury: f64,
    pub venus: f64,
    pub earth: f64,
    pub mars: f64,
    #[serde(rename = "jupiter barycenter")]
    pub jupiter_barycenter: f64,
    #[serde(rename = "saturn barycenter")]
    pub saturn_barycenter: f64,
    #[serde(rename = "uranus barycenter")]
    pub uranus_barycenter: f64,
    #[serde(rename = "neptune barycenter")]
    pub neptune_barycenter: f64,
    pub moon: f64,
}

impl PositionRecord {
    /// Builds a record by evaluating `longitude` once per tracked body.
    pub fn try_from_fn<F>(mut longitude: F) -> anyhow::Result<Self>
    where
        F: FnMut(bodies::Body) -> anyhow::Result<f64>,
    {
        use bodies::Body;
        anyhow::Ok(PositionRecord {
            mercury: longitude(Body::Mercury)?,
            venus: longitude(Body::Venus)?,
            earth: longitude(Body::Earth)?,
            mars: longitude(Body::Mars)?,
            jupiter_barycenter: longitude(Body::JupiterBarycenter)?,
            saturn_barycenter: longitude(Body::SaturnBarycenter)?,
            uranus_barycenter: longitude(Body::UranusBarycenter)?,
            neptune_barycenter: longitude(Body::NeptuneBarycenter)?,
            moon: longitude(Body::Moon)?,
        })
    }

    /// Longitude of `body`, or `None` for bodies that are not tracked.
    pub fn get(&self, body: bodies::Body) -> Option<f64> {
        use bodies::Body;
        match body {
            Body::Sun => None,
            Body::Mercury => Some(self.mercury),
            Body::Venus => Some(self.venus),
            Body::Earth => Some(self.earth),
            Body::Mars => Some(self.mars),
            Body::JupiterBarycenter => Some(self.jupiter_barycenter),
            Body::SaturnBarycenter => Some(self.saturn_barycenter),
            Body::UranusBarycenter => Some(self.uranus_barycenter),
            Body::NeptuneBarycenter => Some(self.neptune_barycenter),
            Body::Moon => Some(self.moon),
        }
    }

    /// `(body, longitude)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (bodies::Body, f64)> + '_ {
        bodies::TRACKED_BODIES
            .iter()
            .filter_map(move |body| self.get(*body).map(|lon| (*body, lon)))
    }
}

/// Output document: date key (`YYYY-MM-DD`) to position record, ordered by date.
pub type PositionDocument = std::collections::BTreeMap<String, PositionRecord>;

/// Computes the position record for a single date at 00:00:00 UTC.
///
/// # Arguments
/// * `ephemeris` - Position source.
/// * `date` - Calendar date on the UTC scale.
///
/// # Returns
/// * `anyhow::Result<PositionRecord>` - Longitudes of all tracked bodies, or the
///   first query error annotated with the date.
pub fn compute_record<E: ephemeris::Ephemeris + ?Sized>(
    ephemeris: &E,
    date: chrono::NaiveDate,
) -> anyhow::Result<PositionRecord> {
    let et = timescale::utc_midnight_to_et(date);
    PositionRecord::try_from_fn(|body| ephemeris::ecliptic_longitude(ephemeris, body, et))
        .with_context(|| format!("Failed to compute positions for {}", utils::date_key(date)))
}

/// Computes the full position document for a date range.
///
/// Dates are evaluated in parallel on the current rayon pool; records are
/// then inserted into the ordered document, so the result does not depend on
/// the thread count. The first failing date aborts the whole computation.
///
/// # Arguments
/// * `ephemeris` - Position source shared by all workers.
/// * `range` - Inclusive range of dates.
/// * `progress` - Advanced by one per computed date.
///
/// # Returns
/// * `anyhow::Result<PositionDocument>` - One record per date in `range`.
pub fn compute_positions<E: ephemeris::Ephemeris + ?Sized>(
    ephemeris: &E,
    range: &dates::DateRange,
    progress: &indicatif::ProgressBar,
) -> anyhow::Result<PositionDocument> {
    let dates: Vec<chrono::NaiveDate> = range.iter().collect();

    let records = dates
        .par_iter()
        .map(|date| {
            let record = compute_record(ephemeris, *date)?;
            progress.inc(1);
            anyhow::Ok((utils::date_key(*date), record))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    anyhow::Ok(records.into_iter().collect())
}

/// Checks that `document` holds exactly one record per date of `range` and
/// that every longitude is finite and within [0, 360).
pub fn validate_document(
    document: &PositionDocument,
    range: &dates::DateRange,
) -> anyhow::Result<()> {
    if document.len() != range.len() {
        anyhow::bail!(
            "Expected {} dates from {} to {}, found {}",
            range.len(),
            range.start(),
            range.end(),
            document.len()
        );
    }

    for (date, (key, record)) in range.iter().zip(document) {
        let expected = utils::date_key(date);
        if *key != expected {
            anyhow::bail!("Expected date {} but found {}", expected, key);
        }
        for (body, longitude) in record.iter() {
            if !longitude.is_finite() || !(0.0..360.0).contains(&longitude) {
                anyhow::bail!("{}: longitude of {} is out of range: {}", key, body, longitude);
            }
        }
    }

    anyhow::Ok(())
}
