/// Julian date of the J2000 epoch, 2000-01-01T12:00:00 TDB.
const J2000_JD: f64 = 2_451_545.0;

/// Seconds per day.
const DAY_S: f64 = 86_400.0;

/// Converts a UTC instant to ephemeris time: TDB seconds past J2000.
///
/// The instant enters `tempoch` as a Unix time, which applies the IERS
/// leap-second table (UTC → TAI → TT); the conversion to `TDB` adds the
/// periodic TDB − TT terms. This is the time argument SPK segments are
/// indexed by.
///
/// # Arguments
/// * `utc` - Calendar date and time on the UTC scale.
///
/// # Returns
/// * `f64` - Seconds past 2000-01-01T12:00:00 TT, on the TDB scale.
pub fn utc_to_et(utc: chrono::NaiveDateTime) -> f64 {
    let utc = utc.and_utc();
    let unix_seconds = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9;

    let unix = tempoch::Time::<tempoch::UnixTime>::new(unix_seconds / DAY_S);
    let tdb: tempoch::Time<tempoch::TDB> = unix.to::<tempoch::TDB>();
    (tdb.quantity().value() - J2000_JD) * DAY_S
}

/// Ephemeris time of 00:00:00 UTC on `date`.
pub fn utc_midnight_to_et(date: chrono::NaiveDate) -> f64 {
    utc_to_et(date.and_time(chrono::NaiveTime::MIN))
}
