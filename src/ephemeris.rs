use crate::bodies;
use crate::spk;

use anyhow::Context;

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Mean obliquity of the ecliptic at J2000, in arcseconds.
pub const OBLIQUITY_J2000_ARCSEC: f64 = 84_381.448;

/// Light-time iteration stops once the correction changes by less than this (s).
const LIGHT_TIME_TOLERANCE_S: f64 = 1e-12 * 86_400.0;
const LIGHT_TIME_MAX_ITERATIONS: usize = 10;

/// Source of barycentric body positions.
///
/// Positions are ICRF-aligned, in kilometres, relative to the solar-system
/// barycenter at `et` (TDB seconds past J2000).
pub trait Ephemeris: Sync {
    fn barycentric_position(&self, naif_id: i32, et: f64) -> anyhow::Result<[f64; 3]>;
}

impl Ephemeris for spk::SpkKernel {
    fn barycentric_position(&self, naif_id: i32, et: f64) -> anyhow::Result<[f64; 3]> {
        spk::SpkKernel::barycentric_position(self, naif_id, et)
    }
}

/// Ecliptic spherical coordinates of an astrometric vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticCoords {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub distance_km: f64,
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Astrometric position of `target` as seen from `observer`.
///
/// The observer is placed at `et`; the target is evaluated at `et - τ`, where
/// `τ` is the light travel time, iterated until it settles.
///
/// # Arguments
/// * `ephemeris` - Position source.
/// * `observer` - Body the observation is made from.
/// * `target` - Body being observed.
/// * `et` - Observation time, TDB seconds past J2000.
///
/// # Returns
/// * `anyhow::Result<[f64; 3]>` - ICRF vector from observer to target in km.
pub fn observe<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    observer: bodies::Body,
    target: bodies::Body,
    et: f64,
) -> anyhow::Result<[f64; 3]> {
    let origin = ephemeris.barycentric_position(observer.naif_id(), et)?;
    let mut vector = sub(ephemeris.barycentric_position(target.naif_id(), et)?, origin);
    let mut light_time = norm(vector) / SPEED_OF_LIGHT_KM_S;

    for _ in 0..LIGHT_TIME_MAX_ITERATIONS {
        let position = ephemeris.barycentric_position(target.naif_id(), et - light_time)?;
        vector = sub(position, origin);
        let next = norm(vector) / SPEED_OF_LIGHT_KM_S;
        let delta = (next - light_time).abs();
        light_time = next;
        if delta < LIGHT_TIME_TOLERANCE_S {
            break;
        }
    }

    anyhow::Ok(vector)
}

/// Rotates an ICRF vector into the J2000 ecliptic frame and converts it to
/// latitude, longitude in [0, 360), and distance.
pub fn to_ecliptic(vector: [f64; 3]) -> EclipticCoords {
    let eps = (OBLIQUITY_J2000_ARCSEC / 3600.0).to_radians();
    let (sin_e, cos_e) = eps.sin_cos();

    let x = vector[0];
    let y = cos_e * vector[1] + sin_e * vector[2];
    let z = -sin_e * vector[1] + cos_e * vector[2];

    let distance_km = (x * x + y * y + z * z).sqrt();
    let mut longitude_deg = y.atan2(x).to_degrees().rem_euclid(360.0);
    if longitude_deg >= 360.0 {
        longitude_deg = 0.0;
    }
    let latitude_deg = if distance_km > 0.0 {
        z.atan2((x * x + y * y).sqrt()).to_degrees()
    } else {
        0.0
    };

    EclipticCoords {
        latitude_deg,
        longitude_deg,
        distance_km,
    }
}

/// Observes `target` from `observer` at `et` and returns its J2000 ecliptic
/// coordinates.
///
/// Fails when the observation is degenerate: the two bodies coincide, or the
/// kernel produced non-finite coordinates.
pub fn observe_ecliptic<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    observer: bodies::Body,
    target: bodies::Body,
    et: f64,
) -> anyhow::Result<EclipticCoords> {
    let vector = observe(ephemeris, observer, target, et)
        .with_context(|| format!("Failed to observe {} from {} at ET {}", target, observer, et))?;
    let coords = to_ecliptic(vector);
    if !(coords.distance_km > 0.0 && coords.distance_km.is_finite()) || !coords.latitude_deg.is_finite() {
        anyhow::bail!(
            "Degenerate observation of {} from {} at ET {}: distance {} km, latitude {}",
            target,
            observer,
            et,
            coords.distance_km,
            coords.latitude_deg
        );
    }
    anyhow::Ok(coords)
}

/// Ecliptic longitude in degrees of `target` observed from its conventional
/// observer (the Sun, or Earth for the Moon) at `et`.
pub fn ecliptic_longitude<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    target: bodies::Body,
    et: f64,
) -> anyhow::Result<f64> {
    let coords = observe_ecliptic(ephemeris, target.observer(), target, et)?;
    anyhow::Ok(coords.longitude_deg)
}


#[cfg(test)]
mod tests {
    use super::mock::{ecliptic_to_icrf, CircularOrbits};
    use super::*;
    use crate::bodies::Body;
    use crate::spk::daf::Endian;
    use crate::spk::fixtures;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    fn angular_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_to_ecliptic_axes() {
        let c = to_ecliptic([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(c.longitude_deg, 0.0);
        assert_abs_diff_eq!(c.latitude_deg, 0.0);

        let c = to_ecliptic(ecliptic_to_icrf([0.0, 2.0, 0.0]));
        assert_abs_diff_eq!(c.longitude_deg, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.latitude_deg, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.distance_km, 2.0, epsilon = 1e-12);

        let c = to_ecliptic(ecliptic_to_icrf([0.0, 0.0, 5.0]));
        assert_abs_diff_eq!(c.latitude_deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_longitude_is_normalized() {
        let c = to_ecliptic(ecliptic_to_icrf([1.0, -1.0, 0.0]));
        assert_abs_diff_eq!(c.longitude_deg, 315.0, epsilon = 1e-9);

        let c = to_ecliptic([1.0, -1e-300, 0.0]);
        assert!((0.0..360.0).contains(&c.longitude_deg));
    }

    #[test]
    fn test_observe_applies_light_time() {
        let et = 0.0;
        let vector = observe(&CircularOrbits, Body::Sun, Body::NeptuneBarycenter, et).unwrap();
        let light_time = norm(vector) / SPEED_OF_LIGHT_KM_S;
        // roughly 4 hours for Neptune
        assert!(light_time > 14_000.0 && light_time < 16_000.0);

        let expected = CircularOrbits::expected_longitude(8, et - light_time);
        let actual = to_ecliptic(vector).longitude_deg;
        assert_abs_diff_eq!(actual, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_moon_is_measured_from_earth() {
        let et = 86_400.0 * 1000.0;
        let lon = ecliptic_longitude(&CircularOrbits, Body::Moon, et).unwrap();
        let expected = CircularOrbits::expected_longitude(301, et);
        // the Moon is evaluated light-time earlier and the Earth-Moon barycenter
        // moves about 0.002 deg in that interval
        assert!(angular_diff(lon, expected) < 0.01);
    }

    #[test]
    fn test_earth_opposes_geocentric_sun() {
        for day in [0.0, 91.0, 7305.0, 9000.0] {
            let et = day * 86_400.0;
            let earth = ecliptic_longitude(&CircularOrbits, Body::Earth, et).unwrap();
            let sun = to_ecliptic(observe(&CircularOrbits, Body::Earth, Body::Sun, et).unwrap());
            assert!(angular_diff(earth, sun.longitude_deg + 180.0) < 0.01);
        }
    }

    #[test]
    fn test_unknown_body_propagates_with_context() {
        struct Empty;
        impl Ephemeris for Empty {
            fn barycentric_position(&self, naif_id: i32, _et: f64) -> anyhow::Result<[f64; 3]> {
                anyhow::bail!("Body {} is not present in the ephemeris", naif_id)
            }
        }

        let err = ecliptic_longitude(&Empty, Body::Mars, 0.0).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to observe mars from sun"));
    }

    #[test]
    fn test_rejects_coincident_bodies() {
        struct SamePlace;
        impl Ephemeris for SamePlace {
            fn barycentric_position(&self, _naif_id: i32, _et: f64) -> anyhow::Result<[f64; 3]> {
                anyhow::Ok([1.0e8, 0.0, 0.0])
            }
        }

        let err = ecliptic_longitude(&SamePlace, Body::Venus, 0.0).unwrap_err();
        assert!(err.to_string().contains("Degenerate observation of venus from sun"));
    }

    #[test]
    fn test_rejects_non_finite_positions() {
        struct Corrupt;
        impl Ephemeris for Corrupt {
            fn barycentric_position(&self, naif_id: i32, _et: f64) -> anyhow::Result<[f64; 3]> {
                match naif_id {
                    10 => anyhow::Ok([0.0; 3]),
                    _ => anyhow::Ok([1.0e8, 0.0, f64::NAN]),
                }
            }
        }

        assert!(ecliptic_longitude(&Corrupt, Body::Mars, 0.0).is_err());
    }

    #[test]
    fn test_observe_ecliptic_reports_distance_and_latitude() {
        let coords = observe_ecliptic(&CircularOrbits, Body::Sun, Body::Venus, 0.0).unwrap();
        assert_abs_diff_eq!(coords.distance_km, 1.082e8, epsilon = 1.0);
        assert_abs_diff_eq!(coords.latitude_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spk_kernel_longitudes() {
        let segments = vec![
            fixtures::constant_segment(10, 0, [0.0; 3]),
            fixtures::constant_segment(1, 0, [5.0e7, 0.0, 0.0]),
            fixtures::constant_segment(199, 1, [0.0; 3]),
            fixtures::constant_segment(3, 0, [-1.5e8, 0.0, 0.0]),
            fixtures::constant_segment(399, 3, [0.0; 3]),
            fixtures::constant_segment(301, 3, [0.0, 3.8e5, 0.0]),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&fixtures::build_kernel(&segments, Endian::Little)).unwrap();
        file.flush().unwrap();
        let kernel = spk::SpkKernel::open(file.path()).unwrap();

        let mercury = ecliptic_longitude(&kernel, Body::Mercury, 0.0).unwrap();
        let earth = ecliptic_longitude(&kernel, Body::Earth, 0.0).unwrap();
        let moon = ecliptic_longitude(&kernel, Body::Moon, 0.0).unwrap();
        assert_abs_diff_eq!(mercury, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(earth, 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moon, 90.0, epsilon = 1e-9);

        assert!(ecliptic_longitude(&kernel, Body::Mars, 0.0).is_err());
    }
}
