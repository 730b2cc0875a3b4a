//! Reader for JPL SPK ephemeris kernels (`.bsp`).
//!
//! Covers what the planetary DE files need: the DAF container, Chebyshev
//! segments of types 2 and 3, and chaining segments down to the solar-system
//! barycenter.
pub mod daf;
pub mod segments;

use anyhow::Context;

/// NAIF id of the solar-system barycenter, the root of every segment chain.
pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;

/// Longest `target -> center` chain followed before giving up.
const MAX_CHAIN_DEPTH: usize = 16;

/// An opened SPK kernel with its decoded segment table.
#[derive(Debug)]
pub struct SpkKernel {
    daf: daf::DafFile,
    segments: Vec<segments::SpkSegment>,
}

impl SpkKernel {
    /// Opens an SPK file and decodes every segment summary.
    ///
    /// # Arguments
    /// * `path` - Path to the `.bsp` kernel.
    ///
    /// # Returns
    /// * `anyhow::Result<SpkKernel>` - The kernel or an error naming the path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let daf = daf::DafFile::open(path)
            .with_context(|| format!("Failed to load ephemeris {}", path.display()))?;

        if daf.id_word != "DAF/SPK" && daf.id_word != "NAIF/DAF" {
            anyhow::bail!("{} is a {} file, not an SPK kernel", path.display(), daf.id_word);
        }
        if daf.nd != 2 || daf.ni != 6 {
            anyhow::bail!(
                "{} has summary format ND={}, NI={}; SPK kernels use ND=2, NI=6",
                path.display(),
                daf.nd,
                daf.ni
            );
        }

        let segments = daf
            .summaries
            .iter()
            .map(|summary| segments::SpkSegment::from_summary(&daf, summary))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("Failed to decode segments of {}", path.display()))?;

        anyhow::Ok(SpkKernel { daf, segments })
    }

    pub fn segments(&self) -> &[segments::SpkSegment] {
        &self.segments
    }

    /// Finds the segment for `target` covering `et`. Later segments take
    /// precedence over earlier ones, as in SPICE.
    fn segment_for(&self, target: i32, et: f64) -> anyhow::Result<&segments::SpkSegment> {
        let mut known = false;
        for segment in self.segments.iter().rev() {
            if segment.target != target {
                continue;
            }
            known = true;
            if segment.covers(et) {
                return anyhow::Ok(segment);
            }
        }
        if known {
            anyhow::bail!("No segment for body {} covers epoch {} (TDB s past J2000)", target, et)
        } else {
            anyhow::bail!("Body {} is not present in the ephemeris", target)
        }
    }

    /// Position of `body` relative to the solar-system barycenter in kilometres.
    ///
    /// Sums segment positions along the `target -> center` chain, e.g. the
    /// Moon is `301 -> 3 -> 0`.
    pub fn barycentric_position(&self, body: i32, et: f64) -> anyhow::Result<[f64; 3]> {
        let mut position = [0.0; 3];
        let mut current = body;

        for _ in 0..MAX_CHAIN_DEPTH {
            if current == SOLAR_SYSTEM_BARYCENTER {
                return anyhow::Ok(position);
            }
            let segment = self.segment_for(current, et)?;
            let offset = segment.position(&self.daf, et)?;
            for axis in 0..3 {
                position[axis] += offset[axis];
            }
            current = segment.center;
        }

        anyhow::bail!("Segment chain for body {} does not reach the barycenter", body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::daf::Endian;
    use approx::assert_abs_diff_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn kernel(segments: &[fixtures::TestSegment]) -> (NamedTempFile, SpkKernel) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&fixtures::build_kernel(segments, Endian::Little)).unwrap();
        file.flush().unwrap();
        let kernel = SpkKernel::open(file.path()).unwrap();
        (file, kernel)
    }

    #[test]
    fn test_chains_segments_to_barycenter() {
        let (_file, kernel) = kernel(&[
            fixtures::constant_segment(3, 0, [1.5e8, 0.0, 0.0]),
            fixtures::constant_segment(399, 3, [-4.6e3, 0.0, 0.0]),
            fixtures::constant_segment(301, 3, [3.8e5, 1.0e4, 0.0]),
        ]);

        assert_eq!(kernel.segments().len(), 3);
        let moon = kernel.barycentric_position(301, 0.0).unwrap();
        assert_abs_diff_eq!(moon[0], 1.5e8 + 3.8e5, epsilon = 1e-6);
        assert_abs_diff_eq!(moon[1], 1.0e4, epsilon = 1e-6);

        let earth = kernel.barycentric_position(399, 0.0).unwrap();
        assert_abs_diff_eq!(earth[0], 1.5e8 - 4.6e3, epsilon = 1e-6);
        assert_eq!(kernel.barycentric_position(0, 0.0).unwrap(), [0.0; 3]);
    }

    #[test]
    fn test_later_segment_wins() {
        let (_file, kernel) = kernel(&[
            fixtures::constant_segment(10, 0, [1.0, 0.0, 0.0]),
            fixtures::constant_segment(10, 0, [2.0, 0.0, 0.0]),
        ]);

        assert_eq!(kernel.barycentric_position(10, 0.0).unwrap(), [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_body_is_an_error() {
        let (_file, kernel) = kernel(&[fixtures::constant_segment(10, 0, [0.0; 3])]);

        let err = kernel.barycentric_position(499, 0.0).unwrap_err();
        assert!(err.to_string().contains("Body 499 is not present"));
    }

    #[test]
    fn test_uncovered_epoch_is_an_error() {
        let (_file, kernel) = kernel(&[fixtures::constant_segment(10, 0, [0.0; 3])]);

        let err = kernel.barycentric_position(10, fixtures::COVERAGE_END + 1.0).unwrap_err();
        assert!(err.to_string().contains("No segment for body 10 covers epoch"));
    }

    #[test]
    fn test_cyclic_chain_is_an_error() {
        let (_file, kernel) = kernel(&[
            fixtures::constant_segment(5, 6, [0.0; 3]),
            fixtures::constant_segment(6, 5, [0.0; 3]),
        ]);

        assert!(kernel.barycentric_position(5, 0.0).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = SpkKernel::open("/nonexistent/de421.bsp").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/de421.bsp"));
    }
}
