use crate::spk::daf;

/// Chebyshev position only.
pub const TYPE_CHEBYSHEV_POSITION: i32 = 2;
/// Chebyshev position and velocity. Only the position blocks are evaluated.
pub const TYPE_CHEBYSHEV_STATE: i32 = 3;

/// NAIF frame code of J2000, which DE kernels use and the ecliptic rotation assumes.
pub const FRAME_J2000: i32 = 1;

/// A type 2 or type 3 SPK segment located inside a DAF file.
///
/// The segment trailer (`INIT`, `INTLEN`, `RSIZE`, `N`) is decoded once at load
/// time; coefficient records are read from the mapped file per evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub target: i32,
    pub center: i32,
    pub data_type: i32,
    pub start_et: f64,
    pub end_et: f64,
    start_address: usize,
    init: f64,
    interval_len: f64,
    record_size: usize,
    n_records: usize,
}

impl SpkSegment {
    /// Decodes a segment from its DAF summary.
    ///
    /// # Arguments
    /// * `daf` - The container the summary was read from.
    /// * `summary` - Summary with 2 doubles (start/end epoch) and 6 integers
    ///   (target, center, frame, type, start address, end address).
    ///
    /// # Returns
    /// * `anyhow::Result<SpkSegment>` - The decoded segment, or an error for
    ///   unsupported data types and inconsistent trailers.
    pub fn from_summary(daf: &daf::DafFile, summary: &daf::Summary) -> anyhow::Result<Self> {
        let [start_et, end_et] = summary.doubles[..] else {
            anyhow::bail!("SPK summary must hold 2 doubles, found {}", summary.doubles.len());
        };
        let [target, center, frame, data_type, start_address, end_address] = summary.ints[..] else {
            anyhow::bail!("SPK summary must hold 6 integers, found {}", summary.ints.len());
        };

        if data_type != TYPE_CHEBYSHEV_POSITION && data_type != TYPE_CHEBYSHEV_STATE {
            anyhow::bail!(
                "Segment for body {} relative to {} has unsupported SPK type {}",
                target,
                center,
                data_type
            );
        }
        if frame != FRAME_J2000 {
            anyhow::bail!(
                "Segment for body {} is in frame {}; only J2000 (1) is supported",
                target,
                frame
            );
        }
        let trailer_start = start_address.checked_add(3);
        if start_address < 1 || trailer_start.is_none_or(|first| end_address < first) {
            anyhow::bail!(
                "Segment for body {} has invalid address range {}..{}",
                target,
                start_address,
                end_address
            );
        }

        let trailer = daf.read_doubles(end_address as usize - 3, 4)?;
        let (init, interval_len, record_size, n_records) =
            (trailer[0], trailer[1], trailer[2] as usize, trailer[3] as usize);

        let blocks = if data_type == TYPE_CHEBYSHEV_POSITION { 3 } else { 6 };
        if record_size < 2 + blocks || (record_size - 2) % blocks != 0 {
            anyhow::bail!("Segment for body {} has invalid record size {}", target, record_size);
        }
        if n_records == 0 || interval_len <= 0.0 {
            anyhow::bail!("Segment for body {} holds no records", target);
        }
        let data_words = end_address as usize - start_address as usize + 1;
        let declared_words = record_size
            .checked_mul(n_records)
            .and_then(|words| words.checked_add(4));
        if declared_words.is_none_or(|words| words > data_words) {
            anyhow::bail!(
                "Segment for body {} declares {} records of {} words but spans {} words",
                target,
                n_records,
                record_size,
                data_words
            );
        }

        anyhow::Ok(SpkSegment {
            target,
            center,
            data_type,
            start_et,
            end_et,
            start_address: start_address as usize,
            init,
            interval_len,
            record_size,
            n_records,
        })
    }

    pub fn covers(&self, et: f64) -> bool {
        et >= self.start_et && et <= self.end_et
    }

    fn coefficient_count(&self) -> usize {
        let blocks = if self.data_type == TYPE_CHEBYSHEV_POSITION { 3 } else { 6 };
        (self.record_size - 2) / blocks
    }

    /// Position of `target` relative to `center` in kilometres at `et`
    /// (TDB seconds past J2000).
    pub fn position(&self, daf: &daf::DafFile, et: f64) -> anyhow::Result<[f64; 3]> {
        if !self.covers(et) {
            anyhow::bail!(
                "Epoch {} is outside segment coverage {}..{} for body {}",
                et,
                self.start_et,
                self.end_et,
                self.target
            );
        }

        let index = ((et - self.init) / self.interval_len).floor().max(0.0) as usize;
        let index = index.min(self.n_records - 1);
        let address = self.start_address + index * self.record_size;
        let record = daf.read_doubles(address, self.record_size)?;

        let (mid, radius) = (record[0], record[1]);
        let s = (et - mid) / radius;
        let n = self.coefficient_count();

        let mut position = [0.0; 3];
        for (axis, value) in position.iter_mut().enumerate() {
            let start = 2 + axis * n;
            *value = chebyshev(&record[start..start + n], s);
        }
        anyhow::Ok(position)
    }
}

/// Evaluates a Chebyshev series of the first kind at `s` in [-1, 1].
pub fn chebyshev(coefficients: &[f64], s: f64) -> f64 {
    let mut sum = 0.0;
    let (mut t_prev, mut t_curr) = (1.0, s);
    for (k, c) in coefficients.iter().enumerate() {
        match k {
            0 => sum += c,
            1 => sum += c * s,
            _ => {
                let t_next = 2.0 * s * t_curr - t_prev;
                sum += c * t_next;
                t_prev = t_curr;
                t_curr = t_next;
            }
        }
    }
    sum
}
