/// Size in bytes of one DAF physical record.
pub const RECORD_LEN: usize = 1024;

/// Byte order of the numeric data stored in a DAF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// One array summary: `nd` doubles followed by `ni` integers.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
}

/// A memory-mapped Double precision Array File.
///
/// Only the parts of the container needed to locate arrays are decoded:
/// the file record and the linked list of summary records. Array data is
/// read on demand through [`DafFile::read_doubles`].
pub struct DafFile {
    mmap: memmap2::Mmap,
    pub id_word: String,
    pub endian: Endian,
    pub nd: usize,
    pub ni: usize,
    pub summaries: Vec<Summary>,
}

impl std::fmt::Debug for DafFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DafFile")
            .field("id_word", &self.id_word)
            .field("endian", &self.endian)
            .field("nd", &self.nd)
            .field("ni", &self.ni)
            .field("summaries", &self.summaries.len())
            .field("bytes", &self.mmap.len())
            .finish()
    }
}

impl DafFile {
    /// Opens and memory-maps a DAF file, then decodes its file record and summaries.
    ///
    /// # Arguments
    /// * `path` - Path to the DAF file (e.g. `de421.bsp`).
    ///
    /// # Returns
    /// * `anyhow::Result<DafFile>` - The decoded container or an error if the file
    ///   is missing, truncated, or not a DAF.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_mmap(mmap)
    }

    fn from_mmap(mmap: memmap2::Mmap) -> anyhow::Result<Self> {
        let bytes: &[u8] = &mmap;
        if bytes.len() < RECORD_LEN {
            anyhow::bail!(
                "File is {} bytes, shorter than a DAF file record ({} bytes)",
                bytes.len(),
                RECORD_LEN
            );
        }

        let id_word = String::from_utf8_lossy(&bytes[0..8]).trim_end().to_string();
        if !id_word.starts_with("DAF/") && id_word != "NAIF/DAF" {
            anyhow::bail!("Not a DAF file: unexpected identification word {:?}", id_word);
        }

        let endian = detect_endian(bytes)?;
        let nd = read_i32(bytes, 8, endian)?;
        let ni = read_i32(bytes, 12, endian)?;
        if !(0..=124).contains(&nd) || !(2..=250).contains(&ni) {
            anyhow::bail!("Invalid DAF summary format ND={}, NI={}", nd, ni);
        }
        let fward = read_i32(bytes, 76, endian)?;

        let mut daf = DafFile {
            id_word,
            endian,
            nd: nd as usize,
            ni: ni as usize,
            summaries: Vec::new(),
            mmap,
        };
        daf.summaries = daf.read_summaries(fward)?;
        anyhow::Ok(daf)
    }

    /// Number of doubles occupied by one summary.
    pub fn summary_size(&self) -> usize {
        self.nd + (self.ni + 1) / 2
    }

    fn read_summaries(&self, first_record: i32) -> anyhow::Result<Vec<Summary>> {
        let bytes: &[u8] = &self.mmap;
        let max_records = bytes.len() / RECORD_LEN;
        let summary_bytes = self.summary_size() * 8;

        let mut summaries = Vec::new();
        let mut record = first_record;
        let mut visited = 0usize;

        while record > 0 {
            visited += 1;
            if visited > max_records {
                anyhow::bail!("Summary record chain does not terminate");
            }
            let base = (record as usize - 1) * RECORD_LEN;
            let next = read_f64(bytes, base, self.endian)?;
            let count = read_f64(bytes, base + 16, self.endian)?;
            if !(0.0..=(RECORD_LEN as f64)).contains(&count) {
                anyhow::bail!("Summary record {} holds an invalid count {}", record, count);
            }

            for i in 0..count as usize {
                let start = base + 24 + i * summary_bytes;
                let doubles = (0..self.nd)
                    .map(|d| read_f64(bytes, start + d * 8, self.endian))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let ints_start = start + self.nd * 8;
                let ints = (0..self.ni)
                    .map(|n| read_i32(bytes, ints_start + n * 4, self.endian))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                summaries.push(Summary { doubles, ints });
            }

            record = next as i32;
        }

        anyhow::Ok(summaries)
    }

    /// Reads `count` consecutive doubles starting at a 1-based DAF word address.
    pub fn read_doubles(&self, address: usize, count: usize) -> anyhow::Result<Vec<f64>> {
        if address == 0 {
            anyhow::bail!("DAF addresses are 1-based, got 0");
        }
        let start = (address - 1) * 8;
        (0..count)
            .map(|i| read_f64(&self.mmap, start + i * 8, self.endian))
            .collect()
    }
}

/// Reads the binary format string, falling back to the value of ND for
/// pre-N0050 files that leave it blank.
fn detect_endian(bytes: &[u8]) -> anyhow::Result<Endian> {
    match &bytes[88..96] {
        b"LTL-IEEE" => return anyhow::Ok(Endian::Little),
        b"BIG-IEEE" => return anyhow::Ok(Endian::Big),
        _ => {}
    }
    let nd_le = read_i32(bytes, 8, Endian::Little)?;
    if (0..=124).contains(&nd_le) {
        anyhow::Ok(Endian::Little)
    } else {
        anyhow::Ok(Endian::Big)
    }
}

fn read_f64(bytes: &[u8], offset: usize, endian: Endian) -> anyhow::Result<f64> {
    let raw: [u8; 8] = bytes
        .get(offset..offset + 8)
        .ok_or_else(|| anyhow::anyhow!("Read past end of file at byte {}", offset))?
        .try_into()?;
    let value = match endian {
        Endian::Little => f64::from_le_bytes(raw),
        Endian::Big => f64::from_be_bytes(raw),
    };
    anyhow::Ok(value)
}

fn read_i32(bytes: &[u8], offset: usize, endian: Endian) -> anyhow::Result<i32> {
    let raw: [u8; 4] = bytes
        .get(offset..offset + 4)
        .ok_or_else(|| anyhow::anyhow!("Read past end of file at byte {}", offset))?
        .try_into()?;
    let value = match endian {
        Endian::Little => i32::from_le_bytes(raw),
        Endian::Big => i32::from_be_bytes(raw),
    };
    anyhow::Ok(value)
}
