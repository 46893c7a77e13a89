//! # SPK kernel reader
//!
//! Reads binary NAIF SPK kernels (DAF container, little-endian) holding
//! type 2 segments, i.e. Chebyshev position series such as the JPL DE
//! planetary ephemerides.
//!
//! ## File layout
//! -----------------
//! ```text
//! record 1          DAF file record            -> DafHeader
//! records 2..fward  comment area (skipped)
//! record fward      summary record             -> SummaryRecord (linked list via `next`)
//! ...               segment data, per summary:
//!                     n_records × [mid, radius, x[n], y[n], z[n]]
//!                     directory [init, intlen, rsize, n_records]
//! ```
//!
//! Every segment is loaded in memory when the kernel is opened. Segments are
//! keyed by `(center, target)`; when a pair appears twice the later segment
//! wins, following the SPK precedence rule.
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
};

use camino::Utf8Path;
use log::debug;
use nalgebra::Vector3;

use crate::{
    astro_errors::AstroError,
    constants::{BodyId, J2000_JD, SECONDS_PER_DAY},
};

use super::{Segment, SegmentKernel};

pub mod daf_header;
pub mod directory;
pub mod ephemeris_record;
pub mod summary_record;

use daf_header::{DafHeader, DAF_RECORD_SIZE};
use directory::{DirectoryData, DIRECTORY_SIZE};
use ephemeris_record::EphemerisRecord;
use summary_record::{Summary, SummaryRecord};

/// SPK data type handled by this reader (Chebyshev, position only).
pub const CHEBYSHEV_POSITION_TYPE: i32 = 2;

/// One type 2 segment with its records.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub summary: Summary,
    pub directory: DirectoryData,
    pub records: Vec<EphemerisRecord>,
}

impl SpkSegment {
    fn read(file: &mut BufReader<File>, summary: Summary) -> Result<Self, AstroError> {
        if summary.data_type != CHEBYSHEV_POSITION_TYPE {
            return Err(AstroError::InvalidSpkDataType(summary.data_type));
        }
        if summary.initial_addr < 1 || summary.final_addr < summary.initial_addr + 3 {
            return Err(AstroError::NomParsingError(format!(
                "invalid segment addresses for {summary}"
            )));
        }

        let dir_offset = (summary.final_addr as u64 - 4) * 8;
        let dir_bytes = read_at(file, dir_offset, DIRECTORY_SIZE)?;
        let (_, directory) = DirectoryData::parse(&dir_bytes)?;

        let n_coeffs = directory.n_coeffs();
        let record_bytes = directory.rsize * 8;
        let data_words = (summary.final_addr - summary.initial_addr + 1) as usize;
        if n_coeffs == 0
            || directory.intlen <= 0.0
            || directory.n_records == 0
            || directory.n_records * directory.rsize + 4 > data_words
        {
            return Err(AstroError::NomParsingError(format!(
                "inconsistent directory {directory:?} for {summary}"
            )));
        }

        let start = (summary.initial_addr as u64 - 1) * 8;
        let data = read_at(file, start, directory.n_records * record_bytes)?;
        let records = data
            .chunks_exact(record_bytes)
            .map(|chunk| EphemerisRecord::parse(chunk, n_coeffs).map(|(_, record)| record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SpkSegment {
            summary,
            directory,
            records,
        })
    }
}

impl Segment for SpkSegment {
    fn compute_and_differentiate(
        &self,
        tdb: f64,
        tdb2: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), AstroError> {
        let et = ((tdb - J2000_JD) + tdb2) * SECONDS_PER_DAY;
        if !self.summary.covers(et) {
            return Err(AstroError::EpochOutOfRange {
                target: self.summary.target,
                center: self.summary.center,
                et,
            });
        }

        let index = self.directory.record_index(et);
        let record = self.records.get(index).ok_or(AstroError::EpochOutOfRange {
            target: self.summary.target,
            center: self.summary.center,
            et,
        })?;
        Ok(record.interpolate(et))
    }
}

/// Type 2 SPK kernel loaded in memory.
#[derive(Debug, Clone)]
pub struct SpkKernel {
    header: DafHeader,
    segments: BTreeMap<(BodyId, BodyId), SpkSegment>,
}

impl SpkKernel {
    /// Read the kernel at `path`.
    ///
    /// Fails with [`AstroError::IoError`] on I/O failures,
    /// [`AstroError::NomParsingError`] on malformed content and
    /// [`AstroError::InvalidSpkDataType`] on segments other than type 2.
    pub fn open(path: &Utf8Path) -> Result<Self, AstroError> {
        let mut file = BufReader::new(File::open(path)?);

        let mut buffer = [0u8; DAF_RECORD_SIZE];
        file.read_exact(&mut buffer)?;
        let (_, header) = DafHeader::parse(&buffer)?;
        header.check_spk()?;

        let nd = header.nd as usize;
        let ni = header.ni as usize;
        let summary_size = header.summary_size();

        let mut summaries = Vec::new();
        let mut record_number = header.fward as usize;
        while record_number != 0 {
            let offset = (record_number as u64 - 1) * DAF_RECORD_SIZE as u64;
            let bytes = read_at(&mut file, offset, DAF_RECORD_SIZE)?;
            let (_, record) = SummaryRecord::parse(&bytes, nd, ni, summary_size)?;
            summaries.extend(record.summaries);

            // summary records are chained forward only
            if record.next != 0 && record.next <= record_number {
                return Err(AstroError::NomParsingError(format!(
                    "summary record {record_number} points back to {}",
                    record.next
                )));
            }
            record_number = record.next;
        }

        let mut segments = BTreeMap::new();
        for summary in summaries {
            let key = (summary.center, summary.target);
            segments.insert(key, SpkSegment::read(&mut file, summary)?);
        }

        debug!(
            "SPK kernel {path} ({}) opened with {} segments",
            header.internal_filename,
            segments.len()
        );

        Ok(SpkKernel { header, segments })
    }

    pub fn header(&self) -> &DafHeader {
        &self.header
    }

    pub fn segments(&self) -> impl Iterator<Item = &SpkSegment> {
        self.segments.values()
    }
}

impl SegmentKernel for SpkKernel {
    fn pairs(&self) -> Vec<(BodyId, BodyId)> {
        self.segments.keys().copied().collect()
    }

    fn segment(&self, center: BodyId, target: BodyId) -> Option<&dyn Segment> {
        self.segments
            .get(&(center, target))
            .map(|segment| segment as &dyn Segment)
    }
}

fn read_at(file: &mut BufReader<File>, offset: u64, len: usize) -> Result<Vec<u8>, AstroError> {
    let mut buffer = vec![0u8; len];
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod test_spk_kernel {
    use std::io::Write;

    use camino::Utf8PathBuf;
    use tempfile::NamedTempFile;

    use super::*;

    fn temp_path(file: &NamedTempFile) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_missing_kernel() {
        let result = SpkKernel::open(Utf8Path::new("/nonexistent/astroframes/de440.bsp"));
        assert!(matches!(result, Err(AstroError::IoError(_))));
    }

    #[test]
    fn test_not_a_daf_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'x'; DAF_RECORD_SIZE]).unwrap();
        file.flush().unwrap();

        let result = SpkKernel::open(&temp_path(&file));
        assert!(matches!(result, Err(AstroError::NomParsingError(_))));
    }

    #[test]
    fn test_truncated_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"DAF/SPK ").unwrap();
        file.flush().unwrap();

        let result = SpkKernel::open(&temp_path(&file));
        assert!(matches!(result, Err(AstroError::IoError(_))));
    }
}
