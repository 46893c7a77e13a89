use nom::{number::complete::le_f64, IResult};

/// Size in bytes of the directory trailing every type 2 segment.
pub const DIRECTORY_SIZE: usize = 4 * 8;

/// Trailer of a type 2 segment: the last four words of its data.
#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    /// Start of the first record interval, ET seconds.
    pub init: f64,
    /// Length of each record interval, seconds.
    pub intlen: f64,
    /// Record size, in words.
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, init) = le_f64(input)?;
        let (input, intlen) = le_f64(input)?;
        let (input, rsize) = le_f64(input)?;
        let (input, n_records) = le_f64(input)?;

        Ok((
            input,
            DirectoryData {
                init,
                intlen,
                rsize: rsize as usize,
                n_records: n_records as usize,
            },
        ))
    }

    /// Number of Chebyshev coefficients per axis.
    pub fn n_coeffs(&self) -> usize {
        self.rsize.saturating_sub(2) / 3
    }

    /// Index of the record whose interval contains `et`.
    ///
    /// The end of the last interval belongs to the last record.
    pub fn record_index(&self, et: f64) -> usize {
        let index = ((et - self.init) / self.intlen).floor().max(0.0) as usize;
        index.min(self.n_records.saturating_sub(1))
    }
}

#[cfg(test)]
mod test_directory {
    use super::*;

    fn directory_bytes(init: f64, intlen: f64, rsize: f64, n: f64) -> Vec<u8> {
        [init, intlen, rsize, n]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    #[test]
    fn test_parse_directory() {
        let bytes = directory_bytes(-14200747200.0, 1382400.0, 41.0, 25112.0);
        let (rest, dir) = DirectoryData::parse(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            dir,
            DirectoryData {
                init: -14200747200.0,
                intlen: 1382400.0,
                rsize: 41,
                n_records: 25112,
            }
        );
        assert_eq!(dir.n_coeffs(), 13);
    }

    #[test]
    fn test_record_index() {
        let (_, dir) = DirectoryData::parse(&directory_bytes(0.0, 100.0, 11.0, 3.0)).unwrap();
        assert_eq!(dir.record_index(0.0), 0);
        assert_eq!(dir.record_index(99.9), 0);
        assert_eq!(dir.record_index(100.0), 1);
        assert_eq!(dir.record_index(250.0), 2);
        assert_eq!(dir.record_index(300.0), 2);
    }
}
