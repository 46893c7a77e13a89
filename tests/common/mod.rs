#![allow(dead_code)]

use std::fs;

use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use nalgebra::Vector3;

pub fn assert_vector_close(actual: &Vector3<f64>, expected: &Vector3<f64>, atol: f64) {
    for i in 0..3 {
        assert_abs_diff_eq!(actual[i], expected[i], epsilon = atol);
    }
}

/// Chebyshev coefficients of one record, per axis.
pub type Coefficients = [Vec<f64>; 3];

/// Segment of a synthetic SPK kernel: consecutive records of length `intlen`
/// starting at `init` (ET seconds).
pub struct SyntheticSegment {
    pub center: i32,
    pub target: i32,
    pub data_type: i32,
    pub init: f64,
    pub intlen: f64,
    pub records: Vec<Coefficients>,
}

impl SyntheticSegment {
    pub fn chebyshev(
        center: i32,
        target: i32,
        init: f64,
        intlen: f64,
        records: Vec<Coefficients>,
    ) -> Self {
        SyntheticSegment {
            center,
            target,
            data_type: 2,
            init,
            intlen,
            records,
        }
    }

    fn n_coeffs(&self) -> usize {
        self.records.first().map_or(0, |r| r[0].len())
    }

    fn end(&self) -> f64 {
        self.init + self.intlen * self.records.len() as f64
    }
}

const RECORD: usize = 1024;

fn push_f64(buf: &mut Vec<u8>, value: f64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write a little-endian DAF/SPK kernel: file record, one summary record,
/// one name record, then the segment data.
pub fn write_spk(path: &Utf8Path, segments: &[SyntheticSegment]) {
    let first_data_word = 3 * RECORD / 8 + 1;

    let mut data = Vec::new();
    let mut summaries = Vec::new();
    for segment in segments {
        let initial_addr = first_data_word + data.len() / 8;
        let n = segment.n_coeffs();
        let rsize = 2 + 3 * n;
        for (i, coeffs) in segment.records.iter().enumerate() {
            push_f64(&mut data, segment.init + (i as f64 + 0.5) * segment.intlen);
            push_f64(&mut data, segment.intlen / 2.0);
            for axis in coeffs {
                assert_eq!(axis.len(), n);
                axis.iter().for_each(|&c| push_f64(&mut data, c));
            }
        }
        push_f64(&mut data, segment.init);
        push_f64(&mut data, segment.intlen);
        push_f64(&mut data, rsize as f64);
        push_f64(&mut data, segment.records.len() as f64);
        let final_addr = first_data_word + data.len() / 8 - 1;

        let mut summary = Vec::new();
        push_f64(&mut summary, segment.init);
        push_f64(&mut summary, segment.end());
        for value in [
            segment.target,
            segment.center,
            1,
            segment.data_type,
            initial_addr as i32,
            final_addr as i32,
        ] {
            push_i32(&mut summary, value);
        }
        summaries.push(summary);
    }

    let mut file = Vec::new();
    file.extend_from_slice(b"DAF/SPK ");
    push_i32(&mut file, 2);
    push_i32(&mut file, 6);
    let mut name = [b' '; 60];
    name[..9].copy_from_slice(b"SYNTHETIC");
    file.extend_from_slice(&name);
    push_i32(&mut file, 2);
    push_i32(&mut file, 2);
    push_i32(&mut file, (first_data_word + data.len() / 8) as i32);
    file.extend_from_slice(b"LTL-IEEE");
    file.resize(699, 0);
    file.extend_from_slice(b"FTPSTR:\r:\n:\r\n:\r\0:\x81:\x10\xce:ENDFTP");
    file.resize(RECORD, 0);

    push_f64(&mut file, 0.0);
    push_f64(&mut file, 0.0);
    push_f64(&mut file, summaries.len() as f64);
    summaries.iter().for_each(|s| file.extend_from_slice(s));
    file.resize(2 * RECORD, 0);

    file.resize(3 * RECORD, b' ');
    file.extend_from_slice(&data);

    fs::write(path, file).expect("write synthetic kernel");
}
