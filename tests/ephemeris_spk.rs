mod common;

use approx::assert_abs_diff_eq;
use astroframes::{
    astro_errors::AstroError,
    constants::J2000_JD,
    ephemeris::{kernel_source::EphemerisSource, spk::SpkKernel, JplEphemeris, SegmentKernel},
};
use camino::Utf8PathBuf;
use common::{write_spk, SyntheticSegment};
use hifitime::Epoch;
use nalgebra::Vector3;
use tempfile::TempDir;

const DAY: f64 = 86_400.0;

/// Earth-Moon barycenter, Earth and Moon over two days centered on J2000.
fn earth_moon_segments() -> Vec<SyntheticSegment> {
    vec![
        SyntheticSegment::chebyshev(
            0,
            3,
            -DAY,
            DAY,
            vec![
                [
                    vec![1.0e8, 2.0e5, 50.0],
                    vec![-5.0e7, 1.0e5, 0.0],
                    vec![1.0e6, 0.0, 0.0],
                ],
                [
                    vec![1.004e8, 2.0e5, 50.0],
                    vec![-4.98e7, 1.0e5, 0.0],
                    vec![1.0e6, 0.0, 0.0],
                ],
            ],
        ),
        SyntheticSegment::chebyshev(
            3,
            399,
            -DAY,
            2.0 * DAY,
            vec![[
                vec![-4.0e3, 10.0, 0.0],
                vec![3.0e3, -8.0, 0.0],
                vec![100.0, 0.0, 0.0],
            ]],
        ),
        SyntheticSegment::chebyshev(
            3,
            301,
            -DAY,
            2.0 * DAY,
            vec![[
                vec![3.8e5, -8.64e5, 0.0],
                vec![1.0e4, 0.0, 2.0e3],
                vec![0.0, 0.0, 0.0],
            ]],
        ),
    ]
}

fn kernel_file(dir: &TempDir, segments: &[SyntheticSegment]) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.path().join("synthetic.bsp")).unwrap();
    write_spk(&path, segments);
    path
}

#[test]
fn test_open_synthetic_kernel() {
    let dir = TempDir::new().unwrap();
    let path = kernel_file(&dir, &earth_moon_segments());

    let kernel = SpkKernel::open(&path).unwrap();
    assert_eq!(kernel.header().internal_filename, "SYNTHETIC");
    assert_eq!(kernel.pairs(), vec![(0, 3), (3, 301), (3, 399)]);
    assert_eq!(kernel.segments().map(|s| s.records.len()).sum::<usize>(), 4);
}

#[test]
fn test_chebyshev_segment_values() {
    let dir = TempDir::new().unwrap();
    let source = EphemerisSource::File(kernel_file(&dir, &earth_moon_segments()));
    let ephem = JplEphemeris::from_source(&source).unwrap();

    // et = 0.25 day, second record, normalized time -0.5
    let (r, v) = ephem.rv(0, 3, J2000_JD, 0.25).unwrap();
    let tau: f64 = -0.5;
    let x = 1.004e8 + 2.0e5 * tau + 50.0 * (2.0 * tau * tau - 1.0);
    let vx = (2.0e5 + 4.0 * 50.0 * tau) / (DAY / 2.0);
    assert_abs_diff_eq!(r, Vector3::new(x, -4.98e7 + 1.0e5 * tau, 1.0e6), epsilon = 1e-6);
    assert_abs_diff_eq!(v, Vector3::new(vx, 1.0e5 / (DAY / 2.0), 0.0), epsilon = 1e-12);

    // Moon relative to the barycenter moves at -10 km/s along x
    let (_, v) = ephem.rv(3, 301, J2000_JD, 0.25).unwrap();
    assert_abs_diff_eq!(v.x, -10.0, epsilon = 1e-12);
}

#[test]
fn test_moon_relative_to_earth() {
    let dir = TempDir::new().unwrap();
    let source = EphemerisSource::File(kernel_file(&dir, &earth_moon_segments()));
    let ephem = JplEphemeris::from_source(&source).unwrap();

    assert_eq!(ephem.path(399, 301), Some(&[399, 3, 301][..]));

    let (r_em, v_em) = ephem.rv(3, 301, J2000_JD, -0.4).unwrap();
    let (r_ee, v_ee) = ephem.rv(3, 399, J2000_JD, -0.4).unwrap();
    let (r, v) = ephem.rv(399, 301, J2000_JD, -0.4).unwrap();
    assert_abs_diff_eq!(r, r_em - r_ee, epsilon = 1e-9);
    assert_abs_diff_eq!(v, v_em - v_ee, epsilon = 1e-12);

    let (r_h, v_h) = ephem.rv_through_hierarchy(399, 301, J2000_JD, -0.4).unwrap();
    assert_abs_diff_eq!(r_h, r, epsilon = 1e-9);
    assert_abs_diff_eq!(v_h, v, epsilon = 1e-12);

    let (r_back, v_back) = ephem.rv(301, 399, J2000_JD, -0.4).unwrap();
    assert_eq!(r_back, -r);
    assert_eq!(v_back, -v);
}

#[test]
fn test_rv_at_epoch() {
    let dir = TempDir::new().unwrap();
    let source = EphemerisSource::File(kernel_file(&dir, &earth_moon_segments()));
    let ephem = JplEphemeris::from_source(&source).unwrap();

    let epoch = Epoch::from_et_seconds(0.25 * DAY);
    let (r, v) = ephem.rv_at(0, 399, &epoch).unwrap();
    let (r_jd, v_jd) = ephem.rv(0, 399, J2000_JD, 0.25).unwrap();
    assert_abs_diff_eq!(r, r_jd, epsilon = 1e-3);
    assert_abs_diff_eq!(v, v_jd, epsilon = 1e-9);
}

#[test]
fn test_coverage_limits() {
    let dir = TempDir::new().unwrap();
    let source = EphemerisSource::File(kernel_file(&dir, &earth_moon_segments()));
    let ephem = JplEphemeris::from_source(&source).unwrap();

    // end of coverage belongs to the last record
    assert!(ephem.rv(0, 3, J2000_JD, 1.0).is_ok());
    assert!(ephem.rv(0, 3, J2000_JD, -1.0).is_ok());

    assert_eq!(
        ephem.rv(0, 3, J2000_JD, 1.5),
        Err(AstroError::EpochOutOfRange {
            target: 3,
            center: 0,
            et: 1.5 * DAY,
        })
    );
    assert_eq!(
        ephem.rv(0, 5, J2000_JD, 0.0),
        Err(AstroError::UnknownPair(0, 5))
    );
}

#[test]
fn test_unsupported_segment_type() {
    let dir = TempDir::new().unwrap();
    let mut segments = earth_moon_segments();
    segments[1].data_type = 3;
    let path = kernel_file(&dir, &segments);

    assert_eq!(
        SpkKernel::open(&path).unwrap_err(),
        AstroError::InvalidSpkDataType(3)
    );
}

#[test]
fn test_missing_kernel_source() {
    let dir = TempDir::new().unwrap();
    let missing = Utf8PathBuf::from_path_buf(dir.path().join("de440.bsp")).unwrap();
    let source = EphemerisSource::File(missing.clone());

    assert_eq!(
        JplEphemeris::from_source(&source).unwrap_err(),
        AstroError::KernelNotFound(missing.to_string())
    );
}
