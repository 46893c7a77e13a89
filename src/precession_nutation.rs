//! # IAU 1976 precession and IAU 1980 nutation
//!
//! Time-dependent angle models consumed by the `MOD_IAU1976` and
//! `TOD_IAU1980` transform providers of [`crate::frames`].
//!
//! All functions take the date as a Modified Julian Date in the TT scale
//! (`tjm`) and work in Julian centuries `T = (tjm − T2000) / 36525`.
//!
//! The rotations returned here follow the frame-tree convention: applied to a
//! vector expressed in the parent frame, they yield the same vector expressed
//! in the child frame.
use hifitime::Epoch;

use crate::{
    constants::{ArcSec, Radian, DPI, RADEG, RADSEC, T2000},
    rotation::{Convention, Rotation, RotationOrder},
};

/// Julian centuries of TT elapsed since J2000.0.
fn julian_centuries(tjm: f64) -> f64 {
    (tjm - T2000) / 36525.0
}

/// MJD (TT) of an epoch, the time argument of every model in this module.
pub fn mjd_tt(epoch: &Epoch) -> f64 {
    epoch.to_mjd_tt_days()
}

/// Mean obliquity of the ecliptic ε (IAU 1976), in radians.
///
/// ```text
/// ε(T) = 84381.448″ − 46.815″ T − 0.0006″ T² + 0.00181″ T³
/// ```
/// evaluated with Horner's scheme.
pub fn obleq(tjm: f64) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = julian_centuries(tjm);

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// Precession angles `(ζ, θ, z)` of the IAU 1976 model, in radians.
///
/// ```text
/// ζ(T) = (0.6406161 + 0.0000839 T + 0.0000050 T²) T   [deg]
/// θ(T) = (0.5567530 − 0.0001185 T − 0.0000116 T²) T   [deg]
/// z(T) = (0.6406161 + 0.0003041 T + 0.0000051 T²) T   [deg]
/// ```
pub fn precession_angles(tjm: f64) -> (Radian, Radian, Radian) {
    let t = julian_centuries(tjm);

    let zeta = ((0.0000050 * RADEG * t + 0.0000839 * RADEG) * t + 0.6406161 * RADEG) * t;
    let theta = ((-0.0000116 * RADEG * t - 0.0001185 * RADEG) * t + 0.5567530 * RADEG) * t;
    let z = ((0.0000051 * RADEG * t + 0.0003041 * RADEG) * t + 0.6406161 * RADEG) * t;

    (zeta, theta, z)
}

/// Precession from the J2000 mean equator and equinox (EME2000) to the mean
/// equator and equinox of date.
///
/// Equal to `R3(−z) · R2(θ) · R3(−ζ)` in the passive convention, i.e. the
/// active rotations `Rz(z) · Ry(−θ) · Rz(ζ)`.
pub fn precession_rotation(tjm: f64) -> Rotation {
    let (zeta, theta, z) = precession_angles(tjm);
    Rotation::from_euler_angles(RotationOrder::ZYZ, z, -theta, zeta, Convention::Vector)
}

/// Delaunay arguments of the IAU 1980 theory, reduced modulo 2π.
struct FundamentalArguments {
    /// mean anomaly of the Moon
    l: Radian,
    /// mean anomaly of the Sun
    p: Radian,
    /// twice the Moon argument of latitude
    x: Radian,
    /// mean elongation of the Moon from the Sun
    d: Radian,
    /// longitude of the ascending node of the Moon
    n: Radian,
}

impl FundamentalArguments {
    fn at(t: f64) -> Self {
        let t2 = t * t;
        let t3 = t2 * t;

        let dl = (485866.733 + 1717915922.633 * t + 31.310 * t2 + 0.064 * t3) * RADSEC;
        let dp = (1287099.804 + 129596581.224 * t - 0.577 * t2 - 0.012 * t3) * RADSEC;
        let df = (335778.877 + 1739527263.137 * t - 13.257 * t2 + 0.011 * t3) * RADSEC;
        let dd = (1072261.307 + 1602961601.328 * t - 6.891 * t2 + 0.019 * t3) * RADSEC;
        let dn = (450160.280 - 6962890.539 * t + 7.455 * t2 + 0.008 * t3) * RADSEC;

        FundamentalArguments {
            l: dl % DPI,
            p: dp % DPI,
            x: df % DPI * 2.0,
            d: dd % DPI,
            n: dn % DPI,
        }
    }
}

/// Nutation in longitude Δψ and in obliquity Δε (IAU 1980, Wahr), in arcseconds.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `(Δψ, Δε)` in arcseconds.
///
/// The 106-term series is evaluated through angle-addition recurrences on the
/// five fundamental arguments, so only five sine/cosine pairs are computed.
pub fn nutn80(tjm: f64) -> (ArcSec, ArcSec) {
    let t = julian_centuries(tjm);
    let args = FundamentalArguments::at(t);

    let cos_sin = |angle: f64| (angle.cos(), angle.sin());

    let (cl, sl) = cos_sin(args.l);
    let (cp, sp) = cos_sin(args.p);
    let (cx, sx) = cos_sin(args.x);
    let (cd, sd) = cos_sin(args.d);
    let (cn, sn) = cos_sin(args.n);

    // multiple-angle and combined-argument terms
    let cp2 = 2.0 * cp * cp - 1.0;

    let sp2 = 2.0 * sp * cp;
    let cd2 = 2.0 * cd * cd - 1.0;
    let sd2 = 2.0 * sd * cd;
    let cn2 = 2.0 * cn * cn - 1.0;
    let sn2 = 2.0 * sn * cn;
    let cl2 = 2.0 * cl * cl - 1.0;
    let sl2 = 2.0 * sl * cl;

    let ca = cx * cd2 + sx * sd2;
    let sa = sx * cd2 - cx * sd2;
    let cb = ca * cn - sa * sn;
    let sb = sa * cn + ca * sn;
    let cc = cb * cn - sb * sn;
    let sc = sb * cn + cb * sn;

    let cv = cx * cd2 - sx * sd2;
    let sv = sx * cd2 + cx * sd2;
    let ce = cv * cn - sv * sn;
    let se = sv * cn + cv * sn;
    let cf = ce * cn - se * sn;
    let sf = se * cn + ce * sn;

    let cg = cl * cd2 + sl * sd2;
    let sg = sl * cd2 - cl * sd2;
    let ch = cx * cn2 - sx * sn2;
    let sh = sx * cn2 + cx * sn2;
    let cj = ch * cl - sh * sl;
    let sj = sh * cl + ch * sl;

    let ck = cj * cl - sj * sl;
    let sk = sj * cl + cj * sl;
    let cm = cx * cl2 + sx * sl2;
    let sm = sx * cl2 - cx * sl2;
    let cq = cl * cd + sl * sd;
    let sq = sl * cd - cl * sd;

    let cr = 2.0 * cq * cq - 1.0;
    let sr = 2.0 * sq * cq;
    let cs = cx * cn - sx * sn;
    let ss = sx * cn + cx * sn;
    let ct = cs * cl - ss * sl;
    let st = ss * cl + cs * sl;

    let cu = cf * cl + sf * sl;
    let su = sf * cl - cf * sl;
    let cw = cp * cg - sp * sg;
    let sw = sp * cg + cp * sg;

    // longitude, units of 0.0001"
    let mut dpsi =
        -(171996.0 + 174.2 * t) * sn + (2062.0 + 0.2 * t) * sn2 + 46.0 * (sm * cn + cm * sn)
            - 11.0 * sm
            - 3.0 * (sm * cn2 + cm * sn2)
            - 3.0 * (sq * cp - cq * sp)
            - 2.0 * (sb * cp2 - cb * sp2)
            + (sn * cm - cn * sm)
            - (13187.0 + 1.6 * t) * sc
            + (1426.0 - 3.4 * t) * sp
            - (517.0 - 1.2 * t) * (sc * cp + cc * sp)
            + (217.0 - 0.5 * t) * (sc * cp - cc * sp)
            + (129.0 + 0.1 * t) * sb
            + 48.0 * sr
            - 22.0 * sa
            + (17.0 - 0.1 * t) * sp2
            - 15.0 * (sp * cn + cp * sn)
            - (16.0 - 0.1 * t) * (sc * cp2 + cc * sp2)
            - 12.0 * (sn * cp - cn * sp);

    dpsi += -6.0 * (sn * cr - cn * sr) - 5.0 * (sb * cp - cb * sp)
        + 4.0 * (sr * cn + cr * sn)
        + 4.0 * (sb * cp + cb * sp)
        - 4.0 * sq
        + (sr * cp + cr * sp)
        + (sn * ca - cn * sa)
        - (sp * ca - cp * sa)
        + (sp * cn2 + cp * sn2)
        + (sn * cq - cn * sq)
        - (sp * ca + cp * sa)
        - (2274.0 + 0.2 * t) * sh
        + (712.0 + 0.1 * t) * sl
        - (386.0 + 0.4 * t) * ss
        - 301.0 * sj
        - 158.0 * sg
        + 123.0 * (sh * cl - ch * sl)
        + 63.0 * sd2
        + (63.0 + 0.1 * t) * (sl * cn + cl * sn)
        - (58.0 + 0.1 * t) * (sn * cl - cn * sl)
        - 59.0 * su
        - 51.0 * st
        - 38.0 * sf
        + 29.0 * sl2;

    dpsi += 29.0 * (sc * cl + cc * sl) - 31.0 * sk
        + 26.0 * sx
        + 21.0 * (ss * cl - cs * sl)
        + 16.0 * (sn * cg - cn * sg)
        - 13.0 * (sn * cg + cn * sg)
        - 10.0 * (se * cl - ce * sl)
        - 7.0 * (sg * cp + cg * sp)
        + 7.0 * (sh * cp + ch * sp)
        - 7.0 * (sh * cp - ch * sp)
        - 8.0 * (sf * cl + cf * sl)
        + 6.0 * (sl * cd2 + cl * sd2)
        + 6.0 * (sc * cl2 + cc * sl2)
        - 6.0 * (sn * cd2 + cn * sd2)
        - 7.0 * se
        + 6.0 * (sb * cl + cb * sl)
        - 5.0 * (sn * cd2 - cn * sd2)
        + 5.0 * (sl * cp - cl * sp)
        - 5.0 * (ss * cl2 + cs * sl2)
        - 4.0 * (sp * cd2 - cp * sd2);

    dpsi += 4.0 * (sl * cx - cl * sx) - 4.0 * sd - 3.0 * (sl * cp + cl * sp)
        + 3.0 * (sl * cx + cl * sx)
        - 3.0 * (sj * cp - cj * sp)
        - 3.0 * (su * cp - cu * sp)
        - 2.0 * (sn * cl2 - cn * sl2)
        - 3.0 * (sk * cl + ck * sl)
        - 3.0 * (sf * cp - cf * sp)
        + 2.0 * (sj * cp + cj * sp)
        - 2.0 * (sb * cl - cb * sl);

    dpsi += 2.0 * (sn * cl2 + cn * sl2) - 2.0 * (sl * cn2 + cl * sn2)
        + 2.0 * (sl * cl2 + cl * sl2)
        + 2.0 * (sh * cd + ch * sd)
        + (sn2 * cl - cn2 * sl)
        - (sg * cd2 - cg * sd2)
        + (sf * cl2 - cf * sl2)
        - 2.0 * (su * cd2 + cu * sd2)
        - (sr * cd2 - cr * sd2)
        + (sw * ch + cw * sh)
        - (sl * ce + cl * se)
        - (sf * cr - cf * sr)
        + (su * ca + cu * sa)
        + (sg * cp - cg * sp)
        + (sb * cl2 + cb * sl2)
        - (sf * cl2 + cf * sl2)
        - (st * ca - ct * sa)
        + (sc * cx + cc * sx)
        + (sj * cr + cj * sr)
        - (sg * cx + cg * sx);

    dpsi += (sp * cs + cp * ss) + (sn * cw - cn * sw)
        - (sn * cx - cn * sx)
        - (sh * cd - ch * sd)
        - (sp * cd2 + cp * sd2)
        - (sl * cv - cl * sv)
        - (ss * cp - cs * sp)
        - (sw * cn + cw * sn)
        - (sl * ca - cl * sa)
        + (sl2 * cd2 + cl2 * sd2)
        - (sf * cd2 + cf * sd2)
        + (sp * cd + cp * sd);

    // obliquity, units of 0.0001"
    let mut deps = (92025.0 + 8.9 * t) * cn - (895.0 - 0.5 * t) * cn2 - 24.0 * (cm * cn - sm * sn)
        + (cm * cn2 - sm * sn2)
        + (cb * cp2 + sb * sp2)
        + (5736.0 - 3.1 * t) * cc
        + (54.0 - 0.1 * t) * cp
        + (224.0 - 0.6 * t) * (cc * cp - sc * sp)
        - (95.0 - 0.3 * t) * (cc * cp + sc * sp)
        - 70.0 * cb
        + cr
        + 9.0 * (cp * cn - sp * sn)
        + 7.0 * (cc * cp2 - sc * sp2)
        + 6.0 * (cn * cp + sn * sp)
        + 3.0 * (cn * cr + sn * sr)
        + 3.0 * (cb * cp + sb * sp)
        - 2.0 * (cr * cn - sr * sn)
        - 2.0 * (cb * cp - sb * sp);

    deps += (977.0 - 0.5 * t) * ch - 7.0 * cl + 200.0 * cs + (129.0 - 0.1 * t) * cj
        - cg
        - 53.0 * (ch * cl + sh * sl)
        - 2.0 * cd2
        - 33.0 * (cl * cn - sl * sn)
        + 32.0 * (cn * cl + sn * sl)
        + 26.0 * cu
        + 27.0 * ct
        + 16.0 * cf
        - cl2
        - 12.0 * (cc * cl - sc * sl)
        + 13.0 * ck
        - cx
        - 10.0 * (cs * cl + ss * sl)
        - 8.0 * (cn * cg + sn * sg)
        + 7.0 * (cn * cg - sn * sg)
        + 5.0 * (ce * cl + se * sl)
        - 3.0 * (ch * cp - sh * sp)
        + 3.0 * (ch * cp + sh * sp)
        + 3.0 * (cf * cl - sf * sl)
        - 3.0 * (cc * cl2 - sc * sl2)
        + 3.0 * (cn * cd2 - sn * sd2)
        + 3.0 * ce
        - 3.0 * (cb * cl - sb * sl)
        + 3.0 * (cn * cd2 + sn * sd2)
        + 3.0 * (cs * cl2 - ss * sl2)
        + (cj * cp + sj * sp)
        + (cu * cp + su * sp)
        + (cn * cl2 + sn * sl2)
        + (ck * cl - sk * sl)
        + (cf * cp + sf * sp)
        - (cj * cp - sj * sp)
        + (cb * cl + sb * sl)
        - (cn * cl2 - sn * sl2)
        + (cl * cn2 - sl * sn2)
        - (ch * cd - sh * sd)
        - (cn2 * cl + sn2 * sl)
        - (cf * cl2 + sf * sl2)
        + (cu * cd2 - su * sd2)
        - (cw * ch - sw * sh)
        + (cl * ce - sl * se)
        + (cf * cr + sf * sr)
        - (cb * cl2 - sb * sl2);

    dpsi *= 1e-4;
    deps *= 1e-4;

    (dpsi, deps)

}

/// Nutation from the mean equator and equinox of date to the true equator
/// and equinox of date.
///
/// Equal to `R1(−ε−Δε) · R3(−Δψ) · R1(ε)` in the passive convention, with ε
/// the mean obliquity from [`obleq`] and (Δψ, Δε) from [`nutn80`].
pub fn nutation_rotation(tjm: f64) -> Rotation {
    let mean_obliquity = obleq(tjm);
    let (dpsi, deps) = nutn80(tjm);
    let true_obliquity = mean_obliquity + deps * RADSEC;

    Rotation::from_euler_angles(
        RotationOrder::XZX,
        true_obliquity,
        dpsi * RADSEC,
        -mean_obliquity,
        Convention::Vector,
    )
}
