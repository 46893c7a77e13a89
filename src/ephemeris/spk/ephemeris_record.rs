//! Type 2 records: Chebyshev coefficients of position over one interval.
use nalgebra::Vector3;
use nom::{multi::count, number::complete::le_f64, IResult};

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    /// Interval midpoint, ET seconds.
    pub mid: f64,
    /// Interval half-length, seconds.
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl EphemerisRecord {
    pub fn parse(input: &[u8], n_coeffs: usize) -> IResult<&[u8], Self> {
        let (input, mid) = le_f64(input)?;
        let (input, radius) = le_f64(input)?;
        let (input, x) = count(le_f64, n_coeffs)(input)?;
        let (input, y) = count(le_f64, n_coeffs)(input)?;
        let (input, z) = count(le_f64, n_coeffs)(input)?;

        Ok((
            input,
            EphemerisRecord {
                mid,
                radius,
                x,
                y,
                z,
            },
        ))
    }

    /// Position (km) and velocity (km/s) at `et` seconds past J2000.
    ///
    /// Velocity is the derivative of the position series, so the
    /// normalized-time derivative is scaled by `1 / radius`.
    pub fn interpolate(&self, et: f64) -> (Vector3<f64>, Vector3<f64>) {
        let tau = ((et - self.mid) / self.radius).clamp(-1.0, 1.0);
        let n = self.x.len();

        // T_0 = 1, T_1 = t, T_k = 2 t T_{k-1} - T_{k-2}
        let mut t = vec![0.0; n];
        // T'_0 = 0, T'_1 = 1, T'_k = 2 T_{k-1} + 2 t T'_{k-1} - T'_{k-2}
        let mut dt = vec![0.0; n];
        if n > 0 {
            t[0] = 1.0;
        }
        if n > 1 {
            t[1] = tau;
            dt[1] = 1.0;
        }
        for k in 2..n {
            t[k] = 2.0 * tau * t[k - 1] - t[k - 2];
            dt[k] = 2.0 * t[k - 1] + 2.0 * tau * dt[k - 1] - dt[k - 2];
        }

        let series = |coeffs: &[f64], basis: &[f64]| -> f64 {
            coeffs.iter().zip(basis).map(|(c, b)| c * b).sum()
        };

        let position = Vector3::new(series(&self.x, &t), series(&self.y, &t), series(&self.z, &t));
        let velocity = Vector3::new(
            series(&self.x, &dt),
            series(&self.y, &dt),
            series(&self.z, &dt),
        ) / self.radius;

        (position, velocity)
    }
}
