//! Numeric helpers shared by the recipe table
//!
//! All divisions add a small epsilon to the denominator instead of testing
//! for zero. Output near singularities depends on these exact magnitudes.

use super::ComplexPoint;

/// Added to squared moduli before dividing by them.
pub const DIV_EPSILON: f64 = 1e-9;

/// Added to r² before raising it to a negative power.
pub const POWER_EPSILON: f64 = 1e-12;

/// z^p in polar form: r^p·(cos pθ, sin pθ), θ = atan2(im, re)
pub fn polar_power(z: ComplexPoint, p: u32) -> ComplexPoint {
    let r2 = z.re * z.re + z.im * z.im;
    let rp = r2.powf(p as f64 / 2.0);
    let theta = z.im.atan2(z.re) * p as f64;
    ComplexPoint::new(rp * theta.cos(), rp * theta.sin())
}

/// z^-p in polar form with the angle negated: r^-p·(cos pθ, -sin pθ)
pub fn inverse_polar_power(z: ComplexPoint, p: u32) -> ComplexPoint {
    let r2 = z.re * z.re + z.im * z.im + POWER_EPSILON;
    let rp = r2.powf(-(p as f64) / 2.0);
    let theta = z.im.atan2(z.re) * p as f64;
    ComplexPoint::new(rp * theta.cos(), -rp * theta.sin())
}

/// 1/z with the squared modulus guarded by `DIV_EPSILON`
pub fn reciprocal(z: ComplexPoint) -> ComplexPoint {
    let d = z.re * z.re + z.im * z.im + DIV_EPSILON;
    ComplexPoint::new(z.re / d, -z.im / d)
}

/// num/den computed as num·conj(den) / (|den|² + `DIV_EPSILON`)
pub fn guarded_div(num: ComplexPoint, den: ComplexPoint) -> ComplexPoint {
    let d = den.re * den.re + den.im * den.im + DIV_EPSILON;
    let n = num * den.conj();
    ComplexPoint::new(n.re / d, n.im / d)
}

/// Componentwise z² = (re² - im², 2·re·im)
#[inline]
pub fn square(z: ComplexPoint) -> ComplexPoint {
    ComplexPoint::new(z.re * z.re - z.im * z.im, 2.0 * z.re * z.im)
}

#[inline]
pub fn norm_sqr(z: ComplexPoint) -> f64 {
    z.re * z.re + z.im * z.im
}
