use binfhe_math::{modular::reduce_signed, poly::Poly};
use rand::{Rng, thread_rng};
use rand_distr::StandardNormal;

/// `n` values uniform in `[0, q)`.
pub fn uniform_vec(n: usize, q: u64) -> Vec<u64> {
    let mut rng = thread_rng();

    (0..n).map(|_| rng.gen_range(0..q)).collect()
}

/// `n` values uniform in `{-1, 0, 1}`.
pub fn ternary_vec(n: usize) -> Vec<i64> {
    let mut rng = thread_rng();

    (0..n).map(|_| rng.gen_range(-1..=1)).collect()
}

/// A rounded Gaussian sample with mean zero.
pub fn gaussian(std_dev: f64) -> i64 {
    let x: f64 = thread_rng().sample(StandardNormal);

    (x * std_dev).round() as i64
}

/// `n` rounded Gaussian samples.
pub fn gaussian_vec(n: usize, std_dev: f64) -> Vec<i64> {
    (0..n).map(|_| gaussian(std_dev)).collect()
}

/// A polynomial with coefficients uniform in `[0, q)`.
pub fn uniform_poly(n: usize, q: u64) -> Poly {
    Poly {
        coeffs: uniform_vec(n, q),
    }
}

/// A polynomial with ternary coefficients, reduced mod `q`.
pub fn ternary_poly(n: usize, q: u64) -> Poly {
    Poly::from_signed(&ternary_vec(n), q)
}

/// A polynomial with Gaussian coefficients, reduced mod `q`.
pub fn gaussian_poly(n: usize, std_dev: f64, q: u64) -> Poly {
    Poly::from_signed(&gaussian_vec(n, std_dev), q)
}

/// A Gaussian sample reduced mod `q`.
pub fn gaussian_mod(std_dev: f64, q: u64) -> u64 {
    reduce_signed(gaussian(std_dev), q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ternary_is_ternary() {
        let s = ternary_vec(4096);

        assert!(s.iter().all(|x| (-1..=1).contains(x)));
        assert!(s.contains(&-1));
        assert!(s.contains(&0));
        assert!(s.contains(&1));
    }

    #[test]
    fn gaussian_has_expected_spread() {
        let std_dev = 3.19;
        let e = gaussian_vec(20_000, std_dev);

        let mean = e.iter().sum::<i64>() as f64 / e.len() as f64;
        let var = e.iter().map(|x| (*x as f64 - mean).powi(2)).sum::<f64>() / e.len() as f64;

        assert!(mean.abs() < 0.2);
        assert!((var.sqrt() - std_dev).abs() < 0.3);
    }

    #[test]
    fn uniform_is_reduced() {
        assert!(uniform_vec(1000, 17).iter().all(|x| *x < 17));
    }
}
