use serde::{Deserialize, Serialize};

use crate::{
    modular::{mod_add, mod_mul, mod_neg, mod_sub, reduce_signed},
    ntt::NttTable,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A polynomial in `Z_q[X]/(X^N + 1)`, stored as its `N` coefficients.
///
/// # Remarks
/// A [`Poly`] doesn't record whether it holds coefficients or NTT evaluations, nor which
/// modulus it lives under; owners track both. Every binary operation asserts matching lengths.
pub struct Poly {
    /// The coefficients (or evaluations) in `[0, q)`.
    pub coeffs: Vec<u64>,
}

impl Poly {
    /// The zero polynomial of degree `< n`.
    pub fn zero(n: usize) -> Self {
        Self { coeffs: vec![0; n] }
    }

    /// Embed signed coefficients into `Z_q`.
    pub fn from_signed(vals: &[i64], q: u64) -> Self {
        Self {
            coeffs: vals.iter().map(|x| reduce_signed(*x, q)).collect(),
        }
    }

    /// The ring dimension `N`.
    pub fn ring_dim(&self) -> usize {
        self.coeffs.len()
    }

    /// Compute `self += rhs`.
    pub fn add_assign(&mut self, rhs: &Poly, q: u64) {
        assert_eq!(self.ring_dim(), rhs.ring_dim());

        for (x, y) in self.coeffs.iter_mut().zip(&rhs.coeffs) {
            *x = mod_add(*x, *y, q);
        }
    }

    /// Compute `self -= rhs`.
    pub fn sub_assign(&mut self, rhs: &Poly, q: u64) {
        assert_eq!(self.ring_dim(), rhs.ring_dim());

        for (x, y) in self.coeffs.iter_mut().zip(&rhs.coeffs) {
            *x = mod_sub(*x, *y, q);
        }
    }

    /// Compute `-self`.
    pub fn neg(&self, q: u64) -> Poly {
        Self {
            coeffs: self.coeffs.iter().map(|x| mod_neg(*x, q)).collect(),
        }
    }

    /// Compute `self += a * b` coefficient-wise. With `a` and `b` in NTT form, this
    /// accumulates their ring product.
    pub fn mul_add_pointwise(&mut self, a: &Poly, b: &Poly, q: u64) {
        assert_eq!(self.ring_dim(), a.ring_dim());
        assert_eq!(self.ring_dim(), b.ring_dim());

        for ((c, x), y) in self.coeffs.iter_mut().zip(&a.coeffs).zip(&b.coeffs) {
            *c = mod_add(*c, mod_mul(*x, *y, q), q);
        }
    }

    /// Multiply by the monomial `X^k` for `k` in `[0, 2N)`.
    pub fn mul_monomial(&self, k: usize, q: u64) -> Poly {
        let n = self.ring_dim();
        assert!(k < 2 * n);

        let mut out = vec![0; n];

        for (i, x) in self.coeffs.iter().enumerate() {
            let j = i + k;
            let (idx, negate) = if j < n {
                (j, false)
            } else if j < 2 * n {
                (j - n, true)
            } else {
                (j - 2 * n, false)
            };

            out[idx] = if negate { mod_neg(*x, q) } else { *x };
        }

        Self { coeffs: out }
    }

    /// Returns `a'` with `a'_0 = a_0` and `a'_j = -a_{N - j}`, so that the constant coefficient
    /// of `self * s` equals the inner product of `a'` with the coefficients of `s`.
    pub fn transpose(&self, q: u64) -> Poly {
        let n = self.ring_dim();
        let mut out = vec![0; n];

        out[0] = self.coeffs[0];

        for j in 1..n {
            out[j] = mod_neg(self.coeffs[n - j], q);
        }

        Self { coeffs: out }
    }

    /// Forward NTT of a copy of `self`.
    pub fn to_ntt(&self, table: &NttTable) -> Poly {
        let mut out = self.clone();
        table.forward(&mut out.coeffs);

        out
    }

    /// Inverse NTT of a copy of `self`.
    pub fn from_ntt(&self, table: &NttTable) -> Poly {
        let mut out = self.clone();
        table.inverse(&mut out.coeffs);

        out
    }

    /// The negacyclic product of two polynomials in coefficient form.
    pub fn mul(&self, rhs: &Poly, table: &NttTable) -> Poly {
        let q = table.modulus();
        let a = self.to_ntt(table);
        let b = rhs.to_ntt(table);

        let mut c = Poly::zero(self.ring_dim());
        c.mul_add_pointwise(&a, &b, q);
        table.inverse(&mut c.coeffs);

        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::{first_prime, previous_prime};

    fn table(n: usize) -> NttTable {
        let m = 2 * n as u64;
        let q = previous_prime(first_prime(27, m).unwrap(), m).unwrap();

        NttTable::new(n, q).unwrap()
    }

    #[test]
    fn monomial_matches_ring_product() {
        let table = table(16);
        let q = table.modulus();

        let a = Poly::from_signed(&(0..16).map(|i| i * 3 - 20).collect::<Vec<i64>>(), q);

        for k in [0, 1, 5, 15, 16, 17, 31] {
            let mut mono = Poly::zero(16);

            if k < 16 {
                mono.coeffs[k] = 1;
            } else {
                mono.coeffs[k - 16] = q - 1;
            }

            assert_eq!(a.mul_monomial(k, q), a.mul(&mono, &table), "k = {k}");
        }
    }

    #[test]
    fn transpose_extracts_constant_coefficient() {
        let table = table(8);
        let q = table.modulus();

        let a = Poly::from_signed(&[5, -3, 7, 1, 0, 2, -9, 4], q);
        let s = Poly::from_signed(&[1, 0, -1, 1, 1, -1, 0, 1], q);

        let prod = a.mul(&s, &table);
        let a_t = a.transpose(q);

        let inner = a_t
            .coeffs
            .iter()
            .zip(&s.coeffs)
            .fold(0, |acc, (x, y)| mod_add(acc, mod_mul(*x, *y, q), q));

        assert_eq!(inner, prod.coeffs[0]);
    }

    #[test]
    fn add_sub_neg() {
        let q = 97;
        let mut a = Poly::from_signed(&[1, 2, 3, -4], q);
        let b = Poly::from_signed(&[96, 5, 0, 4], q);

        a.add_assign(&b, q);
        assert_eq!(a.coeffs, vec![0, 7, 3, 0]);

        a.sub_assign(&b, q);
        assert_eq!(a, Poly::from_signed(&[1, 2, 3, -4], q));

        assert_eq!(a.neg(q).coeffs, vec![96, 95, 94, 4]);
    }
}
