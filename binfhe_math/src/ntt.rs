use serde::{Deserialize, Serialize};

use crate::{
    Result,
    modular::{mod_add, mod_inverse_prime, mod_mul, mod_pow, mod_sub},
    primes::primitive_root_of_unity,
};

#[inline(always)]
fn bit_reverse(i: usize, log_n: u32) -> usize {
    if log_n == 0 {
        0
    } else {
        i.reverse_bits() >> (usize::BITS - log_n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Precomputed twiddle factors for the negacyclic NTT over `Z_q[X]/(X^n + 1)`.
///
/// # Remarks
/// The forward transform takes coefficients in natural order and produces evaluations in
/// bit-reversed order; the inverse undoes this. Pointwise products of two forward transforms
/// followed by [`NttTable::inverse`] compute the negacyclic product, so callers never need to
/// reason about evaluation order.
pub struct NttTable {
    q: u64,
    n: usize,
    psi_rev: Vec<u64>,
    psi_inv_rev: Vec<u64>,
    n_inv: u64,
}

impl NttTable {
    /// Build the table for ring dimension `n` (a power of two) and prime `q = 1 mod 2n`.
    pub fn new(n: usize, q: u64) -> Result<Self> {
        assert!(n.is_power_of_two(), "n must be a power of two");

        let psi = primitive_root_of_unity(2 * n as u64, q)?;
        let psi_inv = mod_inverse_prime(psi, q);
        let log_n = n.trailing_zeros();

        let mut psi_rev = vec![0; n];
        let mut psi_inv_rev = vec![0; n];

        let mut pow = 1;
        let mut pow_inv = 1;

        for i in 0..n {
            let r = bit_reverse(i, log_n);
            psi_rev[r] = pow;
            psi_inv_rev[r] = pow_inv;

            pow = mod_mul(pow, psi, q);
            pow_inv = mod_mul(pow_inv, psi_inv, q);
        }

        let n_inv = mod_inverse_prime(n as u64, q);

        debug_assert_eq!(mod_pow(psi, n as u64, q), q - 1);

        Ok(Self {
            q,
            n,
            psi_rev,
            psi_inv_rev,
            n_inv,
        })
    }

    /// The modulus.
    pub fn modulus(&self) -> u64 {
        self.q
    }

    /// The ring dimension.
    pub fn ring_dim(&self) -> usize {
        self.n
    }

    /// In-place forward transform.
    ///
    /// # Panics
    /// If `a.len()` isn't the ring dimension.
    pub fn forward(&self, a: &mut [u64]) {
        assert_eq!(a.len(), self.n);

        let q = self.q;
        let mut t = self.n;
        let mut m = 1;

        while m < self.n {
            t >>= 1;

            for i in 0..m {
                let j1 = 2 * i * t;
                let s = self.psi_rev[m + i];

                for j in j1..j1 + t {
                    let u = a[j];
                    let v = mod_mul(a[j + t], s, q);

                    a[j] = mod_add(u, v, q);
                    a[j + t] = mod_sub(u, v, q);
                }
            }

            m <<= 1;
        }
    }

    /// In-place inverse transform.
    ///
    /// # Panics
    /// If `a.len()` isn't the ring dimension.
    pub fn inverse(&self, a: &mut [u64]) {
        assert_eq!(a.len(), self.n);

        let q = self.q;
        let mut t = 1;
        let mut m = self.n;

        while m > 1 {
            let h = m >> 1;
            let mut j1 = 0;

            for i in 0..h {
                let s = self.psi_inv_rev[h + i];

                for j in j1..j1 + t {
                    let u = a[j];
                    let v = a[j + t];

                    a[j] = mod_add(u, v, q);
                    a[j + t] = mod_mul(mod_sub(u, v, q), s, q);
                }

                j1 += 2 * t;
            }

            t <<= 1;
            m = h;
        }

        for x in a.iter_mut() {
            *x = mod_mul(*x, self.n_inv, q);
        }
    }
}
