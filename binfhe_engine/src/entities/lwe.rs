use binfhe_math::{
    modular::{mod_add, mod_mul, mod_neg, mod_sub, reduce_signed},
    poly::Poly,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// An LWE ciphertext `(a, b)` with `b = <a, s> + m + e mod modulus`.
///
/// # Remarks
/// The ciphertext carries its own modulus so operations can check compatibility before
/// switching keys or moduli.
pub struct LweCiphertext {
    a: Vec<u64>,
    b: u64,
    modulus: u64,
}

impl LweCiphertext {
    /// Create a ciphertext from its parts. Coordinates must already be reduced.
    pub fn new(a: Vec<u64>, b: u64, modulus: u64) -> Self {
        debug_assert!(a.iter().all(|x| *x < modulus) && b < modulus);

        Self { a, b, modulus }
    }

    /// A noiseless encryption of `b` with zero mask.
    pub fn trivial(dim: usize, b: u64, modulus: u64) -> Self {
        Self::new(vec![0; dim], b % modulus, modulus)
    }

    /// The mask.
    pub fn a(&self) -> &[u64] {
        &self.a
    }

    /// The body.
    pub fn b(&self) -> u64 {
        self.b
    }

    /// The ciphertext modulus.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// The LWE dimension.
    pub fn dim(&self) -> usize {
        self.a.len()
    }

    /// Reinterpret the ciphertext modulo `modulus` by reducing every coordinate.
    ///
    /// # Remarks
    /// When `modulus` divides the current modulus this reduces the phase mod `modulus`. When
    /// `modulus` is a multiple of it, the phase becomes one of its lifts.
    pub fn with_modulus(&self, modulus: u64) -> Self {
        Self {
            a: self.a.iter().map(|x| x % modulus).collect(),
            b: self.b % modulus,
            modulus,
        }
    }

    fn assert_compatible(&self, rhs: &Self) {
        assert_eq!(self.modulus, rhs.modulus, "ciphertext moduli differ");
        assert_eq!(self.dim(), rhs.dim(), "ciphertext dimensions differ");
    }

    /// Homomorphically compute `self += rhs`.
    ///
    /// # Panics
    /// If the ciphertexts have different dimensions or moduli.
    pub fn add_assign(&mut self, rhs: &Self) {
        self.assert_compatible(rhs);

        let q = self.modulus;

        for (x, y) in self.a.iter_mut().zip(&rhs.a) {
            *x = mod_add(*x, *y, q);
        }

        self.b = mod_add(self.b, rhs.b, q);
    }

    /// Homomorphically compute `self -= rhs`.
    ///
    /// # Panics
    /// If the ciphertexts have different dimensions or moduli.
    pub fn sub_assign(&mut self, rhs: &Self) {
        self.assert_compatible(rhs);

        let q = self.modulus;

        for (x, y) in self.a.iter_mut().zip(&rhs.a) {
            *x = mod_sub(*x, *y, q);
        }

        self.b = mod_sub(self.b, rhs.b, q);
    }

    /// Homomorphically negate.
    pub fn neg(&self) -> Self {
        let q = self.modulus;

        Self {
            a: self.a.iter().map(|x| mod_neg(*x, q)).collect(),
            b: mod_neg(self.b, q),
            modulus: q,
        }
    }

    /// Homomorphically multiply by the public constant `k`.
    pub fn scale(&self, k: u64) -> Self {
        let q = self.modulus;
        let k = k % q;

        Self {
            a: self.a.iter().map(|x| mod_mul(*x, k, q)).collect(),
            b: mod_mul(self.b, k, q),
            modulus: q,
        }
    }

    /// Add the public constant `c` to the phase.
    pub fn add_const(&mut self, c: u64) {
        self.b = mod_add(self.b, c % self.modulus, self.modulus);
    }

    /// Subtract the public constant `c` from the phase.
    pub fn sub_const(&mut self, c: u64) {
        self.b = mod_sub(self.b, c % self.modulus, self.modulus);
    }

    /// Check that every coordinate is reduced and the dimension is `dim`.
    pub fn validate(&self, dim: usize) -> Result<()> {
        if self.dim() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: self.dim(),
            });
        }

        if self.modulus < 2 || self.b >= self.modulus || self.a.iter().any(|x| *x >= self.modulus)
        {
            return Err(Error::InvalidSize);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// An LWE secret key with small signed coefficients.
///
/// # Remarks
/// The key records the modulus it was generated for. Ternary and Gaussian keys are valid under
/// every modulus, so encryption may use another one.
pub struct LwePrivateKey {
    s: Vec<i64>,
    modulus: u64,
}

impl LwePrivateKey {
    /// Wrap signed coefficients.
    pub fn new(s: Vec<i64>, modulus: u64) -> Self {
        Self { s, modulus }
    }

    /// The signed coefficients.
    pub fn coeffs(&self) -> &[i64] {
        &self.s
    }

    /// The key's dimension.
    pub fn dim(&self) -> usize {
        self.s.len()
    }

    /// The modulus the key was generated for.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Whether every coefficient lies in `{-1, 0, 1}`.
    pub fn is_ternary(&self) -> bool {
        self.s.iter().all(|x| (-1..=1).contains(x))
    }

    /// The coefficients reduced mod `q`.
    pub fn reduced(&self, q: u64) -> Vec<u64> {
        self.s.iter().map(|x| reduce_signed(*x, q)).collect()
    }

    /// The key as a ring element mod `q`.
    pub fn to_poly(&self, q: u64) -> Poly {
        Poly::from_signed(&self.s, q)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// An LWE public key: a square matrix `A` and `v = A s + e`.
pub struct LwePublicKey {
    pub(crate) a: Vec<u64>,
    pub(crate) v: Vec<u64>,
    pub(crate) dim: usize,
    pub(crate) modulus: u64,
}

impl LwePublicKey {
    /// The dimension of the secret key this public key belongs to.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of LWE samples in the key.
    pub fn rows(&self) -> usize {
        self.v.len()
    }

    /// The modulus.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Row `i` of `A`.
    pub fn row(&self, i: usize) -> &[u64] {
        &self.a[i * self.dim..(i + 1) * self.dim]
    }

    /// The vector `v`.
    pub fn v(&self) -> &[u64] {
        &self.v
    }

    /// Check the matrix shape after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.a.len() != self.dim * self.v.len() {
            return Err(Error::InvalidSize);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A secret key and a public key encrypting under it.
pub struct LweKeyPair {
    /// The secret key.
    pub secret: LwePrivateKey,

    /// The public key.
    pub public: LwePublicKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// One party's contribution to a threshold decryption.
pub struct DecryptionShare {
    /// The partial phase.
    pub value: u64,

    /// The ciphertext modulus.
    pub modulus: u64,

    /// Whether this share contains the ciphertext body.
    pub lead: bool,
}
