use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Switches LWE ciphertexts mod `q_ks` from a key of dimension `from_dim` to one of dimension
/// `to_dim`.
///
/// # Remarks
/// Entry `(i, k, j)` encrypts `j * z_i * B^k` for every nonzero digit value `j < B`, so key
/// switching only adds table entries and never multiplies by a digit.
pub struct KeySwitchKey {
    pub(crate) from_dim: usize,
    pub(crate) to_dim: usize,
    pub(crate) modulus: u64,
    pub(crate) base: u64,
    pub(crate) digits: usize,
    pub(crate) a: Vec<u64>,
    pub(crate) b: Vec<u64>,
    pub(crate) parties: usize,
}

impl KeySwitchKey {
    /// The dimension of the key switched from.
    pub fn from_dim(&self) -> usize {
        self.from_dim
    }

    /// The dimension of the key switched to.
    pub fn to_dim(&self) -> usize {
        self.to_dim
    }

    /// The key switching modulus.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// The decomposition base.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// The number of decomposition digits.
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// How many parties have contributed to this key.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// The number of LWE samples in the table.
    pub fn entries(&self) -> usize {
        self.from_dim * self.digits * (self.base as usize - 1)
    }

    #[inline(always)]
    pub(crate) fn index(&self, i: usize, k: usize, j: u64) -> usize {
        debug_assert!(j >= 1 && j < self.base);

        (i * self.digits + k) * (self.base as usize - 1) + (j as usize - 1)
    }

    #[inline(always)]
    pub(crate) fn entry(&self, idx: usize) -> (&[u64], u64) {
        (
            &self.a[idx * self.to_dim..(idx + 1) * self.to_dim],
            self.b[idx],
        )
    }

    /// Check the table shape after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.base < 2 || self.digits == 0 {
            return Err(Error::InvalidSize);
        }

        let entries = self.entries();

        if self.b.len() != entries || self.a.len() != entries * self.to_dim {
            return Err(Error::InvalidSize);
        }

        if self.b.iter().chain(&self.a).any(|x| *x >= self.modulus) {
            return Err(Error::InvalidSize);
        }

        Ok(())
    }
}
