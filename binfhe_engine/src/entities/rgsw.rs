use binfhe_math::poly::Poly;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A ring LWE ciphertext `(a, b)` with `b = a z + m + e`.
pub struct RlweCiphertext {
    /// The mask.
    pub a: Poly,

    /// The body.
    pub b: Poly,
}

impl RlweCiphertext {
    /// The zero ciphertext of ring dimension `n`.
    pub fn zero(n: usize) -> Self {
        Self {
            a: Poly::zero(n),
            b: Poly::zero(n),
        }
    }

    /// The noiseless encryption of `m`.
    pub fn trivial(m: Poly) -> Self {
        Self {
            a: Poly::zero(m.ring_dim()),
            b: m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A ring GSW ciphertext with its rows kept in NTT form.
///
/// # Remarks
/// With `d` gadget digits, rows `0..d` encrypt zero with `mu * B^l` added to the mask and rows
/// `d..2d` encrypt `mu * B^l` in the body.
pub struct RgswCiphertext {
    pub(crate) rows: Vec<RlweCiphertext>,
    pub(crate) base: u32,
}

impl RgswCiphertext {
    /// The rows in NTT form.
    pub fn rows(&self) -> &[RlweCiphertext] {
        &self.rows
    }

    /// The gadget base the rows were encrypted for.
    pub fn base(&self) -> u32 {
        self.base
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The common reference string of threshold RGSW encryption: one public mask per gadget row,
/// in NTT form.
pub struct CommonReferenceString {
    pub(crate) rows: Vec<Poly>,
    pub(crate) base: u32,
}

impl CommonReferenceString {
    /// The masks.
    pub fn rows(&self) -> &[Poly] {
        &self.rows
    }

    /// The gadget base the string was sampled for.
    pub fn base(&self) -> u32 {
        self.base
    }
}
