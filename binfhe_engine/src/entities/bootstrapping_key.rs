use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, RgswParams,
    entities::{KeySwitchKey, LwePublicKey, RgswCiphertext},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One party's GINX key: for every coefficient `s_i` of its LWE secret, RGSW encryptions of
/// `[s_i == 1]` and `[s_i == -1]`.
pub struct GinxBlock {
    pub(crate) plus: Vec<RgswCiphertext>,
    pub(crate) minus: Vec<RgswCiphertext>,
}

impl GinxBlock {
    /// The LWE dimension the block covers.
    pub fn dim(&self) -> usize {
        self.plus.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The blind rotation key. Single-party keys hold one block; threshold keys hold one block per
/// party, applied in order.
pub struct AccumulatorKey {
    pub(crate) blocks: Vec<GinxBlock>,
    pub(crate) base: u32,
}

impl AccumulatorKey {
    /// The gadget base of every RGSW ciphertext in the key.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// The per-party blocks.
    pub fn blocks(&self) -> &[GinxBlock] {
        &self.blocks
    }

    /// The number of parties that contributed blocks.
    pub fn parties(&self) -> usize {
        self.blocks.len()
    }

    /// Check every RGSW ciphertext's shape after deserialization: `dim` coordinates per block,
    /// `2d` rows of ring dimension `N` with coefficients below `Q`.
    pub fn validate(&self, params: &RgswParams, dim: usize) -> Result<()> {
        let gadget = params
            .gadget(self.base)
            .ok_or(Error::UnknownGadgetBase(self.base))?;

        if self.blocks.is_empty() {
            return Err(Error::InvalidSize);
        }

        let rgsw_ok = |ct: &RgswCiphertext| {
            ct.base == self.base
                && ct.rows.len() == 2 * gadget.digits
                && ct.rows.iter().flat_map(|r| [&r.a, &r.b]).all(|p| {
                    p.coeffs.len() == params.ring_dim()
                        && p.coeffs.iter().all(|c| *c < params.big_q())
                })
        };

        for block in &self.blocks {
            if block.plus.len() != dim || block.minus.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: block.plus.len(),
                });
            }

            if !block.plus.iter().chain(&block.minus).all(rgsw_ok) {
                return Err(Error::InvalidSize);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Everything a server needs to bootstrap: the accumulator key, the key switching key back to
/// the small LWE key and, for public key encryption, a public key under the ring secret.
pub struct BootstrappingKey {
    /// The accumulator key.
    pub acc: AccumulatorKey,

    /// Switches extracted samples back to the small key. Shared among the keys generated for
    /// different gadget bases.
    pub ksk: Arc<KeySwitchKey>,

    /// A public key under the ring secret, present when keys were generated for public key
    /// encryption.
    pub public_key: Option<Arc<LwePublicKey>>,
}

impl BootstrappingKey {
    /// The gadget base of the accumulator key.
    pub fn base(&self) -> u32 {
        self.acc.base
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, test_utils::get_small_keys};

    #[test]
    fn accumulator_key_validates() {
        let keys = get_small_keys();
        let acc = &keys.default_key().acc;

        assert_eq!(acc.validate(&keys.rgsw, keys.lwe.n), Ok(()));
        assert!(matches!(
            acc.validate(&keys.rgsw, keys.lwe.n + 1),
            Err(Error::DimensionMismatch { .. })
        ));

        let mut bad = acc.clone();
        bad.blocks[0].plus[3].rows[1].b.coeffs[7] = keys.rgsw.big_q();

        assert_eq!(bad.validate(&keys.rgsw, keys.lwe.n), Err(Error::InvalidSize));

        let mut bad = acc.clone();
        bad.base = 3;

        assert_eq!(
            bad.validate(&keys.rgsw, keys.lwe.n),
            Err(Error::UnknownGadgetBase(3))
        );
    }
}
