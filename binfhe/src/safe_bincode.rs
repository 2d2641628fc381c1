use bincode::{DefaultOptions, Options};
use binfhe_engine::entities::{
    BootstrappingKey, KeySwitchKey, LweCiphertext, LwePrivateKey, LwePublicKey,
};
use serde::Deserialize;

use crate::{Params, Result};

/// Get the expected size of a type for safe bincode deserialization.
pub trait GetSize {
    /// The largest encoding of this type under the given [`Params`].
    fn get_size(params: &Params) -> usize;

    /// Check if the given object is valid under the given [`Params`].
    fn check_is_valid(&self, params: &Params) -> Result<()>;
}

/// Safely deserialize the given buffer given a type
pub fn deserialize<'a, T: GetSize + Deserialize<'a>>(data: &'a [u8], params: &Params) -> Result<T> {
    let options = DefaultOptions::new()
        .with_limit(T::get_size(params) as u64)
        .with_fixint_encoding()
        .allow_trailing_bytes();

    let mut deserializer = bincode::Deserializer::from_slice(data, options);
    let result = T::deserialize(&mut deserializer)?;
    result.check_is_valid(params)?;

    Ok(result)
}

const WORD: usize = size_of::<u64>();

fn vec_size(len: usize) -> usize {
    WORD + WORD * len
}

/// Keys and ciphertexts come at the small dimension `n` or the ring dimension `N`.
fn check_dim(params: &Params, dim: usize) -> Result<()> {
    let lwe = params.lwe();

    if dim != lwe.n && dim != lwe.ring_dim {
        return Err(binfhe_engine::Error::DimensionMismatch {
            expected: lwe.n,
            actual: dim,
        }
        .into());
    }

    Ok(())
}

impl GetSize for LweCiphertext {
    fn get_size(params: &Params) -> usize {
        vec_size(params.lwe().ring_dim) + 2 * WORD
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        check_dim(params, self.dim())?;

        Ok(self.validate(self.dim())?)
    }
}

impl GetSize for LwePrivateKey {
    fn get_size(params: &Params) -> usize {
        vec_size(params.lwe().ring_dim) + WORD
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        check_dim(params, self.dim())
    }
}

impl GetSize for LwePublicKey {
    fn get_size(params: &Params) -> usize {
        let dim = params.lwe().ring_dim;

        vec_size(dim * dim) + vec_size(dim) + 2 * WORD
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        check_dim(params, self.dim())?;

        Ok(self.validate()?)
    }
}

impl GetSize for KeySwitchKey {
    fn get_size(params: &Params) -> usize {
        let lwe = params.lwe();
        let entries = lwe.ring_dim * lwe.ks_digits() * (lwe.base_ks as usize - 1);

        5 * WORD + vec_size(entries * lwe.n) + vec_size(entries) + WORD
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        let lwe = params.lwe();

        if self.from_dim() != lwe.ring_dim || self.to_dim() != lwe.n {
            return Err(binfhe_engine::Error::DimensionMismatch {
                expected: lwe.ring_dim,
                actual: self.from_dim(),
            }
            .into());
        }

        if self.modulus() != lwe.q_ks
            || self.base() != lwe.base_ks
            || self.digits() != lwe.ks_digits()
            || self.parties() > params.parties()
        {
            return Err(binfhe_engine::Error::InvalidSize.into());
        }

        Ok(self.validate()?)
    }
}

impl GetSize for BootstrappingKey {
    fn get_size(params: &Params) -> usize {
        let lwe = params.lwe();
        let rgsw = params.rgsw();

        let digits = rgsw
            .gadget_bases()
            .filter_map(|b| rgsw.gadget(b))
            .map(|g| g.digits)
            .max()
            .unwrap_or_default();

        let poly = vec_size(rgsw.ring_dim());
        let rgsw_ct = WORD + 2 * digits * 2 * poly + size_of::<u32>();
        let block = 2 * (WORD + lwe.n * rgsw_ct);
        let acc = WORD + params.parties() * block + size_of::<u32>();

        acc + KeySwitchKey::get_size(params) + 1 + LwePublicKey::get_size(params)
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        self.acc.validate(params.rgsw(), params.lwe().n)?;

        if self.acc.parties() > params.parties() {
            return Err(binfhe_engine::Error::PartyCountMismatch {
                expected: params.parties(),
                actual: self.acc.parties(),
            }
            .into());
        }

        self.ksk.check_is_valid(params)?;

        if let Some(pk) = &self.public_key {
            pk.check_is_valid(params)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        test_utils::{get_large_context, get_toy_context},
    };

    use super::*;

    #[test]
    fn can_safe_deserialize_ciphertexts() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let params = ctx.params();

        let ct = ctx.encrypt(sk, 1, 4, None);
        let ser = bincode::serialize(&ct).unwrap();
        assert_eq!(deserialize::<LweCiphertext>(&ser, params).unwrap(), ct);

        let large = ctx
            .encrypt_public(ctx.public_key().unwrap(), 1, crate::Output::LargeDim, 4, None)
            .unwrap();
        let ser = bincode::serialize(&large).unwrap();
        assert_eq!(deserialize::<LweCiphertext>(&ser, params).unwrap(), large);
    }

    #[test]
    fn rejects_malformed_serialized_ciphertext() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let params = ctx.params();

        // Malformed length
        let ser = vec![
            253, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x1, 0x2, 0x3, 0x4,
        ];
        assert!(deserialize::<LweCiphertext>(&ser, params).is_err());

        // Unreduced body
        let ct = ctx.encrypt(sk, 1, 4, None);
        let mut ser = bincode::serialize(&ct).unwrap();
        let body = WORD + WORD * ct.dim();
        ser[body..body + WORD].copy_from_slice(&u64::MAX.to_le_bytes());

        assert!(matches!(
            deserialize::<LweCiphertext>(&ser, params),
            Err(Error::Engine(binfhe_engine::Error::InvalidSize))
        ));

        // Dimension of another parameter set
        let large = get_large_context();
        let ct = large.ctx.encrypt(&large.sk, 1, 4, None);
        let ser = bincode::serialize(&ct).unwrap();

        assert!(matches!(
            deserialize::<LweCiphertext>(&ser, params),
            Err(Error::Engine(binfhe_engine::Error::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn can_safe_deserialize_keys() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let params = ctx.params();

        let ser = bincode::serialize(sk).unwrap();
        assert_eq!(&deserialize::<LwePrivateKey>(&ser, params).unwrap(), sk);

        let pk = ctx.public_key().unwrap();
        let ser = bincode::serialize(pk).unwrap();
        assert_eq!(&deserialize::<LwePublicKey>(&ser, params).unwrap(), pk);

        let ksk = ctx.key_switch_key().unwrap();
        let ser = bincode::serialize(ksk).unwrap();
        assert_eq!(&deserialize::<KeySwitchKey>(&ser, params).unwrap(), ksk);

        let key = ctx.bootstrapping_key().unwrap();
        let ser = bincode::serialize(key).unwrap();
        assert_eq!(&deserialize::<BootstrappingKey>(&ser, params).unwrap(), key);
    }

    #[test]
    fn rejects_malformed_keys() {
        macro_rules! case {
            ($key_ty:ty, $params:expr) => {
                // Malformed length
                let ser = vec![
                    253, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x1, 0x2, 0x3, 0x4,
                ];

                let res = deserialize::<$key_ty>(&ser, $params);

                assert!(res.is_err());
            };
        }

        let toy = get_toy_context();
        let large = get_large_context();
        let params = toy.ctx.params();

        case!(LwePrivateKey, params);
        case!(LwePublicKey, params);
        case!(KeySwitchKey, params);
        case!(BootstrappingKey, params);

        let ser = bincode::serialize(&large.sk).unwrap();
        assert!(deserialize::<LwePrivateKey>(&ser, params).is_err());

        let ser = bincode::serialize(large.ctx.key_switch_key().unwrap()).unwrap();
        assert!(deserialize::<KeySwitchKey>(&ser, params).is_err());

        let ser = bincode::serialize(toy.ctx.bootstrapping_key().unwrap()).unwrap();
        assert!(deserialize::<BootstrappingKey>(&ser, large.ctx.params()).is_err());
    }
}
