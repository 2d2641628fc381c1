use std::{collections::BTreeMap, sync::Arc};

use binfhe_engine::{
    AccKeyGenMode, AccumulatorEngine,
    entities::{
        BootstrappingKey, CommonReferenceString, KeySwitchKey, LweCiphertext, LweKeyPair,
        LwePrivateKey, LwePublicKey,
    },
    ops::lwe,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{BootstrapMethod, Error, ExplicitParams, ParamSet, Params, Result};

mod evaluation;
mod multiparty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Which encryptions a bootstrapping key supports.
pub enum KeyGenMode {
    /// Secret key encryption only.
    #[default]
    Symmetric,

    /// Also generate a public key under the ring secret, available from
    /// [`BinFheContext::public_key`].
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// The shape of a public key encryption.
pub enum Output {
    /// Key switch down to `(n, q)`, ready for gate evaluation.
    #[default]
    SmallDim,

    /// Keep the public key's dimension and modulus.
    LargeDim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Whether [`BinFheContext::clear_key_cache`] may drop cached bootstrapping keys.
pub enum CacheConfig {
    /// Keys live as long as the context.
    #[default]
    Retain,

    /// Keys for gadget bases other than the default one may be dropped.
    Clearable,
}

/// The entry point for Boolean FHE: owns the parameters, the accumulator engine and the
/// bootstrapping keys, and runs every protocol over them.
///
/// # Remarks
/// Bootstrapping keys are cached by gadget base. The active key is always the one for the
/// default base ([`BinFheContext::base`]); in multi-base mode the keys for the other bases
/// serve [`BinFheContext::eval_sign`] and [`BinFheContext::eval_decomp`], which switch bases
/// as the working modulus shrinks.
///
/// Key generation takes `&mut self` and evaluation `&self`, so a context can evaluate on many
/// threads at once but never while its keys change.
pub struct BinFheContext {
    params: Params,
    engine: AccumulatorEngine,
    keys: BTreeMap<u32, Arc<BootstrappingKey>>,
    ksk: Option<Arc<KeySwitchKey>>,
    public_key: Option<Arc<LwePublicKey>>,
    cache: CacheConfig,
}

impl BinFheContext {
    /// Create a context without keys.
    pub fn new(params: Params) -> Self {
        let engine = AccumulatorEngine::new(params.lwe().clone(), params.rgsw().clone());

        Self {
            params,
            engine,
            keys: BTreeMap::new(),
            ksk: None,
            public_key: None,
            cache: CacheConfig::default(),
        }
    }

    /// See [`Params::from_preset`].
    pub fn from_preset(set: ParamSet, method: BootstrapMethod) -> Result<Self> {
        Ok(Self::new(Params::from_preset(set, method)?))
    }

    /// See [`Params::from_preset_with_parties`].
    pub fn from_preset_with_parties(
        set: ParamSet,
        method: BootstrapMethod,
        parties: usize,
    ) -> Result<Self> {
        Ok(Self::new(Params::from_preset_with_parties(
            set, method, parties,
        )?))
    }

    /// See [`Params::from_security_level`].
    pub fn from_security_level(
        set: ParamSet,
        arb_func: bool,
        log_q: u32,
        min_ring_dim: usize,
        method: BootstrapMethod,
        time_optimization: bool,
    ) -> Result<Self> {
        Ok(Self::new(Params::from_security_level(
            set,
            arb_func,
            log_q,
            min_ring_dim,
            method,
            time_optimization,
        )?))
    }

    /// See [`Params::from_explicit`].
    pub fn from_explicit(params: &ExplicitParams) -> Result<Self> {
        Ok(Self::new(Params::from_explicit(params)?))
    }

    /// Set the cache policy.
    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// The cache policy.
    pub fn cache_config(&self) -> CacheConfig {
        self.cache
    }

    /// The parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The accumulator engine, whose counters show how many keys were generated and how many
    /// bootstraps ran.
    pub fn engine(&self) -> &AccumulatorEngine {
        &self.engine
    }

    /// The default gadget base, under which the active bootstrapping key is cached.
    pub fn base(&self) -> u32 {
        self.params.rgsw().base_g()
    }

    /// See [`Params::beta`].
    pub fn beta(&self) -> u64 {
        self.params.beta()
    }

    /// See [`Params::max_plaintext_space`].
    pub fn max_plaintext_space(&self) -> u64 {
        self.params.max_plaintext_space()
    }

    /// The active bootstrapping key, if one was generated.
    pub fn bootstrapping_key(&self) -> Option<&BootstrappingKey> {
        self.keys.get(&self.base()).map(|k| k.as_ref())
    }

    /// The gadget bases with a cached bootstrapping key, in ascending order.
    pub fn cached_bases(&self) -> Vec<u32> {
        self.keys.keys().copied().collect()
    }

    /// The key switching key from the ring secret to the LWE secret, once one was generated.
    pub fn key_switch_key(&self) -> Option<&KeySwitchKey> {
        self.ksk.as_deref()
    }

    /// The public key generated with [`KeyGenMode::Public`] or installed by threshold key
    /// generation.
    pub fn public_key(&self) -> Option<&LwePublicKey> {
        self.public_key.as_deref()
    }

    fn active_key(&self) -> &BootstrappingKey {
        match self.bootstrapping_key() {
            Some(key) => key,
            None => panic!(
                "no bootstrapping key for base {}; generate one before evaluating",
                self.base()
            ),
        }
    }

    fn install(&mut self, key: BootstrappingKey) {
        let base = key.base();

        debug!(
            "installed bootstrapping key for base {base} ({} parties)",
            key.acc.parties()
        );

        self.ksk = Some(key.ksk.clone());
        self.keys.insert(base, Arc::new(key));
    }

    /// Generate an LWE secret key of dimension `n` for the key switching modulus, drawn from
    /// the configured distribution.
    pub fn key_gen(&self) -> LwePrivateKey {
        let lwe = self.params.lwe();

        lwe::key_gen_with_dist(lwe.n, lwe.q_ks, lwe.key_dist, lwe.std_dev)
    }

    /// Generate a secret key of dimension `N` modulo `Q`, usable as a ring secret.
    pub fn key_gen_large(&self) -> LwePrivateKey {
        let lwe = self.params.lwe();

        lwe::key_gen_with_dist(lwe.ring_dim, lwe.big_q, lwe.key_dist, lwe.std_dev)
    }

    /// Generate a secret key of dimension `n` and a public key for it.
    pub fn key_gen_pair(&self) -> LweKeyPair {
        lwe::key_gen_pair(self.params.lwe())
    }

    /// Derive a public key from `sk`, under `sk`'s dimension and modulus.
    pub fn pub_key_gen(&self, sk: &LwePrivateKey) -> LwePublicKey {
        lwe::pub_key_gen(self.params.lwe(), sk)
    }

    /// Generate a key switching key from `sk_large` (dimension `N`) to `sk` (dimension `n`).
    pub fn key_switch_gen(
        &self,
        sk: &LwePrivateKey,
        sk_large: &LwePrivateKey,
    ) -> Result<KeySwitchKey> {
        Ok(lwe::key_switch_gen(self.params.lwe(), sk, sk_large)?)
    }

    /// Encrypt `m` mod `p` under `sk`, at modulus `q` unless `modulus` overrides it.
    ///
    /// # Panics
    /// If `p` is zero or exceeds the ciphertext modulus.
    pub fn encrypt(
        &self,
        sk: &LwePrivateKey,
        m: u64,
        p: u64,
        modulus: Option<u64>,
    ) -> LweCiphertext {
        let lwe = self.params.lwe();

        lwe::encrypt(lwe, sk, m, p, modulus.unwrap_or(lwe.q))
    }

    /// Encrypt `m` mod `p` under a public key.
    ///
    /// # Remarks
    /// With [`Output::LargeDim`] the ciphertext keeps the key's dimension and modulus unless
    /// `modulus` overrides it. With [`Output::SmallDim`] a ciphertext under a ring public key
    /// (dimension `N`) is switched to `(n, q)` with the context's key switching key, and the
    /// result is then switched to `modulus` when given.
    ///
    /// # Panics
    /// If `p` is zero or exceeds the key's modulus, or if a small output needs key switching
    /// before any key switching key was generated.
    pub fn encrypt_public(
        &self,
        pk: &LwePublicKey,
        m: u64,
        output: Output,
        p: u64,
        modulus: Option<u64>,
    ) -> Result<LweCiphertext> {
        let lwe = self.params.lwe();
        let ct = lwe::encrypt_public(lwe, pk, m, p);

        let (ct, target) = match output {
            Output::LargeDim => {
                let target = ct.modulus();
                (ct, target)
            }
            Output::SmallDim if ct.dim() == lwe.ring_dim => {
                let Some(ksk) = self.ksk.as_deref() else {
                    panic!("no key switching key; generate bootstrapping keys first");
                };

                (self.switch_dimension(ksk, &ct)?, lwe.q)
            }
            Output::SmallDim => (ct, lwe.q),
        };

        let target = modulus.unwrap_or(target);

        if ct.modulus() == target {
            Ok(ct)
        } else {
            Ok(lwe::mod_switch(&ct, target))
        }
    }

    /// Switch a ciphertext at `(N, Q)` to `(n, q)` with `ksk`.
    pub fn switch_dimension(
        &self,
        ksk: &KeySwitchKey,
        ct: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        let lwe = self.params.lwe();

        if ct.dim() != lwe.ring_dim || ct.modulus() != lwe.big_q {
            return Err(Error::DimensionMismatch {
                expected_dim: lwe.ring_dim,
                actual_dim: ct.dim(),
                expected_modulus: lwe.big_q,
                actual_modulus: ct.modulus(),
            });
        }

        Ok(lwe::switch_dimension(lwe, ksk, ct)?)
    }

    /// Decrypt `ct` to a plaintext mod `p`.
    ///
    /// # Panics
    /// If the key and ciphertext dimensions differ.
    pub fn decrypt(&self, sk: &LwePrivateKey, ct: &LweCiphertext, p: u64) -> u64 {
        lwe::decrypt(sk, ct, p)
    }

    /// Generate the bootstrapping keys for `sk`.
    ///
    /// # Remarks
    /// A fresh ring secret is sampled along with a key switching key from it to `sk`. In
    /// multi-base mode a key is generated for every supported gadget base. Otherwise the key
    /// for the default base is reused if one is already cached and carries a public key
    /// whenever `mode` asks for one, and generated if not. Every key generated by one call
    /// shares the key switching key.
    ///
    /// A public key belongs to the ring secret it was derived from. Generating keys in
    /// [`KeyGenMode::Symmetric`] replaces that secret, so any public key held by the context,
    /// including a joint one, is dropped.
    pub fn bt_key_gen(&mut self, sk: &LwePrivateKey, mode: KeyGenMode) -> Result<()> {
        let base = self.base();
        let multi_base = self.params.rgsw().multi_base();

        let reusable = self.keys.get(&base).filter(|key| match mode {
            KeyGenMode::Public => key.public_key.is_some(),
            KeyGenMode::Symmetric => true,
        });

        if !multi_base && reusable.is_some() {
            debug!("reusing cached bootstrapping key for base {base}");
            return Ok(());
        }

        let lwe = self.params.lwe();
        let z = self.key_gen_large();
        let ksk = Arc::new(lwe::key_switch_gen(lwe, sk, &z)?);

        let public_key = match mode {
            KeyGenMode::Public => Some(Arc::new(lwe::pub_key_gen(lwe, &z))),
            KeyGenMode::Symmetric => None,
        };

        let bases = if multi_base {
            self.params.rgsw().gadget_bases().collect()
        } else {
            vec![base]
        };

        for b in bases {
            let key = self.engine.key_gen(
                b,
                &z,
                sk,
                AccKeyGenMode::Random,
                ksk.clone(),
                public_key.clone(),
            )?;

            self.install(key);
        }

        self.public_key = public_key;

        Ok(())
    }

    /// Generate the default base's bootstrapping key from given material: the ring secret
    /// `z`, a reference string supplying every RGSW mask, and a key switching key. Replaces
    /// any cached key for the base.
    pub fn bt_key_gen_test(
        &mut self,
        sk: &LwePrivateKey,
        z: &LwePrivateKey,
        acrs: &CommonReferenceString,
        ksk: KeySwitchKey,
        mode: KeyGenMode,
    ) -> Result<()> {
        let base = self.base();

        if acrs.base() != base {
            return Err(binfhe_engine::Error::ReferenceStringMismatch.into());
        }

        let public_key = match mode {
            KeyGenMode::Public => Some(Arc::new(lwe::pub_key_gen(self.params.lwe(), z))),
            KeyGenMode::Symmetric => None,
        };

        let key = self.engine.key_gen(
            base,
            z,
            sk,
            AccKeyGenMode::WithCrs(acrs),
            Arc::new(ksk),
            public_key.clone(),
        )?;

        self.install(key);
        self.public_key = public_key;

        Ok(())
    }

    /// Drop the cached keys for every base but the default one, returning how many were
    /// dropped. Fails unless the context was configured with [`CacheConfig::Clearable`].
    pub fn clear_key_cache(&mut self) -> Result<usize> {
        if self.cache == CacheConfig::Retain {
            return Err(Error::UnsupportedConfiguration(
                "the bootstrapping key cache is configured to retain keys".to_owned(),
            ));
        }

        let base = self.base();
        let before = self.keys.len();
        self.keys.retain(|b, _| *b == base);

        debug!("dropped {} cached bootstrapping keys", before - self.keys.len());

        Ok(before - self.keys.len())
    }
}
