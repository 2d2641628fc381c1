use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    LweParams, Result, RgswParams,
    entities::{
        AccumulatorKey, BootstrappingKey, CommonReferenceString, KeySwitchKey, LweCiphertext,
        LwePrivateKey, LwePublicKey, RgswCiphertext,
    },
    ops::{
        bootstrapping::{self, BinGate, KeyLookup},
        keygen,
    },
};

/// How [`AccumulatorEngine::key_gen`] encrypts the accumulator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccKeyGenMode<'a> {
    /// Fresh uniform masks.
    Random,

    /// Masks taken from a reference string, for reproducible keys in tests.
    WithCrs(&'a CommonReferenceString),
}

/// The accumulator engine: key generation and every bootstrapped evaluation for one parameter
/// set.
///
/// # Remarks
/// The engine counts accumulator key generations and bootstrapped evaluations so callers can
/// observe whether cached keys were reused.
pub struct AccumulatorEngine {
    lwe: LweParams,
    rgsw: RgswParams,
    key_generations: AtomicUsize,
    evaluations: AtomicUsize,
}

impl AccumulatorEngine {
    /// Create an engine for the given parameters.
    pub fn new(lwe: LweParams, rgsw: RgswParams) -> Self {
        Self {
            lwe,
            rgsw,
            key_generations: AtomicUsize::new(0),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// The LWE parameters.
    pub fn lwe_params(&self) -> &LweParams {
        &self.lwe
    }

    /// The accumulator parameters.
    pub fn rgsw_params(&self) -> &RgswParams {
        &self.rgsw
    }

    /// How many accumulator keys this engine has generated.
    pub fn key_generations(&self) -> usize {
        self.key_generations.load(Ordering::Relaxed)
    }

    /// How many bootstrapped evaluations this engine has run.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn generated(&self, acc: AccumulatorKey) -> AccumulatorKey {
        self.key_generations.fetch_add(1, Ordering::Relaxed);

        acc
    }

    fn evaluated<T>(&self, out: Result<T>) -> Result<T> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);

        out
    }

    /// Generate a bootstrapping key for gadget base `base` from the ring secret `z` and the LWE
    /// secret `s`, pairing it with `ksk` and an optional public key.
    pub fn key_gen(
        &self,
        base: u32,
        z: &LwePrivateKey,
        s: &LwePrivateKey,
        mode: AccKeyGenMode,
        ksk: Arc<KeySwitchKey>,
        public_key: Option<Arc<LwePublicKey>>,
    ) -> Result<BootstrappingKey> {
        let acc = match mode {
            AccKeyGenMode::Random => keygen::acc_key_gen(&self.rgsw, base, z, s)?,
            AccKeyGenMode::WithCrs(acrs) => keygen::acc_key_gen_with_crs(&self.rgsw, z, s, acrs)?,
        };

        Ok(BootstrappingKey {
            acc: self.generated(acc),
            ksk,
            public_key,
        })
    }

    /// One party's round of threshold accumulator key generation. See
    /// [`keygen::multiparty_acc_key_gen`].
    #[allow(clippy::too_many_arguments)]
    pub fn multiparty_key_gen(
        &self,
        s_i: &LwePrivateKey,
        prev: Option<&AccumulatorKey>,
        acrs: &CommonReferenceString,
        joint_zero: &RgswCiphertext,
        ksk: Arc<KeySwitchKey>,
        public_key: Option<Arc<LwePublicKey>>,
        lead: bool,
        parties: usize,
    ) -> Result<BootstrappingKey> {
        let acc =
            keygen::multiparty_acc_key_gen(&self.rgsw, s_i, prev, acrs, joint_zero, lead, parties)?;

        Ok(BootstrappingKey {
            acc: self.generated(acc),
            ksk,
            public_key,
        })
    }

    /// See [`bootstrapping::eval_bin_gate`].
    pub fn eval_bin_gate(
        &self,
        key: &BootstrappingKey,
        gate: BinGate,
        ct1: &LweCiphertext,
        ct2: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.evaluated(bootstrapping::eval_bin_gate(
            &self.lwe, &self.rgsw, key, gate, ct1, ct2,
        ))
    }

    /// See [`bootstrapping::bootstrap`].
    pub fn bootstrap(&self, key: &BootstrappingKey, ct: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluated(bootstrapping::bootstrap(&self.lwe, &self.rgsw, key, ct))
    }

    /// See [`bootstrapping::eval_not`]. Doesn't bootstrap.
    pub fn eval_not(&self, ct: &LweCiphertext) -> LweCiphertext {
        bootstrapping::eval_not(ct)
    }

    /// See [`bootstrapping::eval_func`].
    pub fn eval_func(
        &self,
        key: &BootstrappingKey,
        ct: &LweCiphertext,
        lut: &[u64],
        beta: u64,
    ) -> Result<LweCiphertext> {
        self.evaluated(bootstrapping::eval_func(
            &self.lwe, &self.rgsw, key, ct, lut, beta,
        ))
    }

    /// See [`bootstrapping::eval_floor`].
    pub fn eval_floor(
        &self,
        key: &BootstrappingKey,
        ct: &LweCiphertext,
        beta: u64,
        round_bits: u32,
    ) -> Result<LweCiphertext> {
        self.evaluated(bootstrapping::eval_floor(
            &self.lwe, &self.rgsw, key, ct, beta, round_bits,
        ))
    }

    /// See [`bootstrapping::eval_sign`].
    pub fn eval_sign<K: KeyLookup>(
        &self,
        keys: &K,
        base: u32,
        ct: &LweCiphertext,
        beta: u64,
    ) -> Result<LweCiphertext> {
        self.evaluated(bootstrapping::eval_sign(
            &self.lwe, &self.rgsw, keys, base, ct, beta,
        ))
    }

    /// See [`bootstrapping::eval_decomp`].
    pub fn eval_decomp<K: KeyLookup>(
        &self,
        keys: &K,
        base: u32,
        ct: &LweCiphertext,
        beta: u64,
    ) -> Result<Vec<LweCiphertext>> {
        self.evaluated(bootstrapping::eval_decomp(
            &self.lwe, &self.rgsw, keys, base, ct, beta,
        ))
    }
}
