use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock},
};

use binfhe_math::primes::{first_prime, previous_prime};

use crate::{
    BootstrapMethod, KeyDistribution, LweParams, RgswDef, RgswParams,
    entities::{BootstrappingKey, LwePrivateKey},
    ops::{keygen, lwe},
};

/// Keys for bootstrapping tests, generated once per process.
pub struct TestKeys {
    pub lwe: LweParams,
    pub rgsw: RgswParams,
    pub sk: LwePrivateKey,
    pub z: LwePrivateKey,
    pub keys: BTreeMap<u32, Arc<BootstrappingKey>>,
}

impl TestKeys {
    pub fn default_key(&self) -> &BootstrappingKey {
        &self.keys[&self.rgsw.base_g()]
    }
}

static SMALL_KEYS: OnceLock<Arc<TestKeys>> = OnceLock::new();
static LARGE_KEYS: OnceLock<Arc<TestKeys>> = OnceLock::new();

fn prime(bits: u32, ring_dim: usize) -> u64 {
    let m = 2 * ring_dim as u64;

    previous_prime(first_prime(bits, m).unwrap(), m).unwrap()
}

/// A toy parameter set: `n = 64`, `N = 512`, `q = 512`, a 27-bit `Q` that is also the key
/// switching modulus.
pub fn test_lwe_params() -> LweParams {
    let big_q = prime(27, 512);

    LweParams {
        n: 64,
        ring_dim: 512,
        q: 512,
        big_q,
        q_ks: big_q,
        std_dev: 3.19,
        base_ks: 25,
        key_dist: KeyDistribution::UniformTernary,
    }
}

pub fn test_rgsw_params() -> RgswParams {
    let lwe = test_lwe_params();

    RgswParams::new(RgswDef {
        ring_dim: lwe.ring_dim,
        big_q: lwe.big_q,
        q: lwe.q,
        base_g: 1 << 9,
        base_r: 23,
        method: BootstrapMethod::Ginx,
        std_dev: lwe.std_dev,
        key_dist: KeyDistribution::UniformTernary,
        multi_base: false,
    })
    .unwrap()
}

/// Large precision parameters: `N = 1024`, a 54-bit `Q`, `q = 2048` and keys for every base in
/// [`crate::MULTI_BASE_CANDIDATES`].
pub fn test_large_lwe_params() -> LweParams {
    LweParams {
        n: 32,
        ring_dim: 1024,
        q: 2048,
        big_q: prime(54, 1024),
        q_ks: 1 << 35,
        std_dev: 3.19,
        base_ks: 4,
        key_dist: KeyDistribution::UniformTernary,
    }
}

pub fn test_large_rgsw_params() -> RgswParams {
    let lwe = test_large_lwe_params();

    RgswParams::new(RgswDef {
        ring_dim: lwe.ring_dim,
        big_q: lwe.big_q,
        q: lwe.q,
        base_g: 1 << 18,
        base_r: 32,
        method: BootstrapMethod::Ginx,
        std_dev: lwe.std_dev,
        key_dist: KeyDistribution::UniformTernary,
        multi_base: true,
    })
    .unwrap()
}

/// A ternary ring secret at `(N, Q)`.
pub fn test_ring_key(params: &LweParams) -> LwePrivateKey {
    lwe::key_gen(params.ring_dim, params.big_q)
}

fn make_keys(lwe: LweParams, rgsw: RgswParams) -> TestKeys {
    let sk = lwe::key_gen(lwe.n, lwe.q_ks);
    let z = test_ring_key(&lwe);
    let ksk = Arc::new(lwe::key_switch_gen(&lwe, &sk, &z).unwrap());

    let keys = rgsw
        .gadget_bases()
        .map(|base| {
            let acc = keygen::acc_key_gen(&rgsw, base, &z, &sk).unwrap();

            let key = BootstrappingKey {
                acc,
                ksk: ksk.clone(),
                public_key: None,
            };

            (base, Arc::new(key))
        })
        .collect();

    TestKeys {
        lwe,
        rgsw,
        sk,
        z,
        keys,
    }
}

pub fn get_small_keys() -> Arc<TestKeys> {
    SMALL_KEYS
        .get_or_init(|| Arc::new(make_keys(test_lwe_params(), test_rgsw_params())))
        .clone()
}

pub fn get_large_keys() -> Arc<TestKeys> {
    LARGE_KEYS
        .get_or_init(|| {
            Arc::new(make_keys(test_large_lwe_params(), test_large_rgsw_params()))
        })
        .clone()
}
