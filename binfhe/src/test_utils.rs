use std::sync::{Arc, OnceLock};

use binfhe_engine::entities::LwePrivateKey;
use binfhe_math::primes::{first_prime, previous_prime};

use crate::{
    BinFheContext, BootstrapMethod, ExplicitParams, KeyDistribution, KeyGenMode, ParamSet,
    STD_DEV,
};

/// A context with bootstrapping keys for `sk`.
pub struct TestContext {
    pub ctx: BinFheContext,
    pub sk: LwePrivateKey,
}

static TOY_CONTEXT: OnceLock<Arc<TestContext>> = OnceLock::new();
static LARGE_CONTEXT: OnceLock<Arc<TestContext>> = OnceLock::new();

/// A fresh [`ParamSet::Toy`] context without keys.
pub fn toy_context() -> BinFheContext {
    BinFheContext::from_preset(ParamSet::Toy, BootstrapMethod::Ginx).unwrap()
}

/// Multi-base parameters for sign and decomposition tests: `n = 32`, `N = 1024`, `q = 2048`, a
/// 54-bit `Q` and default gadget base `2^18`.
pub fn large_params() -> ExplicitParams {
    let m = 2048;

    ExplicitParams {
        n: 32,
        ring_dim: 1024,
        q: 2048,
        big_q: previous_prime(first_prime(54, m).unwrap(), m).unwrap(),
        std_dev: STD_DEV,
        base_ks: 4,
        base_g: 1 << 18,
        base_r: 32,
        method: BootstrapMethod::Ginx,
        q_ks: Some(1 << 35),
        key_dist: KeyDistribution::UniformTernary,
        multi_base: true,
    }
}

fn with_keys(mut ctx: BinFheContext, mode: KeyGenMode) -> TestContext {
    let sk = ctx.key_gen();
    ctx.bt_key_gen(&sk, mode).unwrap();

    TestContext { ctx, sk }
}

/// A [`ParamSet::Toy`] context with a public key, generated once per process.
pub fn get_toy_context() -> Arc<TestContext> {
    TOY_CONTEXT
        .get_or_init(|| Arc::new(with_keys(toy_context(), KeyGenMode::Public)))
        .clone()
}

/// A context over [`large_params`] with keys for every multi-base candidate, generated once
/// per process.
pub fn get_large_context() -> Arc<TestContext> {
    LARGE_CONTEXT
        .get_or_init(|| {
            let ctx = BinFheContext::from_explicit(&large_params()).unwrap();

            Arc::new(with_keys(ctx, KeyGenMode::Symmetric))
        })
        .clone()
}
