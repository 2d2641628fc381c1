use std::{fmt, str::FromStr};

use binfhe_engine::{LweParams, RgswDef, RgswParams};
use binfhe_math::{
    primes::{first_prime, is_prime, previous_prime},
    security::{SecurityLevel, find_ring_dim},
};
use log::debug;
use serde::{Deserialize, Serialize};

pub use binfhe_engine::{BootstrapMethod, KeyDistribution};

use crate::{Error, Result};

/// The noise standard deviation of every preset.
pub const STD_DEV: f64 = 3.19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Named parameter presets.
///
/// # Remarks
/// The `*Q` sets target quantum security and the `*_OPT` sets shrink the LWE dimension for
/// faster key switching. [`ParamSet::Toy`] is insecure and intended for tests.
pub enum ParamSet {
    /// Insecure parameters for tests and examples.
    Toy,
    /// Roughly 100 bits of classical security.
    Medium,
    /// 128-bit classical security with Gaussian secrets.
    Std128Lmkcdey,
    /// 128-bit classical security tuned for AP accumulation.
    Std128Ap,
    /// [`ParamSet::Std128Ap`] with a smaller LWE dimension.
    Std128ApOpt,
    /// 128-bit classical security.
    Std128,
    /// [`ParamSet::Std128`] with a smaller LWE dimension.
    Std128Opt,
    /// 192-bit classical security.
    Std192,
    /// [`ParamSet::Std192`] with a smaller LWE dimension.
    Std192Opt,
    /// 256-bit classical security.
    Std256,
    /// [`ParamSet::Std256`] with a smaller LWE dimension.
    Std256Opt,
    /// 128-bit quantum security.
    Std128Q,
    /// [`ParamSet::Std128Q`] with a smaller LWE dimension.
    Std128QOpt,
    /// 192-bit quantum security.
    Std192Q,
    /// [`ParamSet::Std192Q`] with a smaller LWE dimension.
    Std192QOpt,
    /// 256-bit quantum security.
    Std256Q,
    /// [`ParamSet::Std256Q`] with a smaller LWE dimension.
    Std256QOpt,
    /// Parameters for testing signed modular reduction.
    SignedModTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// One row of the preset table.
pub struct Preset {
    /// The bit length the accumulator modulus `Q` is searched below.
    pub modulus_bits: u32,

    /// The cyclotomic order `2N`.
    pub cycl_order: usize,

    /// The LWE dimension `n`.
    pub n: usize,

    /// The ciphertext modulus `q`.
    pub q: u64,

    /// The key switching modulus. `None` uses `Q`.
    pub q_ks: Option<u64>,

    /// The key switching base.
    pub base_ks: u64,

    /// The gadget base.
    pub base_g: u32,

    /// The refresh key base.
    pub base_r: u32,

    /// The secret key distribution.
    pub key_dist: KeyDistribution,
}

#[allow(clippy::too_many_arguments)]
const fn preset(
    modulus_bits: u32,
    cycl_order: usize,
    n: usize,
    q: u64,
    q_ks: Option<u64>,
    base_ks: u64,
    base_g: u32,
    base_r: u32,
) -> Preset {
    Preset {
        modulus_bits,
        cycl_order,
        n,
        q,
        q_ks,
        base_ks,
        base_g,
        base_r,
        key_dist: KeyDistribution::UniformTernary,
    }
}

impl ParamSet {
    /// Every preset.
    pub const ALL: [ParamSet; 18] = [
        Self::Toy,
        Self::Medium,
        Self::Std128Lmkcdey,
        Self::Std128Ap,
        Self::Std128ApOpt,
        Self::Std128,
        Self::Std128Opt,
        Self::Std192,
        Self::Std192Opt,
        Self::Std256,
        Self::Std256Opt,
        Self::Std128Q,
        Self::Std128QOpt,
        Self::Std192Q,
        Self::Std192QOpt,
        Self::Std256Q,
        Self::Std256QOpt,
        Self::SignedModTest,
    ];

    /// The preset's canonical name, e.g. `STD128_OPT`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Toy => "TOY",
            Self::Medium => "MEDIUM",
            Self::Std128Lmkcdey => "STD128_LMKCDEY",
            Self::Std128Ap => "STD128_AP",
            Self::Std128ApOpt => "STD128_APOPT",
            Self::Std128 => "STD128",
            Self::Std128Opt => "STD128_OPT",
            Self::Std192 => "STD192",
            Self::Std192Opt => "STD192_OPT",
            Self::Std256 => "STD256",
            Self::Std256Opt => "STD256_OPT",
            Self::Std128Q => "STD128Q",
            Self::Std128QOpt => "STD128Q_OPT",
            Self::Std192Q => "STD192Q",
            Self::Std192QOpt => "STD192Q_OPT",
            Self::Std256Q => "STD256Q",
            Self::Std256QOpt => "STD256Q_OPT",
            Self::SignedModTest => "SIGNED_MOD_TEST",
        }
    }

    /// The preset's table row.
    pub fn preset(self) -> Preset {
        match self {
            Self::Toy => preset(27, 1024, 64, 512, None, 25, 1 << 9, 23),
            Self::Medium => preset(28, 2048, 422, 1024, Some(1 << 14), 1 << 7, 1 << 10, 32),
            Self::Std128Lmkcdey => Preset {
                key_dist: KeyDistribution::Gaussian,
                ..preset(28, 2048, 458, 1024, Some(1 << 14), 1 << 7, 1 << 10, 32)
            },
            Self::Std128Ap => preset(27, 2048, 512, 1024, Some(1 << 14), 1 << 7, 1 << 9, 32),
            Self::Std128ApOpt => preset(27, 2048, 502, 1024, Some(1 << 14), 1 << 7, 1 << 9, 32),
            Self::Std128 => preset(27, 2048, 512, 1024, Some(1 << 14), 1 << 7, 1 << 7, 32),
            Self::Std128Opt => preset(27, 2048, 502, 1024, Some(1 << 14), 1 << 7, 1 << 7, 32),
            Self::Std192 => preset(37, 4096, 1024, 1024, Some(1 << 19), 28, 1 << 13, 32),
            Self::Std192Opt => preset(37, 4096, 805, 1024, Some(1 << 15), 32, 1 << 13, 32),
            Self::Std256 => preset(29, 4096, 1024, 2048, Some(1 << 14), 1 << 7, 1 << 8, 46),
            Self::Std256Opt => preset(29, 4096, 990, 2048, Some(1 << 14), 1 << 7, 1 << 8, 46),
            Self::Std128Q => preset(50, 4096, 1024, 1024, Some(1 << 25), 32, 1 << 25, 32),
            Self::Std128QOpt => preset(50, 4096, 585, 1024, Some(1 << 15), 32, 1 << 25, 32),
            Self::Std192Q => preset(35, 4096, 1024, 1024, Some(1 << 17), 64, 1 << 12, 32),
            Self::Std192QOpt => preset(35, 4096, 875, 1024, Some(1 << 15), 32, 1 << 12, 32),
            Self::Std256Q => preset(27, 4096, 2048, 2048, Some(1 << 16), 16, 1 << 7, 46),
            Self::Std256QOpt => preset(27, 4096, 1225, 1024, Some(1 << 16), 16, 1 << 7, 32),
            Self::SignedModTest => preset(28, 2048, 512, 1024, None, 25, 1 << 7, 23),
        }
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|set| set.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownParameterSet(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Parameters given value by value instead of by preset.
pub struct ExplicitParams {
    /// The LWE dimension `n`.
    pub n: usize,

    /// The ring dimension `N`.
    pub ring_dim: usize,

    /// The ciphertext modulus `q`.
    pub q: u64,

    /// The accumulator modulus `Q`, a prime with `Q = 1 mod 2N`.
    pub big_q: u64,

    /// The noise standard deviation.
    pub std_dev: f64,

    /// The key switching base.
    pub base_ks: u64,

    /// The gadget base.
    pub base_g: u32,

    /// The refresh key base.
    pub base_r: u32,

    /// The blind rotation algorithm.
    pub method: BootstrapMethod,

    /// The key switching modulus. `None` uses `Q`.
    pub q_ks: Option<u64>,

    /// The secret key distribution.
    pub key_dist: KeyDistribution,

    /// Whether to generate bootstrapping keys for every multi-base candidate.
    pub multi_base: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The combined LWE and accumulator parameters of a [`crate::BinFheContext`].
///
/// # Remarks
/// Every constructor validates that `Q` is an NTT-friendly prime, that `q <= Q` divides `2N`
/// and that `n <= N`. Only GINX blind rotation is implemented; the other
/// [`BootstrapMethod`]s are rejected.
///
/// `beta` is the margin [`crate::BinFheContext::eval_func`] and the precision primitives
/// leave around each plaintext. It is 128, capped at `q / 16` for small moduli.
pub struct Params {
    lwe: LweParams,
    rgsw: RgswParams,
    beta: u64,
    parties: usize,
}

fn unsupported(msg: impl Into<String>) -> Error {
    Error::UnsupportedConfiguration(msg.into())
}

fn ntt_prime(bits: u32, cycl_order: u64) -> Result<u64> {
    Ok(previous_prime(first_prime(bits, cycl_order)?, cycl_order)?)
}

impl Params {
    /// Look up a preset for a single party.
    pub fn from_preset(set: ParamSet, method: BootstrapMethod) -> Result<Self> {
        Self::from_preset_with_parties(set, method, 1)
    }

    /// Look up a preset, recording the number of parties for threshold key generation and
    /// decryption.
    pub fn from_preset_with_parties(
        set: ParamSet,
        method: BootstrapMethod,
        parties: usize,
    ) -> Result<Self> {
        let p = set.preset();
        let big_q = ntt_prime(p.modulus_bits, p.cycl_order as u64)?;
        let ring_dim = p.cycl_order / 2;

        let lwe = LweParams {
            n: p.n,
            ring_dim,
            q: p.q,
            big_q,
            q_ks: p.q_ks.unwrap_or(big_q),
            std_dev: STD_DEV,
            base_ks: p.base_ks,
            key_dist: p.key_dist,
        };

        let rgsw = RgswDef {
            ring_dim,
            big_q,
            q: p.q,
            base_g: p.base_g,
            base_r: p.base_r,
            method,
            std_dev: STD_DEV,
            key_dist: p.key_dist,
            multi_base: false,
        };

        debug!("preset {set}: N={ring_dim} Q={big_q} n={} q={}", p.n, p.q);

        Self::assemble(lwe, rgsw, parties)
    }

    /// Derive parameters from a bound on `log2(q)` of the messages to be bootstrapped.
    ///
    /// # Remarks
    /// The gadget base shrinks as `log_q` grows: above 25 bits it is `2^14`, above 16 bits
    /// `2^18`, above 11 bits `2^27`, and at exactly 11 bits `2^5` with a 27-bit `Q` instead of
    /// 54 bits. `N` is the smallest ring dimension giving 128-bit security for ternary secrets
    /// at that modulus, raised to `min_ring_dim`. `q` is `N` when `arb_func` is set (arbitrary
    /// lookup tables need `q <= N`) and `2N` otherwise, for the largest plaintext space.
    ///
    /// Only [`ParamSet::Std128`] and [`ParamSet::Toy`] (which shrinks `n` to 32) are accepted,
    /// and `log_q` must lie in `11..=29`. `time_optimization` generates keys for every
    /// multi-base candidate so sign evaluation and decomposition can switch bases.
    pub fn from_security_level(
        set: ParamSet,
        arb_func: bool,
        log_q: u32,
        min_ring_dim: usize,
        method: BootstrapMethod,
        time_optimization: bool,
    ) -> Result<Self> {
        if method != BootstrapMethod::Ginx {
            return Err(unsupported(format!(
                "{method:?} blind rotation isn't implemented; use GINX"
            )));
        }

        if set != ParamSet::Std128 && set != ParamSet::Toy {
            return Err(unsupported(format!(
                "{set} can't be derived from a security level; use STD128 or TOY"
            )));
        }

        if !(11..=29).contains(&log_q) {
            return Err(unsupported(format!("log q = {log_q} is outside 11..=29")));
        }

        let (base_g, log_big_q) = match log_q {
            26.. => (1 << 14, 54),
            17.. => (1 << 18, 54),
            12.. => (1 << 27, 54),
            _ => (1 << 5, 27),
        };

        let ring_dim = find_ring_dim(
            KeyDistribution::UniformTernary,
            SecurityLevel::Classic128,
            log_big_q,
        )?
        .max(min_ring_dim);

        if !ring_dim.is_power_of_two() {
            return Err(unsupported(format!(
                "ring dimension {ring_dim} isn't a power of two"
            )));
        }

        let big_q = ntt_prime(log_big_q, 2 * ring_dim as u64)?;
        let q = if arb_func {
            ring_dim as u64
        } else {
            2 * ring_dim as u64
        };
        let n = if set == ParamSet::Toy { 32 } else { 1305 };

        let lwe = LweParams {
            n,
            ring_dim,
            q,
            big_q,
            q_ks: 1 << 35,
            std_dev: STD_DEV,
            base_ks: 32,
            key_dist: KeyDistribution::UniformTernary,
        };

        let rgsw = RgswDef {
            ring_dim,
            big_q,
            q,
            base_g,
            base_r: 23,
            method,
            std_dev: STD_DEV,
            key_dist: KeyDistribution::UniformTernary,
            multi_base: log_q != 11 && time_optimization,
        };

        debug!(
            "derived parameters for log q = {log_q}: N={ring_dim} Q={big_q} q={q} baseG={base_g}"
        );

        Self::assemble(lwe, rgsw, 1)
    }

    /// Use explicitly given parameters.
    pub fn from_explicit(p: &ExplicitParams) -> Result<Self> {
        let lwe = LweParams {
            n: p.n,
            ring_dim: p.ring_dim,
            q: p.q,
            big_q: p.big_q,
            q_ks: p.q_ks.unwrap_or(p.big_q),
            std_dev: p.std_dev,
            base_ks: p.base_ks,
            key_dist: p.key_dist,
        };

        let rgsw = RgswDef {
            ring_dim: p.ring_dim,
            big_q: p.big_q,
            q: p.q,
            base_g: p.base_g,
            base_r: p.base_r,
            method: p.method,
            std_dev: p.std_dev,
            key_dist: p.key_dist,
            multi_base: p.multi_base,
        };

        Self::assemble(lwe, rgsw, 1)
    }

    fn assemble(lwe: LweParams, rgsw: RgswDef, parties: usize) -> Result<Self> {
        Self::validate(&lwe, &rgsw, parties)?;

        let beta = (lwe.q / 16).min(128);
        let rgsw = RgswParams::new(rgsw)?;

        Ok(Self {
            lwe,
            rgsw,
            beta,
            parties,
        })
    }

    fn validate(lwe: &LweParams, rgsw: &RgswDef, parties: usize) -> Result<()> {
        if rgsw.method != BootstrapMethod::Ginx {
            return Err(unsupported(format!(
                "{:?} blind rotation isn't implemented; use GINX",
                rgsw.method
            )));
        }

        let n_big = lwe.ring_dim;
        let two_n = 2 * n_big as u64;

        if n_big < 2 || !n_big.is_power_of_two() {
            return Err(unsupported(format!(
                "ring dimension {n_big} isn't a power of two"
            )));
        }

        if lwe.big_q >= 1 << 62 || !is_prime(lwe.big_q) || lwe.big_q % two_n != 1 {
            return Err(unsupported(format!(
                "Q = {} isn't a prime below 2^62 congruent to 1 mod {two_n}",
                lwe.big_q
            )));
        }

        if lwe.q < 16 || lwe.q > lwe.big_q || two_n % lwe.q != 0 {
            return Err(unsupported(format!(
                "q = {} must be at least 16, at most Q and divide 2N = {two_n}",
                lwe.q
            )));
        }

        if lwe.n == 0 || lwe.n > n_big {
            return Err(unsupported(format!("n = {} must lie in 1..={n_big}", lwe.n)));
        }

        if lwe.q_ks < 2 || lwe.q_ks >= 1 << 62 || lwe.base_ks < 2 {
            return Err(unsupported(format!(
                "key switching modulus {} or base {} is out of range",
                lwe.q_ks, lwe.base_ks
            )));
        }

        if rgsw.base_g < 2 || !rgsw.base_g.is_power_of_two() {
            return Err(unsupported(format!(
                "gadget base {} isn't a power of two",
                rgsw.base_g
            )));
        }

        if parties == 0 {
            return Err(unsupported("at least one party is required"));
        }

        Ok(())
    }

    /// The LWE parameters.
    pub fn lwe(&self) -> &LweParams {
        &self.lwe
    }

    /// The accumulator parameters.
    pub fn rgsw(&self) -> &RgswParams {
        &self.rgsw
    }

    /// The rounding margin around each plaintext used by lookup table evaluation.
    pub fn beta(&self) -> u64 {
        self.beta
    }

    /// The number of parties in threshold key generation and decryption.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// The largest plaintext modulus lookup tables can be evaluated over: `q / (2 beta)`.
    pub fn max_plaintext_space(&self) -> u64 {
        self.lwe.q / (2 * self.beta)
    }
}
