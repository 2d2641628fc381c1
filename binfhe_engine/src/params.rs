use std::{collections::BTreeMap, sync::Arc};

use binfhe_math::ntt::NttTable;
use log::debug;
use serde::{Deserialize, Serialize};

pub use binfhe_math::security::SecretDistribution as KeyDistribution;

/// The gadget bases keyed in multi-base mode. Sign evaluation and digit decomposition switch
/// among these as the working modulus shrinks.
pub const MULTI_BASE_CANDIDATES: [u32; 3] = [1 << 14, 1 << 18, 1 << 27];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The blind rotation algorithm.
pub enum BootstrapMethod {
    /// Alperin-Sheriff–Peikert accumulation.
    Ap,

    /// Gama–Izabachène–Nguyen–Xie accumulation (also called CGGI).
    Ginx,

    /// Lee–Micciancio–Kim–Choi–Deryabin–Eom–Yoo accumulation.
    Lmkcdey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Parameters of the LWE layer.
pub struct LweParams {
    /// The small LWE dimension `n`.
    pub n: usize,

    /// The ring dimension `N`, which is also the dimension of extracted LWE samples.
    pub ring_dim: usize,

    /// The small ciphertext modulus `q` that carries plaintexts between bootstraps.
    pub q: u64,

    /// The large modulus `Q` of the accumulator.
    pub big_q: u64,

    /// The key switching modulus.
    pub q_ks: u64,

    /// The standard deviation of encryption noise.
    pub std_dev: f64,

    /// The radix of key switching decomposition.
    pub base_ks: u64,

    /// The distribution secret keys are drawn from.
    pub key_dist: KeyDistribution,
}

impl LweParams {
    /// The number of digits key switching decomposes a coordinate mod `q_ks` into.
    pub fn ks_digits(&self) -> usize {
        let mut digits = 1;
        let mut pow = self.base_ks as u128;

        while pow < self.q_ks as u128 {
            pow *= self.base_ks as u128;
            digits += 1;
        }

        digits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A signed radix decomposition modulo `Q` with a power of two base.
pub struct Gadget {
    /// The base `B`.
    pub base: u32,

    /// `log2(B)`.
    pub log_base: u32,

    /// The number of digits `d` with `B^d >= Q`.
    pub digits: usize,

    /// `B^l mod Q` for `l` in `0..d`.
    pub powers: Vec<u64>,
}

impl Gadget {
    /// Create the decomposition for `base` (a power of two) modulo `big_q`.
    ///
    /// # Panics
    /// If `base` isn't a power of two of at least 2.
    pub fn new(base: u32, big_q: u64) -> Self {
        assert!(base >= 2 && base.is_power_of_two());

        let log_base = base.trailing_zeros();
        let log_q = u64::BITS - big_q.leading_zeros();
        let digits = log_q.div_ceil(log_base) as usize;

        let powers = (0..digits)
            .map(|l| ((1u128 << (log_base as usize * l)) % big_q as u128) as u64)
            .collect();

        Self {
            base,
            log_base,
            digits,
            powers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The user-facing description of the accumulator layer. [`RgswParams`] adds the derived
/// gadget and transform tables.
pub struct RgswDef {
    /// The ring dimension `N`.
    pub ring_dim: usize,

    /// The accumulator modulus `Q`, a prime with `Q = 1 mod 2N`.
    pub big_q: u64,

    /// The small ciphertext modulus `q`.
    pub q: u64,

    /// The default gadget base.
    pub base_g: u32,

    /// The refresh key base. Only AP accumulation consumes it.
    pub base_r: u32,

    /// The blind rotation algorithm.
    pub method: BootstrapMethod,

    /// The standard deviation of RGSW encryption noise.
    pub std_dev: f64,

    /// The distribution of the ring secret.
    pub key_dist: KeyDistribution,

    /// Whether bootstrapping keys are generated for every base in
    /// [`MULTI_BASE_CANDIDATES`].
    pub multi_base: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RgswDef", into = "RgswDef")]
/// Parameters of the accumulator layer along with their precomputed gadget decompositions and
/// NTT table.
///
/// # Remarks
/// The default gadget base is fixed at construction. Operations that need another base look
/// its decomposition up with [`RgswParams::gadget`] instead of mutating the parameters.
pub struct RgswParams {
    def: RgswDef,
    gadgets: BTreeMap<u32, Gadget>,
    ntt: Arc<NttTable>,
}

impl PartialEq for RgswParams {
    fn eq(&self, other: &Self) -> bool {
        self.def == other.def
    }
}

impl TryFrom<RgswDef> for RgswParams {
    type Error = binfhe_math::Error;

    fn try_from(def: RgswDef) -> Result<Self, Self::Error> {
        Self::new(def)
    }
}

impl From<RgswParams> for RgswDef {
    fn from(value: RgswParams) -> Self {
        value.def
    }
}

impl RgswParams {
    /// Precompute the gadget power tables and the NTT table for `def`.
    pub fn new(def: RgswDef) -> binfhe_math::Result<Self> {
        let ntt = Arc::new(NttTable::new(def.ring_dim, def.big_q)?);

        let mut gadgets = BTreeMap::new();
        gadgets.insert(def.base_g, Gadget::new(def.base_g, def.big_q));

        if def.multi_base {
            for base in MULTI_BASE_CANDIDATES {
                gadgets.insert(base, Gadget::new(base, def.big_q));
            }
        }

        debug!(
            "RGSW params N={} Q={} q={} bases {:?}",
            def.ring_dim,
            def.big_q,
            def.q,
            gadgets.keys().collect::<Vec<_>>()
        );

        Ok(Self { def, gadgets, ntt })
    }

    /// The parameter description.
    pub fn def(&self) -> &RgswDef {
        &self.def
    }

    /// The ring dimension `N`.
    pub fn ring_dim(&self) -> usize {
        self.def.ring_dim
    }

    /// The accumulator modulus `Q`.
    pub fn big_q(&self) -> u64 {
        self.def.big_q
    }

    /// The small ciphertext modulus `q`.
    pub fn q(&self) -> u64 {
        self.def.q
    }

    /// The default gadget base.
    pub fn base_g(&self) -> u32 {
        self.def.base_g
    }

    /// The refresh key base.
    pub fn base_r(&self) -> u32 {
        self.def.base_r
    }

    /// The blind rotation algorithm.
    pub fn method(&self) -> BootstrapMethod {
        self.def.method
    }

    /// The standard deviation of RGSW noise.
    pub fn std_dev(&self) -> f64 {
        self.def.std_dev
    }

    /// The ring secret distribution.
    pub fn key_dist(&self) -> KeyDistribution {
        self.def.key_dist
    }

    /// Whether keys exist for every base in [`MULTI_BASE_CANDIDATES`].
    pub fn multi_base(&self) -> bool {
        self.def.multi_base
    }

    /// The decomposition for `base`, if this parameter set supports it.
    pub fn gadget(&self, base: u32) -> Option<&Gadget> {
        self.gadgets.get(&base)
    }

    /// The decomposition for the default base.
    pub fn default_gadget(&self) -> &Gadget {
        // The default base always has a gadget.
        &self.gadgets[&self.def.base_g]
    }

    /// Every base with a decomposition, in ascending order.
    pub fn gadget_bases(&self) -> impl Iterator<Item = u32> + '_ {
        self.gadgets.keys().copied()
    }

    /// The NTT table for `Z_Q[X]/(X^N + 1)`.
    pub fn ntt(&self) -> &NttTable {
        &self.ntt
    }
}
