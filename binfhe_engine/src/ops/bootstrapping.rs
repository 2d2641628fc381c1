use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use binfhe_math::{
    modular::{mod_neg, scale_round},
    poly::Poly,
};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    Error, LweParams, Result, RgswParams,
    entities::{BootstrappingKey, LweCiphertext, RlweCiphertext},
    ops::{
        blind_rotation::{blind_rotate, sample_extract},
        lwe::{key_switch, mod_switch},
    },
};

/// Finds the bootstrapping key for a gadget base. Sign evaluation and digit decomposition switch
/// bases as the working modulus shrinks.
pub trait KeyLookup {
    /// The key for `base`, if one was generated.
    fn key(&self, base: u32) -> Option<&BootstrappingKey>;
}

impl KeyLookup for BTreeMap<u32, Arc<BootstrappingKey>> {
    fn key(&self, base: u32) -> Option<&BootstrappingKey> {
        self.get(&base).map(|k| k.as_ref())
    }
}

impl KeyLookup for HashMap<u32, Arc<BootstrappingKey>> {
    fn key(&self, base: u32) -> Option<&BootstrappingKey> {
        self.get(&base).map(|k| k.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A two-input Boolean gate.
pub enum BinGate {
    /// `a | b`
    Or,

    /// `a & b`
    And,

    /// `!(a | b)`
    Nor,

    /// `!(a & b)`
    Nand,

    /// `a ^ b`
    Xor,

    /// `!(a ^ b)`
    Xnor,
}

impl BinGate {
    /// Every gate.
    pub const ALL: [BinGate; 6] = [
        BinGate::Or,
        BinGate::And,
        BinGate::Nor,
        BinGate::Nand,
        BinGate::Xor,
        BinGate::Xnor,
    ];

    /// Evaluate the gate on plaintext bits.
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::Or => a | b,
            Self::And => a & b,
            Self::Nor => !(a | b),
            Self::Nand => !(a & b),
            Self::Xor => a ^ b,
            Self::Xnor => !(a ^ b),
        }
    }

    /// The start of the half-circle of phases that decrypt to the gate's majority output, in
    /// units of `q / 8`.
    fn eighths(self) -> u64 {
        match self {
            Self::Or => 5,
            Self::And => 7,
            Self::Nor => 1,
            Self::Nand => 3,
            Self::Xor => 7,
            Self::Xnor => 3,
        }
    }
}

/// Whether a lookup table can be evaluated with one blind rotation or needs the tricks in
/// [`eval_func`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LutKind {
    /// `lut[i + q/2] = -lut[i]`: one bootstrap.
    Negacyclic,

    /// `lut[i + q/2] = lut[i]`: two bootstraps.
    Periodic,

    /// Anything else: two bootstraps over `2q`, requiring `q <= N`.
    Arbitrary,
}

/// Classify `lut`, a table of outputs mod `q` indexed by phase.
pub fn classify_lut(lut: &[u64], q: u64) -> LutKind {
    let mid = lut.len() / 2;
    let (lo, hi) = lut.split_at(mid);

    if lo.iter().zip(hi).all(|(x, y)| *x == mod_neg(*y % q, q)) {
        LutKind::Negacyclic
    } else if lo == hi {
        LutKind::Periodic
    } else {
        LutKind::Arbitrary
    }
}

fn check_input(lwe: &LweParams, ct: &LweCiphertext) -> Result<()> {
    if ct.dim() != lwe.n {
        return Err(Error::DimensionMismatch {
            expected: lwe.n,
            actual: ct.dim(),
        });
    }

    Ok(())
}

/// Blind rotate `m` by the phase of `ct` and extract the constant coefficient at `(N, Q)`.
fn rotate_and_extract(
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
    m: Poly,
) -> Result<LweCiphertext> {
    let mut acc = RlweCiphertext::trivial(m);
    blind_rotate(rgsw, &mut acc, &key.acc, ct.a(), ct.modulus())?;

    Ok(sample_extract(&acc, rgsw.big_q()))
}

/// Take an extracted sample at `(N, Q)` back to `(n, out_modulus)`.
fn finish(
    lwe: &LweParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
    out_modulus: u64,
) -> Result<LweCiphertext> {
    let ct = mod_switch(ct, lwe.q_ks);
    let ct = key_switch(&key.ksk, &ct)?;

    Ok(mod_switch(&ct, out_modulus))
}

/// Programmable bootstrapping: refresh `ct` (modulus `q'` dividing `2N`) into a ciphertext mod
/// `out_modulus` whose phase is `f(phase(ct), q')`.
///
/// # Remarks
/// `f` is only sampled on half the phases; the result for `x >= q'/2` is `-f(x - q'/2)`, so
/// `f` must be negacyclic on the phases `ct` can take. Outputs are taken mod `out_modulus`.
pub fn bootstrap_func<F>(
    lwe: &LweParams,
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
    f: F,
    out_modulus: u64,
) -> Result<LweCiphertext>
where
    F: Fn(u64, u64) -> u64,
{
    check_input(lwe, ct)?;

    let n = rgsw.ring_dim();
    let big_q = rgsw.big_q();
    let ct_mod = ct.modulus();
    let two_n = 2 * n as u64;

    if two_n % ct_mod != 0 {
        return Err(Error::UnsupportedModulus {
            modulus: ct_mod,
            two_n,
        });
    }

    let factor = (two_n / ct_mod) as usize;
    let b = ct.b();
    let mut m = Poly::zero(n);

    for j in 0..(ct_mod / 2) {
        let x = (b + ct_mod - j) % ct_mod;
        let y = f(x, ct_mod) % out_modulus;

        m.coeffs[j as usize * factor] = scale_round(y, out_modulus, big_q);
    }

    let extracted = rotate_and_extract(rgsw, key, ct, m)?;

    finish(lwe, key, &extracted, out_modulus)
}

fn gate_core(
    lwe: &LweParams,
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
    eighths: u64,
) -> Result<LweCiphertext> {
    let n = rgsw.ring_dim();
    let big_q = rgsw.big_q();
    let q = ct.modulus();
    let two_n = 2 * n as u64;

    if two_n % q != 0 {
        return Err(Error::UnsupportedModulus { modulus: q, two_n });
    }

    let q1 = eighths * (q >> 3);
    let q2 = (q1 + (q >> 1)) % q;

    let pos = big_q / 8 + 1;
    let neg = big_q - pos;

    let factor = (two_n / q) as usize;
    let b = ct.b();
    let mut m = Poly::zero(n);

    for j in 0..(q / 2) {
        let t = (b + q - j) % q;

        m.coeffs[j as usize * factor] = if q1 < q2 {
            if t >= q1 && t < q2 { neg } else { pos }
        } else if t >= q2 && t < q1 {
            pos
        } else {
            neg
        };
    }

    let mut extracted = rotate_and_extract(rgsw, key, ct, m)?;
    extracted.add_const(pos);

    finish(lwe, key, &extracted, lwe.q)
}

fn check_gate_input(lwe: &LweParams, ct: &LweCiphertext) -> Result<()> {
    check_input(lwe, ct)?;

    if ct.modulus() != lwe.q {
        return Err(Error::ModulusMismatch {
            expected: lwe.q,
            actual: ct.modulus(),
        });
    }

    Ok(())
}

/// Evaluate `gate` on two bit encryptions (`p = 4`, modulus `q`) with one bootstrap.
pub fn eval_bin_gate(
    lwe: &LweParams,
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    gate: BinGate,
    ct1: &LweCiphertext,
    ct2: &LweCiphertext,
) -> Result<LweCiphertext> {
    check_gate_input(lwe, ct1)?;
    check_gate_input(lwe, ct2)?;

    let mut prep = ct1.clone();
    prep.add_assign(ct2);

    if matches!(gate, BinGate::Xor | BinGate::Xnor) {
        prep = prep.scale(2);
    }

    gate_core(lwe, rgsw, key, &prep, gate.eighths())
}

/// Refresh a bit encryption.
pub fn bootstrap(
    lwe: &LweParams,
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
) -> Result<LweCiphertext> {
    check_gate_input(lwe, ct)?;

    let mut prep = ct.clone();
    prep.add_const(lwe.q >> 2);

    gate_core(lwe, rgsw, key, &prep, BinGate::And.eighths())
}

/// Negate a bit encryption without bootstrapping: `(-a, q/4 - b)`.
pub fn eval_not(ct: &LweCiphertext) -> LweCiphertext {
    let mut out = ct.neg();
    out.add_const(ct.modulus() >> 2);

    out
}

/// `x < q/2` maps to `-q/4`, the rest to `q/4`.
fn half_select(x: u64, q: u64, out: u64) -> u64 {
    if x < q / 2 { out - q / 4 } else { q / 4 }
}

/// The table extended negacyclically: `x >= q/2` reads `-lut[x - q/2]`.
fn negacyclic_extension(lut: &[u64], x: u64, q: u64, out: u64) -> u64 {
    let half = q / 2;

    if x < half {
        lut[x as usize]
    } else {
        out - lut[(x - half) as usize] % out
    }
}

/// Evaluate a lookup table on `ct` (modulus `q`): the result encrypts `lut[phase(ct) + beta]`.
///
/// # Remarks
/// Negacyclic tables cost one bootstrap. Periodic ones first fold the phase into `[0, q/2)`.
/// Arbitrary tables lift the ciphertext to `2q`, fold it into `[0, q)` and need `q <= N`.
pub fn eval_func(
    lwe: &LweParams,
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
    lut: &[u64],
    beta: u64,
) -> Result<LweCiphertext> {
    let q = ct.modulus();

    if lut.len() as u64 != q {
        return Err(Error::DimensionMismatch {
            expected: q as usize,
            actual: lut.len(),
        });
    }

    match classify_lut(lut, q) {
        LutKind::Negacyclic => {
            let mut ct1 = ct.clone();
            ct1.add_const(beta);

            bootstrap_func(lwe, rgsw, key, &ct1, |x, _| lut[x as usize], q)
        }
        LutKind::Periodic => {
            let mut ct1 = ct.clone();
            ct1.add_const(beta);

            let folded = bootstrap_func(lwe, rgsw, key, &ct1, |x, m| half_select(x, m, q), q)?;

            let mut ct2 = ct.clone();
            ct2.sub_assign(&folded);
            ct2.add_const(beta);
            ct2.sub_const(q >> 2);

            bootstrap_func(
                lwe,
                rgsw,
                key,
                &ct2,
                |x, m| negacyclic_extension(lut, x, m, q),
                q,
            )
        }
        LutKind::Arbitrary => {
            let n = rgsw.ring_dim();

            if q > n as u64 {
                return Err(Error::ArbitraryFunctionModulus {
                    modulus: q,
                    ring_dim: n,
                });
            }

            let dq = q << 1;
            let ct1 = ct.with_modulus(dq);

            let mut ct2 = ct1.clone();
            ct2.add_const(beta);

            let folded = bootstrap_func(lwe, rgsw, key, &ct2, |x, m| half_select(x, m, dq), dq)?;

            let mut ct3 = ct1;
            ct3.sub_assign(&folded);
            ct3.add_const(beta);
            ct3.sub_const(q >> 1);

            let out = bootstrap_func(
                lwe,
                rgsw,
                key,
                &ct3,
                |x, m| negacyclic_extension(lut, x, m, dq),
                dq,
            )?;

            Ok(out.with_modulus(q))
        }
    }
}

/// Clear the low plaintext digit: the result encrypts `q_s * floor((phase + beta) / q_s)`
/// where `q_s = q` when `round_bits == 0` and `beta * 2^(round_bits + 1)` otherwise. The
/// ciphertext's modulus must be a multiple of `q_s`, and `q_s` must fit in a `u64`.
pub fn eval_floor(
    lwe: &LweParams,
    rgsw: &RgswParams,
    key: &BootstrappingKey,
    ct: &LweCiphertext,
    beta: u64,
    round_bits: u32,
) -> Result<LweCiphertext> {
    let q_s = if round_bits == 0 {
        lwe.q
    } else {
        round_bits
            .checked_add(1)
            .and_then(|shift| 1u64.checked_shl(shift))
            .and_then(|scale| beta.checked_mul(scale))
            .ok_or(Error::InvalidRoundBits(round_bits))?
    };
    let m = ct.modulus();

    if q_s == 0 || q_s > m || m % q_s != 0 {
        return Err(Error::ModulusMismatch {
            expected: q_s,
            actual: m,
        });
    }

    let mut ct1 = ct.clone();
    ct1.add_const(beta);

    let selected = bootstrap_func(
        lwe,
        rgsw,
        key,
        &ct1.with_modulus(q_s),
        |x, q| half_select(x, q, m),
        m,
    )?;
    ct1.sub_assign(&selected);

    // The low part now lies in [q_s/4, 3q_s/4).
    let low = bootstrap_func(
        lwe,
        rgsw,
        key,
        &ct1.with_modulus(q_s),
        |x, q| {
            if x < q / 4 {
                m - q / 2 - x
            } else if x < 3 * (q / 4) {
                x
            } else {
                m + q / 2 - x
            }
        },
        m,
    )?;
    ct1.sub_assign(&low);

    Ok(ct1)
}

/// The gadget base the working modulus `m` calls for in multi-base mode, or `None` to keep the
/// current one.
pub fn base_for_modulus(m: u64) -> Option<u32> {
    let bin_log = 63 - m.leading_zeros();

    if bin_log <= 17 {
        Some(1 << 27)
    } else if bin_log <= 26 {
        Some(1 << 18)
    } else {
        None
    }
}

/// One round of sign and decomposition evaluation: floor the low digit and switch to the next
/// smaller modulus, switching keys when the parameters are multi-base.
fn shrink<'a, K: KeyLookup>(
    lwe: &LweParams,
    rgsw: &RgswParams,
    keys: &'a K,
    key: &mut &'a BootstrappingKey,
    ct: &LweCiphertext,
    beta: u64,
) -> Result<LweCiphertext> {
    let floored = eval_floor(lwe, rgsw, *key, ct, beta, 0)?;
    let m = ((ct.modulus() as u128 * 2 * beta as u128) / lwe.q as u128) as u64;
    let out = mod_switch(&floored, m);

    trace!("floored a digit, working modulus now {m}");

    if rgsw.multi_base() {
        if let Some(base) = base_for_modulus(m) {
            *key = keys.key(base).ok_or(Error::MissingBootstrappingKey(base))?;

            trace!("switched to gadget base {base}");
        }
    }

    Ok(out)
}

fn check_large(lwe: &LweParams, ct: &LweCiphertext) -> Result<()> {
    if ct.modulus() <= lwe.q {
        return Err(Error::LargePrecisionRequired {
            modulus: ct.modulus(),
            q: lwe.q,
        });
    }

    Ok(())
}

/// The most significant bit of a large precision plaintext, as a bit encryption mod `q`.
///
/// # Remarks
/// Repeatedly floors away a digit of `q / (2 beta)` and shrinks the modulus by the same factor
/// until it reaches `q`, starting with the key for `base`.
pub fn eval_sign<K: KeyLookup>(
    lwe: &LweParams,
    rgsw: &RgswParams,
    keys: &K,
    base: u32,
    ct: &LweCiphertext,
    beta: u64,
) -> Result<LweCiphertext> {
    check_large(lwe, ct)?;

    let q = lwe.q;
    let mut key = keys.key(base).ok_or(Error::MissingBootstrappingKey(base))?;
    let mut ct = ct.clone();

    while ct.modulus() > q {
        ct = shrink(lwe, rgsw, keys, &mut key, &ct, beta)?;
    }

    ct.add_const(beta);

    let mut out = bootstrap_func(
        lwe,
        rgsw,
        key,
        &ct,
        |x, m| if x < m / 2 { q / 4 } else { q - q / 4 },
        q,
    )?;
    out.sub_const(q >> 2);

    Ok(out)
}

/// Split a large precision plaintext into digits of `q / (2 beta)`, least significant first.
/// Each digit is a ciphertext mod `q` except the last, which keeps the final working modulus.
pub fn eval_decomp<K: KeyLookup>(
    lwe: &LweParams,
    rgsw: &RgswParams,
    keys: &K,
    base: u32,
    ct: &LweCiphertext,
    beta: u64,
) -> Result<Vec<LweCiphertext>> {
    check_large(lwe, ct)?;

    let q = lwe.q;
    let mut key = keys.key(base).ok_or(Error::MissingBootstrappingKey(base))?;
    let mut ct = ct.clone();
    let mut digits = vec![];

    while ct.modulus() > q {
        digits.push(ct.with_modulus(q));
        ct = shrink(lwe, rgsw, keys, &mut key, &ct, beta)?;
    }

    digits.push(ct);

    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ops::lwe::{decrypt, encrypt},
        test_utils::{get_large_keys, get_small_keys},
    };

    fn beta(lwe: &LweParams) -> u64 {
        (lwe.q / 16).min(128)
    }

    fn lut(f: impl Fn(u64) -> u64, p: u64, q: u64) -> Vec<u64> {
        let interval = q / p;

        (0..q).map(|i| f(i / interval) * interval).collect()
    }

    #[test]
    fn gates_match_truth_tables() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());

        for gate in BinGate::ALL {
            for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
                let ct1 = encrypt(lwe, &keys.sk, a as u64, 4, lwe.q);
                let ct2 = encrypt(lwe, &keys.sk, b as u64, 4, lwe.q);

                let out = eval_bin_gate(lwe, rgsw, key, gate, &ct1, &ct2).unwrap();

                assert_eq!(out.modulus(), lwe.q);
                assert_eq!(
                    decrypt(&keys.sk, &out, 4),
                    gate.apply(a, b) as u64,
                    "{gate:?}({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn gates_chain() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());

        let a = encrypt(lwe, &keys.sk, 1, 4, lwe.q);
        let b = encrypt(lwe, &keys.sk, 0, 4, lwe.q);

        let mut acc = eval_bin_gate(lwe, rgsw, key, BinGate::Xor, &a, &b).unwrap();
        let mut expected = true;

        for _ in 0..4 {
            acc = eval_bin_gate(lwe, rgsw, key, BinGate::Nand, &acc, &a).unwrap();
            expected = !(expected & true);
        }

        assert_eq!(decrypt(&keys.sk, &acc, 4), expected as u64);
    }

    #[test]
    fn bootstrap_and_not() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());

        for bit in [0, 1] {
            let ct = encrypt(lwe, &keys.sk, bit, 4, lwe.q);

            let refreshed = bootstrap(lwe, rgsw, key, &ct).unwrap();
            assert_eq!(decrypt(&keys.sk, &refreshed, 4), bit);

            let negated = eval_not(&refreshed);
            assert_eq!(decrypt(&keys.sk, &negated, 4), 1 - bit);
        }
    }

    #[test]
    fn gate_rejects_wrong_modulus() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());

        let ct1 = encrypt(lwe, &keys.sk, 1, 4, lwe.q);
        let ct2 = encrypt(lwe, &keys.sk, 1, 4, 2 * lwe.q);

        assert!(matches!(
            eval_bin_gate(lwe, rgsw, key, BinGate::And, &ct1, &ct2),
            Err(Error::ModulusMismatch { .. })
        ));
    }

    #[test]
    fn classifies_luts() {
        let q = 512;
        let p = 8;

        let negacyclic = lut(|m| if m < 4 { m } else { (12 - m) % 8 }, p, q);
        let periodic = lut(|m| m % 4, p, q);
        let arbitrary = lut(|m| (m + 1) % p, p, q);

        assert_eq!(classify_lut(&negacyclic, q), LutKind::Negacyclic);
        assert_eq!(classify_lut(&periodic, q), LutKind::Periodic);
        assert_eq!(classify_lut(&arbitrary, q), LutKind::Arbitrary);
        assert_eq!(classify_lut(&vec![0; 512], q), LutKind::Negacyclic);
    }

    #[test]
    fn eval_func_each_kind() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());
        let p = 8;

        let fns: [(&dyn Fn(u64) -> u64, LutKind); 3] = [
            (&|m| if m < 4 { m } else { (12 - m) % 8 }, LutKind::Negacyclic),
            (&|m| m % 4, LutKind::Periodic),
            (&|m| (m + 1) % p, LutKind::Arbitrary),
        ];

        for (f, kind) in fns {
            let table = lut(f, p, lwe.q);
            assert_eq!(classify_lut(&table, lwe.q), kind);

            for m in 0..p {
                let ct = encrypt(lwe, &keys.sk, m, p, lwe.q);
                let out = eval_func(lwe, rgsw, key, &ct, &table, beta(lwe)).unwrap();

                assert_eq!(out.modulus(), lwe.q);
                assert_eq!(decrypt(&keys.sk, &out, p), f(m), "{kind:?} at {m}");
            }
        }
    }

    #[test]
    fn eval_func_rejects_short_lut() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());
        let ct = encrypt(lwe, &keys.sk, 1, 4, lwe.q);

        assert!(matches!(
            eval_func(lwe, rgsw, key, &ct, &[0; 16], beta(lwe)),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn floor_clears_low_bit() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());
        let beta = beta(lwe);
        let p = lwe.q / (2 * beta);

        for m in 0..p {
            let ct = encrypt(lwe, &keys.sk, m, p, lwe.q);
            let out = eval_floor(lwe, rgsw, key, &ct, beta, 1).unwrap();

            assert_eq!(decrypt(&keys.sk, &out, p / 2), m >> 1);
        }
    }

    #[test]
    fn floor_rejects_oversized_round_bits() {
        let keys = get_small_keys();
        let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());
        let beta = beta(lwe);
        let ct = encrypt(lwe, &keys.sk, 1, 4, lwe.q);

        for round_bits in [58, 62, 63, 64, u32::MAX] {
            assert_eq!(
                eval_floor(lwe, rgsw, key, &ct, beta, round_bits),
                Err(Error::InvalidRoundBits(round_bits)),
                "round_bits {round_bits}"
            );
        }

        assert!(matches!(
            eval_floor(lwe, rgsw, key, &ct, beta, 20),
            Err(Error::ModulusMismatch { .. })
        ));
    }

    #[test]
    fn base_follows_modulus() {
        assert_eq!(base_for_modulus(1 << 17), Some(1 << 27));
        assert_eq!(base_for_modulus(1 << 18), Some(1 << 18));
        assert_eq!(base_for_modulus(1 << 26), Some(1 << 18));
        assert_eq!(base_for_modulus(1 << 27), None);
    }

    #[test]
    fn sign_of_large_plaintext() {
        let keys = get_large_keys();
        let (lwe, rgsw) = (&keys.lwe, &keys.rgsw);
        let beta = beta(lwe);
        let modulus = 1 << 17;
        let p = modulus / (2 * beta);

        for m in [0, 1, 100, 255, 256, 300, p - 1] {
            let ct = encrypt(lwe, &keys.sk, m, p, modulus);
            let out = eval_sign(lwe, rgsw, &keys.keys, rgsw.base_g(), &ct, beta).unwrap();

            assert_eq!(out.modulus(), lwe.q);
            assert_eq!(decrypt(&keys.sk, &out, 2), (m >= p / 2) as u64, "sign of {m}");
        }
    }

    #[test]
    fn decomposes_large_plaintext() {
        let keys = get_large_keys();
        let (lwe, rgsw) = (&keys.lwe, &keys.rgsw);
        let beta = beta(lwe);
        let modulus = 1 << 17;
        let p = modulus / (2 * beta);
        let digit = lwe.q / (2 * beta);

        for m in [0, 5, 77, 300, p - 1] {
            let ct = encrypt(lwe, &keys.sk, m, p, modulus);
            let digits = eval_decomp(lwe, rgsw, &keys.keys, rgsw.base_g(), &ct, beta).unwrap();

            assert_eq!(digits.len(), 3);

            let mut expected = m;

            for d in &digits {
                assert_eq!(decrypt(&keys.sk, d, digit), expected % digit);
                expected /= digit;
            }
        }
    }

    #[test]
    fn large_precision_only() {
        let keys = get_large_keys();
        let (lwe, rgsw) = (&keys.lwe, &keys.rgsw);
        let ct = encrypt(lwe, &keys.sk, 1, 4, lwe.q);

        assert!(matches!(
            eval_sign(lwe, rgsw, &keys.keys, rgsw.base_g(), &ct, 128),
            Err(Error::LargePrecisionRequired { .. })
        ));
        assert!(matches!(
            eval_decomp(lwe, rgsw, &keys.keys, rgsw.base_g(), &ct, 128),
            Err(Error::LargePrecisionRequired { .. })
        ));
    }

    #[test]
    fn missing_key_is_reported() {
        let keys = get_large_keys();
        let (lwe, rgsw) = (&keys.lwe, &keys.rgsw);
        let ct = encrypt(lwe, &keys.sk, 1, 512, 1 << 17);

        let mut partial = keys.keys.clone();
        partial.remove(&(1 << 27));

        assert_eq!(
            eval_sign(lwe, rgsw, &partial, rgsw.base_g(), &ct, 128),
            Err(Error::MissingBootstrappingKey(1 << 27))
        );
    }
}
