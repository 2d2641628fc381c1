use binfhe_math::modular::{mod_add, mod_mul, mod_sub, reduce_signed, scale_round};
use itertools::iproduct;
use log::debug;
use rayon::prelude::*;

use crate::{
    Error, KeyDistribution, LweParams, Result,
    entities::{
        DecryptionShare, KeySwitchKey, LweCiphertext, LweKeyPair, LwePrivateKey, LwePublicKey,
    },
    sampling::{gaussian_mod, gaussian_vec, ternary_vec, uniform_vec},
};

fn dot(a: &[u64], s: &[u64], q: u64) -> u64 {
    a.iter()
        .zip(s)
        .fold(0, |acc, (x, y)| mod_add(acc, mod_mul(*x, *y, q), q))
}

/// Generate a uniform ternary secret key of dimension `dim`.
pub fn key_gen(dim: usize, modulus: u64) -> LwePrivateKey {
    LwePrivateKey::new(ternary_vec(dim), modulus)
}

/// Generate a secret key with rounded Gaussian coefficients.
pub fn key_gen_gaussian(dim: usize, modulus: u64, std_dev: f64) -> LwePrivateKey {
    LwePrivateKey::new(gaussian_vec(dim, std_dev), modulus)
}

/// Generate a secret key drawn from `dist`.
pub fn key_gen_with_dist(
    dim: usize,
    modulus: u64,
    dist: KeyDistribution,
    std_dev: f64,
) -> LwePrivateKey {
    match dist {
        KeyDistribution::UniformTernary => key_gen(dim, modulus),
        KeyDistribution::Gaussian => key_gen_gaussian(dim, modulus, std_dev),
    }
}

/// Generate a public key with as many samples as the secret key's dimension, under the
/// secret key's modulus.
pub fn pub_key_gen(params: &LweParams, sk: &LwePrivateKey) -> LwePublicKey {
    let dim = sk.dim();
    let q = sk.modulus();
    let s = sk.reduced(q);

    let rows = (0..dim)
        .into_par_iter()
        .map(|_| {
            let a = uniform_vec(dim, q);
            let v = mod_add(dot(&a, &s, q), gaussian_mod(params.std_dev, q), q);

            (a, v)
        })
        .collect::<Vec<_>>();

    let (a, v): (Vec<_>, Vec<_>) = rows.into_iter().unzip();

    LwePublicKey {
        a: a.concat(),
        v,
        dim,
        modulus: q,
    }
}

/// Generate a small secret key at `(n, q_ks)` together with its public key.
pub fn key_gen_pair(params: &LweParams) -> LweKeyPair {
    let secret = key_gen_with_dist(params.n, params.q_ks, params.key_dist, params.std_dev);
    let public = pub_key_gen(params, &secret);

    LweKeyPair { secret, public }
}

/// Encrypt `m` (mod `p`) under `sk` with ciphertext modulus `modulus`. The message is scaled
/// by `modulus / p`.
///
/// # Panics
/// If `p` is zero or exceeds `modulus`.
pub fn encrypt(
    params: &LweParams,
    sk: &LwePrivateKey,
    m: u64,
    p: u64,
    modulus: u64,
) -> LweCiphertext {
    assert!(p > 0 && p <= modulus, "invalid plaintext modulus {p}");

    let s = sk.reduced(modulus);
    let a = uniform_vec(s.len(), modulus);

    let mut b = mod_mul(m % p, modulus / p, modulus);
    b = mod_add(b, gaussian_mod(params.std_dev, modulus), modulus);
    b = mod_add(b, dot(&a, &s, modulus), modulus);

    LweCiphertext::new(a, b, modulus)
}

/// Encrypt `m` (mod `p`) with a public key. The ciphertext has the key's dimension and
/// modulus.
pub fn encrypt_public(params: &LweParams, pk: &LwePublicKey, m: u64, p: u64) -> LweCiphertext {
    let q = pk.modulus;
    assert!(p > 0 && p <= q, "invalid plaintext modulus {p}");

    let r = ternary_vec(pk.rows());
    let mut a = vec![0; pk.dim];
    let mut b = 0;

    for (i, r_i) in r.iter().enumerate() {
        let r_i = reduce_signed(*r_i, q);

        if r_i == 0 {
            continue;
        }

        for (x, y) in a.iter_mut().zip(pk.row(i)) {
            *x = mod_add(*x, mod_mul(*y, r_i, q), q);
        }

        b = mod_add(b, mod_mul(pk.v[i], r_i, q), q);
    }

    b = mod_add(b, mod_mul(m % p, q / p, q), q);
    b = mod_add(b, gaussian_mod(params.std_dev, q), q);

    LweCiphertext::new(a, b, q)
}

/// Compute `b - <a, s>`.
///
/// # Panics
/// If the key and ciphertext dimensions differ.
pub fn phase(sk: &LwePrivateKey, ct: &LweCiphertext) -> u64 {
    assert_eq!(sk.dim(), ct.dim(), "key and ciphertext dimensions differ");

    let q = ct.modulus();
    let s = sk.reduced(q);

    mod_sub(ct.b(), dot(ct.a(), &s, q), q)
}

/// Round a phase mod `q` to the nearest multiple of `q / p` and return the multiple mod `p`.
pub fn decode(phase: u64, p: u64, q: u64) -> u64 {
    let r = mod_add(phase, q / (2 * p), q);

    ((r as u128 * p as u128 / q as u128) % p as u128) as u64
}

/// Decrypt to a plaintext mod `p`.
pub fn decrypt(sk: &LwePrivateKey, ct: &LweCiphertext, p: u64) -> u64 {
    decode(phase(sk, ct), p, ct.modulus())
}

/// A noiseless encryption of `bit` mod `q` with `p = 4` scaling.
pub fn noiseless_embedding(params: &LweParams, bit: bool) -> LweCiphertext {
    let b = if bit { params.q >> 2 } else { 0 };

    LweCiphertext::trivial(params.n, b, params.q)
}

/// Rescale every coordinate from the ciphertext's modulus to `to`, rounding.
pub fn mod_switch(ct: &LweCiphertext, to: u64) -> LweCiphertext {
    let from = ct.modulus();

    LweCiphertext::new(
        ct.a().iter().map(|x| scale_round(*x, from, to)).collect(),
        scale_round(ct.b(), from, to),
        to,
    )
}

/// One key switching entry per nonzero digit value: encryptions of `j * z_i * B^k` under `s`,
/// all sharing the masks in `a` when given.
fn key_switch_rows(
    params: &LweParams,
    s: &[u64],
    z_i: i64,
    masks: Option<(&[u64], &[u64])>,
) -> (Vec<u64>, Vec<u64>) {
    let q = params.q_ks;
    let base = params.base_ks;
    let digits = params.ks_digits();
    let n = s.len();
    let z_i = reduce_signed(z_i, q);

    let mut a_out = Vec::with_capacity(digits * (base as usize - 1) * n);
    let mut b_out = Vec::with_capacity(digits * (base as usize - 1));

    let mut pow = 1u64;
    let mut entry = 0;

    for (k, j) in iproduct!(0..digits, 1..base) {
        if j == 1 && k > 0 {
            pow = mod_mul(pow, base % q, q);
        }

        let (a, b_prev) = match masks {
            Some((a, b)) => (a[entry * n..(entry + 1) * n].to_vec(), b[entry]),
            None => (uniform_vec(n, q), 0),
        };

        let msg = mod_mul(mod_mul(j % q, pow, q), z_i, q);

        let mut b = mod_add(b_prev, dot(&a, s, q), q);
        b = mod_add(b, gaussian_mod(params.std_dev, q), q);
        b = mod_add(b, msg, q);

        a_out.extend_from_slice(&a);
        b_out.push(b);
        entry += 1;
    }

    (a_out, b_out)
}

fn check_ks_keys(params: &LweParams, sk: &LwePrivateKey, sk_large: &LwePrivateKey) -> Result<()> {
    if sk.dim() != params.n {
        return Err(Error::DimensionMismatch {
            expected: params.n,
            actual: sk.dim(),
        });
    }

    if sk_large.dim() != params.ring_dim {
        return Err(Error::DimensionMismatch {
            expected: params.ring_dim,
            actual: sk_large.dim(),
        });
    }

    Ok(())
}

/// Generate a key switching key from `sk_large` (dimension `N`) to `sk` (dimension `n`) mod
/// `q_ks`.
pub fn key_switch_gen(
    params: &LweParams,
    sk: &LwePrivateKey,
    sk_large: &LwePrivateKey,
) -> Result<KeySwitchKey> {
    check_ks_keys(params, sk, sk_large)?;

    let s = sk.reduced(params.q_ks);

    let rows = sk_large
        .coeffs()
        .par_iter()
        .map(|z_i| key_switch_rows(params, &s, *z_i, None))
        .collect::<Vec<_>>();

    let (a, b): (Vec<_>, Vec<_>) = rows.into_iter().unzip();

    let ksk = KeySwitchKey {
        from_dim: params.ring_dim,
        to_dim: params.n,
        modulus: params.q_ks,
        base: params.base_ks,
        digits: params.ks_digits(),
        a: a.concat(),
        b: b.concat(),
        parties: 1,
    };

    debug!(
        "generated key switching key with {} entries (base {}, {} digits)",
        ksk.entries(),
        ksk.base,
        ksk.digits
    );

    Ok(ksk)
}

/// Add one party's contribution to a threshold key switching key. The masks of `prev` are
/// reused so the result switches from `sum z` to `sum s`.
pub fn multiparty_key_switch_gen(
    params: &LweParams,
    sk: &LwePrivateKey,
    sk_large: &LwePrivateKey,
    prev: &KeySwitchKey,
) -> Result<KeySwitchKey> {
    check_ks_keys(params, sk, sk_large)?;

    if prev.from_dim != params.ring_dim || prev.to_dim != params.n {
        return Err(Error::DimensionMismatch {
            expected: params.ring_dim,
            actual: prev.from_dim,
        });
    }

    if prev.modulus != params.q_ks {
        return Err(Error::ModulusMismatch {
            expected: params.q_ks,
            actual: prev.modulus,
        });
    }

    let s = sk.reduced(params.q_ks);
    let per_coeff = prev.digits * (prev.base as usize - 1);
    let n = params.n;

    let rows = sk_large
        .coeffs()
        .par_iter()
        .enumerate()
        .map(|(i, z_i)| {
            let a = &prev.a[i * per_coeff * n..(i + 1) * per_coeff * n];
            let b = &prev.b[i * per_coeff..(i + 1) * per_coeff];

            key_switch_rows(params, &s, *z_i, Some((a, b)))
        })
        .collect::<Vec<_>>();

    let (a, b): (Vec<_>, Vec<_>) = rows.into_iter().unzip();

    Ok(KeySwitchKey {
        a: a.concat(),
        b: b.concat(),
        parties: prev.parties + 1,
        ..prev.clone()
    })
}

/// Switch a ciphertext mod `q_ks` from the key's source secret to its target secret.
pub fn key_switch(ksk: &KeySwitchKey, ct: &LweCiphertext) -> Result<LweCiphertext> {
    if ct.dim() != ksk.from_dim {
        return Err(Error::DimensionMismatch {
            expected: ksk.from_dim,
            actual: ct.dim(),
        });
    }

    if ct.modulus() != ksk.modulus {
        return Err(Error::ModulusMismatch {
            expected: ksk.modulus,
            actual: ct.modulus(),
        });
    }

    let q = ksk.modulus;
    let mut a = vec![0; ksk.to_dim];
    let mut b = ct.b();

    for (i, x) in ct.a().iter().enumerate() {
        let mut x = *x;

        for k in 0..ksk.digits {
            let j = x % ksk.base;
            x /= ksk.base;

            if j == 0 {
                continue;
            }

            let (e_a, e_b) = ksk.entry(ksk.index(i, k, j));

            for (y, e) in a.iter_mut().zip(e_a) {
                *y = mod_sub(*y, *e, q);
            }

            b = mod_sub(b, e_b, q);
        }
    }

    Ok(LweCiphertext::new(a.into_iter().map(|x| mod_sub(0, x, q)).collect(), b, q))
}

/// Take a ciphertext at `(N, Q)` to `(n, q)`: switch to `q_ks`, key switch, then switch to
/// `q`.
pub fn switch_dimension(
    params: &LweParams,
    ksk: &KeySwitchKey,
    ct: &LweCiphertext,
) -> Result<LweCiphertext> {
    let ct = mod_switch(ct, params.q_ks);
    let ct = key_switch(ksk, &ct)?;

    Ok(mod_switch(&ct, params.q))
}

/// Combine secret key shares into the key `sum s_i`.
pub fn multiparty_key_gen(shares: &[LwePrivateKey]) -> Result<LwePrivateKey> {
    let Some(first) = shares.first() else {
        return Err(Error::PartyCountMismatch {
            expected: 1,
            actual: 0,
        });
    };

    let mut s = vec![0i64; first.dim()];

    for share in shares {
        if share.dim() != first.dim() {
            return Err(Error::DimensionMismatch {
                expected: first.dim(),
                actual: share.dim(),
            });
        }

        for (x, y) in s.iter_mut().zip(share.coeffs()) {
            *x += y;
        }
    }

    Ok(LwePrivateKey::new(s, first.modulus()))
}

/// Add one party's secret share to a public key: `v' = v + A s_i + e_i`.
pub fn multiparty_pub_key_gen(
    params: &LweParams,
    sk: &LwePrivateKey,
    prev: &LwePublicKey,
) -> Result<LwePublicKey> {
    if sk.dim() != prev.dim {
        return Err(Error::DimensionMismatch {
            expected: prev.dim,
            actual: sk.dim(),
        });
    }

    let q = prev.modulus;
    let s = sk.reduced(q);

    let v = prev
        .v
        .par_iter()
        .enumerate()
        .map(|(i, v_i)| {
            let v_i = mod_add(*v_i, dot(prev.row(i), &s, q), q);

            mod_add(v_i, gaussian_mod(params.std_dev, q), q)
        })
        .collect();

    Ok(LwePublicKey { v, ..prev.clone() })
}

fn partial_decrypt(
    params: &LweParams,
    sk: &LwePrivateKey,
    ct: &LweCiphertext,
    lead: bool,
) -> DecryptionShare {
    assert_eq!(sk.dim(), ct.dim(), "key and ciphertext dimensions differ");

    let q = ct.modulus();
    let inner = dot(ct.a(), &sk.reduced(q), q);
    let body = if lead { ct.b() } else { 0 };

    let value = mod_add(mod_sub(body, inner, q), gaussian_mod(params.std_dev, q), q);

    DecryptionShare {
        value,
        modulus: q,
        lead,
    }
}

/// The lead party's decryption share: `b - <a, s_i> + e`.
pub fn multiparty_decrypt_lead(
    params: &LweParams,
    sk: &LwePrivateKey,
    ct: &LweCiphertext,
) -> DecryptionShare {
    partial_decrypt(params, sk, ct, true)
}

/// Another party's decryption share: `-<a, s_i> + e`.
pub fn multiparty_decrypt_main(
    params: &LweParams,
    sk: &LwePrivateKey,
    ct: &LweCiphertext,
) -> DecryptionShare {
    partial_decrypt(params, sk, ct, false)
}

/// Sum decryption shares and decode the result mod `p`.
pub fn multiparty_decrypt_fusion(shares: &[DecryptionShare], p: u64) -> Result<u64> {
    let Some(first) = shares.first() else {
        return Err(Error::PartyCountMismatch {
            expected: 1,
            actual: 0,
        });
    };

    let q = first.modulus;
    let mut sum = 0;

    for share in shares {
        if share.modulus != q {
            return Err(Error::ModulusMismatch {
                expected: q,
                actual: share.modulus,
            });
        }

        sum = mod_add(sum, share.value, q);
    }

    Ok(decode(sum, p, q))
}
