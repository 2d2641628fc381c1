use binfhe_math::poly::Poly;

use crate::{
    Error, Result, RgswParams,
    entities::{AccumulatorKey, LweCiphertext, RlweCiphertext},
    ops::rgsw::{decompose_ntt, external_product_ntt},
};

/// Add `t * X^k - t` to `acc`.
fn add_rotated_difference(acc: &mut RlweCiphertext, t: &RlweCiphertext, k: usize, q: u64) {
    acc.a.add_assign(&t.a.mul_monomial(k, q), q);
    acc.a.sub_assign(&t.a, q);
    acc.b.add_assign(&t.b.mul_monomial(k, q), q);
    acc.b.sub_assign(&t.b, q);
}

/// GINX blind rotation: multiply `acc` by `X^(-<a, s> * 2N / ct_mod)`, where `s` is the sum of
/// the LWE secrets behind the key's blocks.
///
/// # Remarks
/// Every coordinate applies a CMux
/// `acc += (X^k - 1) acc [s_i = 1] + (X^-k - 1) acc [s_i = -1]`, decomposing the accumulator
/// once for both products. Coordinates with `a_i = 0` are skipped.
pub fn blind_rotate(
    params: &RgswParams,
    acc: &mut RlweCiphertext,
    key: &AccumulatorKey,
    a: &[u64],
    ct_mod: u64,
) -> Result<()> {
    let n = params.ring_dim();
    let two_n = 2 * n as u64;

    if ct_mod == 0 || two_n % ct_mod != 0 {
        return Err(Error::UnsupportedModulus {
            modulus: ct_mod,
            two_n,
        });
    }

    let gadget = params
        .gadget(key.base)
        .ok_or(Error::UnknownGadgetBase(key.base))?;
    let table = params.ntt();
    let q = params.big_q();
    let factor = two_n / ct_mod;

    for block in &key.blocks {
        if block.dim() != a.len() {
            return Err(Error::DimensionMismatch {
                expected: block.dim(),
                actual: a.len(),
            });
        }

        for (i, a_i) in a.iter().enumerate() {
            let rot = (((ct_mod - a_i % ct_mod) % ct_mod) * factor) as usize;

            if rot == 0 {
                continue;
            }

            let digits = decompose_ntt(acc, gadget, table);

            let (mut t1, mut t2) = rayon::join(
                || external_product_ntt(&digits, &block.plus[i], q),
                || external_product_ntt(&digits, &block.minus[i], q),
            );

            for p in [&mut t1.a, &mut t1.b, &mut t2.a, &mut t2.b] {
                table.inverse(&mut p.coeffs);
            }

            add_rotated_difference(acc, &t1, rot, q);
            add_rotated_difference(acc, &t2, 2 * n - rot, q);
        }
    }

    Ok(())
}

/// Extract the constant coefficient of an RLWE ciphertext as an LWE ciphertext of dimension
/// `N` under the ring secret's coefficients.
pub fn sample_extract(acc: &RlweCiphertext, q: u64) -> LweCiphertext {
    let Poly { coeffs } = acc.a.transpose(q);

    LweCiphertext::new(coeffs, acc.b.coeffs[0], q)
}
