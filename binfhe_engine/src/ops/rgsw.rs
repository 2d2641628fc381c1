use binfhe_math::{
    modular::{centered, mod_add, mod_mul, mod_sub, reduce_signed},
    ntt::NttTable,
    poly::Poly,
};
use rayon::prelude::*;

use crate::{
    Error, Gadget, Result, RgswParams,
    entities::{CommonReferenceString, LwePrivateKey, RgswCiphertext, RlweCiphertext},
    sampling::{gaussian_poly, ternary_poly, uniform_poly},
};

/// Signed radix decomposition of `poly` (coefficient form) into `gadget.digits` polynomials
/// with coefficients in `[-B/2, B/2)`, written to `out`.
///
/// # Remarks
/// Values are centered first so small negative coefficients yield small digits. A leftover
/// carry past the top digit is folded into it.
pub fn decompose_into(poly: &Poly, gadget: &Gadget, q: u64, out: &mut [Poly]) {
    assert_eq!(out.len(), gadget.digits);

    let base = gadget.base as i64;
    let half = base >> 1;
    let mask = base - 1;
    let d = gadget.digits;

    for (j, x) in poly.coeffs.iter().enumerate() {
        let mut c = centered(*x, q);

        for (l, digit) in out.iter_mut().enumerate() {
            let mut r = c & mask;

            if r >= half {
                r -= base;
            }

            c = (c - r) >> gadget.log_base;

            let r = if l == d - 1 {
                r + (c << gadget.log_base)
            } else {
                r
            };

            digit.coeffs[j] = reduce_signed(r, q);
        }
    }
}

/// Allocating form of [`decompose_into`].
pub fn decompose(poly: &Poly, gadget: &Gadget, q: u64) -> Vec<Poly> {
    let mut out = vec![Poly::zero(poly.ring_dim()); gadget.digits];
    decompose_into(poly, gadget, q, &mut out);

    out
}

/// Decompose both halves of `acc` and move the `2d` digits to NTT form. Digits of the mask come
/// first.
pub fn decompose_ntt(acc: &RlweCiphertext, gadget: &Gadget, table: &NttTable) -> Vec<Poly> {
    let q = table.modulus();
    let mut digits = decompose(&acc.a, gadget, q);
    digits.extend(decompose(&acc.b, gadget, q));

    for d in digits.iter_mut() {
        table.forward(&mut d.coeffs);
    }

    digits
}

/// Multiply pre-decomposed NTT digits by an RGSW ciphertext, leaving the result in NTT form.
pub fn external_product_ntt(digits: &[Poly], rgsw: &RgswCiphertext, q: u64) -> RlweCiphertext {
    assert_eq!(digits.len(), rgsw.rows.len());

    let n = digits[0].ring_dim();
    let mut out = RlweCiphertext::zero(n);

    for (d, row) in digits.iter().zip(&rgsw.rows) {
        out.a.mul_add_pointwise(d, &row.a, q);
        out.b.mul_add_pointwise(d, &row.b, q);
    }

    out
}

/// Compute `rgsw * rlwe` where `rlwe` is in coefficient form. The result is in coefficient form.
pub fn external_product(
    params: &RgswParams,
    rgsw: &RgswCiphertext,
    rlwe: &RlweCiphertext,
) -> Result<RlweCiphertext> {
    let gadget = params
        .gadget(rgsw.base)
        .ok_or(Error::UnknownGadgetBase(rgsw.base))?;
    let table = params.ntt();

    let digits = decompose_ntt(rlwe, gadget, table);
    let mut out = external_product_ntt(&digits, rgsw, table.modulus());

    table.inverse(&mut out.a.coeffs);
    table.inverse(&mut out.b.coeffs);

    Ok(out)
}

fn add_constant(p: &mut Poly, c: u64, q: u64) {
    // A constant polynomial is the same constant in every NTT slot.
    for x in p.coeffs.iter_mut() {
        *x = mod_add(*x, c, q);
    }
}

/// Add `mu * B^l` to the mask of row `l` and the body of row `d + l`.
fn add_gadget(rows: &mut [RlweCiphertext], gadget: &Gadget, mu: u64, q: u64) {
    if mu == 0 {
        return;
    }

    let d = gadget.digits;

    for (l, pow) in gadget.powers.iter().enumerate() {
        let c = mod_mul(mu, *pow, q);

        add_constant(&mut rows[l].a, c, q);
        add_constant(&mut rows[d + l].b, c, q);
    }
}

/// The ring secret in NTT form.
pub fn secret_ntt(params: &RgswParams, z: &LwePrivateKey) -> Result<Poly> {
    if z.dim() != params.ring_dim() {
        return Err(Error::DimensionMismatch {
            expected: params.ring_dim(),
            actual: z.dim(),
        });
    }

    Ok(z.to_poly(params.big_q()).to_ntt(params.ntt()))
}

/// Encrypt the constant `mu` under the NTT-form ring secret `z_ntt`. When `masks` is given,
/// row `r` uses `masks[r]` instead of a fresh uniform mask.
pub(crate) fn encrypt_rgsw_with_masks(
    params: &RgswParams,
    gadget: &Gadget,
    z_ntt: &Poly,
    mu: i64,
    masks: Option<&[Poly]>,
) -> RgswCiphertext {
    let q = params.big_q();
    let n = params.ring_dim();
    let table = params.ntt();

    let mut rows = (0..2 * gadget.digits)
        .map(|r| {
            // Uniform in coefficient form is uniform in NTT form.
            let a = match masks {
                Some(m) => m[r].clone(),
                None => uniform_poly(n, q),
            };

            let mut b = gaussian_poly(n, params.std_dev(), q).to_ntt(table);
            b.mul_add_pointwise(&a, z_ntt, q);

            RlweCiphertext { a, b }
        })
        .collect::<Vec<_>>();

    add_gadget(&mut rows, gadget, reduce_signed(mu, q), q);

    RgswCiphertext {
        rows,
        base: gadget.base,
    }
}

/// Encrypt the constant `mu` with gadget base `base` under the ring secret `z`.
pub fn encrypt_rgsw(
    params: &RgswParams,
    base: u32,
    z: &LwePrivateKey,
    mu: i64,
) -> Result<RgswCiphertext> {
    let gadget = params.gadget(base).ok_or(Error::UnknownGadgetBase(base))?;
    let z_ntt = secret_ntt(params, z)?;

    Ok(encrypt_rgsw_with_masks(params, gadget, &z_ntt, mu, None))
}

/// Sample a common reference string: one uniform mask per row of an RGSW ciphertext with gadget
/// base `base`.
pub fn generate_acrs(params: &RgswParams, base: u32) -> Result<CommonReferenceString> {
    let gadget = params.gadget(base).ok_or(Error::UnknownGadgetBase(base))?;

    let rows = (0..2 * gadget.digits)
        .map(|_| uniform_poly(params.ring_dim(), params.big_q()))
        .collect();

    Ok(CommonReferenceString { rows, base })
}

/// One party's share of a threshold RGSW encryption of `mu`: row `r` is
/// `(acrs_r, acrs_r * z_i + e)`. Only the lead party adds the gadget term, so summing every
/// party's share with [`rgsw_eval_add`] yields an encryption of `mu` under `sum z_i`.
pub fn encrypt_rgsw_partial(
    params: &RgswParams,
    acrs: &CommonReferenceString,
    z_i: &LwePrivateKey,
    mu: i64,
    lead: bool,
) -> Result<RgswCiphertext> {
    let gadget = params
        .gadget(acrs.base)
        .ok_or(Error::UnknownGadgetBase(acrs.base))?;

    if acrs.rows.len() != 2 * gadget.digits {
        return Err(Error::ReferenceStringMismatch);
    }

    let z_ntt = secret_ntt(params, z_i)?;
    let mu = if lead { mu } else { 0 };

    Ok(encrypt_rgsw_with_masks(
        params,
        gadget,
        &z_ntt,
        mu,
        Some(&acrs.rows),
    ))
}

fn is_constant_offset(a: &Poly, crs: &Poly, q: u64) -> bool {
    let offset = mod_sub(a.coeffs[0], crs.coeffs[0], q);

    a.coeffs
        .iter()
        .zip(&crs.coeffs)
        .all(|(x, y)| mod_sub(*x, *y, q) == offset)
}

/// Sum two partial RGSW encryptions made from the same reference string.
///
/// # Remarks
/// Each mask may differ from the reference string only by the lead party's gadget term, a
/// constant in every NTT slot. The sum keeps one copy of the reference string in its masks.
pub fn rgsw_eval_add(
    params: &RgswParams,
    acrs: &CommonReferenceString,
    lhs: &RgswCiphertext,
    rhs: &RgswCiphertext,
) -> Result<RgswCiphertext> {
    let q = params.big_q();

    if lhs.base != acrs.base
        || rhs.base != acrs.base
        || lhs.rows.len() != acrs.rows.len()
        || rhs.rows.len() != acrs.rows.len()
    {
        return Err(Error::ReferenceStringMismatch);
    }

    let rows = lhs
        .rows
        .iter()
        .zip(&rhs.rows)
        .zip(&acrs.rows)
        .map(|((x, y), crs)| {
            if !is_constant_offset(&x.a, crs, q) || !is_constant_offset(&y.a, crs, q) {
                return Err(Error::ReferenceStringMismatch);
            }

            let mut a = x.a.clone();
            a.add_assign(&y.a, q);
            a.sub_assign(crs, q);

            let mut b = x.b.clone();
            b.add_assign(&y.b, q);

            Ok(RlweCiphertext { a, b })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RgswCiphertext {
        rows,
        base: lhs.base,
    })
}

/// Recover the constant `mu` an RGSW ciphertext encrypts, rounding the phase of the top body row
/// by `B^(d-1)`.
pub fn rgsw_decrypt(params: &RgswParams, z: &LwePrivateKey, ct: &RgswCiphertext) -> Result<i64> {
    let gadget = params
        .gadget(ct.base)
        .ok_or(Error::UnknownGadgetBase(ct.base))?;

    if ct.rows.len() != 2 * gadget.digits {
        return Err(Error::InvalidSize);
    }

    let q = params.big_q();
    let table = params.ntt();
    let z_ntt = secret_ntt(params, z)?;
    let row = &ct.rows[2 * gadget.digits - 1];

    let mut phase = row.b.clone();
    let mut az = Poly::zero(params.ring_dim());
    az.mul_add_pointwise(&row.a, &z_ntt, q);
    phase.sub_assign(&az, q);
    table.inverse(&mut phase.coeffs);

    let scale = gadget.powers[gadget.digits - 1] as f64;
    let mu = (centered(phase.coeffs[0], q) as f64 / scale).round() as i64;

    Ok(mu)
}

/// Re-randomize a joint encryption of zero into a fresh encryption of `mu`: each row
/// `(a, b)` becomes `(r a + e1, r b + e2)` for a fresh ternary `r`, then the gadget term is
/// added.
pub(crate) fn rerandomize_zero(
    params: &RgswParams,
    gadget: &Gadget,
    zero: &RgswCiphertext,
    mu: i64,
) -> RgswCiphertext {
    let q = params.big_q();
    let n = params.ring_dim();
    let table = params.ntt();
    let std_dev = params.std_dev();

    let mut rows = zero
        .rows
        .par_iter()
        .map(|row| {
            let r = ternary_poly(n, q).to_ntt(table);

            let mut a = gaussian_poly(n, std_dev, q).to_ntt(table);
            a.mul_add_pointwise(&r, &row.a, q);

            let mut b = gaussian_poly(n, std_dev, q).to_ntt(table);
            b.mul_add_pointwise(&r, &row.b, q);

            RlweCiphertext { a, b }
        })
        .collect::<Vec<_>>();

    add_gadget(&mut rows, gadget, reduce_signed(mu, q), q);

    RgswCiphertext {
        rows,
        base: zero.base,
    }
}
