use binfhe_math::poly::Poly;
use log::debug;
use rayon::prelude::*;

use crate::{
    BootstrapMethod, Error, Gadget, Result, RgswParams,
    entities::{AccumulatorKey, CommonReferenceString, GinxBlock, LwePrivateKey, RgswCiphertext},
    ops::rgsw::{encrypt_rgsw_with_masks, rerandomize_zero, secret_ntt},
};

fn check_inputs<'a>(params: &'a RgswParams, base: u32, s: &LwePrivateKey) -> Result<&'a Gadget> {
    if params.method() != BootstrapMethod::Ginx {
        return Err(Error::UnsupportedMethod(params.method()));
    }

    if !s.is_ternary() {
        return Err(Error::UnsupportedSecretKey);
    }

    params.gadget(base).ok_or(Error::UnknownGadgetBase(base))
}

/// Encrypt `[s_i = 1]` and `[s_i = -1]` for every coordinate of `s`.
fn ginx_block<F>(s: &LwePrivateKey, encrypt: F) -> GinxBlock
where
    F: Fn(i64) -> RgswCiphertext + Sync,
{
    let (plus, minus) = s
        .coeffs()
        .par_iter()
        .map(|s_i| (encrypt((*s_i == 1) as i64), encrypt((*s_i == -1) as i64)))
        .unzip();

    GinxBlock { plus, minus }
}

/// Generate a single party accumulator key with gadget base `base`, encrypting the ternary LWE
/// secret `s` under the ring secret `z`.
pub fn acc_key_gen(
    params: &RgswParams,
    base: u32,
    z: &LwePrivateKey,
    s: &LwePrivateKey,
) -> Result<AccumulatorKey> {
    let gadget = check_inputs(params, base, s)?;
    let z_ntt = secret_ntt(params, z)?;

    let block = ginx_block(s, |mu| {
        encrypt_rgsw_with_masks(params, gadget, &z_ntt, mu, None)
    });

    debug!(
        "generated GINX accumulator key: base {base}, {} coordinates",
        block.dim()
    );

    Ok(AccumulatorKey {
        blocks: vec![block],
        base,
    })
}

/// Like [`acc_key_gen`], but every RGSW ciphertext takes its masks from `acrs` so the key is
/// reproducible from the secrets and the reference string.
pub fn acc_key_gen_with_crs(
    params: &RgswParams,
    z: &LwePrivateKey,
    s: &LwePrivateKey,
    acrs: &CommonReferenceString,
) -> Result<AccumulatorKey> {
    let base = acrs.base;
    let gadget = check_inputs(params, base, s)?;

    if acrs.rows.len() != 2 * gadget.digits {
        return Err(Error::ReferenceStringMismatch);
    }

    let z_ntt = secret_ntt(params, z)?;
    let masks: &[Poly] = &acrs.rows;

    let block = ginx_block(s, |mu| {
        encrypt_rgsw_with_masks(params, gadget, &z_ntt, mu, Some(masks))
    });

    Ok(AccumulatorKey {
        blocks: vec![block],
        base,
    })
}

/// One party's round of threshold accumulator key generation. Appends a block for `s_i` to
/// `prev` (or starts a key when `prev` is `None`), built by re-randomizing `joint_zero`, the
/// joint RGSW encryption of zero under the combined ring secret.
///
/// # Remarks
/// The lead party runs last and checks the key holds a block from each of the `parties`.
pub fn multiparty_acc_key_gen(
    params: &RgswParams,
    s_i: &LwePrivateKey,
    prev: Option<&AccumulatorKey>,
    acrs: &CommonReferenceString,
    joint_zero: &RgswCiphertext,
    lead: bool,
    parties: usize,
) -> Result<AccumulatorKey> {
    let base = acrs.base;
    let gadget = check_inputs(params, base, s_i)?;

    if joint_zero.base != base
        || joint_zero.rows.len() != acrs.rows.len()
        || joint_zero
            .rows
            .iter()
            .zip(&acrs.rows)
            .any(|(row, a)| &row.a != a)
    {
        return Err(Error::ReferenceStringMismatch);
    }

    let mut key = match prev {
        Some(k) if k.base != base => return Err(Error::UnknownGadgetBase(k.base)),
        Some(k) => k.clone(),
        None => AccumulatorKey {
            blocks: vec![],
            base,
        },
    };

    let block = ginx_block(s_i, |mu| rerandomize_zero(params, gadget, joint_zero, mu));
    key.blocks.push(block);

    if lead && key.blocks.len() != parties {
        return Err(Error::PartyCountMismatch {
            expected: parties,
            actual: key.blocks.len(),
        });
    }

    debug!(
        "threshold accumulator round: {} of {parties} blocks, lead {lead}",
        key.blocks.len()
    );

    Ok(key)
}
