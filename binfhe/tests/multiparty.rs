use std::sync::Arc;

use binfhe::{
    BinFheContext, BinGate, BootstrapMethod, Error, LwePrivateKey, Output, ParamSet,
};

const PARTIES: usize = 2;

struct Party {
    s: LwePrivateKey,
    z: LwePrivateKey,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context() -> BinFheContext {
    BinFheContext::from_preset_with_parties(ParamSet::Toy, BootstrapMethod::Ginx, PARTIES)
        .unwrap()
}

fn parties(ctx: &BinFheContext) -> Vec<Party> {
    (0..PARTIES)
        .map(|_| Party {
            s: ctx.key_gen(),
            z: ctx.key_gen_large(),
        })
        .collect()
}

/// Run every round of threshold key generation. The last party leads.
fn threshold_keys(ctx: &mut BinFheContext, parties: &[Party]) {
    let is_lead = |i: usize| i + 1 == parties.len();

    let mut pk = ctx.pub_key_gen(&parties[0].z);

    for p in &parties[1..] {
        pk = ctx.multiparty_pub_key_gen(&p.z, &pk).unwrap();
    }

    let mut prev_ksk = None;

    for (i, p) in parties.iter().enumerate() {
        ctx.multi_party_key_gen(&p.s, &p.z, &pk, prev_ksk.as_ref(), is_lead(i))
            .unwrap();
        prev_ksk = ctx.key_switch_key().cloned();
    }

    let ksk = Arc::new(ctx.key_switch_key().unwrap().clone());

    let acrs = ctx.generate_acrs().unwrap();
    let mut joint_zero = ctx.rgsw_encrypt(&acrs, &parties[0].z, 0, false).unwrap();

    for (i, p) in parties.iter().enumerate().skip(1) {
        let share = ctx.rgsw_encrypt(&acrs, &p.z, 0, is_lead(i)).unwrap();
        joint_zero = ctx.rgsw_eval_add(&acrs, &joint_zero, &share).unwrap();
    }

    let mut prev_acc = None;

    for (i, p) in parties.iter().enumerate() {
        ctx.multiparty_bt_key_gen(
            &p.s,
            prev_acc.as_ref(),
            &acrs,
            &joint_zero,
            ksk.clone(),
            is_lead(i),
        )
        .unwrap();

        prev_acc = ctx.bootstrapping_key().map(|k| k.acc.clone());
    }
}

fn fuse(ctx: &BinFheContext, parties: &[Party], ct: &binfhe::LweCiphertext, p: u64) -> u64 {
    let shares = parties
        .iter()
        .enumerate()
        .map(|(i, party)| {
            if i == 0 {
                ctx.multiparty_decrypt_lead(&party.s, ct)
            } else {
                ctx.multiparty_decrypt_main(&party.s, ct)
            }
        })
        .collect::<Vec<_>>();

    ctx.multiparty_decrypt_fusion(&shares, p).unwrap()
}

#[test]
fn threshold_gate_evaluation() {
    init_logging();

    let mut ctx = context();
    let parties = parties(&ctx);

    threshold_keys(&mut ctx, &parties);

    let key = ctx.bootstrapping_key().unwrap();
    assert_eq!(key.acc.parties(), PARTIES);
    assert_eq!(key.ksk.parties(), PARTIES);
    assert!(key.public_key.is_some());

    let pk = ctx.public_key().unwrap();

    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let ct1 = ctx
            .encrypt_public(pk, a as u64, Output::SmallDim, 4, None)
            .unwrap();
        let ct2 = ctx
            .encrypt_public(pk, b as u64, Output::SmallDim, 4, None)
            .unwrap();

        assert_eq!(fuse(&ctx, &parties, &ct1, 4), a as u64);

        for gate in [BinGate::And, BinGate::Xor, BinGate::Nor] {
            let out = ctx.eval_bin_gate(gate, &ct1, &ct2).unwrap();

            assert_eq!(
                fuse(&ctx, &parties, &out, 4),
                gate.apply(a, b) as u64,
                "{gate:?}({a}, {b})"
            );
        }
    }
}

#[test]
fn joint_secret_decrypts_threshold_ciphertexts() {
    init_logging();

    let mut ctx = context();
    let parties = parties(&ctx);

    threshold_keys(&mut ctx, &parties);

    let s = parties.iter().map(|p| p.s.clone()).collect::<Vec<_>>();
    let s_joint = ctx.multiparty_key_gen(&s).unwrap();

    let pk = ctx.public_key().unwrap();
    let ct = ctx.encrypt_public(pk, 1, Output::SmallDim, 4, None).unwrap();
    let out = ctx.bootstrap(&ct).unwrap();

    assert_eq!(ctx.decrypt(&s_joint, &out, 4), 1);
    assert_eq!(fuse(&ctx, &parties, &out, 4), 1);
}

#[test]
fn lead_round_requires_every_party() {
    let mut ctx = context();
    let parties = parties(&ctx);
    let pk = ctx.pub_key_gen(&parties[0].z);

    ctx.multi_party_key_gen(&parties[0].s, &parties[0].z, &pk, None, false)
        .unwrap();

    let ksk = Arc::new(ctx.key_switch_key().unwrap().clone());
    let acrs = ctx.generate_acrs().unwrap();
    let joint_zero = ctx.rgsw_encrypt(&acrs, &parties[0].z, 0, true).unwrap();

    assert!(matches!(
        ctx.multiparty_bt_key_gen(&parties[0].s, None, &acrs, &joint_zero, ksk, true),
        Err(Error::Engine(binfhe_engine::Error::PartyCountMismatch {
            expected: PARTIES,
            actual: 1
        }))
    ));
}

#[test]
fn fusion_rejects_incomplete_shares() {
    let ctx = context();
    let parties = parties(&ctx);
    let s = parties.iter().map(|p| p.s.clone()).collect::<Vec<_>>();
    let s_joint = ctx.multiparty_key_gen(&s).unwrap();

    let ct = ctx.encrypt(&s_joint, 1, 4, None);
    let lead = ctx.multiparty_decrypt_lead(&parties[0].s, &ct);
    let main = ctx.multiparty_decrypt_main(&parties[1].s, &ct);

    assert_eq!(ctx.multiparty_decrypt_fusion(&[lead, main], 4).unwrap(), 1);

    assert!(matches!(
        ctx.multiparty_decrypt_fusion(&[lead], 4),
        Err(Error::InsufficientDecryptionShares {
            expected: PARTIES,
            actual: 1,
            leads: 1
        })
    ));
    assert!(matches!(
        ctx.multiparty_decrypt_fusion(&[main, main], 4),
        Err(Error::InsufficientDecryptionShares {
            expected: PARTIES,
            actual: 2,
            leads: 0
        })
    ));
}
