use std::sync::{Arc, OnceLock};

use binfhe::{
    BinFheContext, BinGate, BootstrapMethod, KeyGenMode, LwePrivateKey, ParamSet,
};
use criterion::{Criterion, criterion_group, criterion_main};

fn setup(set: ParamSet) -> Arc<(BinFheContext, LwePrivateKey)> {
    static TOY: OnceLock<Arc<(BinFheContext, LwePrivateKey)>> = OnceLock::new();
    static STD128: OnceLock<Arc<(BinFheContext, LwePrivateKey)>> = OnceLock::new();

    let cell = match set {
        ParamSet::Toy => &TOY,
        _ => &STD128,
    };

    cell.get_or_init(|| {
        let mut ctx = BinFheContext::from_preset(set, BootstrapMethod::Ginx).unwrap();
        let sk = ctx.key_gen();
        ctx.bt_key_gen(&sk, KeyGenMode::Symmetric).unwrap();

        Arc::new((ctx, sk))
    })
    .clone()
}

fn gates(c: &mut Criterion) {
    for set in [ParamSet::Toy, ParamSet::Std128] {
        let keys = setup(set);
        let (ctx, sk) = (&keys.0, &keys.1);

        let a = ctx.encrypt(sk, 1, 4, None);
        let b = ctx.encrypt(sk, 0, 4, None);

        for gate in [BinGate::And, BinGate::Xor] {
            c.bench_function(&format!("{set} {gate:?}"), |bench| {
                bench.iter(|| ctx.eval_bin_gate(gate, &a, &b).unwrap());
            });
        }

        c.bench_function(&format!("{set} bootstrap"), |bench| {
            bench.iter(|| ctx.bootstrap(&a).unwrap());
        });
    }
}

fn lut(c: &mut Criterion) {
    let keys = setup(ParamSet::Toy);
    let (ctx, sk) = (&keys.0, &keys.1);
    let p = ctx.max_plaintext_space();

    let negacyclic = ctx
        .generate_lut_via_function(|m, p| if m < p / 2 { m } else { (p + p / 2 - m) % p }, p)
        .unwrap();
    let arbitrary = ctx
        .generate_lut_via_function(|m, p| (m * m + 1) % p, p)
        .unwrap();

    let ct = ctx.encrypt(sk, 3, p, None);

    c.bench_function("TOY negacyclic function", |bench| {
        bench.iter(|| ctx.eval_func(&ct, &negacyclic).unwrap());
    });

    c.bench_function("TOY arbitrary function", |bench| {
        bench.iter(|| ctx.eval_func(&ct, &arbitrary).unwrap());
    });

    c.bench_function("TOY floor", |bench| {
        bench.iter(|| ctx.eval_floor(&ct, 1).unwrap());
    });
}

criterion_group!(benches, gates, lut);
criterion_main!(benches);
