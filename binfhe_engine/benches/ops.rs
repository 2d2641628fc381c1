use binfhe_engine::{
    entities::RlweCiphertext,
    ops::{
        blind_rotation::blind_rotate,
        bootstrapping::{BinGate, eval_bin_gate, eval_func},
        lwe::{encrypt, key_switch, mod_switch},
    },
    test_utils::get_small_keys,
};
use binfhe_math::poly::Poly;
use criterion::{Criterion, criterion_group, criterion_main};

fn ops(c: &mut Criterion) {
    let keys = get_small_keys();
    let (lwe, rgsw, key) = (&keys.lwe, &keys.rgsw, keys.default_key());

    let a = encrypt(lwe, &keys.sk, 1, 4, lwe.q);
    let b = encrypt(lwe, &keys.sk, 0, 4, lwe.q);

    c.bench_function("Blind rotation", |bench| {
        bench.iter(|| {
            let mut acc = RlweCiphertext::trivial(Poly::zero(rgsw.ring_dim()));
            blind_rotate(rgsw, &mut acc, &key.acc, a.a(), a.modulus()).unwrap();
        });
    });

    let large = encrypt(lwe, &keys.z, 1, 4, lwe.q_ks);

    c.bench_function("Key switch", |bench| {
        bench.iter(|| key_switch(&key.ksk, &large).unwrap());
    });

    c.bench_function("Modulus switch", |bench| {
        bench.iter(|| mod_switch(&large, lwe.q));
    });

    for gate in [BinGate::And, BinGate::Xor] {
        c.bench_function(&format!("{gate:?} gate"), |bench| {
            bench.iter(|| eval_bin_gate(lwe, rgsw, key, gate, &a, &b).unwrap());
        });
    }

    let lut = (0..lwe.q)
        .map(|i| ((i / (lwe.q / 8) + 1) % 8) * (lwe.q / 8))
        .collect::<Vec<_>>();

    c.bench_function("Arbitrary function", |bench| {
        bench.iter(|| eval_func(lwe, rgsw, key, &a, &lut, 32).unwrap());
    });
}

criterion_group!(benches, ops);
criterion_main!(benches);
