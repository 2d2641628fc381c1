use binfhe_math::{
    ntt::NttTable,
    poly::Poly,
    primes::{first_prime, previous_prime},
};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng, thread_rng};

fn table(n: usize, bits: u32) -> NttTable {
    let m = 2 * n as u64;
    let q = previous_prime(first_prime(bits, m).unwrap(), m).unwrap();

    NttTable::new(n, q).unwrap()
}

fn ntt(c: &mut Criterion) {
    for (n, bits) in [(512, 27), (1024, 54), (2048, 54)] {
        let table = table(n, bits);
        let q = table.modulus();

        let mut a = (0..n).map(|_| thread_rng().gen_range(0..q)).collect::<Vec<_>>();

        c.bench_function(&format!("NTT forward N={n} log Q={bits}"), |bench| {
            bench.iter(|| table.forward(&mut a));
        });

        c.bench_function(&format!("NTT inverse N={n} log Q={bits}"), |bench| {
            bench.iter(|| table.inverse(&mut a));
        });

        let x = Poly {
            coeffs: (0..n).map(|_| thread_rng().gen_range(0..q)).collect(),
        };
        let y = Poly {
            coeffs: (0..n).map(|_| thread_rng().gen_range(0..q)).collect(),
        };

        c.bench_function(&format!("Ring product N={n} log Q={bits}"), |bench| {
            bench.iter(|| x.mul(&y, &table));
        });
    }
}

criterion_group!(benches, ntt);
criterion_main!(benches);
