use num::Integer;

use crate::{
    Error, Result,
    modular::{mod_mul, mod_pow},
};

/// Witnesses that make Miller-Rabin deterministic for every 64-bit input.
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Deterministic Miller-Rabin primality test.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }

    for p in MILLER_RABIN_BASES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0;

    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    'witness: for a in MILLER_RABIN_BASES {
        let mut x = mod_pow(a, d, n);

        if x == 1 || x == n - 1 {
            continue;
        }

        for _ in 1..s {
            x = mod_mul(x, x, n);

            if x == n - 1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// The smallest prime `p > 2^bits` with `p = 1 mod m`.
///
/// # Panics
/// If `bits > 62` or `m == 0`.
pub fn first_prime(bits: u32, m: u64) -> Result<u64> {
    assert!(bits <= 62, "moduli above 62 bits are not supported");
    assert_ne!(m, 0);

    let start = 1u64 << bits;
    let r = start % m;
    let mut candidate = start - r + m + 1;

    while !is_prime(candidate) {
        candidate = candidate
            .checked_add(m)
            .ok_or(Error::NoPrimeFound { start, modulus: m })?;
    }

    Ok(candidate)
}

/// The largest prime `p < q` with `p = q mod m`.
///
/// # Remarks
/// When `q = 1 mod m`, as for the output of [`first_prime`], the result is the largest
/// NTT-friendly prime below `q`.
pub fn previous_prime(q: u64, m: u64) -> Result<u64> {
    let mut candidate = q
        .checked_sub(m)
        .ok_or(Error::NoPrimeFound { start: q, modulus: m })?;

    while !is_prime(candidate) {
        candidate = candidate
            .checked_sub(m)
            .ok_or(Error::NoPrimeFound { start: q, modulus: m })?;
    }

    Ok(candidate)
}

/// The smallest prime `p > q` with `p = q mod m`.
pub fn next_prime(q: u64, m: u64) -> Result<u64> {
    let mut candidate = q
        .checked_add(m)
        .ok_or(Error::NoPrimeFound { start: q, modulus: m })?;

    while !is_prime(candidate) {
        candidate = candidate
            .checked_add(m)
            .ok_or(Error::NoPrimeFound { start: q, modulus: m })?;
    }

    Ok(candidate)
}

/// Find a primitive `order`-th root of unity modulo the prime `q`, where `order` is a power of
/// two dividing `q - 1`.
pub fn primitive_root_of_unity(order: u64, q: u64) -> Result<u64> {
    if order < 2 || !order.is_power_of_two() || (q - 1) % order != 0 {
        return Err(Error::NoPrimitiveRoot { order, q });
    }

    let cofactor = (q - 1) / order;

    // For a power of two order, x is primitive iff x^(order/2) = -1.
    for g in 2..q {
        let root = mod_pow(g, cofactor, q);

        if mod_pow(root, order >> 1, q) == q - 1 {
            return Ok(root);
        }
    }

    Err(Error::NoPrimitiveRoot { order, q })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn small_primes_are_classified() {
        let primes = [2u64, 3, 5, 7, 11, 13, 97, 65537, 998_244_353];
        let composites = [0u64, 1, 4, 9, 561, 1105, 65535, 3_215_031_751];

        for p in primes {
            assert!(is_prime(p), "{p}");
        }

        for c in composites {
            assert!(!is_prime(c), "{c}");
        }
    }

    #[test]
    fn first_and_previous_prime_are_ntt_friendly() {
        for (bits, m) in [(27, 1024u64), (28, 2048), (29, 4096), (54, 4096)] {
            let first = first_prime(bits, m).unwrap();

            assert!(first > 1 << bits);
            assert_eq!(first % m, 1);
            assert!(is_prime(first));

            let prev = previous_prime(first, m).unwrap();

            assert!(prev < 1 << bits);
            assert_eq!(prev % m, 1);
            assert!(is_prime(prev));

            assert_eq!(next_prime(prev, m).unwrap(), first);
        }
    }

    #[test]
    fn finds_primitive_roots() {
        let q = previous_prime(first_prime(27, 1024).unwrap(), 1024).unwrap();
        let psi = primitive_root_of_unity(1024, q).unwrap();

        assert_eq!(mod_pow(psi, 1024, q), 1);
        assert_eq!(mod_pow(psi, 512, q), q - 1);

        assert!(primitive_root_of_unity(1024, 65537 * 3).is_err());
    }

    proptest! {
        #[test]
        fn agrees_with_trial_division(n in 0u64..200_000) {
            let trial = n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0);

            prop_assert_eq!(is_prime(n), trial);
        }
    }
}
