//! All functions take operands already reduced into `[0, q)` unless noted otherwise. Moduli may
//! be any value up to `2^63`; products widen to `u128`.

#[inline(always)]
/// Compute `(a + b) mod q`.
pub fn mod_add(a: u64, b: u64, q: u64) -> u64 {
    let (sum, overflow) = a.overflowing_add(b);

    if overflow || sum >= q {
        sum.wrapping_sub(q)
    } else {
        sum
    }
}

#[inline(always)]
/// Compute `(a - b) mod q`.
pub fn mod_sub(a: u64, b: u64, q: u64) -> u64 {
    if a >= b { a - b } else { q - b + a }
}

#[inline(always)]
/// Compute `-a mod q`.
pub fn mod_neg(a: u64, q: u64) -> u64 {
    if a == 0 { 0 } else { q - a }
}

#[inline(always)]
/// Compute `a * b mod q`.
pub fn mod_mul(a: u64, b: u64, q: u64) -> u64 {
    ((a as u128 * b as u128) % q as u128) as u64
}

/// Compute `base^exp mod q` by square and multiply.
pub fn mod_pow(base: u64, mut exp: u64, q: u64) -> u64 {
    if q == 1 {
        return 0;
    }

    let mut result = 1;
    let mut base = base % q;

    while exp > 0 {
        if exp & 0x1 == 1 {
            result = mod_mul(result, base, q);
        }

        base = mod_mul(base, base, q);
        exp >>= 1;
    }

    result
}

/// The inverse of `a` modulo the prime `q`.
///
/// # Panics
/// If `a` is zero mod `q`.
pub fn mod_inverse_prime(a: u64, q: u64) -> u64 {
    assert_ne!(a % q, 0, "zero has no inverse");

    mod_pow(a, q - 2, q)
}

#[inline(always)]
/// Map a signed value into `[0, q)`.
pub fn reduce_signed(x: i64, q: u64) -> u64 {
    let r = (x as i128).rem_euclid(q as i128);

    r as u64
}

#[inline(always)]
/// Map `x` in `[0, q)` to its centered representative in `(-q/2, q/2]`.
pub fn centered(x: u64, q: u64) -> i64 {
    if x > q / 2 {
        -((q - x) as i64)
    } else {
        x as i64
    }
}

#[inline(always)]
/// Round `x * to / from`, reducing the result into `[0, to)`.
///
/// # Remarks
/// This is the modulus switch applied to every coordinate of an LWE ciphertext.
pub fn scale_round(x: u64, from: u64, to: u64) -> u64 {
    let num = x as u128 * to as u128 + (from as u128 >> 1);

    ((num / from as u128) % to as u128) as u64
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const Q: u64 = 0x3fff_ffff_ffe0_0001;

    proptest! {
        #[test]
        fn add_sub_are_inverse(a in 0..Q, b in 0..Q) {
            prop_assert_eq!(mod_sub(mod_add(a, b, Q), b, Q), a);
        }

        #[test]
        fn mul_matches_wide_arithmetic(a in 0..Q, b in 0..Q) {
            let expected = ((a as u128 * b as u128) % Q as u128) as u64;

            prop_assert_eq!(mod_mul(a, b, Q), expected);
        }

        #[test]
        fn centered_round_trips(x in 0..Q) {
            prop_assert_eq!(reduce_signed(centered(x, Q), Q), x);
        }

        #[test]
        fn scale_round_is_within_half(x in 0u64..(1 << 27)) {
            let from = 1u64 << 27;
            let to = 1u64 << 10;

            let y = scale_round(x, from, to);
            let back = y as i128 * (from / to) as i128;
            let diff = (x as i128 - back).rem_euclid(from as i128);
            let diff = diff.min(from as i128 - diff);

            prop_assert!(diff <= (from / to / 2) as i128);
        }
    }

    #[test]
    fn pow_and_inverse_agree() {
        let q = 65537;

        for a in [1, 2, 3, 12345, 65536] {
            let inv = mod_inverse_prime(a, q);

            assert_eq!(mod_mul(a, inv, q), 1);
        }

        assert_eq!(mod_pow(3, 0, q), 1);
        assert_eq!(mod_pow(2, 16, q), 65536);
    }

    #[test]
    fn reduce_signed_handles_negatives() {
        assert_eq!(reduce_signed(-1, 17), 16);
        assert_eq!(reduce_signed(-18, 17), 16);
        assert_eq!(reduce_signed(5, 17), 5);
        assert_eq!(mod_neg(0, 17), 0);
        assert_eq!(mod_neg(3, 17), 14);
    }
}
