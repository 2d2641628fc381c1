use binfhe_engine::{entities::LweCiphertext, ops::lwe};

use crate::{BinFheContext, BinGate, Error, Result};

impl BinFheContext {
    /// Evaluate a two-input gate on bit encryptions (`p = 4`, modulus `q`), returning a fresh
    /// encryption of the output bit.
    ///
    /// # Panics
    /// If no bootstrapping key has been generated.
    pub fn eval_bin_gate(
        &self,
        gate: BinGate,
        ct1: &LweCiphertext,
        ct2: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        Ok(self
            .engine
            .eval_bin_gate(self.active_key(), gate, ct1, ct2)?)
    }

    /// Refresh the noise of a bit encryption.
    ///
    /// # Panics
    /// If no bootstrapping key has been generated.
    pub fn bootstrap(&self, ct: &LweCiphertext) -> Result<LweCiphertext> {
        Ok(self.engine.bootstrap(self.active_key(), ct)?)
    }

    /// Negate a bit encryption. Doesn't bootstrap.
    pub fn eval_not(&self, ct: &LweCiphertext) -> LweCiphertext {
        self.engine.eval_not(ct)
    }

    /// A noiseless encryption of `bit`, for circuit constants.
    pub fn eval_constant(&self, bit: bool) -> LweCiphertext {
        lwe::noiseless_embedding(self.params.lwe(), bit)
    }

    /// Evaluate a lookup table of length `q`, as built by
    /// [`BinFheContext::generate_lut_via_function`].
    ///
    /// # Panics
    /// If no bootstrapping key has been generated.
    pub fn eval_func(&self, ct: &LweCiphertext, lut: &[u64]) -> Result<LweCiphertext> {
        Ok(self
            .engine
            .eval_func(self.active_key(), ct, lut, self.beta())?)
    }

    /// Build the table evaluating `f` on plaintexts mod `p`: entry `i` holds
    /// `f(i / (q / p), p) * (q / p)`.
    ///
    /// # Remarks
    /// `p` must be a power of two no larger than `q`, and `f` must map into `[0, p)`. The table
    /// can be reused for every ciphertext encrypted mod `p`.
    pub fn generate_lut_via_function<F>(&self, f: F, p: u64) -> Result<Vec<u64>>
    where
        F: Fn(u64, u64) -> u64,
    {
        let q = self.params.lwe().q;

        if !p.is_power_of_two() || p > q {
            return Err(Error::InvalidPlaintextModulus(p));
        }

        let interval = q / p;

        (0..q)
            .map(|i| {
                let input = i / interval;
                let output = f(input, p);

                if output >= p {
                    return Err(Error::FunctionRangeViolation { input, output, p });
                }

                Ok(output * interval)
            })
            .collect()
    }

    /// Round away the low bits of a plaintext: with `round_bits = r > 0` the result encrypts
    /// the input divided by `2^r`, at plaintext modulus `p / 2^r`.
    ///
    /// # Panics
    /// If no bootstrapping key has been generated.
    pub fn eval_floor(&self, ct: &LweCiphertext, round_bits: u32) -> Result<LweCiphertext> {
        Ok(self
            .engine
            .eval_floor(self.active_key(), ct, self.beta(), round_bits)?)
    }

    /// The most significant bit of a plaintext encrypted under a modulus above `q`, as an
    /// encryption of a bit mod `q`.
    ///
    /// # Remarks
    /// In multi-base mode the evaluation switches to the cached keys for larger gadget bases as
    /// the working modulus shrinks, and fails if one is missing.
    ///
    /// # Panics
    /// If no bootstrapping key has been generated.
    pub fn eval_sign(&self, ct: &LweCiphertext) -> Result<LweCiphertext> {
        self.active_key();

        Ok(self
            .engine
            .eval_sign(&self.keys, self.base(), ct, self.beta())?)
    }

    /// Split a plaintext encrypted under a modulus above `q` into digits of
    /// `q / (2 beta)` each, least significant first, every digit encrypted mod `q`.
    ///
    /// # Panics
    /// If no bootstrapping key has been generated.
    pub fn eval_decomp(&self, ct: &LweCiphertext) -> Result<Vec<LweCiphertext>> {
        self.active_key();

        Ok(self
            .engine
            .eval_decomp(&self.keys, self.base(), ct, self.beta())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{get_large_context, get_toy_context};

    use super::*;

    #[test]
    fn gates_match_truth_tables() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);

        for gate in BinGate::ALL {
            for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
                let ct1 = ctx.encrypt(sk, a as u64, 4, None);
                let ct2 = ctx.encrypt(sk, b as u64, 4, None);

                let out = ctx.eval_bin_gate(gate, &ct1, &ct2).unwrap();

                assert_eq!(
                    ctx.decrypt(sk, &out, 4),
                    gate.apply(a, b) as u64,
                    "{gate:?}({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn bootstrap_not_and_constants() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);

        for bit in [false, true] {
            let ct = ctx.encrypt(sk, bit as u64, 4, None);

            let refreshed = ctx.bootstrap(&ct).unwrap();
            assert_eq!(ctx.decrypt(sk, &refreshed, 4), bit as u64);
            assert_eq!(ctx.decrypt(sk, &ctx.eval_not(&refreshed), 4), !bit as u64);

            let constant = ctx.eval_constant(bit);
            assert_eq!(constant.a().iter().copied().max(), Some(0));
            assert_eq!(ctx.decrypt(sk, &constant, 4), bit as u64);

            let out = ctx.eval_bin_gate(BinGate::Xor, &ct, &constant).unwrap();
            assert_eq!(ctx.decrypt(sk, &out, 4), 0);
        }
    }

    #[test]
    fn lut_requires_power_of_two_modulus() {
        let tc = get_toy_context();

        for p in [0, 3, 12, 1024] {
            assert!(matches!(
                tc.ctx.generate_lut_via_function(|m, _| m, p),
                Err(Error::InvalidPlaintextModulus(x)) if x == p
            ));
        }
    }

    #[test]
    fn lut_rejects_out_of_range_outputs() {
        let tc = get_toy_context();

        assert!(matches!(
            tc.ctx.generate_lut_via_function(|m, p| m + p / 2, 8),
            Err(Error::FunctionRangeViolation {
                input: 4,
                output: 8,
                p: 8
            })
        ));
    }

    #[test]
    fn lut_layout() {
        let tc = get_toy_context();
        let q = tc.ctx.params().lwe().q;

        let lut = tc.ctx.generate_lut_via_function(|m, p| (m + 1) % p, 4).unwrap();

        assert_eq!(lut.len() as u64, q);
        assert_eq!(lut[0], q / 4);
        assert_eq!(lut[(q / 4 - 1) as usize], q / 4);
        assert_eq!(lut[(3 * q / 4) as usize], 0);
    }

    #[test]
    fn eval_func_computes_function() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let p = ctx.max_plaintext_space();
        let f = |m: u64, p: u64| (m * m + 1) % p;

        let lut = ctx.generate_lut_via_function(f, p).unwrap();

        for m in 0..p {
            let ct = ctx.encrypt(sk, m, p, None);
            let out = ctx.eval_func(&ct, &lut).unwrap();

            assert_eq!(ctx.decrypt(sk, &out, p), f(m, p), "f({m})");
        }
    }

    #[test]
    fn floor_drops_low_bit() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let p = ctx.max_plaintext_space();

        for m in 0..p {
            let ct = ctx.encrypt(sk, m, p, None);
            let out = ctx.eval_floor(&ct, 1).unwrap();

            assert_eq!(ctx.decrypt(sk, &out, p / 2), m >> 1);
        }
    }

    #[test]
    fn floor_rejects_oversized_round_bits() {
        let tc = get_toy_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let ct = ctx.encrypt(sk, 1, 4, None);

        for round_bits in [58, 63] {
            assert!(matches!(
                ctx.eval_floor(&ct, round_bits),
                Err(Error::Engine(binfhe_engine::Error::InvalidRoundBits(r))) if r == round_bits
            ));
        }

        assert!(matches!(
            ctx.eval_floor(&ct, 20),
            Err(Error::Engine(binfhe_engine::Error::ModulusMismatch { .. }))
        ));
    }

    #[test]
    fn floor_without_round_bits_clears_digit() {
        let tc = get_large_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let modulus = 1 << 17;
        let p = modulus / (2 * ctx.beta());
        let digit = ctx.max_plaintext_space();

        for m in [0, 7, 9, 255, 400] {
            let ct = ctx.encrypt(sk, m, p, Some(modulus));
            let out = ctx.eval_floor(&ct, 0).unwrap();

            assert_eq!(ctx.decrypt(sk, &out, p), m - m % digit, "floor of {m}");
        }
    }

    #[test]
    fn sign_and_decomposition() {
        let tc = get_large_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let modulus = 1 << 17;
        let p = modulus / (2 * ctx.beta());
        let digit = ctx.max_plaintext_space();

        for m in [0, 7, 255, 256, 400] {
            let ct = ctx.encrypt(sk, m, p, Some(modulus));

            let sign = ctx.eval_sign(&ct).unwrap();
            assert_eq!(ctx.decrypt(sk, &sign, 2), (m >= p / 2) as u64, "sign of {m}");

            let digits = ctx.eval_decomp(&ct).unwrap();
            let mut rest = m;

            for d in &digits {
                assert_eq!(ctx.decrypt(sk, d, digit), rest % digit);
                rest /= digit;
            }

            assert_eq!(rest, 0);
        }
    }

    #[test]
    fn precision_primitives_need_large_modulus() {
        let tc = get_large_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);
        let ct = ctx.encrypt(sk, 1, 4, None);

        assert!(matches!(
            ctx.eval_sign(&ct),
            Err(Error::LargePrecisionRequired { .. })
        ));
        assert!(matches!(
            ctx.eval_decomp(&ct),
            Err(Error::LargePrecisionRequired { .. })
        ));
    }

    #[test]
    fn arbitrary_function_needs_small_modulus() {
        let tc = get_large_context();
        let (ctx, sk) = (&tc.ctx, &tc.sk);

        let lut = ctx
            .generate_lut_via_function(|m, p| (m + 1) % p, 8)
            .unwrap();
        let ct = ctx.encrypt(sk, 1, 8, None);

        assert!(matches!(
            ctx.eval_func(&ct, &lut),
            Err(Error::ArbitraryFunctionModulus { .. })
        ));
    }
}
