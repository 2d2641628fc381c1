#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! This crate provides [`BinFheContext`], the entry point for FHEW-style Boolean FHE with GINX
//! bootstrapping.
//!
//! A context is built from a named [`ParamSet`], from a target security level or from explicit
//! parameters. It generates keys, encrypts and decrypts, and evaluates gates, lookup tables and
//! large precision sign and digit decomposition over bootstrapping keys it caches by gadget
//! base. It also sequences threshold key generation and decryption among several parties.
//!
//! The [`safe_bincode`] module deserializes keys and ciphertexts with size and shape checks
//! against a context's parameters.
//!
//! # Example
//!
//! ```rust
//! use binfhe::{BinFheContext, BinGate, BootstrapMethod, KeyGenMode, ParamSet};
//!
//! let mut ctx = BinFheContext::from_preset(ParamSet::Toy, BootstrapMethod::Ginx).unwrap();
//!
//! // Generate the secret key and the bootstrapping keys for it.
//! let sk = ctx.key_gen();
//! ctx.bt_key_gen(&sk, KeyGenMode::Symmetric).unwrap();
//!
//! // Bits are encrypted with plaintext modulus 4.
//! let a = ctx.encrypt(&sk, 1, 4, None);
//! let b = ctx.encrypt(&sk, 0, 4, None);
//!
//! let c = ctx.eval_bin_gate(BinGate::Or, &a, &b).unwrap();
//! let c = ctx.eval_not(&c);
//!
//! assert_eq!(ctx.decrypt(&sk, &c, 4), 0);
//!
//! // Small integers go through lookup tables.
//! let p = ctx.max_plaintext_space();
//! let lut = ctx.generate_lut_via_function(|m, p| (3 * m) % p, p).unwrap();
//!
//! let x = ctx.encrypt(&sk, 5, p, None);
//! let y = ctx.eval_func(&x, &lut).unwrap();
//!
//! assert_eq!(ctx.decrypt(&sk, &y, p), 15 % p);
//! ```
mod context;
mod error;
mod params;
/// Size-checked deserialization of keys and ciphertexts.
pub mod safe_bincode;
#[doc(hidden)]
pub mod test_utils;

pub use context::*;
pub use error::*;
pub use params::*;

pub use binfhe_engine::{
    AccumulatorEngine,
    entities::{
        AccumulatorKey, BootstrappingKey, CommonReferenceString, DecryptionShare, KeySwitchKey,
        LweCiphertext, LweKeyPair, LwePrivateKey, LwePublicKey, RgswCiphertext,
    },
    ops::bootstrapping::{BinGate, LutKind},
};
