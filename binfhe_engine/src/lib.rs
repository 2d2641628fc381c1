#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate contains the engines behind FHEW-style Boolean FHE: LWE key generation,
//! encryption, key and modulus switching on one side, and on the other the GINX accumulator
//! that blind-rotates a lookup polynomial to bootstrap ciphertexts.
//!
//! The [`entities`] module holds the keys and ciphertexts, [`ops`] the free functions that
//! operate on them and [`AccumulatorEngine`] a counting facade over the accumulator operations
//! used by higher level contexts.
//!
//! # Example
//!
//! ```rust
//! use binfhe_engine::{ops::lwe, test_utils::{test_lwe_params, test_ring_key}};
//!
//! let params = test_lwe_params();
//! let sk = lwe::key_gen(params.n, params.q_ks);
//! let z = test_ring_key(&params);
//! let ksk = lwe::key_switch_gen(&params, &sk, &z).unwrap();
//!
//! // Encrypt under the ring secret, then switch down to the small key.
//! let ct = lwe::encrypt(&params, &z, 3, 4, params.big_q);
//! let ct = lwe::switch_dimension(&params, &ksk, &ct).unwrap();
//!
//! assert_eq!(lwe::decrypt(&sk, &ct, 4), 3);
//! ```

mod engine;
/// Keys and ciphertexts.
pub mod entities;
mod error;
/// Operations over [`entities`].
pub mod ops;
mod params;
/// Randomness used by key generation and encryption.
pub mod sampling;
#[doc(hidden)]
pub mod test_utils;

pub use engine::*;
pub use error::*;
pub use params::*;
