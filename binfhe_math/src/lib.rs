#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate contains the number theory used by the Boolean FHE engine: modular arithmetic on
//! word-sized moduli, NTT-friendly prime search, the negacyclic number theoretic transform and
//! the lattice security tables used to size ring dimensions.

/// Arithmetic modulo a word-sized integer.
pub mod modular;

/// Primality testing and NTT-friendly prime search.
pub mod primes;

/// The negacyclic number theoretic transform.
pub mod ntt;

/// Polynomials in `Z_q[X]/(X^N + 1)`.
pub mod poly;

/// Functions related to calculating security parameters.
pub mod security;

mod error;
pub use error::*;
