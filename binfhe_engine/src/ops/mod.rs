/// Blind rotation of the accumulator and sample extraction.
pub mod blind_rotation;

/// Programmable bootstrapping and the evaluations built on it.
pub mod bootstrapping;

/// Accumulator key generation, single party and threshold.
pub mod keygen;

/// LWE keys, encryption, key switching and threshold decryption.
pub mod lwe;

/// RGSW encryption, the external product and threshold RGSW helpers.
pub mod rgsw;
