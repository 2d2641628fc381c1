use crate::security::{SecretDistribution, SecurityLevel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Errors that can occur in number theoretic routines.
pub enum Error {
    /// The prime search walked off the end of the representable range.
    #[error("No prime congruent to 1 mod {modulus} found starting from {start}")]
    NoPrimeFound {
        /// Where the search began.
        start: u64,
        /// The congruence modulus.
        modulus: u64,
    },

    /// The modulus has no root of unity of the requested order.
    #[error("No primitive {order}-th root of unity exists modulo {q}")]
    NoPrimitiveRoot {
        /// The requested order.
        order: u64,
        /// The modulus.
        q: u64,
    },

    /// No tabulated ring dimension reaches the requested security.
    #[error("No ring dimension gives {level:?} security for {dist:?} secrets at {log_q} bits")]
    UnsupportedSecurity {
        /// Requested security level.
        level: SecurityLevel,
        /// Secret key distribution.
        dist: SecretDistribution,
        /// Bit length of the modulus.
        log_q: u32,
    },
}

/// A [`std::result::Result`] with this crate's [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
