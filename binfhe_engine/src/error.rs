#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Errors that can occur in the LWE and accumulator engines.
pub enum Error {
    /// An entity's dimension doesn't match the one the operation requires.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The required dimension.
        expected: usize,
        /// The dimension supplied.
        actual: usize,
    },

    /// A floor was asked to clear more plaintext bits than a `u64` modulus holds.
    #[error("Cannot floor away {0} bits")]
    InvalidRoundBits(u32),

    /// An entity lives under a different modulus than the operation requires.
    #[error("Modulus mismatch: expected {expected}, got {actual}")]
    ModulusMismatch {
        /// The required modulus.
        expected: u64,
        /// The modulus supplied.
        actual: u64,
    },

    /// A threshold artifact holds the wrong number of party contributions.
    #[error("Expected contributions from {expected} parties, found {actual}")]
    PartyCountMismatch {
        /// The configured number of parties.
        expected: usize,
        /// The number of contributions present.
        actual: usize,
    },

    /// Partial RGSW encryptions don't share the common reference string.
    #[error("The RGSW ciphertexts weren't generated from the same reference string")]
    ReferenceStringMismatch,

    /// GINX blind rotation requires secret keys with coefficients in `{-1, 0, 1}`.
    #[error("The LWE secret key isn't ternary")]
    UnsupportedSecretKey,

    /// Only GINX blind rotation is implemented.
    #[error("Blind rotation method {0:?} isn't supported")]
    UnsupportedMethod(crate::BootstrapMethod),

    /// The parameters have no gadget decomposition for this base.
    #[error("No gadget decomposition for base {0}")]
    UnknownGadgetBase(u32),

    /// No bootstrapping key exists for the base an operation switched to.
    #[error("No bootstrapping key found for base {0}")]
    MissingBootstrappingKey(u32),

    /// Blind rotation requires a ciphertext modulus dividing `2N`.
    #[error("Ciphertext modulus {modulus} doesn't divide 2N = {two_n}")]
    UnsupportedModulus {
        /// The ciphertext modulus.
        modulus: u64,
        /// Twice the ring dimension.
        two_n: u64,
    },

    /// Evaluating a function that is neither negacyclic nor periodic requires `q <= N`.
    #[error("Arbitrary functions need q = {modulus} <= N = {ring_dim}")]
    ArbitraryFunctionModulus {
        /// The ciphertext modulus.
        modulus: u64,
        /// The ring dimension.
        ring_dim: usize,
    },

    /// Sign evaluation and digit decomposition only apply to moduli above `q`.
    #[error("Ciphertext modulus {modulus} must exceed q = {q}; bootstrap small precision directly")]
    LargePrecisionRequired {
        /// The ciphertext modulus.
        modulus: u64,
        /// The small modulus.
        q: u64,
    },

    /// A deserialized entity is malformed.
    #[error("The entity's size is invalid")]
    InvalidSize,
}

/// A [`std::result::Result`] with this crate's [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
