#[derive(Debug, thiserror::Error)]
/// Errors that can occur while configuring a [`crate::BinFheContext`] or running its protocols.
pub enum Error {
    /// The bootstrapping method, preset or modulus bound isn't supported.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// No preset has this name.
    #[error("Unknown parameter set {0:?}")]
    UnknownParameterSet(String),

    /// A ciphertext isn't at the large dimension and modulus `(N, Q)`.
    #[error(
        "Expected a ciphertext of dimension {expected_dim} mod {expected_modulus}, got dimension {actual_dim} mod {actual_modulus}"
    )]
    DimensionMismatch {
        /// The required dimension.
        expected_dim: usize,
        /// The ciphertext's dimension.
        actual_dim: usize,
        /// The required modulus.
        expected_modulus: u64,
        /// The ciphertext's modulus.
        actual_modulus: u64,
    },

    /// Lookup tables can only be built for power of two plaintext moduli no larger than `q`.
    #[error("Plaintext modulus {0} must be a power of two no larger than q")]
    InvalidPlaintextModulus(u64),

    /// A function used to build a lookup table returned a value outside `[0, p)`.
    #[error("f({input}) = {output} is outside [0, {p})")]
    FunctionRangeViolation {
        /// The plaintext the function was evaluated at.
        input: u64,
        /// The value it returned.
        output: u64,
        /// The plaintext modulus.
        p: u64,
    },

    /// Threshold decryption needs one share from every party, exactly one of them the lead's.
    #[error("Expected {expected} decryption shares with one lead share, got {actual} with {leads}")]
    InsufficientDecryptionShares {
        /// The configured number of parties.
        expected: usize,
        /// The number of shares supplied.
        actual: usize,
        /// How many of them were lead shares.
        leads: usize,
    },

    /// Sign evaluation and digit decomposition take ciphertexts with a modulus above `q`.
    #[error("Ciphertext modulus {modulus} must exceed q = {q}")]
    LargePrecisionRequired {
        /// The ciphertext modulus.
        modulus: u64,
        /// The small modulus.
        q: u64,
    },

    /// The lookup table is neither negacyclic nor periodic, which requires `q <= N`.
    #[error("Arbitrary functions need q = {modulus} <= N = {ring_dim}")]
    ArbitraryFunctionModulus {
        /// The ciphertext modulus.
        modulus: u64,
        /// The ring dimension.
        ring_dim: usize,
    },

    /// An error from parameter derivation.
    #[error("{0}")]
    Math(#[from] binfhe_math::Error),

    /// An error from the LWE or accumulator engine.
    #[error("{0}")]
    Engine(binfhe_engine::Error),

    /// A serialized buffer failed to decode.
    #[error("{0}")]
    Bincode(#[from] bincode::Error),
}

impl From<binfhe_engine::Error> for Error {
    fn from(value: binfhe_engine::Error) -> Self {
        match value {
            binfhe_engine::Error::LargePrecisionRequired { modulus, q } => {
                Self::LargePrecisionRequired { modulus, q }
            }
            binfhe_engine::Error::ArbitraryFunctionModulus { modulus, ring_dim } => {
                Self::ArbitraryFunctionModulus { modulus, ring_dim }
            }
            e => Self::Engine(e),
        }
    }
}

/// A [`std::result::Result`] with this crate's [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
