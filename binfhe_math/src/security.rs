use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Classical security targets from the homomorphic encryption standard.
pub enum SecurityLevel {
    /// 128 bits of classical security.
    Classic128,
    /// 192 bits of classical security.
    Classic192,
    /// 256 bits of classical security.
    Classic256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The distribution secret key coefficients are drawn from.
pub enum SecretDistribution {
    /// Uniform over `{-1, 0, 1}`.
    UniformTernary,
    /// Discrete Gaussian with the scheme's standard deviation.
    Gaussian,
}

/// Ring dimensions covered by the standard's tables.
pub const RING_DIMS: [usize; 6] = [1024, 2048, 4096, 8192, 16384, 32768];

/// The largest `log2(Q)` at which each entry of [`RING_DIMS`] meets the security target.
pub fn max_log_q_table(dist: SecretDistribution, level: SecurityLevel) -> [u32; 6] {
    match (dist, level) {
        (SecretDistribution::UniformTernary, SecurityLevel::Classic128) => {
            [27, 54, 109, 218, 438, 881]
        }
        (SecretDistribution::UniformTernary, SecurityLevel::Classic192) => {
            [19, 37, 75, 152, 305, 611]
        }
        (SecretDistribution::UniformTernary, SecurityLevel::Classic256) => {
            [14, 29, 58, 118, 237, 476]
        }
        (SecretDistribution::Gaussian, SecurityLevel::Classic128) => [29, 56, 111, 220, 440, 883],
        (SecretDistribution::Gaussian, SecurityLevel::Classic192) => [21, 39, 77, 154, 307, 613],
        (SecretDistribution::Gaussian, SecurityLevel::Classic256) => [16, 31, 60, 120, 239, 478],
    }
}

/// The largest modulus bit length a ring of dimension `ring_dim` supports at the given level,
/// or `None` if the dimension isn't tabulated.
pub fn max_log_q(dist: SecretDistribution, level: SecurityLevel, ring_dim: usize) -> Option<u32> {
    let idx = RING_DIMS.iter().position(|n| *n == ring_dim)?;

    Some(max_log_q_table(dist, level)[idx])
}

/// Find the smallest tabulated ring dimension whose security at `log_q` bits meets `level`.
pub fn find_ring_dim(dist: SecretDistribution, level: SecurityLevel, log_q: u32) -> Result<usize> {
    let table = max_log_q_table(dist, level);

    let ring_dim = RING_DIMS
        .iter()
        .zip(table)
        .find(|(_, max)| log_q <= *max)
        .map(|(n, _)| *n)
        .ok_or(Error::UnsupportedSecurity { level, dist, log_q })?;

    debug!("{level:?} security for {log_q}-bit {dist:?} secrets needs N = {ring_dim}");

    Ok(ring_dim)
}
