//! Argon2id key derivation for password → container key.

use {argon2::Argon2, rand::RngCore, zeroize::Zeroizing};

use crate::error::{EngineError, Result};

/// Length of a derived key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Length of the salt written into every symmetric container.
pub const SALT_LEN: usize = 16;

/// Shortest salt accepted by [`derive_key`].
pub const MIN_SALT_LEN: usize = 16;

/// Upper bound on memory cost accepted from a container (1 GiB).
pub const MAX_M_COST: u32 = 1 << 20;
/// Upper bound on iterations accepted from a container.
pub const MAX_T_COST: u32 = 16;
/// Upper bound on lanes accepted from a container.
pub const MAX_P_COST: u32 = 16;

/// Argon2id cost parameters, written into each symmetric container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 64 MiB = 65536).
    pub m_cost: u32,
    /// Number of iterations (default: 3).
    pub t_cost: u32,
    /// Degree of parallelism (default: 1).
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 65536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// Check the parameters against Argon2's limits and the decoder bounds.
    ///
    /// The upper bounds keep a hostile container from demanding unbounded
    /// memory or time from the reader.
    pub fn validate(&self) -> Result<()> {
        if self.p_cost == 0 || self.p_cost > MAX_P_COST {
            return Err(EngineError::InvalidKdfParams(format!(
                "p_cost {} outside 1..={MAX_P_COST}",
                self.p_cost
            )));
        }
        if self.t_cost == 0 || self.t_cost > MAX_T_COST {
            return Err(EngineError::InvalidKdfParams(format!(
                "t_cost {} outside 1..={MAX_T_COST}",
                self.t_cost
            )));
        }
        let min_m_cost = 8 * self.p_cost;
        if self.m_cost < min_m_cost || self.m_cost > MAX_M_COST {
            return Err(EngineError::InvalidKdfParams(format!(
                "m_cost {} outside {min_m_cost}..={MAX_M_COST}",
                self.m_cost
            )));
        }
        Ok(())
    }
}

/// Derive a 256-bit key from a password and salt using Argon2id.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if salt.len() < MIN_SALT_LEN {
        return Err(EngineError::InvalidKdfParams(format!(
            "salt must be at least {MIN_SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    params.validate()?;

    let argon2_params =
        argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))
            .map_err(|e| EngineError::InvalidKdfParams(e.to_string()))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, output.as_mut())
        .map_err(|e| EngineError::InvalidKdfParams(format!("KDF failed: {e}")))?;

    Ok(output)
}

/// Generate a fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
