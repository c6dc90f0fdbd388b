//! Password hashing and verification.

use crate::Result;

/// bcrypt work factor. The digest embeds its own cost and salt, so raising
/// this later keeps previously stored digests verifiable.
pub const HASH_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String> {
    Ok(bcrypt::hash(plain, HASH_COST)?)
}

/// Constant-time comparison against the digest's embedded parameters.
/// Malformed digests verify as false rather than erroring.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    bcrypt::verify(plain, digest).unwrap_or(false)
}
