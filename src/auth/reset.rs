//! Single-use password-reset tokens.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

const RESET_TOKEN_BYTES: usize = 32;

/// Reset links stop working one hour after issuance.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// 256 bits of OS randomness, hex-encoded. Collisions are treated as
/// negligible; the store enforces no uniqueness on this column.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn reset_token_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES)
}
