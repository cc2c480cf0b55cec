use rand::{rngs::OsRng, RngCore};

/// Bytes of OS randomness per token; hex encoding doubles the length.
pub const TOKEN_BYTES: usize = 32;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Generates an opaque token: 32 random bytes as 64 lowercase hex chars.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Strips the case-sensitive `Bearer ` scheme. `None` for any other shape.
pub fn parse_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
