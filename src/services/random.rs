// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cryptographically secure identifiers and tokens.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Bytes of entropy in a password reset token (160 bits).
pub const RESET_TOKEN_BYTES: usize = 20;

/// Bytes of entropy in a document ID.
const ID_BYTES: usize = 12;

/// Fill a fixed-size buffer from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], AppError> {
    let mut buf = [0u8; N];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(buf)
}

/// New password reset token: 20 random bytes, hex encoded.
pub fn reset_token() -> Result<String, AppError> {
    Ok(hex::encode(random_bytes::<RESET_TOKEN_BYTES>()?))
}

/// New document ID.
pub fn document_id() -> Result<String, AppError> {
    Ok(hex::encode(random_bytes::<ID_BYTES>()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reset_token_has_160_bits() {
        let token = reset_token().unwrap();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_distinct() {
        let tokens: HashSet<String> = (0..100).map(|_| reset_token().unwrap()).collect();
        assert_eq!(tokens.len(), 100);
    }
}
