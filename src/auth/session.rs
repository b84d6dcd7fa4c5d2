use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random token, used for both login
/// sessions and password resets.
pub fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Hash a token for at-rest storage. Password-reset tokens are only ever
/// persisted hashed, so a database leak does not leak usable tokens.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
