use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .context("Failed to hash password")?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash).context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validate the signup password policy: at least 8 characters with at least
/// one letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<()> {
    const MIN_LENGTH: usize = 8;

    if password.len() < MIN_LENGTH {
        anyhow::bail!("Password must be at least {MIN_LENGTH} characters long");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        anyhow::bail!("Password must contain at least one letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        anyhow::bail!("Password must contain at least one digit");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "market_pw_1";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("abcdefg1").is_ok());
        assert!(validate_password_strength("MyP2ssword").is_ok());

        // Too short
        assert!(validate_password_strength("ab1").is_err());
        // No digit
        assert!(validate_password_strength("abcdefgh").is_err());
        // No letter
        assert!(validate_password_strength("12345678").is_err());
    }
}
