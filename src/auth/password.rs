use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::Context;
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

lazy_static! {
    // Verified against when the user does not exist, so unknown emails cost
    // the same as wrong passwords.
    static ref DUMMY_HASH: String = match hash_password("dummy-password") {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "failed to build dummy hash; unknown-user logins will return early");
            String::new()
        }
    };
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// [`hash_password`] on the blocking pool, so Argon2 never stalls the
/// runtime or runs while a database lock is held.
pub async fn hash_password_blocking(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("hash task panicked")?
}

/// Returns `true` iff `plain` matches `hash`. A hash that does not parse is
/// treated as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "argon2 parse hash error");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Burns one verification's worth of work. Always returns `false`.
pub fn verify_against_dummy(plain: &str) -> bool {
    let _ = verify_password(plain, &DUMMY_HASH);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("pw1").expect("hash a");
        let b = hash_password("pw1").expect("hash b");
        assert_ne!(a, b);
        assert!(verify_password("pw1", &a));
        assert!(verify_password("pw1", &b));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-marker").expect("hash");
        assert!(!hash.contains("plaintext-marker"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn malformed_hash_does_not_match() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn dummy_hash_is_a_real_phc_string() {
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
    }

    #[tokio::test]
    async fn blocking_hash_verifies() {
        let hash = hash_password_blocking("pw1").await.expect("hash");
        assert!(verify_password("pw1", &hash));
    }

    #[test]
    fn dummy_verification_never_matches() {
        assert!(!verify_against_dummy("dummy-password"));
    }
}
