//! Admin password hashing (Argon2id, PHC string format).
//!
//! Databases created by the earlier Node server hold bcrypt hashes. Those
//! still verify, and callers rehash them with Argon2 after a good login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {e}"))
}

/// bcrypt hashes (`$2a$`, `$2b$`, `$2y$`).
pub fn is_legacy_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|prefix| hash.starts_with(prefix))
}

/// Unparseable hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if is_legacy_hash(hash) {
        return bcrypt::verify(password, hash).unwrap_or(false);
    }

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("admin123").unwrap();
        assert_ne!(hash, "admin123");
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn bcrypt_hashes_still_verify() {
        let legacy = bcrypt::hash("admin123", 4).unwrap();
        assert!(is_legacy_hash(&legacy));
        assert!(verify_password("admin123", &legacy));
        assert!(!verify_password("admin124", &legacy));

        assert!(!is_legacy_hash(&hash_password("admin123").unwrap()));
        assert!(!verify_password("admin123", ""));
        assert!(!verify_password("admin123", "$2b$10$truncated"));
    }
}
