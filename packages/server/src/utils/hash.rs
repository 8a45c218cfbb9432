use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sha2::{Digest, Sha256};

/// Well-formed hash with default cost that no password matches. Verified
/// against for unknown users so they take as long to reject as known ones.
pub const UNKNOWN_USER_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bi11c2VyLXNhbHQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Stable owner id for an email: lowercase hex SHA-256.
pub fn owner_id(email: &str) -> String {
    hex::encode(Sha256::digest(email.as_bytes()))
}

/// Hash a password into an argon2 PHC string suitable for an htpasswd line.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
