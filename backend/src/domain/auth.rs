//! Credential hashing and token key generation.
//!
//! Passwords are stored as salted SHA-256 digests; tokens are random hex
//! keys of which only the digest reaches storage, so a leaked table cannot
//! be replayed as live credentials.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 32;

/// Random per-user salt, hex encoded.
pub fn generate_salt() -> String {
    random_hex(SALT_BYTES)
}

/// Random token key handed to the client, hex encoded.
pub fn generate_token_key() -> String {
    random_hex(TOKEN_BYTES)
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Digest of a password under the given salt.
pub fn password_digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `candidate` matches the stored digest under the stored salt.
pub fn verify_password(candidate: &str, salt: &str, digest: &str) -> bool {
    password_digest(candidate, salt) == digest
}

/// Digest under which a token key is stored and looked up.
pub fn token_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn digests_are_salt_sensitive() {
        let a = password_digest("hunter2", "salt-a");
        let b = password_digest("hunter2", "salt-b");
        assert_ne!(a, b);
    }

    #[rstest]
    fn verify_accepts_the_original_password_only() {
        let salt = generate_salt();
        let digest = password_digest("hunter2", &salt);
        assert!(verify_password("hunter2", &salt, &digest));
        assert!(!verify_password("hunter3", &salt, &digest));
    }

    #[rstest]
    fn token_keys_are_unique_and_digested() {
        let first = generate_token_key();
        let second = generate_token_key();
        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(token_digest(&first), first);
    }
}
