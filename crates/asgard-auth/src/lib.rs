//! # asgard-auth
//!
//! Authentication for Asgard Backup.
//!
//! ## Modules
//!
//! - `token`: opaque client tokens issued at login
//! - `password`: Argon2id password hashing
//! - `admin`: administrator credential file
//! - `session`: in-memory admin dashboard sessions

pub mod admin;
pub mod password;
pub mod session;
pub mod token;

pub use admin::AdminCredentialStore;
pub use password::PasswordHasher;
pub use session::AdminSessions;
pub use token::TokenStore;

/// Render `len` random bytes as lowercase hex.
pub(crate) fn random_hex(len: usize) -> String {
    use rand::RngCore;

    let mut bytes = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
