/// Agora Auth Library
///
/// Password hashing (Argon2id, PHC strings) and signed session tokens
/// (HS256 JWT). The signing secret is always supplied by the caller; nothing
/// here reads configuration or holds global state.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{IssuedToken, TokenError, TokenIssuer};
