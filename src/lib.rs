//! Stronghold auth core
//!
//! Embeddable authentication and session engine: argon2id credential
//! verification, TOTP two-factor with single-use recovery codes, rotating
//! refresh sessions with signed access tokens, sealed temp tokens for the 2FA
//! handshake, and brute-force lockout. Transport and routing are left to the
//! embedding application; every operation here is a plain async method on a
//! service held by [`context::AppContext`].

pub mod account;
pub mod auth;
pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod mailer;
pub mod session;
pub mod twofactor;

#[cfg(test)]
mod test_support;

pub use auth::{AuthManager, LoginRequest, LoginResponse};
pub use config::CoreConfig;
pub use context::AppContext;
pub use error::{AuthError, AuthResult};
pub use session::AuthTokens;
