/// Account management
///
/// Storage and credential primitives for accounts: creation, lookup by
/// normalized email, the failed-attempt counter and lockout fields, and the
/// two-factor flag/secret columns.

pub mod lockout;
mod manager;
pub mod password;

pub use lockout::LockoutPolicy;
pub use manager::{normalize_email, AccountManager};
