//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: file-backed storage for the bearer token issued at login
//! - `CredentialStore`: secure OS-level credential storage via keyring
//! - `TokenProvider`: the capability the request gateway reads tokens through
//!
//! No expiry is tracked locally: a stored token is used until the backend
//! rejects it or the user logs out.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};

/// Read access to the current session credential.
///
/// The gateway takes one of these at construction instead of reaching into
/// ambient storage, so tests can substitute a fixed or absent token.
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, if a session is stored.
    fn token(&self) -> Option<String>;

    /// Discard the stored credential, e.g. after the backend rejected it.
    fn invalidate(&self) {}
}
