//! Identity provider
//!
//! Accounts, password sign-in and the session registry. Sessions are plain
//! values handed to callers and passed explicitly into patota operations;
//! session changes are published on a broadcast channel.

pub mod errors;
pub mod local;
pub mod provider;
pub mod types;
pub mod validation;

pub use errors::IdentityError;
pub use local::LocalIdentityProvider;
pub use provider::{IdentityDirectory, IdentityProvider};
pub use types::{Identity, Session, SessionChange, SessionEvent, SessionToken};
