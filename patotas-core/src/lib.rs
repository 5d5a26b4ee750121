//! Patotas core: identity, patota membership and storage
//!
//! Users sign up and sign in through [`core_identity`]; with a session they
//! create patotas, redeem invite codes, and read rosters through
//! [`core_patota`]. Both sit on the SQLite plumbing in [`storage`].

pub mod config;
pub mod core_identity;
pub mod core_patota;
pub mod logging;
pub mod metrics;
pub mod storage;
pub mod test_utils;
pub mod types;

pub use config::Config;
pub use core_identity::{IdentityError, IdentityProvider, LocalIdentityProvider, Session};
pub use core_patota::{
    Access, JoinOutcome, Patota, PatotaError, PatotaId, PatotaServices, PatotaSqlStore, Role,
    UserNotice,
};
pub use logging::{init_logging, LogLevel};
pub use types::{Timestamp, UserId};
