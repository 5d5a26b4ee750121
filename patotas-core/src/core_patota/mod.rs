//! Patotas: groups, invite codes, access and rosters
//!
//! Services take an explicit [`Session`](crate::core_identity::Session) and
//! talk to persistence through the [`PatotaStore`] trait.

pub mod access;
pub mod errors;
pub mod invite;
pub mod membership;
pub mod notice;
pub mod patota;
pub mod policy;
pub mod roster;
pub mod services;
pub mod storage;
pub mod store;
pub mod types;

pub use access::{Access, AccessGate};
pub use errors::{Missing, PatotaError};
pub use invite::{InviteCode, InviteCodeError};
pub use membership::{JoinOutcome, MembershipService};
pub use notice::{Severity, UserNotice};
pub use patota::{is_administrator, Membership, Patota, PatotaSummary, Role};
pub use roster::{RosterEntry, RosterProjection, NAME_UNAVAILABLE};
pub use services::PatotaServices;
pub use storage::{MemoryPatotaStore, PatotaSqlStore};
pub use store::{PatotaStore, StoreError};
pub use types::PatotaId;
