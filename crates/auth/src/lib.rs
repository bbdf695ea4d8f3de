//! # Kenkō auth
//!
//! Client-side identity for the clinic portal: the closed [`Role`]
//! catalogue, the [`Session`] issued at login, durable
//! [`SessionStorage`] for the `token`/`user` pair, and the
//! [`SessionStore`] that owns the current session.

pub mod role;
pub mod session;
pub mod storage;
pub mod store;

pub use role::Role;
pub use session::{Profile, Session};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, StoredEntries};
pub use store::{IdentityVerifier, Revalidation, SessionError, SessionState, SessionStore};
