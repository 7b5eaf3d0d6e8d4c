//! Session-scoped write authorization
//!
//! - **[`ElevationStore`]**: the single active write token, with lazy expiry
//! - **[`SessionStorage`]**: pluggable, best-effort persistence for that token

mod session;
mod store;

pub use session::{
    MemorySessionStorage, PersistedToken, SessionStorage, SessionStorageError, EXPIRES_AT_KEY,
    TOKEN_KEY,
};
pub use store::{ElevationStore, ElevationToken, DEFAULT_ELEVATION_TTL};
