//! Async client for the dnsdeck DNS management API.
//!
//! - **[`ApiClient`]**: endpoint calls (`login`, `list_zones`) with
//!   status and error-body mapping into [`Error`].
//! - **[`TokenBinder`]**: the single current bearer credential, stamped
//!   onto every outgoing request while set.
//! - **[`models`]**: loose wire types; canonical domain types live in
//!   `dnsdeck-core`.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::TokenBinder;
pub use client::ApiClient;
pub use error::Error;
pub use models::{LoginResponse, UserRecord, ZoneRecord};
pub use transport::{TlsMode, TransportConfig};
