//! HTTP API.
//!
//! `api_router()` returns the full `Router`; `server` binds it to a socket
//! and owns the shutdown channel. Handlers move SQLite and LLM work onto
//! the blocking pool through `ApiContext`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
