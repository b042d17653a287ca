//! REST client for the verb taxonomy backend.
//!
//! - [`VerbnavClient`]: auth, users and taxonomy endpoints over `reqwest`
//! - [`Session`]: the bearer token capability the client reads and clears
//! - `TaxonomyFetcher` for [`VerbnavClient`], so a `Navigator` can drive it

mod client;
mod config;
mod error;
mod fetcher;
mod session;

pub use client::VerbnavClient;
pub use config::{BackendConfig, SessionConfig};
pub use error::{BackendError, Result};
pub use fetcher::synthetic_verb_id;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
