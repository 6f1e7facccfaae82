//! Library exports for tuum-session, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod startup;
pub mod store;
pub mod utils;

pub use client::{ApiResponse, FormData, RequestBody, RequestOptions, Session, SessionBuilder};
pub use error::{SessionError, TransportError};
pub use events::{LoggingListener, SessionListener};
pub use models::Credential;
