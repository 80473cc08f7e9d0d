//! Authenticated API client
//!
//! One execution path underlies every verb: attach tenant and auth
//! headers, send, and on a 401 run the single-flight refresh protocol and
//! replay the original request exactly once.

pub mod client;
mod errors;
mod refresh;

pub use client::{ApiClient, Payload, RequestOptions, UploadFile};
pub(crate) use errors::failure_from_response;
