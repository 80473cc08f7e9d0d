//! Auth endpoint wrappers

mod api;

pub use api::AuthApi;
