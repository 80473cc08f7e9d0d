//! Domain data types

mod auth;
mod user;

pub use auth::{
    Credentials, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionTokens,
};
pub use user::{Company, StoreUser};
