//! Server-side read path

mod client;

pub use client::{ReadClient, ReadFallback};
