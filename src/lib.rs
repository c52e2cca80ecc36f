extern crate self as evalkit;

mod client;
mod config;
pub mod schema;

pub use client::*;
pub use config::*;
pub use evalkit_core::*;
pub use evalkit_macros::Entity;
