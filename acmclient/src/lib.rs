pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;

pub use client::Client;
pub use config::Config;
