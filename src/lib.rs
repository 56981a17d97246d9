pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod entities;
pub mod handlers;
pub mod message;
pub mod orders;
pub mod reply;
pub mod server;
pub mod store;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
