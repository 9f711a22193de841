pub mod config;
pub mod error;
pub mod export;
pub mod pacing;
pub mod pipeline;
pub mod provision;
pub mod server;
pub mod upstream;
