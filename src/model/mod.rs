pub mod config;
pub mod phase;
pub mod platform;
pub mod release;
