mod commands;
mod config;
pub mod render;

pub use commands::{execute, CliCommand, PostArgs};
pub use config::CliConfig;
