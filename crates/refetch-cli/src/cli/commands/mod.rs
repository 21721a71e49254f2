//! CLI command handlers, one file per command.

mod get;
mod show_config;

pub use get::{run_get, GetArgs};
#[cfg(test)]
pub(crate) use get::build_request;
pub use show_config::run_show_config;
