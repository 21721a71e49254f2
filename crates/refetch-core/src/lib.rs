pub mod config;
pub mod logging;

pub mod cancel;
pub mod fetch;
pub mod retry;
