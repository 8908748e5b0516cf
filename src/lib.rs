pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod server;
pub mod sync;
