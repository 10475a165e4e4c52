pub mod config;
pub mod listener;
pub mod logging;
pub mod shutdown;
