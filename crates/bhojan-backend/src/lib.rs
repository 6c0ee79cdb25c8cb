//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle: it polls the notification API,
//! applies read-state mutations, plays alert sounds and routes bridge
//! messages to the services that do so.

mod api;
mod app;
mod config;
mod csrf;
mod feed_state;
mod poller;
mod runtime;
mod services;
mod sound;
mod state;
#[cfg(test)]
mod test_support;

pub use crate::api::ApiError;
pub use crate::config::{ConfigError, default_config_path};
pub use crate::runtime::{RuntimeOptions, StartupError, run};
