//! HTTP host for the panel's display surface and user actions.

mod config;
mod requests_logging;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use requests_logging::RequestsLoggingLevel;
pub use server::{make_app, run_server};
pub use state::ServerState;
