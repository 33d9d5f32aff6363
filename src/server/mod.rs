mod compose_routes;
pub mod config;
mod error_responses;
mod http_layers;
pub mod server;
mod session;
pub mod state;
mod user_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
