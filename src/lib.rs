// Public API for integration tests and the server binary

pub mod api;
pub mod config;
pub mod prompts;
pub mod state;
pub mod store;
pub mod types;
