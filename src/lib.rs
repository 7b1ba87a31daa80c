pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod scheduler;

pub use cli::cli;
