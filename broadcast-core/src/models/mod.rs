pub mod config;
pub mod devices;
pub mod error;
pub mod state;
pub mod stats;
