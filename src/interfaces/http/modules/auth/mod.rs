//! Simulated authentication endpoint

pub mod handlers;

pub use handlers::*;
