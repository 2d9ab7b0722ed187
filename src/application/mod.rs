//! Application layer: background traffic generation

pub mod producer;

pub use producer::{TrafficGenerator, UserPool};
