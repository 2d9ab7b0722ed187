//! HTTP interface
//!
//! - `modules`: handlers grouped per endpoint, plus request-id middleware
//! - `router`: route table and shared state

pub mod modules;
pub mod router;

pub use router::{create_router, AppState};
