//! Domain types shared by the handler and the traffic generator

pub mod auth;

pub use auth::{AuthRequest, AuthStatus};
