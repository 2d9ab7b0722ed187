//! Simulated authentication outcome
//!
//! The outcome is a coin flip that ignores the submitted identifier.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Draws strictly above this value succeed, so roughly one request in five
/// is authorized.
pub const DEFAULT_SUCCESS_THRESHOLD: f32 = 0.8;

/// Body of `POST /`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    #[serde(rename = "User", default)]
    pub user: String,
}

impl AuthRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    /// Lenient decode of the first JSON value in `body`; trailing bytes are
    /// ignored. The `User` key matches regardless of ASCII case, an exact
    /// match taking precedence. Anything else gives an empty identifier.
    pub fn decode(body: &[u8]) -> Self {
        let first = serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .next();

        let user = match first {
            Some(Ok(Value::Object(mut fields))) => match fields.remove("User") {
                Some(value) => Some(value),
                None => fields
                    .into_iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case("User"))
                    .map(|(_, value)| value),
            },
            _ => None,
        };

        match user {
            Some(Value::String(user)) => Self { user },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    Authorized,
    Unauthorized,
}

impl AuthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthStatus::Authorized => "200",
            AuthStatus::Unauthorized => "401",
        }
    }

    pub fn from_draw(draw: f32, threshold: f32) -> Self {
        if draw > threshold {
            AuthStatus::Authorized
        } else {
            AuthStatus::Unauthorized
        }
    }

    /// Uniform draw in [0, 1) compared against `threshold`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, threshold: f32) -> Self {
        Self::from_draw(rng.gen::<f32>(), threshold)
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
