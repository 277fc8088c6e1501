//! Outcome of a call to the third-party recipe API
//!
//! Upstream calls never fail the request that made them. Instead of a
//! `Result`, they return [`Upstream`], which callers collapse to an empty or
//! absent value. `Missing` and `Unavailable` are kept apart so logs can tell
//! "nothing there" from "could not ask".

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("undecodable payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Upstream<T> {
    Fetched(T),
    /// The upstream answered, but had nothing for us (404 or empty payload)
    Missing,
    Unavailable(UpstreamError),
}

impl<T> Upstream<T> {
    pub fn map<U, F>(self, f: F) -> Upstream<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Upstream::Fetched(value) => Upstream::Fetched(f(value)),
            Upstream::Missing => Upstream::Missing,
            Upstream::Unavailable(err) => Upstream::Unavailable(err),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Upstream::Fetched(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Upstream::Fetched(_))
    }

    /// Record a degraded outcome against the named endpoint
    pub fn logged(self, endpoint: &str) -> Self {
        match &self {
            Upstream::Fetched(_) => {}
            Upstream::Missing => debug!("Upstream {} returned nothing", endpoint),
            Upstream::Unavailable(err) => warn!("Upstream {} unavailable: {}", endpoint, err),
        }
        self
    }
}

impl<T: Default> Upstream<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}
