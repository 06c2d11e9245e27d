// src/services/relay.rs

//! Relay selection for outbound requests.
//!
//! Rotation is an explicit cursor into a fixed list; callers thread the
//! cursor through each attempt instead of the pool mutating itself.

use std::fmt;

use crate::error::{AppError, Result};

/// An outbound proxy endpoint, e.g. `http://10.0.0.1:3128`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    endpoint: String,
}

impl Relay {
    /// Validate an endpoint the way the HTTP client will consume it.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(AppError::proxy("empty relay endpoint"));
        }
        reqwest::Proxy::all(endpoint)
            .map_err(|e| AppError::proxy(format!("malformed relay '{endpoint}': {e}")))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Display for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint)
    }
}

/// Fixed, non-empty list of relays used round-robin.
#[derive(Debug, Clone)]
pub struct RelayPool {
    relays: Vec<Relay>,
}

impl RelayPool {
    /// Build a pool; fails if the list is empty or any entry is malformed.
    pub fn new<S: AsRef<str>>(endpoints: &[S]) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(AppError::proxy("relay pool is empty"));
        }
        let relays = endpoints
            .iter()
            .map(|e| Relay::parse(e.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { relays })
    }

    pub fn len(&self) -> usize {
        self.relays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }

    pub fn relays(&self) -> &[Relay] {
        &self.relays
    }

    /// Relay at `cursor`, wrapping at the end of the list.
    pub fn at(&self, cursor: usize) -> &Relay {
        &self.relays[cursor % self.relays.len()]
    }
}

/// How requests leave the process.
#[derive(Debug, Clone, Default)]
pub enum Routing {
    #[default]
    Direct,
    /// One relay for every request
    Static(Relay),
    /// Rotate through the pool, one step per attempt
    Pool(RelayPool),
}

impl Routing {
    /// Pick the relay for this attempt and return the cursor for the next one.
    pub fn select(&self, cursor: usize) -> (Option<&Relay>, usize) {
        match self {
            Routing::Direct => (None, cursor),
            Routing::Static(relay) => (Some(relay), cursor),
            Routing::Pool(pool) => (Some(pool.at(cursor)), (cursor + 1) % pool.len()),
        }
    }

    /// Every relay this routing may hand out.
    pub fn relays(&self) -> Vec<&Relay> {
        match self {
            Routing::Direct => Vec::new(),
            Routing::Static(relay) => vec![relay],
            Routing::Pool(pool) => pool.relays().iter().collect(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Routing::Direct => "direct connection".to_string(),
            Routing::Static(relay) => format!("static relay {relay}"),
            Routing::Pool(pool) => format!("rotating pool of {} relays", pool.len()),
        }
    }
}
