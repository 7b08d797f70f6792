//! Simulated market session.
//!
//! Quote fixtures carry one snapshot per session (`PRE`, `REGULAR`, `POST`). Which one
//! is served depends on the process-wide `MarketSession`, changed at runtime through
//! the config endpoint.
//!
//! The session is a single atomic byte. Every quote request takes one snapshot of it
//! before resolving, and a change is visible to every request that starts after the
//! store. Last write wins.
use std::sync::atomic::{AtomicU8, Ordering};

use log::info;
use strum_macros::{Display, EnumString};

use crate::error::RequestError;

/// A trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MarketState {
    /// Pre-market.
    Pre,
    /// Regular hours.
    Regular,
    /// After hours.
    #[default]
    Post,
}

impl MarketState {
    /// Every accepted state.
    pub const ALL: [MarketState; 3] = [MarketState::Pre, MarketState::Regular, MarketState::Post];

    /// Key used for this session inside quote fixtures.
    pub fn fixture_key(self) -> &'static str {
        match self {
            MarketState::Pre => "PRE",
            MarketState::Regular => "REGULAR",
            MarketState::Post => "POST",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            MarketState::Pre => 0,
            MarketState::Regular => 1,
            MarketState::Post => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => MarketState::Pre,
            1 => MarketState::Regular,
            _ => MarketState::Post,
        }
    }
}

/// Shared, atomically updated market state.
#[derive(Debug)]
pub struct MarketSession {
    state: AtomicU8,
}

impl Default for MarketSession {
    fn default() -> Self {
        Self::new(MarketState::default())
    }
}

impl MarketSession {
    /// Create a session starting in `initial`.
    pub fn new(initial: MarketState) -> Self {
        Self {
            state: AtomicU8::new(initial.to_u8()),
        }
    }

    /// Current state.
    pub fn current(&self) -> MarketState {
        MarketState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Replace the state, returning the previous one.
    pub fn set(&self, state: MarketState) -> MarketState {
        let previous = MarketState::from_u8(self.state.swap(state.to_u8(), Ordering::AcqRel));
        info!("Changed market state from {} to {}", previous, state);
        previous
    }

    /// Parse a session name and apply it.
    ///
    /// Only the exact lowercase names are accepted; the state is left untouched on
    /// rejection.
    pub fn set_from_str(&self, value: &str) -> Result<MarketState, RequestError> {
        let state: MarketState = value
            .parse()
            .map_err(|_| RequestError::InvalidConfigValue(value.to_string()))?;
        self.set(state);
        Ok(state)
    }
}
