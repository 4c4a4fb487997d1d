//! Weather refresh cadence and observation bookkeeping.

use curve_defence_core::{WeatherFetchOutcome, WeatherKind};
use curve_defence_system_weather::classify;

/// Tracks the active weather bucket and decides when to ask for a fresh
/// observation.
///
/// The station re-requests on every interval regardless of whether the
/// previous request was ever answered, so a lost fetch heals itself on the
/// next cycle.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WeatherStation {
    current: WeatherKind,
    since_request: f32,
    refresh_interval: f32,
}

impl WeatherStation {
    /// Creates a station that wants an observation immediately.
    pub(crate) fn new(refresh_interval: f32) -> Self {
        Self {
            current: WeatherKind::Clear,
            since_request: refresh_interval,
            refresh_interval,
        }
    }

    /// Advances the refresh timer. Returns true when a fetch should be
    /// requested.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.since_request += dt;
        if self.since_request >= self.refresh_interval {
            self.since_request = 0.0;
            return true;
        }
        false
    }

    /// Resolves a fetch outcome into a bucket. Returns the new bucket only
    /// when it differs from the active one.
    pub(crate) fn submit(&mut self, outcome: WeatherFetchOutcome) -> Option<WeatherKind> {
        let resolved = match outcome {
            WeatherFetchOutcome::Observed { code } => classify(code),
            WeatherFetchOutcome::Unavailable => WeatherKind::Clear,
        };
        if resolved == self.current {
            return None;
        }
        self.current = resolved;
        Some(resolved)
    }

    pub(crate) const fn current(&self) -> WeatherKind {
        self.current
    }
}
