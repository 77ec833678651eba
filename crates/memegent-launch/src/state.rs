//! Launch state machine and observable snapshot

use crate::types::{LaunchId, LaunchOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of the current (or last) launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    /// Nothing has run yet
    #[default]
    Idle,
    /// Parsing amounts and addresses
    Normalizing,
    /// Waiting on the wallet to hand out an account
    Connecting,
    /// Approval submitted or allowance being read
    Approving,
    /// `launchToken` submitted, waiting on confirmation
    Launching,
    /// Last launch confirmed
    Confirmed,
    /// Last launch failed
    Failed,
}

impl LaunchState {
    /// Whether a launch is running
    #[inline]
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Normalizing | Self::Connecting | Self::Approving | Self::Launching
        )
    }

    /// Whether a new launch may start from here
    #[inline]
    #[must_use]
    pub fn is_settled(self) -> bool {
        !self.is_in_flight()
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: LaunchState) -> Vec<LaunchState> {
    use LaunchState::*;
    match from {
        Idle | Confirmed | Failed => vec![Normalizing],
        Normalizing => vec![Connecting, Failed],
        Connecting => vec![Approving, Failed],
        Approving => vec![Launching, Failed],
        Launching => vec![Confirmed, Failed],
    }
}

/// Check a transition against the launch state machine
#[must_use]
pub fn validate_transition(from: LaunchState, to: LaunchState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

/// Observable launch status
///
/// Mirrors the `loading / error / result` triple the UI renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSnapshot {
    /// Launch the snapshot belongs to
    pub launch_id: Option<LaunchId>,
    /// Current phase
    pub state: LaunchState,
    /// A launch is running
    pub loading: bool,
    /// Last failure message
    pub error: Option<String>,
    /// Last outcome
    pub result: Option<LaunchOutcome>,
    /// When the snapshot last changed
    pub updated_at: DateTime<Utc>,
}

impl Default for LaunchSnapshot {
    fn default() -> Self {
        Self {
            launch_id: None,
            state: LaunchState::Idle,
            loading: false,
            error: None,
            result: None,
            updated_at: Utc::now(),
        }
    }
}
