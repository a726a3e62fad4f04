use crate::record::{IndexerStatus, ProposalRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical lifecycle state of a proposal at one (block, time) evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalState {
    Pending,
    Updatable,
    Active,
    ObjectionPeriod,
    Succeeded,
    Defeated,
    Queued,
    Executed,
    Cancelled,
    Vetoed,
    Candidate,
}

impl ProposalState {
    pub const ALL: [ProposalState; 11] = [
        ProposalState::Pending,
        ProposalState::Updatable,
        ProposalState::Active,
        ProposalState::ObjectionPeriod,
        ProposalState::Succeeded,
        ProposalState::Defeated,
        ProposalState::Queued,
        ProposalState::Executed,
        ProposalState::Cancelled,
        ProposalState::Vetoed,
        ProposalState::Candidate,
    ];
}

/// DAO-authoritative display tag, derived from a [`ProposalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaoState {
    Pending,
    Updatable,
    Active,
    Successful,
    Failed,
    Expired,
    Queued,
    Executed,
    Cancelled,
    Vetoed,
    Candidate,
}

impl DaoState {
    /// The display table. Objection periods show as `successful`: the badge for
    /// the remaining objection window is driven by `objectionPeriodEndBlock`.
    ///
    /// A defeat on a record the indexer last saw as queued is the grace-period
    /// expiry outcome and shows as `expired`.
    pub fn from_resolution(state: ProposalState, record: &ProposalRecord) -> Self {
        match state {
            ProposalState::Pending => DaoState::Pending,
            ProposalState::Updatable => DaoState::Updatable,
            ProposalState::Active => DaoState::Active,
            ProposalState::ObjectionPeriod => DaoState::Successful,
            ProposalState::Succeeded => DaoState::Successful,
            ProposalState::Defeated => match record.status {
                Some(IndexerStatus::Queued) | Some(IndexerStatus::Expired) => DaoState::Expired,
                _ => DaoState::Failed,
            },
            ProposalState::Queued => DaoState::Queued,
            ProposalState::Executed => DaoState::Executed,
            ProposalState::Cancelled => DaoState::Cancelled,
            ProposalState::Vetoed => DaoState::Vetoed,
            ProposalState::Candidate => DaoState::Candidate,
        }
    }

    /// Voting has not settled yet; only these states can be decorated by the overlay.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            DaoState::Pending | DaoState::Active | DaoState::Updatable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DaoState::Pending => "pending",
            DaoState::Updatable => "updatable",
            DaoState::Active => "active",
            DaoState::Successful => "successful",
            DaoState::Failed => "failed",
            DaoState::Expired => "expired",
            DaoState::Queued => "queued",
            DaoState::Executed => "executed",
            DaoState::Cancelled => "cancelled",
            DaoState::Vetoed => "vetoed",
            DaoState::Candidate => "candidate",
        }
    }
}

/// Overlay-only hint from an off-chain vote. Never an on-chain outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetagovState {
    #[serde(rename = "metagov_active")]
    Active,
    #[serde(rename = "metagov_closed")]
    Closed,
    #[serde(rename = "metagov_pending")]
    Pending,
}

impl MetagovState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetagovState::Active => "metagov_active",
            MetagovState::Closed => "metagov_closed",
            MetagovState::Pending => "metagov_pending",
        }
    }
}

/// What the UI shows for a proposal: either the DAO state itself or an overlay hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayState {
    Dao(DaoState),
    Metagov(MetagovState),
}

impl DisplayState {
    /// The authoritative state, if this is not an overlay value.
    pub fn dao_state(&self) -> Option<DaoState> {
        match self {
            DisplayState::Dao(state) => Some(*state),
            DisplayState::Metagov(_) => None,
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, DisplayState::Metagov(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::Dao(state) => state.as_str(),
            DisplayState::Metagov(state) => state.as_str(),
        }
    }
}

impl From<DaoState> for DisplayState {
    fn from(state: DaoState) -> Self {
        DisplayState::Dao(state)
    }
}

impl From<MetagovState> for DisplayState {
    fn from(state: MetagovState) -> Self {
        DisplayState::Metagov(state)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
