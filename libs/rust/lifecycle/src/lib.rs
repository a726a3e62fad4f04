//! Proposal lifecycle resolution for governor proposals.
//!
//! Raw indexer records are resolved into a canonical [`ProposalState`] for a given
//! block and time, mapped into display-ready [`ProposalOverview`]s, optionally
//! decorated with the off-chain (Snapshot) vote, and bucketed for the UI.
//! Everything here is pure: the caller supplies the current block and time.

pub mod categorize;
pub mod errors;
pub mod metagov;
pub mod overview;
pub mod record;
pub mod resolver;
pub mod state;
pub mod time;

pub use categorize::{Categories, CategorizedProposal, categorize};
pub use errors::LifecycleError;
pub use metagov::{ExternalVoteSnapshot, MetagovMap, SnapshotState, combine};
pub use overview::{OverviewMapper, ProposalOverview, Resolution, to_overview};
pub use record::{IndexerStatus, ProposalRecord, RawProposalRecord};
pub use resolver::{
    CurrentResolver, GRACE_PERIOD_SECONDS, LegacyResolver, ProtocolVersion, StateResolver, resolve,
};
pub use state::{DaoState, DisplayState, MetagovState, ProposalState};
pub use time::{DEFAULT_BLOCK_TIME_SECONDS, TimeEstimator, VotingWindow};
