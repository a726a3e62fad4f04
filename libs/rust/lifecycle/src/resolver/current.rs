use super::{StateResolver, grace_period_expired, state_from_status};
use crate::{
    record::{IndexerStatus, ProposalRecord},
    state::ProposalState,
};
use chrono::{DateTime, Utc};

/// Governor V5/V6 records. State is recomputed from blocks and tallies; the
/// indexer status is only trusted for terminal and queued proposals.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentResolver;

impl StateResolver for CurrentResolver {
    fn resolve(
        &self,
        record: &ProposalRecord,
        current_block: Option<u64>,
        current_time: Option<DateTime<Utc>>,
    ) -> ProposalState {
        match record.status {
            Some(IndexerStatus::Cancelled) => return ProposalState::Cancelled,
            Some(IndexerStatus::Vetoed) => return ProposalState::Vetoed,
            Some(IndexerStatus::Executed) => return ProposalState::Executed,
            Some(IndexerStatus::Queued) => {
                return if grace_period_expired(record, current_time) {
                    ProposalState::Defeated
                } else {
                    ProposalState::Queued
                };
            }
            _ => {}
        }

        let Some(current_block) = current_block else {
            return state_from_status(record.status);
        };

        // Updatable is a sub-window of pending and must be checked first.
        if record
            .update_period_end_block
            .is_some_and(|end| current_block <= end)
        {
            return ProposalState::Updatable;
        }

        if current_block < record.start_block {
            return ProposalState::Pending;
        }

        if current_block <= record.end_block {
            return ProposalState::Active;
        }

        if record
            .objection_period_end_block
            .is_some_and(|end| end > 0 && current_block <= end)
        {
            return ProposalState::ObjectionPeriod;
        }

        if record.vote_passed() {
            ProposalState::Succeeded
        } else {
            ProposalState::Defeated
        }
    }
}
