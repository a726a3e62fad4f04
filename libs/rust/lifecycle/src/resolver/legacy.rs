use super::{StateResolver, grace_period_expired};
use crate::{
    record::{IndexerStatus, ProposalRecord},
    state::ProposalState,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Governor V2 records. The indexer status is the primary signal and block/time
/// data only refines it. V2 has no update or objection periods.
///
/// Known discrepancy with [`super::CurrentResolver`]: a `PENDING` record past its
/// start block is promoted to `Active` without checking `endBlock`, so a stale
/// record whose window already closed reports `Active` until the indexer catches up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyResolver;

impl StateResolver for LegacyResolver {
    fn resolve(
        &self,
        record: &ProposalRecord,
        current_block: Option<u64>,
        current_time: Option<DateTime<Utc>>,
    ) -> ProposalState {
        let provisional = match record.status {
            Some(IndexerStatus::Cancelled) => return ProposalState::Cancelled,
            Some(IndexerStatus::Vetoed) => return ProposalState::Vetoed,
            Some(IndexerStatus::Executed) => return ProposalState::Executed,
            Some(IndexerStatus::Queued) => ProposalState::Queued,
            Some(IndexerStatus::Active) => ProposalState::Active,
            Some(IndexerStatus::Pending) | None => ProposalState::Pending,
            Some(other) => {
                debug!(
                    proposal_id = record.id,
                    status = ?other,
                    "Status not emitted by the V2 governor, treating as pending"
                );
                ProposalState::Pending
            }
        };

        let Some(current_block) = current_block else {
            return provisional;
        };

        match provisional {
            ProposalState::Pending if current_block <= record.start_block => ProposalState::Pending,
            ProposalState::Pending => ProposalState::Active,
            ProposalState::Active if current_block > record.end_block => {
                if !record.vote_passed() {
                    ProposalState::Defeated
                } else if record.execution_eta.is_some() {
                    ProposalState::Queued
                } else {
                    ProposalState::Succeeded
                }
            }
            ProposalState::Queued if grace_period_expired(record, current_time) => {
                ProposalState::Defeated
            }
            state => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::raw_record;
    use crate::resolver::tests::{ETA, eta_plus_days, queued_record};

    fn resolve(record: &ProposalRecord, block: Option<u64>) -> ProposalState {
        LegacyResolver.resolve(record, block, None)
    }

    fn closed_vote(for_votes: &str, against_votes: &str, quorum_votes: &str) -> ProposalRecord {
        let mut raw = raw_record("ACTIVE", 100, 200);
        raw.for_votes = for_votes.to_string();
        raw.against_votes = against_votes.to_string();
        raw.quorum_votes = quorum_votes.to_string();
        raw.parse().unwrap()
    }

    #[test]
    fn test_terminal_statuses_win() {
        for (status, expected) in [
            ("CANCELLED", ProposalState::Cancelled),
            ("VETOED", ProposalState::Vetoed),
            ("EXECUTED", ProposalState::Executed),
        ] {
            let record = raw_record(status, 100, 200).parse().unwrap();
            assert_eq!(resolve(&record, None), expected);
            assert_eq!(resolve(&record, Some(150)), expected);
            assert_eq!(
                LegacyResolver.resolve(&record, Some(10_000), eta_plus_days(100)),
                expected
            );
        }
    }

    #[test]
    fn test_no_block_returns_provisional() {
        let record = raw_record("ACTIVE", 100, 200).parse().unwrap();
        assert_eq!(resolve(&record, None), ProposalState::Active);

        // Without a block even an expired queue stays queued.
        let record = queued_record();
        assert_eq!(
            LegacyResolver.resolve(&record, None, eta_plus_days(30)),
            ProposalState::Queued
        );
    }

    #[test]
    fn test_pending_until_start_block_inclusive() {
        let record = raw_record("PENDING", 100, 200).parse().unwrap();
        assert_eq!(resolve(&record, Some(99)), ProposalState::Pending);
        assert_eq!(resolve(&record, Some(100)), ProposalState::Pending);
        assert_eq!(resolve(&record, Some(101)), ProposalState::Active);
    }

    #[test]
    fn test_pending_promotion_ignores_end_block() {
        let record = raw_record("PENDING", 100, 200).parse().unwrap();
        assert_eq!(resolve(&record, Some(5_000)), ProposalState::Active);
    }

    #[test]
    fn test_active_within_window() {
        let record = raw_record("ACTIVE", 100, 200).parse().unwrap();
        assert_eq!(resolve(&record, Some(150)), ProposalState::Active);
        assert_eq!(resolve(&record, Some(200)), ProposalState::Active);
    }

    #[test]
    fn test_closed_vote_outcomes() {
        assert_eq!(
            resolve(&closed_vote("1000", "200", "500"), Some(250)),
            ProposalState::Succeeded
        );
        assert_eq!(
            resolve(&closed_vote("400", "200", "500"), Some(250)),
            ProposalState::Defeated
        );
        assert_eq!(
            resolve(&closed_vote("1000", "1000", "500"), Some(250)),
            ProposalState::Defeated
        );
    }

    #[test]
    fn test_successful_vote_with_eta_reports_queued() {
        let mut raw = raw_record("ACTIVE", 100, 200);
        raw.for_votes = "1000".to_string();
        raw.quorum_votes = "500".to_string();
        raw.execution_eta = Some(ETA.to_string());
        let record = raw.parse().unwrap();

        assert_eq!(resolve(&record, Some(250)), ProposalState::Queued);
    }

    #[test]
    fn test_queued_grace_period() {
        let record = queued_record();
        assert_eq!(
            LegacyResolver.resolve(&record, Some(250), eta_plus_days(13)),
            ProposalState::Queued
        );
        assert_eq!(
            LegacyResolver.resolve(&record, Some(250), eta_plus_days(15)),
            ProposalState::Defeated
        );
    }

    #[test]
    fn test_unsupported_and_unknown_statuses_are_pending() {
        for status in ["SUCCEEDED", "UPDATABLE", "whatever"] {
            let record = raw_record(status, 100, 200).parse().unwrap();
            assert_eq!(resolve(&record, None), ProposalState::Pending);
            assert_eq!(resolve(&record, Some(50)), ProposalState::Pending);
        }
    }
}
