use crate::{
    errors::LifecycleError,
    record::RawProposalRecord,
    resolver::ProtocolVersion,
    state::{DaoState, ProposalState},
    time::TimeEstimator,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Display-ready proposal. Rebuilt on every pass, never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalOverview {
    #[serde(flatten)]
    pub record: RawProposalRecord,
    pub state: DaoState,
    pub canonical_state: ProposalState,
    pub voting_start_timestamp: i64,
    pub voting_end_timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objection_period_end_timestamp: Option<i64>,
}

impl ProposalOverview {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Still inside the post-vote objection window. Bucketed with successful
    /// proposals, but worth a countdown badge.
    pub fn in_objection_period(&self) -> bool {
        self.canonical_state == ProposalState::ObjectionPeriod
    }
}

/// Outcome of resolving one record inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ProposalOverview),
    Unresolved { id: String, error: LifecycleError },
}

impl Resolution {
    pub fn id(&self) -> &str {
        match self {
            Resolution::Resolved(overview) => overview.id(),
            Resolution::Unresolved { id, .. } => id,
        }
    }

    pub fn overview(&self) -> Option<&ProposalOverview> {
        match self {
            Resolution::Resolved(overview) => Some(overview),
            Resolution::Unresolved { .. } => None,
        }
    }

    /// Label for the UI. Failed resolutions are never shown as a concrete state.
    pub fn state_label(&self) -> &'static str {
        match self {
            Resolution::Resolved(overview) => overview.state.as_str(),
            Resolution::Unresolved { .. } => "unknown",
        }
    }
}

/// Builds [`ProposalOverview`]s for one protocol version.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewMapper {
    pub protocol_version: ProtocolVersion,
    pub estimator: TimeEstimator,
}

impl OverviewMapper {
    pub fn new(protocol_version: ProtocolVersion, estimator: TimeEstimator) -> Self {
        Self {
            protocol_version,
            estimator,
        }
    }

    pub fn to_overview(
        &self,
        raw: &RawProposalRecord,
        current_block: Option<u64>,
        current_time: Option<DateTime<Utc>>,
    ) -> Result<ProposalOverview, LifecycleError> {
        let record = raw.parse()?;
        let canonical_state = self
            .protocol_version
            .resolver()
            .resolve(&record, current_block, current_time);

        let window = self.estimator.estimate(
            record.created_timestamp,
            record.created_block,
            record.start_block,
            record.end_block,
        );

        let objection_period_end_timestamp = record
            .objection_period_end_block
            .filter(|block| *block > 0)
            .map(|block| {
                self.estimator
                    .estimate_block_timestamp(record.created_timestamp, record.created_block, block)
            });

        let state = DaoState::from_resolution(canonical_state, &record);

        debug!(
            proposal_id = record.id,
            protocol_version = self.protocol_version.as_str(),
            current_block = ?current_block,
            canonical_state = ?canonical_state,
            state = state.as_str(),
            "Mapped proposal overview"
        );

        Ok(ProposalOverview {
            record: raw.clone(),
            state,
            canonical_state,
            voting_start_timestamp: window.voting_start_timestamp,
            voting_end_timestamp: window.voting_end_timestamp,
            objection_period_end_timestamp,
        })
    }

    /// Resolves every record independently. The output has one entry per input,
    /// in input order; a malformed record only fails its own entry.
    #[instrument(
        name = "lifecycle_to_overviews",
        skip_all,
        fields(
            protocol_version = %self.protocol_version,
            records = records.len(),
            current_block = ?current_block
        )
    )]
    pub fn to_overviews(
        &self,
        records: &[RawProposalRecord],
        current_block: Option<u64>,
        current_time: Option<DateTime<Utc>>,
    ) -> Vec<Resolution> {
        records
            .iter()
            .map(|raw| match self.to_overview(raw, current_block, current_time) {
                Ok(overview) => Resolution::Resolved(overview),
                Err(error) => {
                    warn!(proposal_id = raw.id, error = %error, "Failed to resolve proposal state");
                    Resolution::Unresolved {
                        id: raw.id.clone(),
                        error,
                    }
                }
            })
            .collect()
    }
}

/// Single-record convenience using the default block time.
pub fn to_overview(
    raw: &RawProposalRecord,
    current_block: Option<u64>,
    current_time: Option<DateTime<Utc>>,
    protocol_version: ProtocolVersion,
) -> Result<ProposalOverview, LifecycleError> {
    let mapper = OverviewMapper::new(protocol_version, TimeEstimator::default());
    mapper.to_overview(raw, current_block, current_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::raw_record;
    use crate::resolver::tests::{ETA, eta_plus_days};

    #[test]
    fn test_overview_carries_record_and_estimates() {
        let raw = raw_record("ACTIVE", 100, 200);
        let overview = to_overview(&raw, Some(150), None, ProtocolVersion::Current).unwrap();

        assert_eq!(overview.record, raw);
        assert_eq!(overview.state, DaoState::Active);
        assert_eq!(overview.canonical_state, ProposalState::Active);
        assert_eq!(overview.voting_start_timestamp, 1_700_000_000 + 10 * 12);
        assert_eq!(overview.voting_end_timestamp, 1_700_000_000 + 110 * 12);
        assert_eq!(overview.objection_period_end_timestamp, None);
    }

    #[test]
    fn test_estimates_do_not_depend_on_current_block() {
        let raw = raw_record("ACTIVE", 100, 200);
        let early = to_overview(&raw, Some(95), None, ProtocolVersion::Current).unwrap();
        let late = to_overview(&raw, Some(9_000_000), None, ProtocolVersion::Current).unwrap();

        assert_eq!(early.voting_start_timestamp, late.voting_start_timestamp);
        assert_eq!(early.voting_end_timestamp, late.voting_end_timestamp);
    }

    #[test]
    fn test_objection_period_shows_successful_with_badge_data() {
        let mut raw = raw_record("ACTIVE", 100, 200);
        raw.for_votes = "1000".to_string();
        raw.quorum_votes = "500".to_string();
        raw.objection_period_end_block = Some("230".to_string());

        let overview = to_overview(&raw, Some(210), None, ProtocolVersion::Current).unwrap();
        assert_eq!(overview.state, DaoState::Successful);
        assert!(overview.in_objection_period());
        assert_eq!(
            overview.objection_period_end_timestamp,
            Some(1_700_000_000 + 140 * 12)
        );
    }

    #[test]
    fn test_expired_queue_is_labelled_expired() {
        let mut raw = raw_record("QUEUED", 100, 200);
        raw.execution_eta = Some(ETA.to_string());

        let overview =
            to_overview(&raw, Some(250), eta_plus_days(15), ProtocolVersion::Current).unwrap();
        assert_eq!(overview.canonical_state, ProposalState::Defeated);
        assert_eq!(overview.state, DaoState::Expired);
    }

    #[test]
    fn test_custom_block_time_is_used() {
        let mapper = OverviewMapper::new(ProtocolVersion::Legacy, TimeEstimator::new(2));
        let overview = mapper
            .to_overview(&raw_record("PENDING", 100, 200), None, None)
            .unwrap();

        assert_eq!(overview.voting_start_timestamp, 1_700_000_000 + 20);
        assert_eq!(overview.state, DaoState::Pending);
    }

    #[test]
    fn test_batch_keeps_failures_in_place() {
        let good = raw_record("ACTIVE", 100, 200);
        let mut bad = raw_record("ACTIVE", 100, 200);
        bad.id = "43".to_string();
        bad.quorum_votes = "NaN".to_string();
        let mut other = raw_record("EXECUTED", 100, 200);
        other.id = "44".to_string();

        let resolutions =
            OverviewMapper::default().to_overviews(&[good, bad, other], Some(150), None);

        assert_eq!(resolutions.len(), 3);
        assert_eq!(resolutions[0].state_label(), "active");
        assert_eq!(resolutions[1].id(), "43");
        assert_eq!(resolutions[1].state_label(), "unknown");
        assert!(resolutions[1].overview().is_none());
        assert!(matches!(
            &resolutions[1],
            Resolution::Unresolved {
                error: LifecycleError::MalformedRecord { field: "quorumVotes", .. },
                ..
            }
        ));
        assert_eq!(resolutions[2].state_label(), "executed");
    }

    #[test]
    fn test_overview_serializes_flat_camel_case() {
        let raw = raw_record("ACTIVE", 100, 200);
        let overview = to_overview(&raw, Some(150), None, ProtocolVersion::Current).unwrap();
        let json = serde_json::to_value(&overview).unwrap();

        assert_eq!(json["id"], "42");
        assert_eq!(json["startBlock"], "100");
        assert_eq!(json["state"], "active");
        assert_eq!(json["canonicalState"], "ACTIVE");
        assert_eq!(json["votingEndTimestamp"], 1_700_000_000 + 110 * 12);
        assert!(json.get("executionETA").is_none());
    }
}
