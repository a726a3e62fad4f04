use crate::{
    errors::LifecycleError,
    record::{IndexerStatus, ProposalRecord, RawProposalRecord},
    state::ProposalState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

mod current;
mod legacy;

pub use current::CurrentResolver;
pub use legacy::LegacyResolver;

/// Time a queued proposal has to be executed before it counts as expired.
pub const GRACE_PERIOD_SECONDS: i64 = 14 * 24 * 60 * 60;

/// One precedence policy for turning an indexer record into a [`ProposalState`].
///
/// `current_block` is `None` when the block number RPC call failed; implementations
/// must still produce a state from the indexer status alone.
pub trait StateResolver: Send + Sync + fmt::Debug {
    fn resolve(
        &self,
        record: &ProposalRecord,
        current_block: Option<u64>,
        current_time: Option<DateTime<Utc>>,
    ) -> ProposalState;
}

/// Governor generation that produced a record. Selects the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// Governor V2: the indexer status is trusted and only refined.
    #[serde(alias = "v2")]
    Legacy,
    /// Governor V5/V6: state is recomputed from blocks and tallies.
    #[default]
    #[serde(alias = "v5", alias = "v6")]
    Current,
}

impl ProtocolVersion {
    pub fn resolver(&self) -> &'static dyn StateResolver {
        match self {
            ProtocolVersion::Legacy => &LegacyResolver,
            ProtocolVersion::Current => &CurrentResolver,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::Legacy => "legacy",
            ProtocolVersion::Current => "current",
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v2" => Ok(ProtocolVersion::Legacy),
            "current" | "v5" | "v6" => Ok(ProtocolVersion::Current),
            _ => Err(LifecycleError::UnknownProtocolVersion(s.to_string())),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `raw` and resolves its state with the resolver for `version`.
pub fn resolve(
    raw: &RawProposalRecord,
    current_block: Option<u64>,
    current_time: Option<DateTime<Utc>>,
    version: ProtocolVersion,
) -> Result<ProposalState, LifecycleError> {
    let record = raw.parse()?;
    let state = version
        .resolver()
        .resolve(&record, current_block, current_time);

    debug!(
        proposal_id = record.id,
        protocol_version = version.as_str(),
        current_block = ?current_block,
        state = ?state,
        "Resolved proposal state"
    );

    Ok(state)
}

/// Queued proposals expire once the grace period after their ETA has fully elapsed.
/// Without an ETA or a clock there is nothing to expire against.
pub(crate) fn grace_period_expired(
    record: &ProposalRecord,
    current_time: Option<DateTime<Utc>>,
) -> bool {
    match (record.execution_eta, current_time) {
        (Some(eta), Some(now)) => now.timestamp() >= eta.saturating_add(GRACE_PERIOD_SECONDS),
        _ => false,
    }
}

/// Indexer status taken at face value, for when there is no block to check it against.
pub(crate) fn state_from_status(status: Option<IndexerStatus>) -> ProposalState {
    match status {
        Some(IndexerStatus::Pending) | None => ProposalState::Pending,
        Some(IndexerStatus::Updatable) => ProposalState::Updatable,
        Some(IndexerStatus::Active) => ProposalState::Active,
        Some(IndexerStatus::ObjectionPeriod) => ProposalState::ObjectionPeriod,
        Some(IndexerStatus::Succeeded) => ProposalState::Succeeded,
        Some(IndexerStatus::Defeated) | Some(IndexerStatus::Expired) => ProposalState::Defeated,
        Some(IndexerStatus::Queued) => ProposalState::Queued,
        Some(IndexerStatus::Executed) => ProposalState::Executed,
        Some(IndexerStatus::Cancelled) => ProposalState::Cancelled,
        Some(IndexerStatus::Vetoed) => ProposalState::Vetoed,
        Some(IndexerStatus::Candidate) => ProposalState::Candidate,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::tests::raw_record;
    use chrono::{Duration, TimeZone};

    pub(crate) const ETA: i64 = 1_700_500_000;

    pub(crate) fn eta_plus_days(days: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(ETA, 0).unwrap() + Duration::days(days))
    }

    pub(crate) fn queued_record() -> ProposalRecord {
        let mut raw = raw_record("QUEUED", 100, 200);
        raw.execution_eta = Some(ETA.to_string());
        raw.parse().unwrap()
    }

    #[test]
    fn test_protocol_version_aliases() {
        for (version, expected) in [
            ("V2", ProtocolVersion::Legacy),
            ("legacy", ProtocolVersion::Legacy),
            ("v6", ProtocolVersion::Current),
        ] {
            assert_eq!(version.parse::<ProtocolVersion>().unwrap(), expected);
        }
        assert!(matches!(
            "v4".parse::<ProtocolVersion>(),
            Err(LifecycleError::UnknownProtocolVersion(_))
        ));

        let parsed: ProtocolVersion = serde_json::from_str("\"v5\"").unwrap();
        assert_eq!(parsed, ProtocolVersion::Current);
    }

    #[test]
    fn test_grace_period_boundary() {
        let record = queued_record();
        assert!(!grace_period_expired(&record, eta_plus_days(13)));
        assert!(grace_period_expired(&record, eta_plus_days(14)));
        assert!(!grace_period_expired(&record, None));
    }

    #[test]
    fn test_grace_period_needs_eta() {
        let record = raw_record("QUEUED", 100, 200).parse().unwrap();
        assert!(!grace_period_expired(&record, eta_plus_days(400)));
    }

    #[test]
    fn test_resolve_fails_on_malformed_record() {
        let mut raw = raw_record("ACTIVE", 100, 200);
        raw.against_votes = "lots".to_string();

        for version in [ProtocolVersion::Legacy, ProtocolVersion::Current] {
            let result = resolve(&raw, Some(250), None, version);
            assert!(matches!(
                result,
                Err(LifecycleError::MalformedRecord { field: "againstVotes", .. })
            ));
        }
    }

    #[test]
    fn test_resolve_dispatches_by_version() {
        // Pending status after the window opened: legacy promotes to active without
        // looking at endBlock, current sees the window has closed with no votes.
        let raw = raw_record("PENDING", 100, 200);
        assert_eq!(
            resolve(&raw, Some(250), None, ProtocolVersion::Legacy).unwrap(),
            ProposalState::Active
        );
        assert_eq!(
            resolve(&raw, Some(250), None, ProtocolVersion::Current).unwrap(),
            ProposalState::Defeated
        );
    }
}
