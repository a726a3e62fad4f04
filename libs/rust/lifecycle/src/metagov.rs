use crate::state::{DaoState, DisplayState, MetagovState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State of the matching off-chain (Snapshot) vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotState {
    Active,
    Closed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalVoteSnapshot {
    pub state: SnapshotState,
}

impl ExternalVoteSnapshot {
    pub fn new(state: SnapshotState) -> Self {
        Self { state }
    }
}

/// Snapshot votes keyed by DAO proposal id.
pub type MetagovMap = HashMap<String, ExternalVoteSnapshot>;

/// Merges the DAO state with the off-chain vote into what the UI displays.
///
/// Settled DAO outcomes are never overridden. The result is for badges and
/// bucketing only; anything that decides whether a holder can still act
/// on-chain must look at the DAO state.
pub fn combine(dao_state: DaoState, snapshot: Option<&ExternalVoteSnapshot>) -> DisplayState {
    if !dao_state.is_open() {
        return DisplayState::Dao(dao_state);
    }

    let Some(snapshot) = snapshot else {
        return match dao_state {
            DaoState::Pending | DaoState::Active => DisplayState::Metagov(MetagovState::Pending),
            _ => DisplayState::Dao(dao_state),
        };
    };

    match (snapshot.state, dao_state) {
        (SnapshotState::Active, _) => DisplayState::Metagov(MetagovState::Active),
        (SnapshotState::Closed, DaoState::Active | DaoState::Updatable) => {
            DisplayState::Metagov(MetagovState::Closed)
        }
        (SnapshotState::Closed, _) | (SnapshotState::Pending, _) => DisplayState::Dao(dao_state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DAO_STATES: [DaoState; 11] = [
        DaoState::Pending,
        DaoState::Updatable,
        DaoState::Active,
        DaoState::Successful,
        DaoState::Failed,
        DaoState::Expired,
        DaoState::Queued,
        DaoState::Executed,
        DaoState::Cancelled,
        DaoState::Vetoed,
        DaoState::Candidate,
    ];

    fn snapshot(state: SnapshotState) -> Option<ExternalVoteSnapshot> {
        Some(ExternalVoteSnapshot::new(state))
    }

    #[test]
    fn test_settled_states_are_never_overridden() {
        for dao_state in ALL_DAO_STATES.into_iter().filter(|state| !state.is_open()) {
            for snap in [
                None,
                snapshot(SnapshotState::Active),
                snapshot(SnapshotState::Closed),
                snapshot(SnapshotState::Pending),
            ] {
                assert_eq!(
                    combine(dao_state, snap.as_ref()),
                    DisplayState::Dao(dao_state)
                );
            }
        }
        let active = snapshot(SnapshotState::Active);
        assert_eq!(
            combine(DaoState::Successful, active.as_ref()),
            DisplayState::Dao(DaoState::Successful)
        );
    }

    #[test]
    fn test_missing_snapshot() {
        assert_eq!(
            combine(DaoState::Pending, None),
            DisplayState::Metagov(MetagovState::Pending)
        );
        assert_eq!(
            combine(DaoState::Active, None),
            DisplayState::Metagov(MetagovState::Pending)
        );
        assert_eq!(
            combine(DaoState::Updatable, None),
            DisplayState::Dao(DaoState::Updatable)
        );
    }

    #[test]
    fn test_active_snapshot() {
        for dao_state in [DaoState::Pending, DaoState::Active, DaoState::Updatable] {
            assert_eq!(
                combine(dao_state, snapshot(SnapshotState::Active).as_ref()),
                DisplayState::Metagov(MetagovState::Active)
            );
        }
    }

    #[test]
    fn test_closed_snapshot() {
        let closed = snapshot(SnapshotState::Closed);
        assert_eq!(
            combine(DaoState::Active, closed.as_ref()),
            DisplayState::Metagov(MetagovState::Closed)
        );
        assert_eq!(
            combine(DaoState::Updatable, closed.as_ref()),
            DisplayState::Metagov(MetagovState::Closed)
        );
        assert_eq!(
            combine(DaoState::Pending, closed.as_ref()),
            DisplayState::Dao(DaoState::Pending)
        );
    }

    #[test]
    fn test_pending_snapshot_passes_through() {
        for dao_state in [DaoState::Pending, DaoState::Active, DaoState::Updatable] {
            assert_eq!(
                combine(dao_state, snapshot(SnapshotState::Pending).as_ref()),
                DisplayState::Dao(dao_state)
            );
        }
    }

    #[test]
    fn test_snapshot_deserializes_lowercase() {
        let map: MetagovMap = serde_json::from_str(
            r#"{ "101": { "state": "active" }, "102": { "state": "closed" } }"#,
        )
        .unwrap();

        assert_eq!(map["101"].state, SnapshotState::Active);
        assert_eq!(map["102"].state, SnapshotState::Closed);
        let unknown = serde_json::from_str::<ExternalVoteSnapshot>(r#"{ "state": "final" }"#);
        assert!(unknown.is_err());
    }
}
