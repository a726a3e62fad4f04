use crate::{
    metagov::{MetagovMap, combine},
    overview::ProposalOverview,
    state::{DaoState, DisplayState, MetagovState},
};
use serde::Serialize;
use tracing::{debug, instrument};

/// A proposal placed in a bucket, with the state its badge should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedProposal<'a> {
    #[serde(flatten)]
    pub overview: &'a ProposalOverview,
    pub display_state: DisplayState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Categories<'a> {
    pub active: Vec<CategorizedProposal<'a>>,
    pub upcoming: Vec<CategorizedProposal<'a>>,
    pub past: Vec<CategorizedProposal<'a>>,
}

impl Categories<'_> {
    pub fn len(&self) -> usize {
        self.active.len() + self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Active,
    Upcoming,
    Past,
}

impl Bucket {
    fn for_dao_state(state: DaoState) -> Self {
        match state {
            DaoState::Active => Bucket::Active,
            DaoState::Pending | DaoState::Updatable | DaoState::Candidate => Bucket::Upcoming,
            DaoState::Successful
            | DaoState::Failed
            | DaoState::Expired
            | DaoState::Queued
            | DaoState::Executed
            | DaoState::Cancelled
            | DaoState::Vetoed => Bucket::Past,
        }
    }
}

/// Splits overviews into active, upcoming and past, preserving input order
/// within each bucket.
///
/// With a metagov map, a live off-chain vote pulls the proposal into `active`
/// even while the DAO vote is still pending. Every other placement follows the
/// DAO state.
#[instrument(
    name = "lifecycle_categorize",
    skip_all,
    fields(proposals = overviews.len(), metagov = metagov.is_some())
)]
pub fn categorize<'a>(
    overviews: &'a [ProposalOverview],
    metagov: Option<&MetagovMap>,
) -> Categories<'a> {
    let mut categories = Categories::default();

    for overview in overviews {
        let display_state = match metagov {
            Some(map) => combine(overview.state, map.get(overview.id())),
            None => DisplayState::Dao(overview.state),
        };

        let bucket = if display_state == DisplayState::Metagov(MetagovState::Active) {
            Bucket::Active
        } else {
            Bucket::for_dao_state(overview.state)
        };

        let entry = CategorizedProposal {
            overview,
            display_state,
        };

        match bucket {
            Bucket::Active => categories.active.push(entry),
            Bucket::Upcoming => categories.upcoming.push(entry),
            Bucket::Past => categories.past.push(entry),
        }
    }

    debug!(
        active = categories.active.len(),
        upcoming = categories.upcoming.len(),
        past = categories.past.len(),
        "Categorized proposals"
    );

    categories
}
