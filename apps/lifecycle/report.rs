use proposalsapp_lifecycle::{Categories, ProposalOverview, ProtocolVersion, Resolution};
use serde::Serialize;

/// A proposal whose state could not be resolved. Shown as "unknown", never as a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedEntry {
    pub id: String,
    pub state: &'static str,
    pub error: String,
}

impl UnresolvedEntry {
    pub fn new(id: impl Into<String>, error: impl ToString) -> Self {
        Self {
            id: id.into(),
            state: "unknown",
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleReport<'a> {
    pub protocol_version: ProtocolVersion,
    pub current_block: Option<u64>,
    pub generated_at: i64,
    #[serde(flatten)]
    pub categories: Categories<'a>,
    pub unresolved: Vec<UnresolvedEntry>,
}

/// Separates resolved overviews from failures, keeping input order in both.
pub fn split_resolutions(
    resolutions: Vec<Resolution>,
) -> (Vec<ProposalOverview>, Vec<UnresolvedEntry>) {
    let mut overviews = Vec::with_capacity(resolutions.len());
    let mut unresolved = Vec::new();

    for resolution in resolutions {
        match resolution {
            Resolution::Resolved(overview) => overviews.push(overview),
            Resolution::Unresolved { id, error } => {
                unresolved.push(UnresolvedEntry::new(id, error))
            }
        }
    }

    (overviews, unresolved)
}
