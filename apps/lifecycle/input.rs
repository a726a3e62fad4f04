use crate::report::UnresolvedEntry;
use anyhow::{Context, Result};
use proposalsapp_lifecycle::{MetagovMap, RawProposalRecord};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, instrument, warn};
use utils::errors::{
    PARSE_METAGOV_FAILED, PARSE_PROPOSALS_FAILED, READ_METAGOV_FAILED, READ_PROPOSALS_FAILED,
};

/// Records exported from an indexer: either a bare array or the GraphQL envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProposalsPayload {
    Bare(Vec<Value>),
    Graphql { data: ProposalsData },
}

#[derive(Deserialize)]
struct ProposalsData {
    proposals: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct Inputs {
    pub records: Vec<RawProposalRecord>,
    /// Entries that are not proposal records at all.
    pub rejected: Vec<UnresolvedEntry>,
    pub metagov: Option<MetagovMap>,
}

#[instrument(
    name = "lifecycle_load_inputs",
    skip_all,
    fields(proposals = %proposals_path.display())
)]
pub async fn load_inputs(proposals_path: &Path, metagov_path: Option<&Path>) -> Result<Inputs> {
    let proposals = async {
        let contents = tokio::fs::read_to_string(proposals_path)
            .await
            .with_context(|| {
                format!("{READ_PROPOSALS_FAILED}: {}", proposals_path.display())
            })?;
        parse_proposals(&contents)
    };

    let metagov = async {
        match metagov_path {
            Some(path) => {
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("{READ_METAGOV_FAILED}: {}", path.display()))?;
                parse_metagov(&contents).map(Some)
            }
            None => Ok(None),
        }
    };

    let ((records, rejected), metagov) = tokio::try_join!(proposals, metagov)?;

    info!(
        records = records.len(),
        rejected = rejected.len(),
        metagov_entries = ?metagov.as_ref().map(|map| map.len()),
        "Loaded lifecycle inputs"
    );

    Ok(Inputs {
        records,
        rejected,
        metagov,
    })
}

/// Parses each entry on its own so one broken entry does not drop the others.
pub fn parse_proposals(contents: &str) -> Result<(Vec<RawProposalRecord>, Vec<UnresolvedEntry>)> {
    let payload =
        serde_json::from_str::<ProposalsPayload>(contents).context(PARSE_PROPOSALS_FAILED)?;
    let entries = match payload {
        ProposalsPayload::Bare(entries) => entries,
        ProposalsPayload::Graphql { data } => data.proposals,
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let id = match entry.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => format!("#{index}"),
        };

        match serde_json::from_value::<RawProposalRecord>(entry) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(
                    proposal_id = %id,
                    error = %err,
                    "Skipping entry that is not a proposal record"
                );
                rejected.push(UnresolvedEntry::new(id, err));
            }
        }
    }

    Ok((records, rejected))
}

pub fn parse_metagov(contents: &str) -> Result<MetagovMap> {
    serde_json::from_str(contents).context(PARSE_METAGOV_FAILED)
}
