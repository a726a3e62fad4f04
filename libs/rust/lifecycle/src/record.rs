use crate::errors::LifecycleError;
use num_bigint::BigUint;
use serde::de::{self, MapAccess, Visitor, value::MapAccessDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use tracing::warn;

/// Proposal as delivered by a governance indexer.
///
/// Numeric fields are kept in their decimal string form and only parsed at
/// resolution time, so a single malformed record fails on its own instead of
/// failing the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProposalRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub proposer_address: String,
    pub status: String,
    #[serde(deserialize_with = "numeric_string")]
    pub created_block: String,
    #[serde(deserialize_with = "numeric_string")]
    pub created_timestamp: String,
    #[serde(deserialize_with = "numeric_string")]
    pub start_block: String,
    #[serde(deserialize_with = "numeric_string")]
    pub end_block: String,
    #[serde(deserialize_with = "numeric_string")]
    pub for_votes: String,
    #[serde(deserialize_with = "numeric_string")]
    pub against_votes: String,
    #[serde(deserialize_with = "numeric_string")]
    pub abstain_votes: String,
    #[serde(deserialize_with = "numeric_string")]
    pub quorum_votes: String,
    #[serde(
        rename = "executionETA",
        default,
        deserialize_with = "optional_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_eta: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_period_end_block: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub objection_period_end_block: Option<String>,
}

impl RawProposalRecord {
    pub fn parse(&self) -> Result<ProposalRecord, LifecycleError> {
        ProposalRecord::try_from(self)
    }
}

/// Subgraphs disagree on whether BigInt fields are strings or numbers. JSON
/// numbers keep their literal digits, so vote totals past `u64` survive.
struct NumericStringVisitor;

impl<'de> Visitor<'de> for NumericStringVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer as a JSON string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    // Debug keeps the fraction or exponent, so the record fails as malformed
    // instead of the float passing for an integer.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(format!("{value:?}"))
    }

    // serde_json hands arbitrary precision numbers over as a single-entry map.
    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        serde_json::Number::deserialize(MapAccessDeserializer::new(map))
            .map(|number| number.to_string())
    }
}

struct OptionalNumericStringVisitor;

impl<'de> Visitor<'de> for OptionalNumericStringVisitor {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("null or an integer as a JSON string or number")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        numeric_string(deserializer).map(Some)
    }
}

fn numeric_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(NumericStringVisitor)
}

fn optional_numeric_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(OptionalNumericStringVisitor)
}

/// Status strings emitted by the governance subgraphs, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexerStatus {
    Pending,
    Updatable,
    Active,
    ObjectionPeriod,
    Succeeded,
    Defeated,
    Expired,
    Queued,
    Executed,
    Cancelled,
    Vetoed,
    Candidate,
}

impl FromStr for IndexerStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(IndexerStatus::Pending),
            "UPDATABLE" => Ok(IndexerStatus::Updatable),
            "ACTIVE" => Ok(IndexerStatus::Active),
            "OBJECTION_PERIOD" | "OBJECTIONPERIOD" => Ok(IndexerStatus::ObjectionPeriod),
            "SUCCEEDED" => Ok(IndexerStatus::Succeeded),
            "DEFEATED" => Ok(IndexerStatus::Defeated),
            "EXPIRED" => Ok(IndexerStatus::Expired),
            "QUEUED" => Ok(IndexerStatus::Queued),
            "EXECUTED" => Ok(IndexerStatus::Executed),
            "CANCELLED" | "CANCELED" => Ok(IndexerStatus::Cancelled),
            "VETOED" => Ok(IndexerStatus::Vetoed),
            "CANDIDATE" => Ok(IndexerStatus::Candidate),
            _ => Err(LifecycleError::UnknownStatus(s.to_string())),
        }
    }
}

/// A record whose numeric fields have been parsed and checked.
///
/// `status` is `None` when the indexer sent a string outside the known set;
/// the warning has already been logged by the time this value exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalRecord {
    pub id: String,
    pub status: Option<IndexerStatus>,
    pub created_block: u64,
    pub created_timestamp: i64,
    pub start_block: u64,
    pub end_block: u64,
    pub for_votes: BigUint,
    pub against_votes: BigUint,
    pub abstain_votes: BigUint,
    pub quorum_votes: BigUint,
    pub execution_eta: Option<i64>,
    pub update_period_end_block: Option<u64>,
    pub objection_period_end_block: Option<u64>,
}

impl ProposalRecord {
    /// Quorum reached and more for than against.
    pub fn vote_passed(&self) -> bool {
        self.for_votes >= self.quorum_votes && self.for_votes > self.against_votes
    }
}

impl TryFrom<&RawProposalRecord> for ProposalRecord {
    type Error = LifecycleError;

    fn try_from(raw: &RawProposalRecord) -> Result<Self, Self::Error> {
        let id = raw.id.as_str();

        let status = match raw.status.parse::<IndexerStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(
                    proposal_id = id,
                    status = raw.status,
                    error = %e,
                    "Unrecognized indexer status, treating proposal as pending"
                );
                None
            }
        };

        let created_block = parse_block(id, "createdBlock", &raw.created_block)?;
        let start_block = parse_block(id, "startBlock", &raw.start_block)?;
        let end_block = parse_block(id, "endBlock", &raw.end_block)?;

        if created_block > start_block {
            return Err(LifecycleError::malformed(
                id,
                "startBlock",
                format!("({start_block}) precedes createdBlock ({created_block})"),
            ));
        }
        if start_block > end_block {
            return Err(LifecycleError::malformed(
                id,
                "endBlock",
                format!("({end_block}) precedes startBlock ({start_block})"),
            ));
        }

        Ok(ProposalRecord {
            id: raw.id.clone(),
            status,
            created_block,
            created_timestamp: parse_timestamp(id, "createdTimestamp", &raw.created_timestamp)?,
            start_block,
            end_block,
            for_votes: parse_votes(id, "forVotes", &raw.for_votes)?,
            against_votes: parse_votes(id, "againstVotes", &raw.against_votes)?,
            abstain_votes: parse_votes(id, "abstainVotes", &raw.abstain_votes)?,
            quorum_votes: parse_votes(id, "quorumVotes", &raw.quorum_votes)?,
            execution_eta: raw
                .execution_eta
                .as_deref()
                .map(|value| parse_timestamp(id, "executionETA", value))
                .transpose()?,
            update_period_end_block: raw
                .update_period_end_block
                .as_deref()
                .map(|value| parse_block(id, "updatePeriodEndBlock", value))
                .transpose()?,
            objection_period_end_block: raw
                .objection_period_end_block
                .as_deref()
                .map(|value| parse_block(id, "objectionPeriodEndBlock", value))
                .transpose()?,
        })
    }
}

fn parse_block(id: &str, field: &'static str, value: &str) -> Result<u64, LifecycleError> {
    value
        .parse::<u64>()
        .map_err(|e| malformed_number(id, field, "block number", value, e))
}

fn parse_timestamp(id: &str, field: &'static str, value: &str) -> Result<i64, LifecycleError> {
    value
        .parse::<i64>()
        .map_err(|e| malformed_number(id, field, "unix timestamp", value, e))
}

/// Plain decimal digits only. `BigUint` on its own would accept `1_000`.
fn parse_votes(id: &str, field: &'static str, value: &str) -> Result<BigUint, LifecycleError> {
    let digits_only = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
    if !digits_only {
        let reason = "only decimal digits are allowed";
        return Err(malformed_number(id, field, "vote count", value, reason));
    }

    BigUint::from_str(value).map_err(|e| malformed_number(id, field, "vote count", value, e))
}

fn malformed_number(
    id: &str,
    field: &'static str,
    kind: &str,
    value: &str,
    err: impl fmt::Display,
) -> LifecycleError {
    LifecycleError::malformed(id, field, format!("is not a {kind} ({value:?}): {err}"))
}
