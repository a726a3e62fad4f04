use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// A numeric field could not be parsed, or the block fields break ordering.
    #[error("Malformed proposal record {id}: field `{field}` {reason}")]
    MalformedRecord {
        id: String,
        field: &'static str,
        reason: String,
    },
    /// Indexer status outside the known set. Resolvers recover from this locally.
    #[error("Unknown proposal status: {0}")]
    UnknownStatus(String),
    #[error("Unknown protocol version: {0} (expected legacy, current, v2, v5 or v6)")]
    UnknownProtocolVersion(String),
}

impl LifecycleError {
    pub(crate) fn malformed(id: &str, field: &'static str, reason: impl Into<String>) -> Self {
        LifecycleError::MalformedRecord {
            id: id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}
