use serde::{Deserialize, Serialize};

/// Average Ethereum mainnet block time since the merge.
pub const DEFAULT_BLOCK_TIME_SECONDS: u64 = 12;

/// Estimated voting window, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingWindow {
    pub voting_start_timestamp: i64,
    pub voting_end_timestamp: i64,
}

/// Converts block numbers into timestamps using a fixed average block time.
///
/// Estimates are anchored at the proposal's own creation block and timestamp,
/// never at the current chain head, so they do not drift as the chain grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEstimator {
    pub block_time_seconds: u64,
}

impl Default for TimeEstimator {
    fn default() -> Self {
        Self {
            block_time_seconds: DEFAULT_BLOCK_TIME_SECONDS,
        }
    }
}

impl TimeEstimator {
    pub fn new(block_time_seconds: u64) -> Self {
        Self { block_time_seconds }
    }

    pub fn estimate(
        &self,
        created_timestamp: i64,
        created_block: u64,
        start_block: u64,
        end_block: u64,
    ) -> VotingWindow {
        VotingWindow {
            voting_start_timestamp: self.estimate_block_timestamp(
                created_timestamp,
                created_block,
                start_block,
            ),
            voting_end_timestamp: self.estimate_block_timestamp(
                created_timestamp,
                created_block,
                end_block,
            ),
        }
    }

    /// Timestamp of `target_block` extrapolated from a known (block, timestamp) anchor.
    /// Targets before the anchor extrapolate backwards.
    pub fn estimate_block_timestamp(
        &self,
        anchor_timestamp: i64,
        anchor_block: u64,
        target_block: u64,
    ) -> i64 {
        let blocks = i128::from(target_block) - i128::from(anchor_block);
        let seconds = blocks
            .saturating_mul(i128::from(self.block_time_seconds))
            .saturating_add(i128::from(anchor_timestamp));
        seconds.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}
