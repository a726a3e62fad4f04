//env
pub const PROPOSALS_FILE_NOT_SET: &str = "PROPOSALS_FILE not set!";
pub const CURRENT_BLOCK_INVALID: &str = "CURRENT_BLOCK is not a block number";

//input
pub const READ_PROPOSALS_FAILED: &str = "Failed to read proposals file";
pub const PARSE_PROPOSALS_FAILED: &str = "Failed to parse proposals file";
pub const READ_METAGOV_FAILED: &str = "Failed to read metagov file";
pub const PARSE_METAGOV_FAILED: &str = "Failed to parse metagov file";

//output
pub const SERIALIZE_REPORT_FAILED: &str = "Failed to serialize lifecycle report";
pub const WRITE_REPORT_FAILED: &str = "Failed to write lifecycle report";
