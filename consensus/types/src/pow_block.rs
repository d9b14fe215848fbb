use crate::*;
use serde::{Deserialize, Serialize};

/// A proof-of-work block, as far as the Bellatrix transition needs to know about it.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct PowBlock {
    pub block_hash: ExecutionBlockHash,
    pub parent_hash: ExecutionBlockHash,
    #[serde(with = "serde_utils::quoted_u64")]
    pub timestamp: u64,
}
