use crate::*;
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Default, Serialize, Deserialize, TreeHash)]
pub struct ConsolidationRequest {
    pub source_address: Address,
    pub source_pubkey: PublicKeyBytes,
    pub target_pubkey: PublicKeyBytes,
}
