use crate::*;
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Default, Serialize, Deserialize, TreeHash)]
pub struct DepositRequest {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
    pub signature: SignatureBytes,
    #[serde(with = "serde_utils::quoted_u64")]
    pub index: u64,
}
