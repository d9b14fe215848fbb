use crate::*;
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

pub type Withdrawals<E> = VariableList<Withdrawal, <E as EthSpec>::MaxWithdrawalsPerPayload>;

/// A validator balance withdrawal processed by the execution layer.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default, Serialize, Deserialize, TreeHash)]
pub struct Withdrawal {
    #[serde(with = "serde_utils::quoted_u64")]
    pub index: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub validator_index: u64,
    pub address: Address,
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
}
