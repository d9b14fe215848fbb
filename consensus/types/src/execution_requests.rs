use crate::{ConsolidationRequest, DepositRequest, EthSpec, WithdrawalRequest};
use serde::{Deserialize, Serialize};
use ssz_types::VariableList;
use tree_hash_derive::TreeHash;

/// Requests from the execution layer to the consensus layer, introduced in Electra.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct ExecutionRequests<E: EthSpec> {
    pub deposits: VariableList<DepositRequest, E::MaxDepositRequestsPerPayload>,
    pub withdrawals: VariableList<WithdrawalRequest, E::MaxWithdrawalRequestsPerPayload>,
    pub consolidations: VariableList<ConsolidationRequest, E::MaxConsolidationRequestsPerPayload>,
}

impl<E: EthSpec> ExecutionRequests<E> {
    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty() && self.withdrawals.is_empty() && self.consolidations.is_empty()
    }
}
