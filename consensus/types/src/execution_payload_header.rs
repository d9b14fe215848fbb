use crate::*;
use serde::{Deserialize, Serialize};
use superstruct::superstruct;
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

#[superstruct(
    variants(Bellatrix, Capella, Deneb, Electra, Fulu),
    variant_attributes(
        derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, TreeHash),
        serde(bound = "E: EthSpec", deny_unknown_fields),
    ),
    cast_error(ty = "Error", expr = "Error::IncorrectStateVariant"),
    partial_getter_error(ty = "Error", expr = "Error::IncorrectStateVariant")
)]
#[derive(Debug, Clone, PartialEq, Serialize, TreeHash)]
#[serde(bound = "E: EthSpec", untagged)]
#[tree_hash(enum_behaviour = "transparent")]
pub struct ExecutionPayloadHeader<E: EthSpec> {
    #[superstruct(getter(copy))]
    pub parent_hash: ExecutionBlockHash,
    #[superstruct(getter(copy))]
    pub fee_recipient: Address,
    #[superstruct(getter(copy))]
    pub state_root: Hash256,
    #[superstruct(getter(copy))]
    pub receipts_root: Hash256,
    #[serde(with = "ssz_types::serde_utils::hex_fixed_vec")]
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    #[superstruct(getter(copy))]
    pub prev_randao: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    #[superstruct(getter(copy))]
    pub block_number: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    #[superstruct(getter(copy))]
    pub gas_limit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    #[superstruct(getter(copy))]
    pub gas_used: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    #[superstruct(getter(copy))]
    pub timestamp: u64,
    #[serde(with = "ssz_types::serde_utils::hex_var_list")]
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    #[serde(with = "serde_utils::quoted_u256")]
    #[superstruct(getter(copy))]
    pub base_fee_per_gas: Uint256,
    #[superstruct(getter(copy))]
    pub block_hash: ExecutionBlockHash,
    #[superstruct(getter(copy))]
    pub transactions_root: Hash256,
    #[superstruct(only(Capella, Deneb, Electra, Fulu), partial_getter(copy))]
    pub withdrawals_root: Hash256,
    #[superstruct(only(Deneb, Electra, Fulu), partial_getter(copy))]
    #[serde(with = "serde_utils::quoted_u64")]
    pub blob_gas_used: u64,
    #[superstruct(only(Deneb, Electra, Fulu), partial_getter(copy))]
    #[serde(with = "serde_utils::quoted_u64")]
    pub excess_blob_gas: u64,
}

impl<E: EthSpec> ExecutionPayloadHeader<E> {
    pub fn fork_name(&self) -> ForkName {
        match self {
            ExecutionPayloadHeader::Bellatrix(_) => ForkName::Bellatrix,
            ExecutionPayloadHeader::Capella(_) => ForkName::Capella,
            ExecutionPayloadHeader::Deneb(_) => ForkName::Deneb,
            ExecutionPayloadHeader::Electra(_) => ForkName::Electra,
            ExecutionPayloadHeader::Fulu(_) => ForkName::Fulu,
        }
    }
}

/// Implements `From<&$payload>` for `$header`. Fields shared by every fork are copied, lists are
/// replaced by their tree hash roots, and `[$copied]` names the extra scalar fields of the fork.
macro_rules! impl_header_from_payload {
    ($payload: ident => $header: ident, [$($copied: ident),*], [$($list: ident => $root: ident),*]) => {
        impl<'a, E: EthSpec> From<&'a $payload<E>> for $header<E> {
            fn from(payload: &'a $payload<E>) -> Self {
                Self {
                    parent_hash: payload.parent_hash,
                    fee_recipient: payload.fee_recipient,
                    state_root: payload.state_root,
                    receipts_root: payload.receipts_root,
                    logs_bloom: payload.logs_bloom.clone(),
                    prev_randao: payload.prev_randao,
                    block_number: payload.block_number,
                    gas_limit: payload.gas_limit,
                    gas_used: payload.gas_used,
                    timestamp: payload.timestamp,
                    extra_data: payload.extra_data.clone(),
                    base_fee_per_gas: payload.base_fee_per_gas,
                    block_hash: payload.block_hash,
                    transactions_root: payload.transactions.tree_hash_root(),
                    $($copied: payload.$copied,)*
                    $($root: payload.$list.tree_hash_root(),)*
                }
            }
        }
    };
}

impl_header_from_payload!(ExecutionPayloadBellatrix => ExecutionPayloadHeaderBellatrix, [], []);
impl_header_from_payload!(
    ExecutionPayloadCapella => ExecutionPayloadHeaderCapella,
    [],
    [withdrawals => withdrawals_root]
);
impl_header_from_payload!(
    ExecutionPayloadDeneb => ExecutionPayloadHeaderDeneb,
    [blob_gas_used, excess_blob_gas],
    [withdrawals => withdrawals_root]
);
impl_header_from_payload!(
    ExecutionPayloadElectra => ExecutionPayloadHeaderElectra,
    [blob_gas_used, excess_blob_gas],
    [withdrawals => withdrawals_root]
);
impl_header_from_payload!(
    ExecutionPayloadFulu => ExecutionPayloadHeaderFulu,
    [blob_gas_used, excess_blob_gas],
    [withdrawals => withdrawals_root]
);

impl<'a, E: EthSpec> From<ExecutionPayloadRef<'a, E>> for ExecutionPayloadHeader<E> {
    fn from(payload: ExecutionPayloadRef<'a, E>) -> Self {
        match payload {
            ExecutionPayloadRef::Bellatrix(payload) => Self::Bellatrix(payload.into()),
            ExecutionPayloadRef::Capella(payload) => Self::Capella(payload.into()),
            ExecutionPayloadRef::Deneb(payload) => Self::Deneb(payload.into()),
            ExecutionPayloadRef::Electra(payload) => Self::Electra(payload.into()),
            ExecutionPayloadRef::Fulu(payload) => Self::Fulu(payload.into()),
        }
    }
}
