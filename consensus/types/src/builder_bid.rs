use crate::*;
use serde::{Deserialize, Serialize};
use superstruct::superstruct;
use tree_hash_derive::TreeHash;

/// The payload header a builder offers a proposer, together with the value it is willing to pay.
#[superstruct(
    variants(Bellatrix, Capella, Deneb, Electra, Fulu),
    variant_attributes(
        derive(PartialEq, Debug, Serialize, Deserialize, TreeHash, Clone),
        serde(bound = "E: EthSpec", deny_unknown_fields)
    ),
    cast_error(ty = "Error", expr = "Error::IncorrectStateVariant"),
    partial_getter_error(ty = "Error", expr = "Error::IncorrectStateVariant")
)]
#[derive(PartialEq, Debug, Serialize, TreeHash, Clone)]
#[serde(bound = "E: EthSpec", deny_unknown_fields, untagged)]
#[tree_hash(enum_behaviour = "transparent")]
pub struct BuilderBid<E: EthSpec> {
    #[superstruct(only(Bellatrix), partial_getter(rename = "header_bellatrix"))]
    pub header: ExecutionPayloadHeaderBellatrix<E>,
    #[superstruct(only(Capella), partial_getter(rename = "header_capella"))]
    pub header: ExecutionPayloadHeaderCapella<E>,
    #[superstruct(only(Deneb), partial_getter(rename = "header_deneb"))]
    pub header: ExecutionPayloadHeaderDeneb<E>,
    #[superstruct(only(Electra), partial_getter(rename = "header_electra"))]
    pub header: ExecutionPayloadHeaderElectra<E>,
    #[superstruct(only(Fulu), partial_getter(rename = "header_fulu"))]
    pub header: ExecutionPayloadHeaderFulu<E>,
    #[superstruct(only(Deneb, Electra, Fulu))]
    pub blob_kzg_commitments: KzgCommitments<E>,
    #[superstruct(only(Electra, Fulu))]
    pub execution_requests: ExecutionRequests<E>,
    #[serde(with = "serde_utils::quoted_u256")]
    #[superstruct(getter(copy))]
    pub value: Uint256,
    #[superstruct(getter(copy))]
    pub pubkey: PublicKeyBytes,
}

impl<E: EthSpec> BuilderBid<E> {
    pub fn header(&self) -> ExecutionPayloadHeaderRef<'_, E> {
        self.to_ref().header()
    }

    pub fn fork_name(&self) -> ForkName {
        match self {
            BuilderBid::Bellatrix(_) => ForkName::Bellatrix,
            BuilderBid::Capella(_) => ForkName::Capella,
            BuilderBid::Deneb(_) => ForkName::Deneb,
            BuilderBid::Electra(_) => ForkName::Electra,
            BuilderBid::Fulu(_) => ForkName::Fulu,
        }
    }

    /// Returns an owned copy of the offered header.
    pub fn to_execution_payload_header(&self) -> ExecutionPayloadHeader<E> {
        match self {
            BuilderBid::Bellatrix(bid) => ExecutionPayloadHeader::Bellatrix(bid.header.clone()),
            BuilderBid::Capella(bid) => ExecutionPayloadHeader::Capella(bid.header.clone()),
            BuilderBid::Deneb(bid) => ExecutionPayloadHeader::Deneb(bid.header.clone()),
            BuilderBid::Electra(bid) => ExecutionPayloadHeader::Electra(bid.header.clone()),
            BuilderBid::Fulu(bid) => ExecutionPayloadHeader::Fulu(bid.header.clone()),
        }
    }
}

impl<'a, E: EthSpec> BuilderBidRef<'a, E> {
    pub fn header(&self) -> ExecutionPayloadHeaderRef<'a, E> {
        match *self {
            BuilderBidRef::Bellatrix(bid) => ExecutionPayloadHeaderRef::Bellatrix(&bid.header),
            BuilderBidRef::Capella(bid) => ExecutionPayloadHeaderRef::Capella(&bid.header),
            BuilderBidRef::Deneb(bid) => ExecutionPayloadHeaderRef::Deneb(&bid.header),
            BuilderBidRef::Electra(bid) => ExecutionPayloadHeaderRef::Electra(&bid.header),
            BuilderBidRef::Fulu(bid) => ExecutionPayloadHeaderRef::Fulu(&bid.header),
        }
    }
}
