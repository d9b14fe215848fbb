//! Ethereum consensus types used when exchanging execution payloads with an execution layer.

pub mod blobs_bundle;
pub mod bls_bytes;
pub mod builder_bid;
pub mod chain_spec;
pub mod consolidation_request;
pub mod deposit_request;
pub mod eth_spec;
pub mod execution_block_hash;
pub mod execution_payload;
pub mod execution_payload_header;
pub mod execution_requests;
pub mod fork_name;
pub mod payload;
pub mod pow_block;
pub mod signed_beacon_block;
pub mod slot_epoch;
pub mod validator_registration_data;
pub mod withdrawal;
pub mod withdrawal_request;

pub use crate::blobs_bundle::{
    Blob, BlobsBundle, BlobsCellBundle, BlobsList, KzgCellProofs, KzgCommitments, KzgProofs,
    VersionedBlobsBundle,
};
pub use crate::bls_bytes::{PublicKeyBytes, SignatureBytes};
pub use crate::builder_bid::{
    BuilderBid, BuilderBidBellatrix, BuilderBidCapella, BuilderBidDeneb, BuilderBidElectra,
    BuilderBidFulu,
};
pub use crate::chain_spec::ChainSpec;
pub use crate::consolidation_request::ConsolidationRequest;
pub use crate::deposit_request::DepositRequest;
pub use crate::eth_spec::{EthSpec, EthSpecId, MainnetEthSpec, MinimalEthSpec};
pub use crate::execution_block_hash::ExecutionBlockHash;
pub use crate::execution_payload::{
    ExecutionPayload, ExecutionPayloadBellatrix, ExecutionPayloadCapella, ExecutionPayloadDeneb,
    ExecutionPayloadElectra, ExecutionPayloadFulu, ExecutionPayloadRef, Transaction, Transactions,
};
pub use crate::execution_payload_header::{
    ExecutionPayloadHeader, ExecutionPayloadHeaderBellatrix, ExecutionPayloadHeaderCapella,
    ExecutionPayloadHeaderDeneb, ExecutionPayloadHeaderElectra, ExecutionPayloadHeaderFulu,
    ExecutionPayloadHeaderRef,
};
pub use crate::execution_requests::ExecutionRequests;
pub use crate::fork_name::ForkName;
pub use crate::payload::{ExecutionPayloadAndBlobs, FullPayloadContents};
pub use crate::pow_block::PowBlock;
pub use crate::signed_beacon_block::{
    BeaconBlock, BeaconBlockBody, BlockPayload, SignedBeaconBlock,
};
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::validator_registration_data::{
    SignedValidatorRegistrationData, ValidatorRegistrationData,
};
pub use crate::withdrawal::{Withdrawal, Withdrawals};
pub use crate::withdrawal_request::WithdrawalRequest;

pub use kzg::{KzgCommitment, KzgProof, VERSIONED_HASH_VERSION_KZG};
pub use ssz_types::{typenum, typenum::Unsigned, BitList, BitVector, FixedVector, VariableList};

pub type Hash256 = ethereum_types::H256;
pub type Uint256 = ethereum_types::U256;
pub type Address = ethereum_types::H160;
pub type VersionedHash = Hash256;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// A superstruct value was accessed as a variant it does not hold.
    IncorrectStateVariant,
}
