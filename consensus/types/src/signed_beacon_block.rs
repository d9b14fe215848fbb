use crate::*;

/// The execution payload a block carries, either in full or as a header committing to it.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPayload<E: EthSpec> {
    Full(ExecutionPayload<E>),
    Blinded(ExecutionPayloadHeader<E>),
}

impl<E: EthSpec> BlockPayload<E> {
    pub fn is_blinded(&self) -> bool {
        matches!(self, BlockPayload::Blinded(_))
    }

    pub fn block_hash(&self) -> ExecutionBlockHash {
        match self {
            BlockPayload::Full(payload) => payload.block_hash(),
            BlockPayload::Blinded(header) => header.block_hash(),
        }
    }
}

/// The parts of a beacon block body which concern the execution layer.
///
/// Fields are `None` when the fork the block belongs to predates them.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconBlockBody<E: EthSpec> {
    pub execution_payload: Option<BlockPayload<E>>,
    pub blob_kzg_commitments: Option<KzgCommitments<E>>,
    pub execution_requests: Option<ExecutionRequests<E>>,
}

impl<E: EthSpec> Default for BeaconBlockBody<E> {
    fn default() -> Self {
        Self {
            execution_payload: None,
            blob_kzg_commitments: None,
            execution_requests: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeaconBlock<E: EthSpec> {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBody<E>,
}

/// A `BeaconBlock` and a signature from its proposer.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedBeaconBlock<E: EthSpec> {
    pub message: BeaconBlock<E>,
    pub signature: SignatureBytes,
}

impl<E: EthSpec> SignedBeaconBlock<E> {
    pub fn slot(&self) -> Slot {
        self.message.slot
    }

    /// Returns `true` if the block carries a payload header rather than a full payload.
    pub fn is_blinded(&self) -> bool {
        self.message
            .body
            .execution_payload
            .as_ref()
            .map_or(false, BlockPayload::is_blinded)
    }

    /// Returns the payload header if the block is blinded.
    pub fn execution_payload_header(&self) -> Option<&ExecutionPayloadHeader<E>> {
        match self.message.body.execution_payload.as_ref()? {
            BlockPayload::Blinded(header) => Some(header),
            BlockPayload::Full(_) => None,
        }
    }

    pub fn blob_kzg_commitments(&self) -> Option<&KzgCommitments<E>> {
        self.message.body.blob_kzg_commitments.as_ref()
    }

    pub fn fork_name(&self, spec: &ChainSpec) -> ForkName {
        spec.fork_name_at_slot::<E>(self.slot())
    }
}
