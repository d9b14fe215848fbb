//! Provides a fully-wired `ExecutionLayerStub` on a manual clock for use in testing.
use crate::{Config, ExecutionLayerStub, ForkchoiceState, PayloadAttributes, PayloadId};
use kzg::DeterministicKzg;
use logging::test_logger;
use slot_clock::{ManualSlotClock, SlotClock};
use std::sync::Arc;
use std::time::Duration;
use types::{
    Address, BeaconBlock, BeaconBlockBody, BlockPayload, BuilderBid, ChainSpec, EthSpec,
    ExecutionBlockHash, ExecutionPayload, ForkName, Hash256, KzgCommitments, SignatureBytes,
    SignedBeaconBlock, Slot, Withdrawal,
};

pub const GENESIS_TIME: u64 = 1_606_824_023;
pub const FEE_RECIPIENT: Address = Address::repeat_byte(0x42);
pub const PREV_RANDAO: Hash256 = Hash256::repeat_byte(0x24);

pub struct StubHarness<E: EthSpec> {
    pub stub: ExecutionLayerStub<E, ManualSlotClock>,
    pub spec: Arc<ChainSpec>,
    pub slot_clock: ManualSlotClock,
}

impl<E: EthSpec> StubHarness<E> {
    /// A harness where every fork up to and including `fork_name` is active from genesis.
    pub fn new(fork_name: ForkName) -> Self {
        Self::with_config(fork_name, Config::default())
    }

    pub fn with_config(fork_name: ForkName, config: Config) -> Self {
        Self::with_spec(fork_name.make_genesis_spec(ChainSpec::minimal()), config)
    }

    pub fn with_spec(spec: ChainSpec, config: Config) -> Self {
        let spec = Arc::new(spec);
        let slot_clock = ManualSlotClock::new(
            Slot::new(0),
            Duration::from_secs(GENESIS_TIME),
            spec.slot_duration(),
        );
        let stub = ExecutionLayerStub::new(
            config,
            spec.clone(),
            slot_clock.clone(),
            Arc::new(DeterministicKzg),
            test_logger(),
        )
        .expect("should build execution layer stub");

        Self {
            stub,
            spec,
            slot_clock,
        }
    }

    pub fn fork_name_at(&self, slot: Slot) -> ForkName {
        self.spec.fork_name_at_slot::<E>(slot)
    }

    pub fn forkchoice_state(head_block_hash: ExecutionBlockHash) -> ForkchoiceState {
        ForkchoiceState {
            head_block_hash,
            safe_block_hash: head_block_hash,
            finalized_block_hash: ExecutionBlockHash::zero(),
        }
    }

    /// Payload attributes of the version the fork at `slot` expects.
    pub fn payload_attributes(&self, slot: Slot) -> PayloadAttributes {
        let fork_name = self.fork_name_at(slot);
        let timestamp = self
            .slot_clock
            .timestamp_of(slot)
            .expect("slot should be after genesis");
        let withdrawals = fork_name.capella_enabled().then(|| {
            vec![Withdrawal {
                index: slot.as_u64(),
                validator_index: 1,
                address: FEE_RECIPIENT,
                amount: 32,
            }]
        });
        let parent_beacon_block_root = fork_name
            .deneb_enabled()
            .then(|| Hash256::from_low_u64_be(slot.as_u64()));

        PayloadAttributes::new(
            timestamp,
            PREV_RANDAO,
            FEE_RECIPIENT,
            withdrawals,
            parent_beacon_block_root,
        )
        .expect("forks with a parent root also have withdrawals")
    }

    /// Notifies the stub of `head` with attributes for `slot` and returns the minted payload id.
    pub fn prepare_payload(&self, head: ExecutionBlockHash, slot: Slot) -> PayloadId {
        self.stub
            .notify_forkchoice_updated(
                Self::forkchoice_state(head),
                Some(self.payload_attributes(slot)),
            )
            .expect("forkchoice update should succeed")
            .payload_id
            .expect("attributes should yield a payload id")
    }

    fn block(
        &self,
        slot: Slot,
        execution_payload: BlockPayload<E>,
        blob_kzg_commitments: Option<KzgCommitments<E>>,
    ) -> SignedBeaconBlock<E> {
        let execution_requests = self
            .fork_name_at(slot)
            .electra_enabled()
            .then(Default::default);

        SignedBeaconBlock {
            message: BeaconBlock {
                slot,
                proposer_index: 0,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body: BeaconBlockBody {
                    execution_payload: Some(execution_payload),
                    blob_kzg_commitments,
                    execution_requests,
                },
            },
            signature: SignatureBytes::empty(),
        }
    }

    /// A blinded block at `slot` carrying the bid's header and commitments.
    pub fn blinded_block_from_bid(&self, bid: &BuilderBid<E>, slot: Slot) -> SignedBeaconBlock<E> {
        self.block(
            slot,
            BlockPayload::Blinded(bid.to_execution_payload_header()),
            bid.blob_kzg_commitments().ok().cloned(),
        )
    }

    /// A full block at `slot` carrying `payload`.
    pub fn full_block(
        &self,
        payload: ExecutionPayload<E>,
        blob_kzg_commitments: Option<KzgCommitments<E>>,
        slot: Slot,
    ) -> SignedBeaconBlock<E> {
        self.block(slot, BlockPayload::Full(payload), blob_kzg_commitments)
    }
}
