use execution_layer_stub::payload_builder::{BLOCK_VALUE_WITHOUT_BLOBS, BLOCK_VALUE_WITH_BLOBS};
use execution_layer_stub::test_utils::StubHarness;
use execution_layer_stub::{Error, ErrorKind};
use tree_hash::TreeHash;
use types::{
    BlockPayload, ExecutionBlockHash, ExecutionPayloadHeader, ForkName, FullPayloadContents,
    Hash256, KzgCommitment, KzgCommitments, MinimalEthSpec, PublicKeyBytes, SignedBeaconBlock,
    Slot, Uint256,
};

type E = MinimalEthSpec;

const HEAD: ExecutionBlockHash = ExecutionBlockHash::repeat_byte(0x22);

fn post_merge_forks() -> Vec<ForkName> {
    ForkName::list_all()
        .into_iter()
        .filter(|fork| fork.bellatrix_enabled())
        .collect()
}

fn tamper_header(
    block: &SignedBeaconBlock<E>,
    tamper: impl FnOnce(&mut ExecutionPayloadHeader<E>),
) -> SignedBeaconBlock<E> {
    let mut block = block.clone();
    match block.message.body.execution_payload.as_mut() {
        Some(BlockPayload::Blinded(header)) => tamper(header),
        _ => panic!("block should be blinded"),
    }
    block
}

#[test]
fn bid_then_unblind_for_every_fork() {
    for fork_name in post_merge_forks() {
        let harness = StubHarness::<E>::new(fork_name);
        harness.stub.set_blobs_to_generate(Some(1));
        let slot = Slot::new(1);
        let payload_id = harness.prepare_payload(HEAD, slot);

        let bid = harness
            .stub
            .builder_get_header(&payload_id, slot, Some(100))
            .unwrap();
        assert_eq!(bid.fork_name(), fork_name);
        assert_eq!(bid.pubkey(), PublicKeyBytes::empty());
        assert_eq!(bid.header().parent_hash(), HEAD);
        assert_eq!(bid.execution_requests().is_ok(), fork_name.electra_enabled());

        let block = harness.blinded_block_from_bid(&bid, slot);
        let contents = harness.stub.builder_get_payload(&block).unwrap();
        assert_eq!(
            contents.payload_ref().tree_hash_root(),
            bid.to_execution_payload_header().tree_hash_root()
        );

        match contents {
            FullPayloadContents::Payload(_) => {
                assert!(!fork_name.deneb_enabled());
                assert_eq!(bid.value(), Uint256::from(BLOCK_VALUE_WITHOUT_BLOBS));
            }
            FullPayloadContents::PayloadAndBlobs(payload_and_blobs) => {
                assert!(fork_name.deneb_enabled());
                assert_eq!(bid.value(), Uint256::from(BLOCK_VALUE_WITH_BLOBS));
                assert_eq!(
                    payload_and_blobs.blobs_bundle.commitments(),
                    bid.blob_kzg_commitments().unwrap()
                );
                assert!(payload_and_blobs.blobs_bundle.matches_fork(fork_name));
            }
        }
    }
}

#[test]
fn engine_and_builder_paths_share_the_payload() {
    let harness = StubHarness::<E>::new(ForkName::Electra);
    let slot = Slot::new(3);
    let payload_id = harness.prepare_payload(HEAD, slot);

    let bid = harness
        .stub
        .builder_get_header(&payload_id, slot, None)
        .unwrap();
    let response = harness.stub.get_payload(&payload_id, slot).unwrap();

    assert_eq!(
        response.execution_payload.tree_hash_root(),
        bid.to_execution_payload_header().tree_hash_root()
    );
    let pending = harness.stub.pending_builder_payload().unwrap();
    assert_eq!(pending.execution_payload, response.execution_payload);
    assert_eq!(pending.blobs_bundle, response.blobs_bundle);
}

#[test]
fn tampered_header_is_a_consistency_error() {
    let harness = StubHarness::<E>::new(ForkName::Deneb);
    let slot = Slot::new(1);
    let payload_id = harness.prepare_payload(HEAD, slot);
    let bid = harness
        .stub
        .builder_get_header(&payload_id, slot, None)
        .unwrap();
    let block = harness.blinded_block_from_bid(&bid, slot);

    let tampered_blocks = vec![
        tamper_header(&block, |header| *header.gas_limit_mut() += 1),
        tamper_header(&block, |header| *header.timestamp_mut() += 1),
        tamper_header(&block, |header| {
            *header.block_hash_mut() = ExecutionBlockHash::repeat_byte(0xff)
        }),
        tamper_header(&block, |header| {
            *header.transactions_root_mut() = Hash256::repeat_byte(0xff)
        }),
        tamper_header(&block, |header| {
            if let Ok(withdrawals_root) = header.withdrawals_root_mut() {
                *withdrawals_root = Hash256::repeat_byte(0xff);
            }
        }),
    ];

    for tampered in tampered_blocks {
        let err = harness.stub.builder_get_payload(&tampered).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(matches!(err, Error::PayloadHeaderMismatch { .. }));
    }

    // The untouched block still unblinds.
    harness.stub.builder_get_payload(&block).unwrap();
}

#[test]
fn commitment_count_mismatch_is_a_consistency_error() {
    let harness = StubHarness::<E>::new(ForkName::Fulu);
    harness.stub.set_blobs_to_generate(Some(2));
    let slot = Slot::new(1);
    let payload_id = harness.prepare_payload(HEAD, slot);
    let bid = harness
        .stub
        .builder_get_header(&payload_id, slot, None)
        .unwrap();

    let mut block = harness.blinded_block_from_bid(&bid, slot);
    block.message.body.blob_kzg_commitments =
        Some(KzgCommitments::<E>::new(vec![KzgCommitment([1; 48])]).unwrap());

    let err = harness.stub.builder_get_payload(&block).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(matches!(
        err,
        Error::BlobCountMismatch {
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn unblind_without_bid_is_not_found() {
    let harness = StubHarness::<E>::new(ForkName::Capella);
    let slot = Slot::new(1);
    let payload_id = harness.prepare_payload(HEAD, slot);
    let response = harness.stub.get_payload(&payload_id, slot).unwrap();

    let header = response.execution_payload.to_execution_payload_header();
    let mut block = harness.full_block(response.execution_payload, None, slot);
    block.message.body.execution_payload = Some(BlockPayload::Blinded(header));

    let err = harness.stub.builder_get_payload(&block).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn full_block_is_an_invalid_argument() {
    let harness = StubHarness::<E>::new(ForkName::Capella);
    let slot = Slot::new(1);
    let payload_id = harness.prepare_payload(HEAD, slot);
    harness
        .stub
        .builder_get_header(&payload_id, slot, None)
        .unwrap();
    let payload = harness
        .stub
        .pending_builder_payload()
        .unwrap()
        .execution_payload;

    let err = harness
        .stub
        .builder_get_payload(&harness.full_block(payload, None, slot))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn pre_merge_unblind_is_unsupported() {
    let mut spec = ForkName::Capella.make_genesis_spec(types::ChainSpec::minimal());
    spec.bellatrix_fork_epoch = Some(types::Epoch::new(1));
    spec.capella_fork_epoch = Some(types::Epoch::new(1));
    let harness = StubHarness::<E>::with_spec(spec, Default::default());

    let merged_slot = Slot::new(8);
    let payload_id = harness.prepare_payload(HEAD, merged_slot);
    let bid = harness
        .stub
        .builder_get_header(&payload_id, merged_slot, None)
        .unwrap();

    let block = harness.blinded_block_from_bid(&bid, Slot::new(1));
    let err = harness.stub.builder_get_payload(&block).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
}

#[test]
fn only_the_latest_bid_can_be_unblinded() {
    let harness = StubHarness::<E>::new(ForkName::Capella);
    let slot = Slot::new(1);
    let first_id = harness.prepare_payload(HEAD, slot);
    let second_id = harness.prepare_payload(HEAD, slot);

    let first_bid = harness
        .stub
        .builder_get_header(&first_id, slot, None)
        .unwrap();
    let second_bid = harness
        .stub
        .builder_get_header(&second_id, slot, None)
        .unwrap();

    let err = harness
        .stub
        .builder_get_payload(&harness.blinded_block_from_bid(&first_bid, slot))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Consistency);

    harness
        .stub
        .builder_get_payload(&harness.blinded_block_from_bid(&second_bid, slot))
        .unwrap();
}
