use crate::blobs::{BlobBundleGenerator, GeneratedBlobs};
use crate::payload_cache::{CachedPayloadRequest, ProducedPayload};
use crate::Error;
use rand::RngCore;
use ssz_types::VariableList;
use types::{
    Address, EthSpec, ExecutionBlockHash, ExecutionPayload, ExecutionPayloadBellatrix,
    ExecutionPayloadCapella, ExecutionPayloadDeneb, ExecutionPayloadElectra,
    ExecutionPayloadFulu, ExecutionRequests, FixedVector, ForkName, Hash256, Transaction,
    Transactions, Uint256, Withdrawals,
};

pub const GAS_LIMIT: u64 = 1;
pub const GAS_USED: u64 = 0;
pub const BASE_FEE_PER_GAS: u64 = 1;

/// Reported block value when the payload carries a blobs bundle.
pub const BLOCK_VALUE_WITH_BLOBS: u64 = 424_242_424_242_424_242;
/// Reported block value when the payload carries no blobs bundle.
pub const BLOCK_VALUE_WITHOUT_BLOBS: u64 = 434_242_424_242_424_242;

/// Placeholder transactions which bracket the blob transaction.
pub const LEADING_TRANSACTION: [u8; 2] = [0x0e, 0xdf];
pub const TRAILING_TRANSACTION: [u8; 2] = [0xed, 0xf0];

/// Fields shared by every payload fork.
struct BaseFields<E: EthSpec> {
    parent_hash: ExecutionBlockHash,
    fee_recipient: Address,
    logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    prev_randao: Hash256,
    block_number: u64,
    timestamp: u64,
    block_hash: ExecutionBlockHash,
}

/// Builds a synthetic payload for `request` at `fork_name`.
///
/// Payloads from Deneb onwards embed a blob transaction committing to a freshly generated bundle
/// which is returned alongside the payload.
pub fn produce_payload<E: EthSpec>(
    fork_name: ForkName,
    request: &CachedPayloadRequest<E>,
    block_number: u64,
    blob_generator: &BlobBundleGenerator<E>,
    max_blobs: usize,
) -> Result<ProducedPayload<E>, Error> {
    let attributes = request.attributes();
    let mut rng = rand::thread_rng();

    let mut logs_bloom = vec![0; E::bytes_per_logs_bloom()];
    rng.fill_bytes(&mut logs_bloom);
    let mut block_hash = [0; 32];
    rng.fill_bytes(&mut block_hash);

    let base = BaseFields::<E> {
        parent_hash: request.head_block_hash(),
        fee_recipient: attributes.suggested_fee_recipient(),
        logs_bloom: FixedVector::new(logs_bloom)?,
        prev_randao: attributes.prev_randao(),
        block_number,
        timestamp: attributes.timestamp(),
        block_hash: ExecutionBlockHash::from_root(Hash256::from(block_hash)),
    };

    let generated = blob_generator.generate(fork_name, max_blobs)?;
    let transactions = transactions::<E>(generated.as_ref())?;
    let blobs_bundle = generated.map(|generated| generated.bundle);

    let execution_payload = match fork_name {
        ForkName::Base | ForkName::Altair => {
            return Err(Error::UnsupportedFork {
                operation: "produce_payload",
                fork_name,
            })
        }
        ForkName::Bellatrix => ExecutionPayload::Bellatrix(ExecutionPayloadBellatrix {
            parent_hash: base.parent_hash,
            fee_recipient: base.fee_recipient,
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: base.logs_bloom,
            prev_randao: base.prev_randao,
            block_number: base.block_number,
            gas_limit: GAS_LIMIT,
            gas_used: GAS_USED,
            timestamp: base.timestamp,
            extra_data: VariableList::empty(),
            base_fee_per_gas: Uint256::from(BASE_FEE_PER_GAS),
            block_hash: base.block_hash,
            transactions,
        }),
        ForkName::Capella => ExecutionPayload::Capella(ExecutionPayloadCapella {
            parent_hash: base.parent_hash,
            fee_recipient: base.fee_recipient,
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: base.logs_bloom,
            prev_randao: base.prev_randao,
            block_number: base.block_number,
            gas_limit: GAS_LIMIT,
            gas_used: GAS_USED,
            timestamp: base.timestamp,
            extra_data: VariableList::empty(),
            base_fee_per_gas: Uint256::from(BASE_FEE_PER_GAS),
            block_hash: base.block_hash,
            transactions,
            withdrawals: Withdrawals::<E>::new(attributes.withdrawals_or_empty())?,
        }),
        ForkName::Deneb => ExecutionPayload::Deneb(ExecutionPayloadDeneb {
            parent_hash: base.parent_hash,
            fee_recipient: base.fee_recipient,
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: base.logs_bloom,
            prev_randao: base.prev_randao,
            block_number: base.block_number,
            gas_limit: GAS_LIMIT,
            gas_used: GAS_USED,
            timestamp: base.timestamp,
            extra_data: VariableList::empty(),
            base_fee_per_gas: Uint256::from(BASE_FEE_PER_GAS),
            block_hash: base.block_hash,
            transactions,
            withdrawals: Withdrawals::<E>::new(attributes.withdrawals_or_empty())?,
            blob_gas_used: 0,
            excess_blob_gas: 0,
        }),
        ForkName::Electra => ExecutionPayload::Electra(ExecutionPayloadElectra {
            parent_hash: base.parent_hash,
            fee_recipient: base.fee_recipient,
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: base.logs_bloom,
            prev_randao: base.prev_randao,
            block_number: base.block_number,
            gas_limit: GAS_LIMIT,
            gas_used: GAS_USED,
            timestamp: base.timestamp,
            extra_data: VariableList::empty(),
            base_fee_per_gas: Uint256::from(BASE_FEE_PER_GAS),
            block_hash: base.block_hash,
            transactions,
            withdrawals: Withdrawals::<E>::new(attributes.withdrawals_or_empty())?,
            blob_gas_used: 0,
            excess_blob_gas: 0,
        }),
        ForkName::Fulu => ExecutionPayload::Fulu(ExecutionPayloadFulu {
            parent_hash: base.parent_hash,
            fee_recipient: base.fee_recipient,
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: base.logs_bloom,
            prev_randao: base.prev_randao,
            block_number: base.block_number,
            gas_limit: GAS_LIMIT,
            gas_used: GAS_USED,
            timestamp: base.timestamp,
            extra_data: VariableList::empty(),
            base_fee_per_gas: Uint256::from(BASE_FEE_PER_GAS),
            block_hash: base.block_hash,
            transactions,
            withdrawals: Withdrawals::<E>::new(attributes.withdrawals_or_empty())?,
            blob_gas_used: 0,
            excess_blob_gas: 0,
        }),
    };

    Ok(ProducedPayload {
        execution_payload,
        blobs_bundle,
    })
}

/// The marker transactions, with the blob transaction between them when one exists.
fn transactions<E: EthSpec>(generated: Option<&GeneratedBlobs<E>>) -> Result<Transactions<E>, Error> {
    let mut transactions: Vec<Transaction<E::MaxBytesPerTransaction>> =
        Vec::with_capacity(3);
    transactions.push(VariableList::new(LEADING_TRANSACTION.to_vec())?);
    if let Some(generated) = generated {
        transactions.push(generated.blob_transaction.clone());
    }
    transactions.push(VariableList::new(TRAILING_TRANSACTION.to_vec())?);
    Ok(VariableList::new(transactions)?)
}

/// The value reported to the proposer for a produced payload.
pub fn block_value<E: EthSpec>(produced: &ProducedPayload<E>) -> Uint256 {
    if produced.blobs_bundle.is_some() {
        Uint256::from(BLOCK_VALUE_WITH_BLOBS)
    } else {
        Uint256::from(BLOCK_VALUE_WITHOUT_BLOBS)
    }
}

/// The execution requests returned alongside a payload, `None` before Electra.
pub fn execution_requests<E: EthSpec>(fork_name: ForkName) -> Option<ExecutionRequests<E>> {
    fork_name.electra_enabled().then(ExecutionRequests::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_api::PayloadAttributes;
    use crate::versioned_hashes::verify_versioned_hashes;
    use kzg::DeterministicKzg;
    use logging::test_logger;
    use std::sync::Arc;
    use types::{MinimalEthSpec, Withdrawal};

    type E = MinimalEthSpec;

    fn generator(blobs: usize) -> BlobBundleGenerator<E> {
        BlobBundleGenerator::new(Arc::new(DeterministicKzg), Some(blobs), test_logger())
    }

    fn withdrawal() -> Withdrawal {
        Withdrawal {
            index: 3,
            validator_index: 4,
            address: Address::repeat_byte(5),
            amount: 6,
        }
    }

    fn request(withdrawals: bool) -> CachedPayloadRequest<E> {
        CachedPayloadRequest::new(
            ExecutionBlockHash::repeat_byte(0xaa),
            PayloadAttributes::new(
                1234,
                Hash256::repeat_byte(0xbb),
                Address::repeat_byte(0xcc),
                withdrawals.then(|| vec![withdrawal()]),
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn bellatrix_payload_fields() {
        let produced =
            produce_payload(ForkName::Bellatrix, &request(false), 7, &generator(2), 6).unwrap();
        let payload = &produced.execution_payload;

        assert!(produced.blobs_bundle.is_none());
        assert_eq!(payload.fork_name(), ForkName::Bellatrix);
        assert_eq!(payload.parent_hash(), ExecutionBlockHash::repeat_byte(0xaa));
        assert_eq!(payload.fee_recipient(), Address::repeat_byte(0xcc));
        assert_eq!(payload.prev_randao(), Hash256::repeat_byte(0xbb));
        assert_eq!(payload.timestamp(), 1234);
        assert_eq!(payload.block_number(), 7);
        assert_eq!(payload.gas_limit(), GAS_LIMIT);
        assert_eq!(payload.gas_used(), GAS_USED);
        assert_eq!(payload.base_fee_per_gas(), Uint256::from(BASE_FEE_PER_GAS));
        assert_eq!(payload.state_root(), Hash256::zero());
        assert!(payload.extra_data().is_empty());
        assert_eq!(payload.transactions().len(), 2);
        assert_eq!(block_value(&produced), Uint256::from(BLOCK_VALUE_WITHOUT_BLOBS));
    }

    #[test]
    fn capella_payload_carries_withdrawals() {
        let produced =
            produce_payload(ForkName::Capella, &request(true), 1, &generator(2), 6).unwrap();
        assert_eq!(
            produced.execution_payload.withdrawals().unwrap().to_vec(),
            vec![withdrawal()]
        );
    }

    #[test]
    fn deneb_payload_embeds_blob_transaction() {
        let produced =
            produce_payload(ForkName::Deneb, &request(true), 1, &generator(2), 6).unwrap();
        let payload = &produced.execution_payload;
        let bundle = produced.blobs_bundle.as_ref().unwrap();

        let transactions = payload.transactions();
        assert_eq!(transactions.len(), 3);
        assert_eq!(&transactions[0][..], &LEADING_TRANSACTION[..]);
        assert_eq!(&transactions[2][..], &TRAILING_TRANSACTION[..]);
        assert_eq!(payload.blob_gas_used(), Ok(0));
        assert_eq!(payload.excess_blob_gas(), Ok(0));

        let versioned_hashes = bundle
            .commitments()
            .iter()
            .map(|commitment| commitment.calculate_versioned_hash())
            .collect::<Vec<_>>();
        verify_versioned_hashes(payload.to_ref(), &versioned_hashes).unwrap();
        assert_eq!(block_value(&produced), Uint256::from(BLOCK_VALUE_WITH_BLOBS));
    }

    #[test]
    fn fulu_payload_uses_cell_bundle() {
        let produced = produce_payload(ForkName::Fulu, &request(true), 1, &generator(1), 9).unwrap();
        assert_eq!(produced.execution_payload.fork_name(), ForkName::Fulu);
        assert!(produced.blobs_bundle.unwrap().is_cell_bundle());
    }

    #[test]
    fn pre_merge_forks_are_unsupported() {
        for fork_name in [ForkName::Base, ForkName::Altair] {
            assert!(matches!(
                produce_payload(fork_name, &request(false), 1, &generator(0), 0),
                Err(Error::UnsupportedFork { .. })
            ));
        }
    }

    #[test]
    fn execution_requests_from_electra() {
        assert!(execution_requests::<E>(ForkName::Deneb).is_none());
        assert!(execution_requests::<E>(ForkName::Electra).unwrap().is_empty());
        assert!(execution_requests::<E>(ForkName::Fulu).is_some());
    }

    #[test]
    fn block_hashes_are_fresh() {
        let request = request(false);
        let a = produce_payload(ForkName::Bellatrix, &request, 1, &generator(0), 0).unwrap();
        let b = produce_payload(ForkName::Bellatrix, &request, 1, &generator(0), 0).unwrap();
        assert_ne!(
            a.execution_payload.block_hash(),
            b.execution_payload.block_hash()
        );
    }
}
