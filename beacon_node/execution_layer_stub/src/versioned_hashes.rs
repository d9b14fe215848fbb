//! The stub's blob-carrying transaction format and the versioned-hash checks built on it.
//!
//! A blob transaction is the type byte `0x03` followed by the 32-byte versioned hashes of the
//! blobs it carries. No other transaction type carries versioned hashes.
use ssz_types::VariableList;
use std::collections::HashSet;
use types::{
    EthSpec, ExecutionPayloadRef, Hash256, KzgCommitment, Transaction, Unsigned, VersionedHash,
};

pub const BLOB_TX_TYPE: u8 = 0x03;

const VERSIONED_HASH_LEN: usize = 32;

#[derive(Debug)]
pub enum Error {
    DecodingTransaction(String),
    LengthMismatch { expected: usize, found: usize },
    MissingHash(VersionedHash),
    TransactionTooLong(ssz_types::Error),
}

/// Encodes the versioned hashes of `commitments` as a blob transaction.
pub fn blob_transaction_from_commitments<N: Unsigned>(
    commitments: &[KzgCommitment],
) -> Result<Transaction<N>, Error> {
    let mut bytes = Vec::with_capacity(1 + commitments.len() * VERSIONED_HASH_LEN);
    bytes.push(BLOB_TX_TYPE);
    for commitment in commitments {
        bytes.extend_from_slice(commitment.calculate_versioned_hash().as_bytes());
    }
    VariableList::new(bytes).map_err(Error::TransactionTooLong)
}

/// Returns the versioned hashes carried by every blob transaction in `transactions`.
pub fn get_versioned_hashes<E: EthSpec>(
    transactions: &types::Transactions<E>,
) -> Result<HashSet<VersionedHash>, Error> {
    let mut versioned_hashes = HashSet::new();
    for tx in transactions.iter() {
        let Some((&BLOB_TX_TYPE, body)) = tx.split_first() else {
            continue;
        };
        if body.len() % VERSIONED_HASH_LEN != 0 {
            return Err(Error::DecodingTransaction(format!(
                "blob transaction body of {} bytes is not a list of hashes",
                body.len()
            )));
        }
        versioned_hashes.extend(body.chunks_exact(VERSIONED_HASH_LEN).map(Hash256::from_slice));
    }
    Ok(versioned_hashes)
}

/// Checks that the payload's blob transactions carry exactly `expected_versioned_hashes`.
pub fn verify_versioned_hashes<E: EthSpec>(
    execution_payload: ExecutionPayloadRef<E>,
    expected_versioned_hashes: &[VersionedHash],
) -> Result<(), Error> {
    let transactions = match execution_payload {
        ExecutionPayloadRef::Bellatrix(_) | ExecutionPayloadRef::Capella(_) => return Ok(()),
        ExecutionPayloadRef::Deneb(payload) => &payload.transactions,
        ExecutionPayloadRef::Electra(payload) => &payload.transactions,
        ExecutionPayloadRef::Fulu(payload) => &payload.transactions,
    };

    let versioned_hashes = get_versioned_hashes::<E>(transactions)?;
    // ensure that all expected hashes are present
    for expected_hash in expected_versioned_hashes {
        if !versioned_hashes.contains(expected_hash) {
            return Err(Error::MissingHash(*expected_hash));
        }
    }
    // ensure that there are no extra hashes
    if versioned_hashes.len() != expected_versioned_hashes.len() {
        return Err(Error::LengthMismatch {
            expected: expected_versioned_hashes.len(),
            found: versioned_hashes.len(),
        });
    }
    Ok(())
}
