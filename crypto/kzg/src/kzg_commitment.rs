use crate::BYTES_PER_COMMITMENT;
use ethereum_hashing::hash_fixed;
use ethereum_types::H256;

pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KzgCommitment(pub [u8; BYTES_PER_COMMITMENT]);

impl KzgCommitment {
    /// The hash a blob transaction uses to refer to this commitment.
    pub fn calculate_versioned_hash(&self) -> H256 {
        let mut versioned_hash = hash_fixed(&self.0);
        versioned_hash[0] = VERSIONED_HASH_VERSION_KZG;
        H256::from(versioned_hash)
    }

    pub fn empty_for_testing() -> Self {
        KzgCommitment([0; BYTES_PER_COMMITMENT])
    }
}

impl_g1_point_bytes!(KzgCommitment, BYTES_PER_COMMITMENT);
