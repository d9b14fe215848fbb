//! KZG commitment types and the `KzgBackend` trait which produces them.
//!
//! `DeterministicKzg` is the only backend shipped here. It hashes blobs instead of evaluating
//! polynomials, so its commitments and proofs are stable but carry no cryptographic security.
//! A real backend, e.g. one wrapping `c-kzg` or `rust_eth_kzg` with a loaded trusted setup,
//! implements `KzgBackend` and is handed to the execution layer stub as an `Arc<dyn KzgBackend>`
//! in place of `DeterministicKzg`. Nothing else in the stub depends on which backend is used.
#[macro_use]
mod macros;
mod deterministic;
mod kzg_commitment;
mod kzg_proof;

use std::fmt::Debug;

pub use crate::{
    deterministic::DeterministicKzg,
    kzg_commitment::{KzgCommitment, VERSIONED_HASH_VERSION_KZG},
    kzg_proof::KzgProof,
};

pub const BYTES_PER_FIELD_ELEMENT: usize = 32;
pub const BYTES_PER_COMMITMENT: usize = 48;
pub const BYTES_PER_PROOF: usize = 48;
pub const CELLS_PER_EXT_BLOB: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The blob is empty or not a whole number of field elements.
    InvalidBlobLength(usize),
    /// The kzg verification failed
    KzgVerificationFailed,
    /// Misc indexing error
    InconsistentArrayLength(String),
}

/// A commitment scheme which binds blobs to commitments and proofs.
///
/// This is the plug-in point for a production KZG library.
///
/// Implementations must be deterministic: the same blob always yields the same commitment and
/// proofs.
pub trait KzgBackend: Send + Sync + Debug {
    /// Compute the kzg commitment for a blob.
    fn blob_to_kzg_commitment(&self, blob: &[u8]) -> Result<KzgCommitment, Error>;

    /// Compute the kzg proof given a blob and its kzg commitment.
    fn compute_blob_kzg_proof(
        &self,
        blob: &[u8],
        kzg_commitment: KzgCommitment,
    ) -> Result<KzgProof, Error>;

    /// Verify a kzg proof given the blob, kzg commitment and kzg proof.
    fn verify_blob_kzg_proof(
        &self,
        blob: &[u8],
        kzg_commitment: KzgCommitment,
        kzg_proof: KzgProof,
    ) -> Result<(), Error>;

    /// Computes the `CELLS_PER_EXT_BLOB` cell proofs for a blob, in cell order.
    fn compute_cell_kzg_proofs(&self, blob: &[u8]) -> Result<Vec<KzgProof>, Error>;
}
