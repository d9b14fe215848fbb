//! A hash-based stand-in for KZG that needs no trusted setup.
//!
//! Commitments and proofs are 48-byte digests of the blob. They are stable for a given blob and
//! can be re-checked with `verify_blob_kzg_proof`, but carry no polynomial-commitment
//! guarantees.
use crate::{
    Error, KzgBackend, KzgCommitment, KzgProof, BYTES_PER_COMMITMENT, BYTES_PER_FIELD_ELEMENT,
    CELLS_PER_EXT_BLOB,
};
use ethereum_hashing::hash_fixed;

const COMMITMENT_DOMAIN: &[u8] = b"kzg_commitment";
const PROOF_DOMAIN: &[u8] = b"kzg_proof";
const CELL_PROOF_DOMAIN: &[u8] = b"kzg_cell_proof";

#[derive(Debug, Default, Clone, Copy)]
pub struct DeterministicKzg;

impl DeterministicKzg {
    fn blob_digest(blob: &[u8]) -> Result<[u8; 32], Error> {
        if blob.is_empty() || blob.len() % BYTES_PER_FIELD_ELEMENT != 0 {
            return Err(Error::InvalidBlobLength(blob.len()));
        }
        Ok(hash_fixed(blob))
    }
}

/// Hashes `parts` into 48 bytes: the digest followed by the first 16 bytes of its re-hash.
fn digest_48(parts: &[&[u8]]) -> [u8; BYTES_PER_COMMITMENT] {
    let preimage = parts.concat();
    let head = hash_fixed(&preimage);
    let tail = hash_fixed(&head);

    let mut out = [0; BYTES_PER_COMMITMENT];
    let (out_head, out_tail) = out.split_at_mut(head.len());
    out_head.copy_from_slice(&head);
    out_tail.copy_from_slice(&tail[..BYTES_PER_COMMITMENT - head.len()]);
    out
}

impl KzgBackend for DeterministicKzg {
    fn blob_to_kzg_commitment(&self, blob: &[u8]) -> Result<KzgCommitment, Error> {
        let digest = Self::blob_digest(blob)?;
        Ok(KzgCommitment(digest_48(&[COMMITMENT_DOMAIN, &digest])))
    }

    fn compute_blob_kzg_proof(
        &self,
        blob: &[u8],
        kzg_commitment: KzgCommitment,
    ) -> Result<KzgProof, Error> {
        let digest = Self::blob_digest(blob)?;
        Ok(KzgProof(digest_48(&[
            PROOF_DOMAIN,
            &kzg_commitment.0,
            &digest,
        ])))
    }

    fn verify_blob_kzg_proof(
        &self,
        blob: &[u8],
        kzg_commitment: KzgCommitment,
        kzg_proof: KzgProof,
    ) -> Result<(), Error> {
        if self.blob_to_kzg_commitment(blob)? != kzg_commitment
            || self.compute_blob_kzg_proof(blob, kzg_commitment)? != kzg_proof
        {
            return Err(Error::KzgVerificationFailed);
        }
        Ok(())
    }

    fn compute_cell_kzg_proofs(&self, blob: &[u8]) -> Result<Vec<KzgProof>, Error> {
        let digest = Self::blob_digest(blob)?;
        Ok((0..CELLS_PER_EXT_BLOB as u64)
            .map(|cell_index| {
                KzgProof(digest_48(&[
                    CELL_PROOF_DOMAIN,
                    &digest,
                    &cell_index.to_le_bytes(),
                ]))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(byte: u8) -> Vec<u8> {
        vec![byte; BYTES_PER_FIELD_ELEMENT * 4]
    }

    #[test]
    fn commitments_are_deterministic_and_distinct() {
        let kzg = DeterministicKzg;
        let a = kzg.blob_to_kzg_commitment(&blob(1)).unwrap();
        assert_eq!(a, kzg.blob_to_kzg_commitment(&blob(1)).unwrap());
        assert_ne!(a, kzg.blob_to_kzg_commitment(&blob(2)).unwrap());
    }

    #[test]
    fn proof_verifies_against_its_blob_only() {
        let kzg = DeterministicKzg;
        let commitment = kzg.blob_to_kzg_commitment(&blob(1)).unwrap();
        let proof = kzg.compute_blob_kzg_proof(&blob(1), commitment).unwrap();

        assert_eq!(kzg.verify_blob_kzg_proof(&blob(1), commitment, proof), Ok(()));
        assert_eq!(
            kzg.verify_blob_kzg_proof(&blob(2), commitment, proof),
            Err(Error::KzgVerificationFailed)
        );
    }

    #[test]
    fn one_proof_per_cell() {
        let proofs = DeterministicKzg.compute_cell_kzg_proofs(&blob(3)).unwrap();
        assert_eq!(proofs.len(), CELLS_PER_EXT_BLOB);
        assert_ne!(proofs[0], proofs[1]);
    }

    #[test]
    fn usable_as_a_shared_backend() {
        let kzg: std::sync::Arc<dyn KzgBackend> = std::sync::Arc::new(DeterministicKzg);
        let commitment = kzg.blob_to_kzg_commitment(&blob(4)).unwrap();
        let proof = kzg.compute_blob_kzg_proof(&blob(4), commitment).unwrap();

        assert_eq!(commitment, DeterministicKzg.blob_to_kzg_commitment(&blob(4)).unwrap());
        assert_eq!(kzg.verify_blob_kzg_proof(&blob(4), commitment, proof), Ok(()));
    }

    #[test]
    fn rejects_partial_field_elements() {
        assert_eq!(
            DeterministicKzg.blob_to_kzg_commitment(&[0; 33]),
            Err(Error::InvalidBlobLength(33))
        );
        assert_eq!(
            DeterministicKzg.compute_cell_kzg_proofs(&[]),
            Err(Error::InvalidBlobLength(0))
        );
    }
}
