use crate::versioned_hashes::blob_transaction_from_commitments;
use crate::Error;
use kzg::{KzgBackend, BYTES_PER_FIELD_ELEMENT};
use parking_lot::RwLock;
use rand::{Rng, RngCore};
use slog::{debug, Logger};
use std::marker::PhantomData;
use std::sync::Arc;
use types::{
    Blob, BlobsBundle, BlobsCellBundle, BlobsList, EthSpec, FixedVector, ForkName,
    KzgCellProofs, KzgCommitments, KzgProofs, Transaction, VersionedBlobsBundle,
};

/// A blobs bundle together with the transaction which references it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBlobs<E: EthSpec> {
    pub bundle: VersionedBlobsBundle<E>,
    pub blob_transaction: Transaction<E::MaxBytesPerTransaction>,
}

/// Produces random blobs and their commitments and proofs for payloads from Deneb onwards.
pub struct BlobBundleGenerator<E: EthSpec> {
    kzg: Arc<dyn KzgBackend>,
    /// When set, every bundle holds exactly this many blobs (capped at the fork maximum).
    blobs_to_generate: RwLock<Option<usize>>,
    log: Logger,
    _phantom: PhantomData<E>,
}

impl<E: EthSpec> BlobBundleGenerator<E> {
    pub fn new(kzg: Arc<dyn KzgBackend>, blobs_to_generate: Option<usize>, log: Logger) -> Self {
        Self {
            kzg,
            blobs_to_generate: RwLock::new(blobs_to_generate),
            log,
            _phantom: PhantomData,
        }
    }

    pub fn blobs_to_generate(&self) -> Option<usize> {
        *self.blobs_to_generate.read()
    }

    /// Fixes the number of blobs per bundle, or restores a random count with `None`.
    pub fn set_blobs_to_generate(&self, blobs_to_generate: Option<usize>) {
        *self.blobs_to_generate.write() = blobs_to_generate;
    }

    fn blob_count(&self, max_blobs: usize) -> usize {
        match self.blobs_to_generate() {
            Some(count) if count > max_blobs => {
                debug!(
                    self.log,
                    "Capping configured blob count";
                    "configured" => count,
                    "max_blobs_per_block" => max_blobs,
                );
                max_blobs
            }
            Some(count) => count,
            None => rand::thread_rng().gen_range(0..=max_blobs),
        }
    }

    /// Generates the bundle for a payload at `fork_name`, or `None` before Deneb.
    pub fn generate(
        &self,
        fork_name: ForkName,
        max_blobs: usize,
    ) -> Result<Option<GeneratedBlobs<E>>, Error> {
        let bundle = match fork_name {
            ForkName::Base | ForkName::Altair | ForkName::Bellatrix | ForkName::Capella => {
                return Ok(None)
            }
            ForkName::Deneb | ForkName::Electra => {
                VersionedBlobsBundle::Classic(self.classic_bundle(self.blob_count(max_blobs))?)
            }
            ForkName::Fulu => {
                VersionedBlobsBundle::Cell(self.cell_bundle(self.blob_count(max_blobs))?)
            }
        };

        let blob_transaction = blob_transaction_from_commitments(bundle.commitments())?;
        debug!(
            self.log,
            "Generated blobs bundle";
            "fork" => %fork_name,
            "blobs" => bundle.number_of_blobs(),
            "proofs" => bundle.proofs().len(),
        );

        Ok(Some(GeneratedBlobs {
            bundle,
            blob_transaction,
        }))
    }

    fn classic_bundle(&self, count: usize) -> Result<BlobsBundle<E>, Error> {
        let mut commitments = Vec::with_capacity(count);
        let mut proofs = Vec::with_capacity(count);
        let mut blobs = Vec::with_capacity(count);

        for _ in 0..count {
            let blob = random_valid_blob::<E>()?;
            let commitment = self.kzg.blob_to_kzg_commitment(&blob)?;
            let proof = self.kzg.compute_blob_kzg_proof(&blob, commitment)?;
            commitments.push(commitment);
            proofs.push(proof);
            blobs.push(blob);
        }

        Ok(BlobsBundle {
            commitments: KzgCommitments::<E>::new(commitments)?,
            proofs: KzgProofs::<E>::new(proofs)?,
            blobs: BlobsList::<E>::new(blobs)?,
        })
    }

    fn cell_bundle(&self, count: usize) -> Result<BlobsCellBundle<E>, Error> {
        let mut commitments = Vec::with_capacity(count);
        let mut proofs = Vec::with_capacity(count * kzg::CELLS_PER_EXT_BLOB);
        let mut blobs = Vec::with_capacity(count);

        for _ in 0..count {
            let blob = random_valid_blob::<E>()?;
            commitments.push(self.kzg.blob_to_kzg_commitment(&blob)?);
            proofs.extend(self.kzg.compute_cell_kzg_proofs(&blob)?);
            blobs.push(blob);
        }

        Ok(BlobsCellBundle {
            commitments: KzgCommitments::<E>::new(commitments)?,
            proofs: KzgCellProofs::<E>::new(proofs)?,
            blobs: BlobsList::<E>::new(blobs)?,
        })
    }
}

/// A random blob whose field elements are all below the BLS modulus.
pub fn random_valid_blob<E: EthSpec>() -> Result<Blob<E>, Error> {
    let mut bytes = vec![0; E::bytes_per_blob()];
    rand::thread_rng().fill_bytes(&mut bytes);
    for field_element in bytes.chunks_mut(BYTES_PER_FIELD_ELEMENT) {
        field_element[0] = 0;
    }
    Ok(FixedVector::new(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioned_hashes::BLOB_TX_TYPE;
    use kzg::{DeterministicKzg, CELLS_PER_EXT_BLOB};
    use logging::test_logger;
    use types::MinimalEthSpec;

    type E = MinimalEthSpec;

    fn generator(blobs_to_generate: Option<usize>) -> BlobBundleGenerator<E> {
        BlobBundleGenerator::new(Arc::new(DeterministicKzg), blobs_to_generate, test_logger())
    }

    #[test]
    fn no_blobs_before_deneb() {
        let generator = generator(Some(2));
        for fork in [ForkName::Bellatrix, ForkName::Capella] {
            assert!(generator.generate(fork, 6).unwrap().is_none());
        }
    }

    #[test]
    fn classic_bundle_has_one_proof_per_blob() {
        let kzg = DeterministicKzg;
        let generated = generator(Some(3))
            .generate(ForkName::Deneb, 6)
            .unwrap()
            .unwrap();
        let bundle = &generated.bundle;

        assert!(!bundle.is_cell_bundle());
        assert_eq!(bundle.number_of_blobs(), 3);
        assert_eq!(bundle.commitments().len(), 3);
        assert_eq!(bundle.proofs().len(), 3);
        for ((blob, commitment), proof) in bundle
            .blobs()
            .iter()
            .zip(bundle.commitments().iter())
            .zip(bundle.proofs())
        {
            kzg.verify_blob_kzg_proof(blob, *commitment, *proof).unwrap();
        }

        assert_eq!(generated.blob_transaction[0], BLOB_TX_TYPE);
        assert_eq!(generated.blob_transaction.len(), 1 + 3 * 32);
    }

    #[test]
    fn cell_bundle_has_cell_proofs_per_blob() {
        let generated = generator(Some(2))
            .generate(ForkName::Fulu, 9)
            .unwrap()
            .unwrap();
        assert!(generated.bundle.is_cell_bundle());
        assert_eq!(generated.bundle.number_of_blobs(), 2);
        assert_eq!(generated.bundle.proofs().len(), 2 * CELLS_PER_EXT_BLOB);
    }

    #[test]
    fn configured_count_is_capped() {
        let generated = generator(Some(50))
            .generate(ForkName::Electra, 4)
            .unwrap()
            .unwrap();
        assert_eq!(generated.bundle.number_of_blobs(), 4);
    }

    #[test]
    fn random_count_within_bounds() {
        let generator = generator(None);
        for _ in 0..20 {
            let generated = generator.generate(ForkName::Deneb, 3).unwrap().unwrap();
            assert!(generated.bundle.number_of_blobs() <= 3);
        }
    }

    #[test]
    fn zero_blobs_still_yields_bundle() {
        let generated = generator(Some(0))
            .generate(ForkName::Deneb, 6)
            .unwrap()
            .unwrap();
        assert_eq!(generated.bundle.number_of_blobs(), 0);
        assert_eq!(generated.blob_transaction.to_vec(), vec![BLOB_TX_TYPE]);
    }

    #[test]
    fn random_blob_is_canonical() {
        let blob = random_valid_blob::<E>().unwrap();
        assert_eq!(blob.len(), E::bytes_per_blob());
        assert!(blob
            .chunks(BYTES_PER_FIELD_ELEMENT)
            .all(|field_element| field_element[0] == 0));
    }
}
