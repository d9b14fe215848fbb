use crate::*;

pub type Blob<E> = FixedVector<u8, <E as EthSpec>::BytesPerBlob>;
pub type BlobsList<E> = VariableList<Blob<E>, <E as EthSpec>::MaxBlobCommitmentsPerBlock>;
pub type KzgCommitments<E> =
    VariableList<KzgCommitment, <E as EthSpec>::MaxBlobCommitmentsPerBlock>;
pub type KzgProofs<E> = VariableList<KzgProof, <E as EthSpec>::MaxBlobCommitmentsPerBlock>;
pub type KzgCellProofs<E> = VariableList<KzgProof, <E as EthSpec>::MaxCellProofsPerBlock>;

/// Blobs with one proof per blob, produced from Deneb until Fulu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlobsBundle<E: EthSpec> {
    pub commitments: KzgCommitments<E>,
    pub proofs: KzgProofs<E>,
    pub blobs: BlobsList<E>,
}

/// Blobs with `CELLS_PER_EXT_BLOB` proofs per blob, produced from Fulu onwards.
///
/// The proofs for blob `i` occupy `proofs[i * CELLS_PER_EXT_BLOB..(i + 1) * CELLS_PER_EXT_BLOB]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlobsCellBundle<E: EthSpec> {
    pub commitments: KzgCommitments<E>,
    pub proofs: KzgCellProofs<E>,
    pub blobs: BlobsList<E>,
}

/// A blobs bundle in whichever proof form the active fork requires.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedBlobsBundle<E: EthSpec> {
    Classic(BlobsBundle<E>),
    Cell(BlobsCellBundle<E>),
}

impl<E: EthSpec> VersionedBlobsBundle<E> {
    pub fn commitments(&self) -> &KzgCommitments<E> {
        match self {
            VersionedBlobsBundle::Classic(bundle) => &bundle.commitments,
            VersionedBlobsBundle::Cell(bundle) => &bundle.commitments,
        }
    }

    pub fn blobs(&self) -> &BlobsList<E> {
        match self {
            VersionedBlobsBundle::Classic(bundle) => &bundle.blobs,
            VersionedBlobsBundle::Cell(bundle) => &bundle.blobs,
        }
    }

    pub fn proofs(&self) -> &[KzgProof] {
        match self {
            VersionedBlobsBundle::Classic(bundle) => &*bundle.proofs,
            VersionedBlobsBundle::Cell(bundle) => &*bundle.proofs,
        }
    }

    pub fn number_of_blobs(&self) -> usize {
        self.blobs().len()
    }

    pub fn is_cell_bundle(&self) -> bool {
        matches!(self, VersionedBlobsBundle::Cell(_))
    }

    /// Returns `true` if the bundle has the proof form required at `fork_name`.
    pub fn matches_fork(&self, fork_name: ForkName) -> bool {
        fork_name.deneb_enabled() && self.is_cell_bundle() == fork_name.fulu_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type E = MinimalEthSpec;

    #[test]
    fn bundle_form_matches_fork() {
        let classic = VersionedBlobsBundle::<E>::Classic(BlobsBundle::default());
        let cell = VersionedBlobsBundle::<E>::Cell(BlobsCellBundle::default());

        assert!(!classic.matches_fork(ForkName::Capella));
        assert!(classic.matches_fork(ForkName::Deneb));
        assert!(classic.matches_fork(ForkName::Electra));
        assert!(!classic.matches_fork(ForkName::Fulu));
        assert!(cell.matches_fork(ForkName::Fulu));
        assert!(!cell.matches_fork(ForkName::Electra));
    }

    #[test]
    fn accessors_read_either_form() {
        let commitments =
            KzgCommitments::<E>::new(vec![KzgCommitment([1; 48]), KzgCommitment([2; 48])])
                .unwrap();
        let bundle = VersionedBlobsBundle::<E>::Classic(BlobsBundle {
            commitments: commitments.clone(),
            proofs: KzgProofs::<E>::new(vec![KzgProof::empty(); 2]).unwrap(),
            blobs: BlobsList::<E>::new(vec![Blob::<E>::default(), Blob::<E>::default()]).unwrap(),
        });
        assert_eq!(bundle.commitments(), &commitments);
        assert_eq!(bundle.number_of_blobs(), 2);
        assert_eq!(bundle.proofs().len(), 2);
    }
}
