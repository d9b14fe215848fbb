//! The builder side of the stub: bids on locally built payloads and reveals them again when a
//! blinded block referencing the bid is submitted.
use crate::engine_api::GetPayloadResponse;
use crate::Error;
use parking_lot::Mutex;
use slog::{debug, Logger};
use tree_hash::TreeHash;
use types::{
    BuilderBid, BuilderBidBellatrix, BuilderBidCapella, BuilderBidDeneb, BuilderBidElectra,
    BuilderBidFulu, EthSpec, ExecutionPayload, ExecutionPayloadAndBlobs, ForkName,
    FullPayloadContents, KzgCommitments, PublicKeyBytes, SignedBeaconBlock, VersionedBlobsBundle,
};

/// The payload behind the most recent bid, kept until a blinded block asks for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUnblind<E: EthSpec> {
    pub execution_payload: ExecutionPayload<E>,
    pub blobs_bundle: Option<VersionedBlobsBundle<E>>,
}

pub struct BuilderPayloadFlow<E: EthSpec> {
    /// Only the latest bid can be unblinded; each new bid replaces the previous record.
    pending_unblind: Mutex<Option<PendingUnblind<E>>>,
    log: Logger,
}

impl<E: EthSpec> BuilderPayloadFlow<E> {
    pub fn new(log: Logger) -> Self {
        Self {
            pending_unblind: Mutex::new(None),
            log,
        }
    }

    /// Wraps the header of a retrieved payload into a bid of the matching fork.
    pub fn build_bid(response: &GetPayloadResponse<E>) -> Result<BuilderBid<E>, Error> {
        let value = response.block_value;
        let pubkey = PublicKeyBytes::empty();
        let fork_name = response.fork_name();

        let bid = match &response.execution_payload {
            ExecutionPayload::Bellatrix(payload) => BuilderBid::Bellatrix(BuilderBidBellatrix {
                header: payload.into(),
                value,
                pubkey,
            }),
            ExecutionPayload::Capella(payload) => BuilderBid::Capella(BuilderBidCapella {
                header: payload.into(),
                value,
                pubkey,
            }),
            ExecutionPayload::Deneb(payload) => BuilderBid::Deneb(BuilderBidDeneb {
                header: payload.into(),
                blob_kzg_commitments: bid_commitments(response, fork_name)?,
                value,
                pubkey,
            }),
            ExecutionPayload::Electra(payload) => BuilderBid::Electra(BuilderBidElectra {
                header: payload.into(),
                blob_kzg_commitments: bid_commitments(response, fork_name)?,
                execution_requests: response.requests.clone().unwrap_or_default(),
                value,
                pubkey,
            }),
            ExecutionPayload::Fulu(payload) => BuilderBid::Fulu(BuilderBidFulu {
                header: payload.into(),
                blob_kzg_commitments: bid_commitments(response, fork_name)?,
                execution_requests: response.requests.clone().unwrap_or_default(),
                value,
                pubkey,
            }),
        };

        Ok(bid)
    }

    /// Stores the payload behind a bid, replacing any bid which was never unblinded.
    pub fn record_bid(
        &self,
        execution_payload: ExecutionPayload<E>,
        blobs_bundle: Option<VersionedBlobsBundle<E>>,
    ) {
        let replaced = self.pending_unblind.lock().replace(PendingUnblind {
            execution_payload,
            blobs_bundle,
        });
        if let Some(replaced) = replaced {
            debug!(
                self.log,
                "Replacing pending builder payload";
                "replaced_block_hash" => ?replaced.execution_payload.block_hash(),
            );
        }
    }

    pub fn pending_unblind(&self) -> Option<PendingUnblind<E>> {
        self.pending_unblind.lock().clone()
    }

    /// Reveals the payload for a blinded block built on the latest bid.
    ///
    /// The header in `block` must commit to exactly the pending payload and, from Deneb onwards,
    /// the block must declare as many commitments as the pending bundle has blobs.
    pub fn unblind(
        &self,
        fork_name: ForkName,
        block: &SignedBeaconBlock<E>,
    ) -> Result<FullPayloadContents<E>, Error> {
        if !fork_name.bellatrix_enabled() {
            return Err(Error::UnsupportedFork {
                operation: "builder_get_payload",
                fork_name,
            });
        }

        let header = block.execution_payload_header().ok_or(Error::NotBlinded)?;
        let pending = self
            .pending_unblind()
            .ok_or(Error::NoPendingBuilderPayload)?;

        let expected = pending.execution_payload.tree_hash_root();
        let found = header.tree_hash_root();
        if expected != found {
            return Err(Error::PayloadHeaderMismatch { expected, found });
        }

        match fork_name {
            ForkName::Base | ForkName::Altair => Err(Error::UnsupportedFork {
                operation: "builder_get_payload",
                fork_name,
            }),
            ForkName::Bellatrix | ForkName::Capella => {
                Ok(FullPayloadContents::Payload(pending.execution_payload))
            }
            ForkName::Deneb | ForkName::Electra | ForkName::Fulu => {
                let blobs_bundle = pending
                    .blobs_bundle
                    .filter(|bundle| bundle.matches_fork(fork_name))
                    .ok_or(Error::BlobsBundleMismatch { fork_name })?;

                let declared = block.blob_kzg_commitments().map_or(0, |c| c.len());
                if declared != blobs_bundle.number_of_blobs() {
                    return Err(Error::BlobCountMismatch {
                        expected: blobs_bundle.number_of_blobs(),
                        found: declared,
                    });
                }

                Ok(FullPayloadContents::PayloadAndBlobs(
                    ExecutionPayloadAndBlobs {
                        execution_payload: pending.execution_payload,
                        blobs_bundle,
                    },
                ))
            }
        }
    }
}

fn bid_commitments<E: EthSpec>(
    response: &GetPayloadResponse<E>,
    fork_name: ForkName,
) -> Result<KzgCommitments<E>, Error> {
    response
        .blobs_bundle
        .as_ref()
        .map(|bundle| bundle.commitments().clone())
        .ok_or(Error::BlobsBundleMismatch { fork_name })
}
