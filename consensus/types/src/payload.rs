use crate::*;

/// An execution payload together with the blobs it commits to.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPayloadAndBlobs<E: EthSpec> {
    pub execution_payload: ExecutionPayload<E>,
    pub blobs_bundle: VersionedBlobsBundle<E>,
}

/// The full contents revealed when a blinded block is unblinded.
#[derive(Debug, Clone, PartialEq)]
pub enum FullPayloadContents<E: EthSpec> {
    Payload(ExecutionPayload<E>),
    PayloadAndBlobs(ExecutionPayloadAndBlobs<E>),
}

impl<E: EthSpec> FullPayloadContents<E> {
    pub fn payload_ref(&self) -> &ExecutionPayload<E> {
        match self {
            FullPayloadContents::Payload(payload) => payload,
            FullPayloadContents::PayloadAndBlobs(payload_and_blobs) => {
                &payload_and_blobs.execution_payload
            }
        }
    }

    pub fn blobs_bundle(&self) -> Option<&VersionedBlobsBundle<E>> {
        match self {
            FullPayloadContents::Payload(_) => None,
            FullPayloadContents::PayloadAndBlobs(payload_and_blobs) => {
                Some(&payload_and_blobs.blobs_bundle)
            }
        }
    }

    pub fn deconstruct(self) -> (ExecutionPayload<E>, Option<VersionedBlobsBundle<E>>) {
        match self {
            FullPayloadContents::Payload(payload) => (payload, None),
            FullPayloadContents::PayloadAndBlobs(payload_and_blobs) => (
                payload_and_blobs.execution_payload,
                Some(payload_and_blobs.blobs_bundle),
            ),
        }
    }
}
