//! An in-process stand-in for an execution client and a block builder.
//!
//! `ExecutionLayerStub` answers the engine API and builder API calls a consensus client makes
//! with synthetic payloads. It remembers enough about what it has handed out to check that later
//! calls are consistent with it, which makes it suitable for driving consensus-side tests without
//! a real execution client.
use crate::blobs::BlobBundleGenerator;
use crate::builder::{BuilderPayloadFlow, PendingUnblind};
use crate::payload_builder::{block_value, execution_requests, produce_payload};
use crate::payload_cache::{PayloadAttributesCache, ProducedPayload};
use crate::transition::{TransitionEmulator, TransitionState};
use crate::versioned_hashes::verify_versioned_hashes;
use kzg::KzgBackend;
use parking_lot::{Mutex, RwLock};
use slog::{debug, info, warn, Logger};
use slot_clock::SlotClock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use strum::IntoStaticStr;
use types::{
    BuilderBid, ChainSpec, EthSpec, ExecutionBlockHash, ForkName, FullPayloadContents, Hash256,
    PowBlock, SignedBeaconBlock, SignedValidatorRegistrationData, Slot, VersionedHash,
};

pub use crate::config::Config;
pub use crate::engine_api::{
    BlobAndCellProofs, BlobAndProofV1, ClientVersionV1, ForkchoiceState,
    ForkchoiceUpdatedResponse, GetPayloadResponse, NewPayloadRequest, PayloadAttributes,
    PayloadId, PayloadStatusV1, PayloadStatusV1Status,
};

pub mod blobs;
pub mod builder;
pub mod config;
pub mod engine_api;
pub mod payload_builder;
pub mod payload_cache;
pub mod test_utils;
pub mod transition;
pub mod versioned_hashes;

#[derive(Debug)]
pub enum Error {
    /// The stub has been taken offline with `set_online(false)`.
    Offline,
    UnsupportedFork {
        operation: &'static str,
        fork_name: ForkName,
    },
    UnknownPowBlock(ExecutionBlockHash),
    PowChainHeadUnsupported,
    PayloadIdNotFound(PayloadId),
    NoPendingBuilderPayload,
    NotBlinded,
    PayloadHeaderMismatch {
        expected: Hash256,
        found: Hash256,
    },
    BlobCountMismatch {
        expected: usize,
        found: usize,
    },
    BlobsBundleMismatch {
        fork_name: ForkName,
    },
    UnableToReadSlotClock,
    InvalidConfig(String),
    InvalidPayloadAttributes(&'static str),
    IncorrectStateVariant,
    Kzg(kzg::Error),
    SszTypes(ssz_types::Error),
    VersionedHashes(versioned_hashes::Error),
}

/// The broad category of an `Error`, as a caller would see it from a real execution client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ServiceUnavailable,
    UnsupportedOperation,
    NotFound,
    Consistency,
    InvalidArgument,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Offline => ErrorKind::ServiceUnavailable,
            Error::UnsupportedFork { .. }
            | Error::UnknownPowBlock(_)
            | Error::PowChainHeadUnsupported => ErrorKind::UnsupportedOperation,
            Error::PayloadIdNotFound(_) | Error::NoPendingBuilderPayload => ErrorKind::NotFound,
            Error::PayloadHeaderMismatch { .. }
            | Error::BlobCountMismatch { .. }
            | Error::BlobsBundleMismatch { .. } => ErrorKind::Consistency,
            Error::NotBlinded | Error::InvalidConfig(_) | Error::InvalidPayloadAttributes(_) => {
                ErrorKind::InvalidArgument
            }
            Error::UnableToReadSlotClock
            | Error::IncorrectStateVariant
            | Error::Kzg(_)
            | Error::SszTypes(_)
            | Error::VersionedHashes(_) => ErrorKind::Internal,
        }
    }
}

impl From<kzg::Error> for Error {
    fn from(e: kzg::Error) -> Self {
        Error::Kzg(e)
    }
}

impl From<ssz_types::Error> for Error {
    fn from(e: ssz_types::Error) -> Self {
        Error::SszTypes(e)
    }
}

impl From<versioned_hashes::Error> for Error {
    fn from(e: versioned_hashes::Error) -> Self {
        Error::VersionedHashes(e)
    }
}

struct Inner<E: EthSpec, T: SlotClock> {
    spec: Arc<ChainSpec>,
    slot_clock: T,
    /// The last payload id handed out. Produced payloads take it as their block number.
    payload_id_counter: AtomicU64,
    payload_cache: PayloadAttributesCache<E>,
    blob_generator: BlobBundleGenerator<E>,
    builder: BuilderPayloadFlow<E>,
    transition: Mutex<TransitionEmulator>,
    default_payload_status: RwLock<PayloadStatusV1>,
    payload_statuses: RwLock<HashMap<ExecutionBlockHash, PayloadStatusV1>>,
    online: AtomicBool,
    log: Logger,
}

/// Serves engine and builder API calls from synthetic state.
///
/// Clones share the same state.
pub struct ExecutionLayerStub<E: EthSpec, T: SlotClock> {
    inner: Arc<Inner<E, T>>,
}

impl<E: EthSpec, T: SlotClock> Clone for ExecutionLayerStub<E, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: EthSpec, T: SlotClock> ExecutionLayerStub<E, T> {
    pub fn new(
        config: Config,
        spec: Arc<ChainSpec>,
        slot_clock: T,
        kzg: Arc<dyn KzgBackend>,
        log: Logger,
    ) -> Result<Self, Error> {
        let payload_cache = PayloadAttributesCache::new(config.payload_cache_size()?);

        info!(
            log,
            "Execution layer stub started";
            "transition_emulation" => config.transition_emulation,
            "payload_cache_size" => config.payload_cache_size,
            "blobs_to_generate" => ?config.blobs_to_generate,
        );

        let inner = Inner {
            spec,
            slot_clock,
            payload_id_counter: AtomicU64::new(0),
            payload_cache,
            blob_generator: BlobBundleGenerator::new(
                kzg,
                config.blobs_to_generate,
                log.clone(),
            ),
            builder: BuilderPayloadFlow::new(log.clone()),
            transition: Mutex::new(TransitionEmulator::new(
                config.transition_emulation,
                log.clone(),
            )),
            default_payload_status: RwLock::new(PayloadStatusV1::valid()),
            payload_statuses: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            log,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn spec(&self) -> &ChainSpec {
        &self.inner.spec
    }

    pub fn slot_clock(&self) -> &T {
        &self.inner.slot_clock
    }

    fn log(&self) -> &Logger {
        &self.inner.log
    }

    fn check_online(&self) -> Result<(), Error> {
        if self.inner.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Offline)
        }
    }

    fn fork_with_payloads(&self, operation: &'static str, slot: Slot) -> Result<ForkName, Error> {
        let fork_name = self.inner.spec.fork_name_at_slot::<E>(slot);
        if fork_name.bellatrix_enabled() {
            Ok(fork_name)
        } else {
            Err(Error::UnsupportedFork {
                operation,
                fork_name,
            })
        }
    }

    fn next_payload_id(&self) -> PayloadId {
        let id = self
            .inner
            .payload_id_counter
            .fetch_add(1, Ordering::SeqCst)
            .wrapping_add(1);
        id.to_be_bytes()
    }

    /// Handles `engine_forkchoiceUpdated`.
    ///
    /// A payload id is only returned, and a build request only cached, when `payload_attributes`
    /// are supplied.
    pub fn notify_forkchoice_updated(
        &self,
        forkchoice_state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<ForkchoiceUpdatedResponse, Error> {
        self.check_online()?;

        {
            let mut transition = self.inner.transition.lock();
            if transition.is_enabled() {
                transition.activate::<E, T>(&self.inner.spec, &self.inner.slot_clock)?;
            }
        }

        let head_block_hash = forkchoice_state.head_block_hash;
        let payload_id = payload_attributes.map(|attributes| {
            let payload_id = self.next_payload_id();
            let timestamp = attributes.timestamp();
            if let Some(evicted) =
                self.inner
                    .payload_cache
                    .insert(payload_id, head_block_hash, attributes)
            {
                debug!(
                    self.log(),
                    "Evicted payload build request";
                    "payload_id" => ?evicted,
                );
            }
            info!(
                self.log(),
                "Payload build requested";
                "payload_id" => ?payload_id,
                "head_block_hash" => ?head_block_hash,
                "timestamp" => timestamp,
            );
            payload_id
        });

        Ok(ForkchoiceUpdatedResponse {
            payload_status: PayloadStatusV1::valid(),
            payload_id,
        })
    }

    /// Returns the payload cached under `payload_id`, producing it on first use.
    ///
    /// The transition lock is taken while the entry lock is held. Nothing takes them in the
    /// opposite order.
    fn produce(
        &self,
        payload_id: &PayloadId,
        fork_name: ForkName,
    ) -> Result<ProducedPayload<E>, Error> {
        let request = self.inner.payload_cache.get(payload_id)?;
        let max_blobs = self.inner.spec.max_blobs_per_block(fork_name) as usize;

        request.get_or_produce(|request| {
            let block_number = self.inner.payload_id_counter.load(Ordering::SeqCst);
            let produced = produce_payload(
                fork_name,
                request,
                block_number,
                &self.inner.blob_generator,
                max_blobs,
            )?;
            debug!(
                self.log(),
                "Produced payload";
                "payload_id" => ?payload_id,
                "fork" => %fork_name,
                "block_number" => block_number,
                "block_hash" => ?produced.execution_payload.block_hash(),
            );
            // Only a fresh payload extends the emulated chain; re-reads leave the head alone.
            self.inner
                .transition
                .lock()
                .on_payload_produced(produced.execution_payload.to_pow_block());
            Ok(produced)
        })
    }

    /// Handles `engine_getPayload`.
    pub fn get_payload(
        &self,
        payload_id: &PayloadId,
        slot: Slot,
    ) -> Result<GetPayloadResponse<E>, Error> {
        self.check_online()?;
        let fork_name = self.fork_with_payloads("get_payload", slot)?;

        let produced = self.produce(payload_id, fork_name)?;
        let block_value = block_value(&produced);

        info!(
            self.log(),
            "Payload retrieved";
            "payload_id" => ?payload_id,
            "slot" => %slot,
            "block_hash" => ?produced.execution_payload.block_hash(),
            "blobs" => produced.blobs_bundle.as_ref().map_or(0, |b| b.number_of_blobs()),
        );

        Ok(GetPayloadResponse {
            execution_payload: produced.execution_payload,
            block_value,
            blobs_bundle: produced.blobs_bundle,
            should_override_builder: false,
            requests: execution_requests(fork_name),
        })
    }

    /// Handles `engine_newPayload`, answering with the status forced for the payload's block hash
    /// or, failing that, the default status.
    pub fn new_payload(
        &self,
        request: NewPayloadRequest<E>,
        slot: Slot,
    ) -> Result<PayloadStatusV1, Error> {
        self.check_online()?;

        let block_hash = request.block_hash();
        if let Err(e) = verify_versioned_hashes(
            request.execution_payload.to_ref(),
            &request.versioned_hashes,
        ) {
            warn!(
                self.log(),
                "Versioned hashes do not match payload";
                "block_hash" => ?block_hash,
                "error" => ?e,
            );
        }

        let status = self
            .inner
            .payload_statuses
            .read()
            .get(&block_hash)
            .cloned()
            .unwrap_or_else(|| self.inner.default_payload_status.read().clone());

        info!(
            self.log(),
            "Processed new payload";
            "slot" => %slot,
            "block_hash" => ?block_hash,
            "parent_beacon_block_root" => ?request.parent_beacon_block_root,
            "status" => <&'static str>::from(status.status),
        );

        Ok(status)
    }

    pub fn get_pow_block(&self, block_hash: ExecutionBlockHash) -> Result<Option<PowBlock>, Error> {
        self.check_online()?;
        self.inner.transition.lock().get_pow_block::<E, T>(
            block_hash,
            &self.inner.spec,
            &self.inner.slot_clock,
        )
    }

    pub fn get_pow_chain_head(&self) -> Result<PowBlock, Error> {
        self.check_online()?;
        self.inner
            .transition
            .lock()
            .get_pow_chain_head::<E, T>(&self.inner.spec, &self.inner.slot_clock)
    }

    /// Handles `engine_getClientVersionV1`.
    pub fn get_client_version(
        &self,
        caller: ClientVersionV1,
    ) -> Result<Vec<ClientVersionV1>, Error> {
        self.check_online()?;
        debug!(
            self.log(),
            "Client version requested";
            "caller_code" => %caller.code,
            "caller_name" => %caller.name,
        );
        Ok(vec![ClientVersionV1::stub()])
    }

    /// Handles `engine_getBlobsV1`. The stub keeps no blob pool, so nothing is ever found.
    pub fn get_blobs(
        &self,
        versioned_hashes: &[VersionedHash],
        slot: Slot,
    ) -> Result<Vec<Option<BlobAndProofV1<E>>>, Error> {
        self.check_online()?;
        debug!(
            self.log(),
            "Blobs requested";
            "slot" => %slot,
            "count" => versioned_hashes.len(),
        );
        Ok(versioned_hashes.iter().map(|_| None).collect())
    }

    /// Handles `engine_getBlobsV2`. As with `get_blobs`, nothing is ever found.
    pub fn get_blobs_and_cell_proofs(
        &self,
        versioned_hashes: &[VersionedHash],
        slot: Slot,
    ) -> Result<Vec<Option<BlobAndCellProofs<E>>>, Error> {
        self.check_online()?;
        debug!(
            self.log(),
            "Blobs with cell proofs requested";
            "slot" => %slot,
            "count" => versioned_hashes.len(),
        );
        Ok(versioned_hashes.iter().map(|_| None).collect())
    }

    /// Accepts validator registrations without acting on them.
    pub fn register_validators(
        &self,
        registrations: &[SignedValidatorRegistrationData],
        slot: Slot,
    ) -> Result<(), Error> {
        self.check_online()?;
        debug!(
            self.log(),
            "Validator registrations received";
            "slot" => %slot,
            "count" => registrations.len(),
        );
        Ok(())
    }

    /// Bids on the payload for `payload_id` and remembers it for a later `builder_get_payload`.
    pub fn builder_get_header(
        &self,
        payload_id: &PayloadId,
        slot: Slot,
        builder_boost_factor: Option<u64>,
    ) -> Result<BuilderBid<E>, Error> {
        let response = self.get_payload(payload_id, slot)?;
        let bid = BuilderPayloadFlow::build_bid(&response)?;

        info!(
            self.log(),
            "Builder bid issued";
            "payload_id" => ?payload_id,
            "slot" => %slot,
            "value" => %bid.value(),
            "builder_boost_factor" => ?builder_boost_factor,
        );

        self.inner
            .builder
            .record_bid(response.execution_payload, response.blobs_bundle);
        Ok(bid)
    }

    /// Reveals the payload behind the latest bid for a blinded block which commits to it.
    pub fn builder_get_payload(
        &self,
        signed_blinded_block: &SignedBeaconBlock<E>,
    ) -> Result<FullPayloadContents<E>, Error> {
        self.check_online()?;
        let fork_name = signed_blinded_block.fork_name(&self.inner.spec);
        let contents = self.inner.builder.unblind(fork_name, signed_blinded_block)?;

        info!(
            self.log(),
            "Blinded block unblinded";
            "slot" => %signed_blinded_block.slot(),
            "block_hash" => ?contents.payload_ref().block_hash(),
        );

        Ok(contents)
    }

    /*
     * Test controls
     */

    /// Sets the status `new_payload` returns for blocks without a forced status.
    pub fn set_payload_status(&self, status: PayloadStatusV1) {
        *self.inner.default_payload_status.write() = status;
    }

    /// Forces the status `new_payload` returns for `block_hash`.
    pub fn add_pos_block(&self, block_hash: ExecutionBlockHash, status: PayloadStatusV1) {
        self.inner.payload_statuses.write().insert(block_hash, status);
    }

    pub fn set_blobs_to_generate(&self, blobs_to_generate: Option<usize>) {
        self.inner.blob_generator.set_blobs_to_generate(blobs_to_generate);
    }

    pub fn set_online(&self, online: bool) {
        info!(self.log(), "Execution layer stub availability changed"; "online" => online);
        self.inner.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    pub fn add_pow_block(&self, block: PowBlock) {
        self.inner.transition.lock().add_pow_block(block);
    }

    /// The hashes `get_pow_block` has been asked for while transition emulation was disabled.
    pub fn requested_pow_blocks(&self) -> HashSet<ExecutionBlockHash> {
        self.inner.transition.lock().requested_pow_blocks()
    }

    pub fn set_transition_emulation(&self, enabled: bool) {
        self.inner.transition.lock().set_enabled(enabled);
    }

    pub fn transition_state(&self) -> TransitionState {
        self.inner.transition.lock().state()
    }

    pub fn pending_builder_payload(&self) -> Option<PendingUnblind<E>> {
        self.inner.builder.pending_unblind()
    }

    pub fn payload_cache_len(&self) -> usize {
        self.inner.payload_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(Error::Offline.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(
            Error::PayloadIdNotFound([0; 8]).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::NotBlinded.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            Error::BlobCountMismatch {
                expected: 1,
                found: 2
            }
            .kind(),
            ErrorKind::Consistency
        );
        assert_eq!(
            Error::Kzg(kzg::Error::KzgVerificationFailed).kind(),
            ErrorKind::Internal
        );
        let name: &'static str = ErrorKind::ServiceUnavailable.into();
        assert_eq!(name, "service_unavailable");
    }
}
