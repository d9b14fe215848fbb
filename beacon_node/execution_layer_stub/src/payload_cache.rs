use crate::engine_api::{PayloadAttributes, PayloadId};
use crate::Error;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use types::{EthSpec, ExecutionBlockHash, ExecutionPayload, VersionedBlobsBundle};

/// A payload and the blobs it commits to, as produced for a cached build request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducedPayload<E: EthSpec> {
    pub execution_payload: ExecutionPayload<E>,
    pub blobs_bundle: Option<VersionedBlobsBundle<E>>,
}

/// A payload build request remembered between `forkchoiceUpdated` and `getPayload`.
#[derive(Debug)]
pub struct CachedPayloadRequest<E: EthSpec> {
    head_block_hash: ExecutionBlockHash,
    attributes: PayloadAttributes,
    produced: Mutex<Option<ProducedPayload<E>>>,
}

impl<E: EthSpec> CachedPayloadRequest<E> {
    pub fn new(head_block_hash: ExecutionBlockHash, attributes: PayloadAttributes) -> Self {
        Self {
            head_block_hash,
            attributes,
            produced: Mutex::new(None),
        }
    }

    pub fn head_block_hash(&self) -> ExecutionBlockHash {
        self.head_block_hash
    }

    pub fn attributes(&self) -> &PayloadAttributes {
        &self.attributes
    }

    pub fn produced(&self) -> Option<ProducedPayload<E>> {
        self.produced.lock().clone()
    }

    /// Returns the payload produced for this request, calling `produce` only if none exists.
    ///
    /// The entry lock is held while producing, so concurrent callers observe a single payload.
    pub fn get_or_produce<F>(&self, produce: F) -> Result<ProducedPayload<E>, Error>
    where
        F: FnOnce(&Self) -> Result<ProducedPayload<E>, Error>,
    {
        let mut produced = self.produced.lock();
        if let Some(existing) = produced.as_ref() {
            return Ok(existing.clone());
        }
        let fresh = produce(self)?;
        *produced = Some(fresh.clone());
        Ok(fresh)
    }
}

/// A bounded cache mapping payload ids to build requests, evicting the least recently used.
pub struct PayloadAttributesCache<E: EthSpec> {
    requests: Mutex<LruCache<PayloadId, Arc<CachedPayloadRequest<E>>>>,
}

impl<E: EthSpec> PayloadAttributesCache<E> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            requests: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Inserts a request, returning the id of any entry evicted to make room.
    pub fn insert(
        &self,
        payload_id: PayloadId,
        head_block_hash: ExecutionBlockHash,
        attributes: PayloadAttributes,
    ) -> Option<PayloadId> {
        let request = Arc::new(CachedPayloadRequest::new(head_block_hash, attributes));
        self.requests
            .lock()
            .push(payload_id, request)
            .and_then(|(evicted_id, _)| (evicted_id != payload_id).then_some(evicted_id))
    }

    /// Returns the request for `payload_id` and marks it as most recently used.
    pub fn get(&self, payload_id: &PayloadId) -> Result<Arc<CachedPayloadRequest<E>>, Error> {
        self.requests
            .lock()
            .get(payload_id)
            .cloned()
            .ok_or(Error::PayloadIdNotFound(*payload_id))
    }

    pub fn contains(&self, payload_id: &PayloadId) -> bool {
        self.requests.lock().contains(payload_id)
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use types::{Address, ExecutionPayloadBellatrix, Hash256, MainnetEthSpec};

    type E = MainnetEthSpec;

    fn id(n: u64) -> PayloadId {
        n.to_be_bytes()
    }

    fn attributes(timestamp: u64) -> PayloadAttributes {
        PayloadAttributes::new(timestamp, Hash256::zero(), Address::zero(), None, None).unwrap()
    }

    fn cache(capacity: usize) -> PayloadAttributesCache<E> {
        PayloadAttributesCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = cache(2);
        assert_eq!(cache.insert(id(1), ExecutionBlockHash::zero(), attributes(1)), None);
        assert_eq!(cache.insert(id(2), ExecutionBlockHash::zero(), attributes(2)), None);

        // Touch the first entry so the second becomes the eviction candidate.
        cache.get(&id(1)).unwrap();
        assert_eq!(
            cache.insert(id(3), ExecutionBlockHash::zero(), attributes(3)),
            Some(id(2))
        );

        assert!(cache.contains(&id(1)));
        assert!(matches!(
            cache.get(&id(2)),
            Err(Error::PayloadIdNotFound(missing)) if missing == id(2)
        ));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entry_remembers_request() {
        let cache = cache(1);
        let head = ExecutionBlockHash::repeat_byte(4);
        cache.insert(id(7), head, attributes(99));

        let request = cache.get(&id(7)).unwrap();
        assert_eq!(request.head_block_hash(), head);
        assert_eq!(request.attributes().timestamp(), 99);
        assert!(request.produced().is_none());
    }

    #[test]
    fn first_production_wins() {
        let request = CachedPayloadRequest::<E>::new(ExecutionBlockHash::zero(), attributes(1));
        let produce = |block_number: u64| {
            move |_: &CachedPayloadRequest<E>| {
                Ok(ProducedPayload {
                    execution_payload: ExecutionPayload::Bellatrix(ExecutionPayloadBellatrix {
                        block_number,
                        ..Default::default()
                    }),
                    blobs_bundle: None,
                })
            }
        };

        let first = request.get_or_produce(produce(1)).unwrap();
        let second = request.get_or_produce(produce(2)).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.execution_payload.block_number(), 1);
    }

    #[test]
    fn racing_producers_run_once() {
        let request = CachedPayloadRequest::<E>::new(ExecutionBlockHash::zero(), attributes(1));
        let runs = AtomicU64::new(0);

        let results = std::thread::scope(|s| {
            let handles = (0..8u64)
                .map(|block_number| {
                    let request = &request;
                    let runs = &runs;
                    s.spawn(move || {
                        request
                            .get_or_produce(|_| {
                                runs.fetch_add(1, Ordering::SeqCst);
                                Ok(ProducedPayload {
                                    execution_payload: ExecutionPayload::Bellatrix(
                                        ExecutionPayloadBellatrix {
                                            block_number,
                                            ..Default::default()
                                        },
                                    ),
                                    blobs_bundle: None,
                                })
                            })
                            .unwrap()
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|result| *result == results[0]));
        assert_eq!(request.produced(), Some(results[0].clone()));
    }

    #[test]
    fn failed_production_leaves_entry_empty() {
        let request = CachedPayloadRequest::<E>::new(ExecutionBlockHash::zero(), attributes(1));
        let result = request.get_or_produce(|_| Err(Error::Offline));
        assert!(matches!(result, Err(Error::Offline)));
        assert!(request.produced().is_none());
    }
}
