use crate::Error;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use superstruct::superstruct;
pub use types::{
    Address, Blob, EthSpec, ExecutionBlockHash, ExecutionPayload, ExecutionPayloadRef,
    ExecutionRequests, ForkName, Hash256, KzgProof, Uint256, VersionedBlobsBundle, VersionedHash,
    Withdrawal,
};

pub type PayloadId = [u8; 8];

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadStatusV1Status {
    Valid,
    Invalid,
    Syncing,
    Accepted,
    InvalidBlockHash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadStatusV1 {
    pub status: PayloadStatusV1Status,
    pub latest_valid_hash: Option<ExecutionBlockHash>,
    pub validation_error: Option<String>,
}

impl PayloadStatusV1 {
    pub fn valid() -> Self {
        Self::from_status(PayloadStatusV1Status::Valid)
    }

    pub fn from_status(status: PayloadStatusV1Status) -> Self {
        Self {
            status,
            latest_valid_hash: None,
            validation_error: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkchoiceState {
    pub head_block_hash: ExecutionBlockHash,
    pub safe_block_hash: ExecutionBlockHash,
    pub finalized_block_hash: ExecutionBlockHash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkchoiceUpdatedResponse {
    pub payload_status: PayloadStatusV1,
    #[serde(with = "optional_payload_id")]
    pub payload_id: Option<PayloadId>,
}

/// Serializes an optional `PayloadId` as `0x`-prefixed hex, or `null`.
mod optional_payload_id {
    use super::PayloadId;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        payload_id: &Option<PayloadId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        payload_id
            .map(serde_utils::hex::encode)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PayloadId>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|hex| {
                let bytes = serde_utils::hex::decode(&hex).map_err(D::Error::custom)?;
                PayloadId::try_from(bytes.as_slice()).map_err(|_| {
                    D::Error::custom(format!("payload id must be 8 bytes, got {}", bytes.len()))
                })
            })
            .transpose()
    }
}

#[superstruct(
    variants(V1, V2, V3),
    variant_attributes(derive(Clone, Debug, Eq, Hash, PartialEq),),
    cast_error(ty = "Error", expr = "Error::IncorrectStateVariant"),
    partial_getter_error(ty = "Error", expr = "Error::IncorrectStateVariant")
)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PayloadAttributes {
    #[superstruct(getter(copy))]
    pub timestamp: u64,
    #[superstruct(getter(copy))]
    pub prev_randao: Hash256,
    #[superstruct(getter(copy))]
    pub suggested_fee_recipient: Address,
    #[superstruct(only(V2, V3))]
    pub withdrawals: Vec<Withdrawal>,
    #[superstruct(only(V3), partial_getter(copy))]
    pub parent_beacon_block_root: Hash256,
}

impl PayloadAttributes {
    /// Builds the attribute version implied by the fields supplied: withdrawals select `V2`,
    /// withdrawals and a parent beacon block root select `V3`.
    ///
    /// A parent beacon block root without withdrawals fits no version and is rejected.
    pub fn new(
        timestamp: u64,
        prev_randao: Hash256,
        suggested_fee_recipient: Address,
        withdrawals: Option<Vec<Withdrawal>>,
        parent_beacon_block_root: Option<Hash256>,
    ) -> Result<Self, Error> {
        match (withdrawals, parent_beacon_block_root) {
            (Some(withdrawals), Some(parent_beacon_block_root)) => {
                Ok(Self::V3(PayloadAttributesV3 {
                    timestamp,
                    prev_randao,
                    suggested_fee_recipient,
                    withdrawals,
                    parent_beacon_block_root,
                }))
            }
            (Some(withdrawals), None) => Ok(Self::V2(PayloadAttributesV2 {
                timestamp,
                prev_randao,
                suggested_fee_recipient,
                withdrawals,
            })),
            (None, None) => Ok(Self::V1(PayloadAttributesV1 {
                timestamp,
                prev_randao,
                suggested_fee_recipient,
            })),
            (None, Some(_)) => Err(Error::InvalidPayloadAttributes(
                "parent_beacon_block_root requires withdrawals",
            )),
        }
    }

    /// The withdrawals to include in the payload, empty for `V1` attributes.
    pub fn withdrawals_or_empty(&self) -> Vec<Withdrawal> {
        self.withdrawals().map(Clone::clone).unwrap_or_default()
    }
}

/// The response to `engine_getPayload`, for every fork from Bellatrix onwards.
#[derive(Clone, Debug, PartialEq)]
pub struct GetPayloadResponse<E: EthSpec> {
    pub execution_payload: ExecutionPayload<E>,
    pub block_value: Uint256,
    /// Present from Deneb onwards.
    pub blobs_bundle: Option<VersionedBlobsBundle<E>>,
    pub should_override_builder: bool,
    /// Present from Electra onwards.
    pub requests: Option<ExecutionRequests<E>>,
}

impl<E: EthSpec> GetPayloadResponse<E> {
    pub fn fork_name(&self) -> ForkName {
        self.execution_payload.fork_name()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPayloadRequest<E: EthSpec> {
    pub execution_payload: ExecutionPayload<E>,
    pub versioned_hashes: Vec<VersionedHash>,
    pub parent_beacon_block_root: Option<Hash256>,
}

impl<E: EthSpec> NewPayloadRequest<E> {
    pub fn block_hash(&self) -> ExecutionBlockHash {
        self.execution_payload.block_hash()
    }
}

pub const STUB_CLIENT_CODE: &str = "SB";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientVersionV1 {
    pub code: String,
    pub name: String,
    pub version: String,
    pub commit: String,
}

impl ClientVersionV1 {
    /// The identity the stub reports for itself.
    pub fn stub() -> Self {
        Self {
            code: STUB_CLIENT_CODE.to_string(),
            name: "stub".to_string(),
            version: "0.0.0".to_string(),
            commit: "00000000".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlobAndProofV1<E: EthSpec> {
    pub blob: Blob<E>,
    pub proof: KzgProof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlobAndCellProofs<E: EthSpec> {
    pub blob: Blob<E>,
    pub proofs: Vec<KzgProof>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_attributes_version_follows_fields() {
        let v1 = PayloadAttributes::new(1, Hash256::zero(), Address::zero(), None, None).unwrap();
        assert!(matches!(v1, PayloadAttributes::V1(_)));
        assert!(v1.withdrawals_or_empty().is_empty());
        assert!(v1.parent_beacon_block_root().is_err());

        let withdrawal = Withdrawal {
            index: 1,
            validator_index: 2,
            address: Address::repeat_byte(3),
            amount: 4,
        };
        let v2 = PayloadAttributes::new(
            1,
            Hash256::zero(),
            Address::zero(),
            Some(vec![withdrawal.clone()]),
            None,
        )
        .unwrap();
        assert!(matches!(v2, PayloadAttributes::V2(_)));
        assert_eq!(v2.withdrawals_or_empty(), vec![withdrawal]);

        let v3 = PayloadAttributes::new(
            1,
            Hash256::zero(),
            Address::zero(),
            Some(vec![]),
            Some(Hash256::repeat_byte(9)),
        )
        .unwrap();
        assert_eq!(
            v3.parent_beacon_block_root().ok(),
            Some(Hash256::repeat_byte(9))
        );
    }

    #[test]
    fn parent_root_without_withdrawals_is_rejected() {
        let result = PayloadAttributes::new(
            1,
            Hash256::zero(),
            Address::zero(),
            None,
            Some(Hash256::repeat_byte(9)),
        );
        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidPayloadAttributes(_)));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn forkchoice_response_json() {
        let response = ForkchoiceUpdatedResponse {
            payload_status: PayloadStatusV1 {
                status: PayloadStatusV1Status::InvalidBlockHash,
                latest_valid_hash: Some(ExecutionBlockHash::zero()),
                validation_error: None,
            },
            payload_id: Some(1u64.to_be_bytes()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "payloadStatus": {
                    "status": "INVALID_BLOCK_HASH",
                    "latestValidHash": format!("0x{}", "00".repeat(32)),
                    "validationError": null,
                },
                "payloadId": "0x0000000000000001",
            })
        );
        assert_eq!(
            serde_json::from_value::<ForkchoiceUpdatedResponse>(json).unwrap(),
            response
        );

        let without_id = ForkchoiceUpdatedResponse {
            payload_status: PayloadStatusV1::valid(),
            payload_id: None,
        };
        let json = serde_json::to_value(&without_id).unwrap();
        assert_eq!(json["payloadId"], serde_json::Value::Null);
        assert!(serde_json::from_str::<ForkchoiceUpdatedResponse>(
            r#"{"payloadStatus":{"status":"VALID","latestValidHash":null,"validationError":null},"payloadId":"0x01"}"#
        )
        .is_err());
    }

    #[test]
    fn client_version_json() {
        let json = serde_json::to_value(ClientVersionV1::stub()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "SB",
                "name": "stub",
                "version": "0.0.0",
                "commit": "00000000",
            })
        );
    }

    #[test]
    fn status_names_are_snake_case() {
        let name: &'static str = PayloadStatusV1Status::InvalidBlockHash.into();
        assert_eq!(name, "invalid_block_hash");
        assert_eq!(PayloadStatusV1::valid().status, PayloadStatusV1Status::Valid);
    }
}
