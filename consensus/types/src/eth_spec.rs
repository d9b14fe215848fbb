use crate::*;

use serde::{Deserialize, Serialize};
use ssz_types::typenum::{
    U1048576, U1073741824, U131072, U16, U2, U256, U32, U4, U4096, U524288, U8, U8192,
};
use std::fmt::{self, Debug};
use std::str::FromStr;

const MAINNET: &str = "mainnet";
const MINIMAL: &str = "minimal";

/// Used to identify one of the `EthSpec` instances defined here.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EthSpecId {
    Mainnet,
    Minimal,
}

impl FromStr for EthSpecId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MAINNET => Ok(EthSpecId::Mainnet),
            MINIMAL => Ok(EthSpecId::Minimal),
            _ => Err(format!("Unknown eth spec: {}", s)),
        }
    }
}

impl fmt::Display for EthSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EthSpecId::Mainnet => MAINNET,
            EthSpecId::Minimal => MINIMAL,
        };
        write!(f, "{}", s)
    }
}

/// The compile-time list bounds used by execution payloads and blob bundles.
pub trait EthSpec: 'static + Default + Sync + Send + Clone + Debug + PartialEq + Eq {
    /*
     * Time parameters
     */
    type SlotsPerEpoch: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    /*
     * New in Bellatrix
     */
    type BytesPerLogsBloom: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    type MaxExtraDataBytes: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    type MaxBytesPerTransaction: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    type MaxTransactionsPerPayload: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    /*
     * New in Capella
     */
    type MaxWithdrawalsPerPayload: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    /*
     * New in Deneb
     */
    type MaxBlobCommitmentsPerBlock: Unsigned
        + Clone
        + Sync
        + Send
        + Debug
        + PartialEq
        + Eq
        + Default;
    type BytesPerBlob: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;
    /*
     * New in Electra
     */
    type MaxDepositRequestsPerPayload: Unsigned
        + Clone
        + Sync
        + Send
        + Debug
        + PartialEq
        + Eq
        + Default;
    type MaxWithdrawalRequestsPerPayload: Unsigned
        + Clone
        + Sync
        + Send
        + Debug
        + PartialEq
        + Eq
        + Default;
    type MaxConsolidationRequestsPerPayload: Unsigned
        + Clone
        + Sync
        + Send
        + Debug
        + PartialEq
        + Eq
        + Default;
    /*
     * New in Fulu
     */
    type MaxCellProofsPerBlock: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq + Default;

    fn spec_name() -> EthSpecId;

    /// Returns the `SLOTS_PER_EPOCH` constant for this preset.
    fn slots_per_epoch() -> u64 {
        Self::SlotsPerEpoch::to_u64()
    }

    /// Returns the `BYTES_PER_LOGS_BLOOM` constant for this preset.
    fn bytes_per_logs_bloom() -> usize {
        Self::BytesPerLogsBloom::to_usize()
    }

    /// Returns the `MAX_WITHDRAWALS_PER_PAYLOAD` constant for this preset.
    fn max_withdrawals_per_payload() -> usize {
        Self::MaxWithdrawalsPerPayload::to_usize()
    }

    /// Returns the `MAX_BLOB_COMMITMENTS_PER_BLOCK` constant for this preset.
    fn max_blob_commitments_per_block() -> usize {
        Self::MaxBlobCommitmentsPerBlock::to_usize()
    }

    fn bytes_per_blob() -> usize {
        Self::BytesPerBlob::to_usize()
    }

    fn max_cell_proofs_per_block() -> usize {
        Self::MaxCellProofsPerBlock::to_usize()
    }
}

/// Macro to inherit some type values from another EthSpec.
#[macro_export]
macro_rules! params_from_eth_spec {
    ($spec_ty:ty { $($ty_name:ident),+ }) => {
        $(type $ty_name = <$spec_ty as EthSpec>::$ty_name;)+
    }
}

/// Ethereum Foundation mainnet preset.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct MainnetEthSpec;

impl EthSpec for MainnetEthSpec {
    type SlotsPerEpoch = U32;
    type BytesPerLogsBloom = U256;
    type MaxExtraDataBytes = U32;
    type MaxBytesPerTransaction = U1073741824; // 1,073,741,824
    type MaxTransactionsPerPayload = U1048576; // 1,048,576
    type MaxWithdrawalsPerPayload = U16;
    type MaxBlobCommitmentsPerBlock = U4096;
    type BytesPerBlob = U131072;
    type MaxDepositRequestsPerPayload = U8192;
    type MaxWithdrawalRequestsPerPayload = U16;
    type MaxConsolidationRequestsPerPayload = U2;
    type MaxCellProofsPerBlock = U524288;

    fn spec_name() -> EthSpecId {
        EthSpecId::Mainnet
    }
}

/// Ethereum Foundation minimal preset, for fast tests.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct MinimalEthSpec;

impl EthSpec for MinimalEthSpec {
    type SlotsPerEpoch = U8;
    type MaxWithdrawalsPerPayload = U4;
    type MaxBlobCommitmentsPerBlock = U32;
    type MaxDepositRequestsPerPayload = U4;
    type MaxWithdrawalRequestsPerPayload = U2;
    type MaxCellProofsPerBlock = U4096;

    params_from_eth_spec!(MainnetEthSpec {
        BytesPerLogsBloom,
        MaxExtraDataBytes,
        MaxBytesPerTransaction,
        MaxTransactionsPerPayload,
        BytesPerBlob,
        MaxConsolidationRequestsPerPayload
    });

    fn spec_name() -> EthSpecId {
        EthSpecId::Minimal
    }
}
