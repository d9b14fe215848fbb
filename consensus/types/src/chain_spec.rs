use crate::*;
use std::time::Duration;

/// Holds all the "constants" for a BeaconChain that matter to execution payload production.
#[derive(PartialEq, Debug, Clone)]
pub struct ChainSpec {
    /*
     * Config name
     */
    pub config_name: Option<String>,

    /*
     * Time parameters
     */
    pub seconds_per_slot: u64,

    /*
     * Fork schedule
     */
    pub altair_fork_epoch: Option<Epoch>,
    pub bellatrix_fork_epoch: Option<Epoch>,
    pub capella_fork_epoch: Option<Epoch>,
    pub deneb_fork_epoch: Option<Epoch>,
    pub electra_fork_epoch: Option<Epoch>,
    pub fulu_fork_epoch: Option<Epoch>,

    /*
     * Bellatrix transition
     */
    pub terminal_total_difficulty: Uint256,
    pub terminal_block_hash: ExecutionBlockHash,
    pub terminal_block_hash_activation_epoch: Epoch,

    /*
     * Blob limits
     */
    pub max_blobs_per_block: u64,
    pub max_blobs_per_block_electra: u64,
    pub max_blobs_per_block_fulu: u64,
}

impl ChainSpec {
    /// Returns the name of the fork which is active at `slot`.
    pub fn fork_name_at_slot<E: EthSpec>(&self, slot: Slot) -> ForkName {
        self.fork_name_at_epoch(slot.epoch(E::slots_per_epoch()))
    }

    /// Returns the name of the fork which is active at `epoch`.
    pub fn fork_name_at_epoch(&self, epoch: Epoch) -> ForkName {
        ForkName::list_all()
            .into_iter()
            .rev()
            .find(|fork| {
                self.fork_epoch(*fork)
                    .map_or(false, |fork_epoch| epoch >= fork_epoch)
            })
            .unwrap_or(ForkName::Base)
    }

    /// Returns the epoch at which `fork_name` activates, if it is scheduled.
    pub fn fork_epoch(&self, fork_name: ForkName) -> Option<Epoch> {
        match fork_name {
            ForkName::Base => Some(Epoch::new(0)),
            ForkName::Altair => self.altair_fork_epoch,
            ForkName::Bellatrix => self.bellatrix_fork_epoch,
            ForkName::Capella => self.capella_fork_epoch,
            ForkName::Deneb => self.deneb_fork_epoch,
            ForkName::Electra => self.electra_fork_epoch,
            ForkName::Fulu => self.fulu_fork_epoch,
        }
    }

    /// The maximum number of blobs a block may commit to under `fork_name`. Zero prior to Deneb.
    pub fn max_blobs_per_block(&self, fork_name: ForkName) -> u64 {
        match fork_name {
            ForkName::Base | ForkName::Altair | ForkName::Bellatrix | ForkName::Capella => 0,
            ForkName::Deneb => self.max_blobs_per_block,
            ForkName::Electra => self.max_blobs_per_block_electra,
            ForkName::Fulu => self.max_blobs_per_block_fulu,
        }
    }

    pub fn max_blobs_per_block_at_slot<E: EthSpec>(&self, slot: Slot) -> u64 {
        self.max_blobs_per_block(self.fork_name_at_slot::<E>(slot))
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::from_secs(self.seconds_per_slot)
    }

    /// Returns a `ChainSpec` matching the Ethereum Foundation mainnet configuration.
    pub fn mainnet() -> Self {
        Self {
            config_name: Some("mainnet".to_string()),
            seconds_per_slot: 12,
            altair_fork_epoch: Some(Epoch::new(74240)),
            bellatrix_fork_epoch: Some(Epoch::new(144896)),
            capella_fork_epoch: Some(Epoch::new(194048)),
            deneb_fork_epoch: Some(Epoch::new(269568)),
            electra_fork_epoch: Some(Epoch::new(364032)),
            fulu_fork_epoch: Some(Epoch::new(411392)),
            terminal_total_difficulty: Uint256::from_dec_str("58750000000000000000000")
                .unwrap_or_else(|_| Uint256::max_value()),
            terminal_block_hash: ExecutionBlockHash::zero(),
            terminal_block_hash_activation_epoch: Epoch::max_value(),
            max_blobs_per_block: 6,
            max_blobs_per_block_electra: 9,
            max_blobs_per_block_fulu: 9,
        }
    }

    /// Ethereum Foundation minimal spec, as defined in the eth2.0-specs repo.
    ///
    /// No fork after `Base` is scheduled.
    pub fn minimal() -> Self {
        Self {
            config_name: Some("minimal".to_string()),
            seconds_per_slot: 6,
            altair_fork_epoch: None,
            bellatrix_fork_epoch: None,
            capella_fork_epoch: None,
            deneb_fork_epoch: None,
            electra_fork_epoch: None,
            fulu_fork_epoch: None,
            terminal_total_difficulty: Uint256::max_value()
                .checked_sub(Uint256::from(2u64.pow(10)))
                .unwrap_or_else(Uint256::max_value),
            ..ChainSpec::mainnet()
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}
