//! Emulates the proof-of-work chain up to and including the terminal block.
//!
//! When emulation is enabled the emulated chain consists of exactly two blocks: the terminal
//! block and its parent. Which of the two is reported as the chain head depends on whether the
//! transition time has passed. When emulation is disabled, proof-of-work blocks are served from
//! a registry populated by the caller.
use crate::Error;
use ethereum_hashing::hash_fixed;
use slog::{debug, info, Logger};
use slot_clock::SlotClock;
use std::collections::{HashMap, HashSet};
use types::{ChainSpec, Epoch, EthSpec, ExecutionBlockHash, Hash256, PowBlock};

/// The hash which identifies the parent of the emulated terminal block.
pub const TERMINAL_BLOCK_PARENT_HASH: ExecutionBlockHash = ExecutionBlockHash::zero();

/// The two proof-of-work blocks of the emulated chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalBlocks {
    pub terminal_block_parent: PowBlock,
    pub terminal_block: PowBlock,
    /// Seconds since the UNIX epoch at which the terminal block becomes the chain head.
    pub transition_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    /// No emulated chain exists yet.
    Inactive,
    /// The emulated chain exists but the terminal block has not been handed out.
    TerminalPending(TerminalBlocks),
    /// The terminal block has been handed out; produced payloads now extend it.
    TerminalSent(TerminalBlocks),
}

impl TransitionState {
    pub fn terminal_blocks(&self) -> Option<TerminalBlocks> {
        match self {
            TransitionState::Inactive => None,
            TransitionState::TerminalPending(blocks) | TransitionState::TerminalSent(blocks) => {
                Some(*blocks)
            }
        }
    }
}

pub struct TransitionEmulator {
    enabled: bool,
    state: TransitionState,
    last_produced_block: Option<PowBlock>,
    known_pow_blocks: HashMap<ExecutionBlockHash, PowBlock>,
    requested_pow_blocks: HashSet<ExecutionBlockHash>,
    log: Logger,
}

impl TransitionEmulator {
    pub fn new(enabled: bool, log: Logger) -> Self {
        Self {
            enabled,
            state: TransitionState::Inactive,
            last_produced_block: None,
            known_pow_blocks: HashMap::new(),
            requested_pow_blocks: HashSet::new(),
            log,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn last_produced_block(&self) -> Option<PowBlock> {
        self.last_produced_block
    }

    /// Builds the emulated chain if it does not exist yet and returns it.
    pub fn activate<E: EthSpec, T: SlotClock>(
        &mut self,
        spec: &ChainSpec,
        slot_clock: &T,
    ) -> Result<TerminalBlocks, Error> {
        if let Some(blocks) = self.state.terminal_blocks() {
            return Ok(blocks);
        }

        let transition_time = match spec.bellatrix_fork_epoch {
            Some(epoch) => Self::fork_start_time::<E, T>(epoch, slot_clock),
            None => slot_clock
                .now_duration()
                .ok_or(Error::UnableToReadSlotClock)?
                .as_secs(),
        };

        let terminal_block_hash = if spec.terminal_block_hash.is_zero() {
            ExecutionBlockHash::from_root(Hash256::from(hash_fixed(
                &transition_time.to_le_bytes(),
            )))
        } else {
            spec.terminal_block_hash
        };

        let blocks = TerminalBlocks {
            terminal_block_parent: PowBlock {
                block_hash: TERMINAL_BLOCK_PARENT_HASH,
                parent_hash: ExecutionBlockHash::zero(),
                timestamp: 0,
            },
            terminal_block: PowBlock {
                block_hash: terminal_block_hash,
                parent_hash: TERMINAL_BLOCK_PARENT_HASH,
                timestamp: transition_time,
            },
            transition_time,
        };

        info!(
            self.log,
            "Transition emulation activated";
            "terminal_block_hash" => ?terminal_block_hash,
            "transition_time" => transition_time,
        );
        self.state = TransitionState::TerminalPending(blocks);
        Ok(blocks)
    }

    /// Seconds since the UNIX epoch at which the fork at `epoch` starts.
    ///
    /// A fork at or before genesis starts at genesis. A fork too far out for the clock to place
    /// starts at `u64::MAX`, so it is never reached.
    fn fork_start_time<E: EthSpec, T: SlotClock>(epoch: Epoch, slot_clock: &T) -> u64 {
        let fork_slot = epoch.start_slot(E::slots_per_epoch());
        if fork_slot <= slot_clock.genesis_slot() {
            return slot_clock.genesis_duration().as_secs();
        }
        slot_clock
            .start_of(fork_slot)
            .map_or(u64::MAX, |start| start.as_secs())
    }

    /// Returns the proof-of-work block with the given hash.
    ///
    /// With emulation enabled only the two emulated blocks are known and any other hash is an
    /// error. Otherwise the registry is consulted and every requested hash is recorded.
    pub fn get_pow_block<E: EthSpec, T: SlotClock>(
        &mut self,
        block_hash: ExecutionBlockHash,
        spec: &ChainSpec,
        slot_clock: &T,
    ) -> Result<Option<PowBlock>, Error> {
        if !self.enabled {
            self.requested_pow_blocks.insert(block_hash);
            return Ok(self.known_pow_blocks.get(&block_hash).copied());
        }

        let blocks = self.activate::<E, T>(spec, slot_clock)?;

        if block_hash == TERMINAL_BLOCK_PARENT_HASH {
            return Ok(Some(blocks.terminal_block_parent));
        }
        if block_hash == blocks.terminal_block.block_hash {
            info!(
                self.log,
                "Handing out terminal block by hash";
                "block_hash" => ?block_hash,
            );
            self.state = TransitionState::TerminalSent(blocks);
            return Ok(Some(blocks.terminal_block));
        }

        Err(Error::UnknownPowBlock(block_hash))
    }

    /// Returns the head of the emulated proof-of-work chain.
    pub fn get_pow_chain_head<E: EthSpec, T: SlotClock>(
        &mut self,
        spec: &ChainSpec,
        slot_clock: &T,
    ) -> Result<PowBlock, Error> {
        if !self.enabled {
            return Err(Error::PowChainHeadUnsupported);
        }

        let blocks = self.activate::<E, T>(spec, slot_clock)?;

        if let TransitionState::TerminalSent(_) = self.state {
            return Ok(self.last_produced_block.unwrap_or(blocks.terminal_block));
        }

        let now = slot_clock
            .now_duration()
            .ok_or(Error::UnableToReadSlotClock)?
            .as_secs();
        if now >= blocks.transition_time {
            info!(
                self.log,
                "Terminal block reached by time";
                "block_hash" => ?blocks.terminal_block.block_hash,
            );
            self.state = TransitionState::TerminalSent(blocks);
            Ok(blocks.terminal_block)
        } else {
            Ok(blocks.terminal_block_parent)
        }
    }

    pub fn add_pow_block(&mut self, block: PowBlock) {
        debug!(self.log, "Registered PoW block"; "block_hash" => ?block.block_hash);
        self.known_pow_blocks.insert(block.block_hash, block);
    }

    pub fn requested_pow_blocks(&self) -> HashSet<ExecutionBlockHash> {
        self.requested_pow_blocks.clone()
    }

    /// Records a produced payload as the newest block of the emulated chain.
    pub fn on_payload_produced(&mut self, block: PowBlock) {
        self.last_produced_block = Some(block);
    }
}
