use log::{info, warn};

use super::{Block, Difficulty, GENESIS_PREVIOUS_HASH, HashSealer, PendingBlock};
use crate::error::{LedgerError, Result};
use crate::transaction::{ContractPipeline, Transaction};

/// Append-only, in-memory chain of sealed blocks.
///
/// Single writer: callers sharing a ledger must serialize
/// `build_next_block`/`append_block` pairs themselves. `append_block`
/// re-checks linkage so a lost update is reported instead of stored.
#[derive(Debug)]
pub struct Ledger {
    blocks: Vec<Block>,
    pipeline: ContractPipeline,
    sealer: HashSealer,
}

impl Ledger {
    /// A ledger without a genesis block. Call [`Ledger::initialize`] before use.
    pub fn empty(pipeline: ContractPipeline, sealer: HashSealer) -> Self {
        Self {
            blocks: Vec::new(),
            pipeline,
            sealer,
        }
    }

    /// Seal `genesis` and start a chain with it.
    pub fn new(
        genesis: PendingBlock,
        pipeline: ContractPipeline,
        sealer: HashSealer,
    ) -> Result<Self> {
        let mut ledger = Self::empty(pipeline, sealer);
        ledger.initialize(genesis)?;
        Ok(ledger)
    }

    /// Seal and store the genesis block. Transactions on the genesis
    /// candidate are allowed and go through the contract pipeline.
    pub fn initialize(&mut self, mut genesis: PendingBlock) -> Result<&Block> {
        if !self.blocks.is_empty() {
            return Err(LedgerError::InvalidGenesis(format!(
                "chain already has {} blocks",
                self.blocks.len()
            )));
        }
        if genesis.index != 0 {
            return Err(LedgerError::InvalidGenesis(format!(
                "genesis index must be 0, got {}",
                genesis.index
            )));
        }
        if !genesis.previous_hash.is_empty() && genesis.previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(LedgerError::InvalidGenesis(format!(
                "genesis previous hash must be {GENESIS_PREVIOUS_HASH}, got {}",
                genesis.previous_hash
            )));
        }

        genesis.previous_hash = GENESIS_PREVIOUS_HASH.to_string();
        self.pipeline.apply_all(&mut genesis.transactions);
        let block = self.sealer.seal(genesis)?;
        info!(
            "LEDGER - genesis sealed (hash={}, nonce={})",
            block.hash(),
            block.nonce()
        );
        self.blocks.push(block);
        Ok(&self.blocks[0])
    }

    /// Build and seal the block that would follow the current tail. The
    /// chain itself is not modified; hand the result to [`Ledger::append_block`].
    pub fn build_next_block(&self, pending_transactions: Vec<Transaction>) -> Result<Block> {
        let previous = self.last_block().ok_or(LedgerError::EmptyChain)?;

        let mut block = PendingBlock::new(self.blocks.len() as u64, previous.hash());
        for tx in pending_transactions {
            block.add_transaction(tx);
        }
        self.pipeline.apply_all(&mut block.transactions);

        self.sealer.seal(block)
    }

    /// Append a sealed block, re-validating its linkage to the tail and its seal.
    pub fn append_block(&mut self, block: Block) -> Result<&Block> {
        let tail = self.last_block().ok_or(LedgerError::EmptyChain)?;
        let expected_index = self.blocks.len() as u64;

        if block.index() != expected_index || block.previous_hash() != tail.hash() {
            warn!(
                "LEDGER - rejected block #{} (prev={}): tail is #{} ({})",
                block.index(),
                block.previous_hash(),
                tail.index(),
                tail.hash()
            );
            return Err(LedgerError::ChainLinkageViolation {
                expected_index,
                actual_index: block.index(),
                expected_previous_hash: tail.hash().to_string(),
                actual_previous_hash: block.previous_hash().to_string(),
            });
        }
        if let Err(e) = self.sealer.verify(&block) {
            warn!("LEDGER - rejected block #{}: {e}", block.index());
            return Err(e);
        }

        info!(
            "LEDGER - appended block #{} (hash={}, nonce={}, txs={})",
            block.index(),
            block.hash(),
            block.nonce(),
            block.transactions().len()
        );
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Walk the whole chain: genesis sentinel, indexes, linkage and seals.
    pub fn validate_chain(&self) -> bool {
        let Some(genesis) = self.blocks.first() else {
            return false;
        };
        if genesis.index() != 0 || genesis.previous_hash() != GENESIS_PREVIOUS_HASH {
            return false;
        }

        for (i, block) in self.blocks.iter().enumerate() {
            if block.index() != i as u64 || self.sealer.verify(block).is_err() {
                return false;
            }
            if i > 0 && block.previous_hash() != self.blocks[i - 1].hash() {
                return false;
            }
        }
        true
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.sealer.difficulty
    }

    pub fn pipeline(&self) -> &ContractPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::Ledger;
    use crate::blockchain::{Difficulty, GENESIS_PREVIOUS_HASH, HashSealer, PendingBlock};
    use crate::error::LedgerError;
    use crate::transaction::{ContractPipeline, Transaction, TransactionKind};

    fn demo_transactions() -> Vec<Transaction> {
        vec![
            Transaction::new("x1", "x2", 20.0, TransactionKind::Domestic).unwrap(),
            Transaction::new("x3", "x4", 10.0, TransactionKind::International).unwrap(),
        ]
    }

    fn ledger() -> Ledger {
        Ledger::new(
            PendingBlock::genesis(),
            ContractPipeline::default(),
            HashSealer::default(),
        )
        .unwrap()
    }

    fn grow(ledger: &mut Ledger, blocks: usize) {
        for _ in 0..blocks {
            let block = ledger.build_next_block(demo_transactions()).unwrap();
            ledger.append_block(block).unwrap();
        }
    }

    #[test]
    fn genesis_is_sealed_with_sentinel() {
        let ledger = ledger();
        assert_eq!(ledger.len(), 1);
        let genesis = &ledger.blocks()[0];
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert!(genesis.hash().starts_with("00"));
        assert!(ledger.validate_chain());
    }

    #[test]
    fn genesis_with_empty_previous_hash_gets_sentinel() {
        let ledger = Ledger::new(
            PendingBlock::new(0, ""),
            ContractPipeline::default(),
            HashSealer::default(),
        )
        .unwrap();
        assert_eq!(ledger.blocks()[0].previous_hash(), GENESIS_PREVIOUS_HASH);
    }

    #[test]
    fn genesis_transactions_are_accepted_and_transformed() {
        let mut genesis = PendingBlock::genesis();
        for tx in demo_transactions() {
            genesis.add_transaction(tx);
        }
        let ledger =
            Ledger::new(genesis, ContractPipeline::default(), HashSealer::default()).unwrap();
        let txs = ledger.blocks()[0].transactions();
        assert_eq!(txs.len(), 2);
        assert!((txs[0].fee() - 0.4).abs() < 1e-9);
        assert!((txs[1].fee() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_misplaced_genesis() {
        let err = Ledger::new(
            PendingBlock::new(1, GENESIS_PREVIOUS_HASH),
            ContractPipeline::new(),
            HashSealer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidGenesis(_)));

        let err = Ledger::new(
            PendingBlock::new(0, "deadbeef"),
            ContractPipeline::new(),
            HashSealer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidGenesis(_)));
    }

    #[test]
    fn rejects_second_genesis() {
        let mut ledger = ledger();
        let err = ledger.initialize(PendingBlock::genesis()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidGenesis(_)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn build_on_empty_chain_is_an_error() {
        let ledger = Ledger::empty(ContractPipeline::default(), HashSealer::default());
        assert!(ledger.is_empty());
        assert!(ledger.last_block().is_none());
        assert_eq!(
            ledger.build_next_block(demo_transactions()),
            Err(LedgerError::EmptyChain)
        );
    }

    #[test]
    fn append_on_empty_chain_is_an_error() {
        let source = ledger();
        let block = source.build_next_block(demo_transactions()).unwrap();
        let mut empty = Ledger::empty(ContractPipeline::default(), HashSealer::default());
        assert_eq!(empty.append_block(block), Err(LedgerError::EmptyChain));
        assert!(empty.is_empty());
        assert!(!empty.validate_chain());
    }

    #[test]
    fn empty_ledger_can_be_initialized_later() {
        let mut ledger = Ledger::empty(ContractPipeline::default(), HashSealer::default());
        ledger.initialize(PendingBlock::genesis()).unwrap();
        grow(&mut ledger, 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn build_does_not_touch_the_chain() {
        let ledger = ledger();
        let before = ledger.blocks().to_vec();
        let block = ledger.build_next_block(demo_transactions()).unwrap();
        assert_eq!(ledger.blocks(), before.as_slice());
        assert_eq!(block.index(), 1);
        assert_eq!(block.previous_hash(), before[0].hash());
    }

    #[test]
    fn built_block_carries_transformed_transactions() {
        let ledger = ledger();
        let block = ledger.build_next_block(demo_transactions()).unwrap();
        let txs = block.transactions();

        assert_eq!(txs[0].from(), "x1");
        assert!((txs[0].fee() - 0.4).abs() < 1e-9);
        assert!((txs[0].amount() - 19.6).abs() < 1e-9);
        assert_eq!(txs[1].from(), "x3");
        assert!((txs[1].fee() - 0.5).abs() < 1e-9);
        assert!((txs[1].amount() - 9.5).abs() < 1e-9);
    }

    #[test]
    fn fees_are_not_reapplied_on_append() {
        let mut ledger = ledger();
        let block = ledger.build_next_block(demo_transactions()).unwrap();
        let built = block.clone();
        ledger.append_block(block).unwrap();
        grow(&mut ledger, 1);

        assert_eq!(&ledger.blocks()[1], &built);
        assert!((ledger.blocks()[1].transactions()[0].amount() - 19.6).abs() < 1e-9);
    }

    #[test]
    fn chain_stays_linked() {
        let mut ledger = ledger();
        grow(&mut ledger, 4);

        let blocks = ledger.blocks();
        assert_eq!(blocks.len(), 5);
        for i in 1..blocks.len() {
            assert_eq!(blocks[i].previous_hash(), blocks[i - 1].hash());
            assert_eq!(blocks[i].index(), i as u64);
        }
        assert!(blocks.iter().all(|b| b.hash().starts_with("00")));
        assert!(ledger.validate_chain());
        assert_eq!(ledger.get(4), ledger.last_block());
        assert!(ledger.get(5).is_none());
    }

    #[test]
    fn rejects_block_with_wrong_previous_hash() {
        let mut ledger = ledger();
        grow(&mut ledger, 1);
        let before = ledger.blocks().to_vec();

        // Sealed against a different index-2 predecessor.
        let sealer = HashSealer::default();
        let mut foreign = PendingBlock::new(2, "ff".repeat(32));
        foreign.add_transaction(Transaction::new("a", "b", 1.0, TransactionKind::Domestic).unwrap());
        let foreign = sealer.seal(foreign).unwrap();

        let err = ledger.append_block(foreign).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ChainLinkageViolation { expected_index: 2, actual_index: 2, .. }
        ));
        assert_eq!(ledger.blocks(), before.as_slice());
    }

    #[test]
    fn rejects_stale_block_after_concurrent_append() {
        let mut ledger = ledger();
        let first = ledger.build_next_block(demo_transactions()).unwrap();
        let stale = ledger.build_next_block(demo_transactions()).unwrap();

        ledger.append_block(first).unwrap();
        let err = ledger.append_block(stale).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ChainLinkageViolation { expected_index: 2, actual_index: 1, .. }
        ));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn rejects_block_below_difficulty() {
        let mut ledger = ledger();
        let tail_hash = ledger.last_block().unwrap().hash().to_string();

        // Correctly linked but sealed against a weaker target.
        let weak = HashSealer::new(Difficulty::trivial(), 1);
        let mut candidate = PendingBlock::new(1, tail_hash);
        candidate.add_transaction(Transaction::new("a", "b", 1.0, TransactionKind::Domestic).unwrap());
        let mut block = weak.seal(candidate.clone()).unwrap();
        // Walk nonces until the trivial seal lands on a hash that misses "00".
        while block.hash().starts_with("00") {
            candidate.nonce += 1;
            block = weak.seal(candidate.clone()).unwrap();
        }

        let err = ledger.append_block(block).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSeal { index: 1, .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn no_op_pipeline_with_trivial_difficulty() {
        let mut ledger = Ledger::new(
            PendingBlock::genesis(),
            ContractPipeline::new(),
            HashSealer::new(Difficulty::trivial(), 1),
        )
        .unwrap();
        let block = ledger.build_next_block(demo_transactions()).unwrap();
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.transactions(), demo_transactions().as_slice());
        ledger.append_block(block).unwrap();
        assert!(ledger.validate_chain());
        assert_eq!(ledger.difficulty(), Difficulty::trivial());
    }

    #[test]
    fn sealing_timeout_leaves_chain_untouched() {
        let mut ledger = Ledger::new(
            PendingBlock::genesis(),
            ContractPipeline::default(),
            HashSealer::new(Difficulty::trivial(), 1),
        )
        .unwrap();
        // Swap in an unreachable target for the next block.
        ledger.sealer = HashSealer::new(Difficulty::new(64), 10);
        let err = ledger.build_next_block(demo_transactions()).unwrap_err();
        assert_eq!(err, LedgerError::SealingTimeout { index: 1, attempts: 10 });
        assert_eq!(ledger.len(), 1);
    }
}
